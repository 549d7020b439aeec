//! RunId - submission identifier shared by every warehouse row of one run
//!
//! Rendered as `C_` followed by a 7-digit zero-padded sequence number.

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "C_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u32);

impl RunId {
    pub fn new(sequence: u32) -> DomainResult<Self> {
        if sequence == 0 {
            return Err(DomainError::InvalidRunId(format!("{PREFIX}{sequence:07}")));
        }
        Ok(Self(sequence))
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn sequence(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> DomainResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidRunId(self.to_string()))
    }

    /// Next id after the maximum currently stored. An empty table or an id
    /// that does not start with `C_<digits>` restarts the sequence at 1.
    pub fn next_after(stored_max: Option<&str>) -> DomainResult<Self> {
        match stored_max.map(Self::parse_leading) {
            Some(Some(current)) => current.next(),
            _ => Ok(Self::first()),
        }
    }

    /// Leading `C_<digits>` match, ignoring trailing text
    fn parse_leading(raw: &str) -> Option<Self> {
        let digits: String = raw
            .trim()
            .strip_prefix(PREFIX)?
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{:07}", self.0)
    }
}

impl FromStr for RunId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PREFIX)
            .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| DomainError::InvalidRunId(s.to_string()))?;
        let sequence = digits
            .parse()
            .map_err(|_| DomainError::InvalidRunId(s.to_string()))?;
        Self::new(sequence)
    }
}

impl Serialize for RunId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        assert_eq!(RunId::first().to_string(), "C_0000001");
        assert_eq!(RunId::new(123).unwrap().to_string(), "C_0000123");
        assert!(RunId::new(0).is_err());
    }

    #[test]
    fn test_next_after_stored_max() {
        assert_eq!(RunId::next_after(None).unwrap(), RunId::first());
        assert_eq!(
            RunId::next_after(Some("C_0000041")).unwrap().to_string(),
            "C_0000042"
        );
        assert_eq!(RunId::next_after(Some("legacy-7")).unwrap(), RunId::first());
    }

    #[test]
    fn test_parse_round_trip() {
        let id: RunId = "C_0000012".parse().unwrap();
        assert_eq!(id.sequence(), 12);
        assert!("C_".parse::<RunId>().is_err());
        assert!("X_0000001".parse::<RunId>().is_err());
    }
}
