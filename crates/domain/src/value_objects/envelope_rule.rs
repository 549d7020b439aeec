//! EnvelopeRule - per-HCP min/max interaction bounds
//!
//! Enforces `0 <= min <= max` at construction and on deserialization, so a
//! rule held by the compiler is always valid.

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// `[min, max]` as emitted in the payload
pub type Bounds = [i64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelopeRule")]
pub struct EnvelopeRule {
    min: i64,
    max: i64,
}

#[derive(Deserialize)]
struct RawEnvelopeRule {
    min: i64,
    max: i64,
}

impl TryFrom<RawEnvelopeRule> for EnvelopeRule {
    type Error = DomainError;

    fn try_from(raw: RawEnvelopeRule) -> Result<Self, Self::Error> {
        EnvelopeRule::new(raw.min, raw.max)
    }
}

impl EnvelopeRule {
    pub fn new(min: i64, max: i64) -> DomainResult<Self> {
        if min < 0 || max < min {
            return Err(DomainError::InvalidEnvelopeRule {
                context: "envelope rule".to_string(),
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn bounds(&self) -> Bounds {
        [self.min, self.max]
    }
}

/// Reference-cycle-actual bucket: how many interactions an HCP had in the
/// reference cycle. Entered as an integer but often arrives as a float from
/// spreadsheet-shaped input; whole floats are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceBucket(i64);

impl ReferenceBucket {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReferenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ReferenceBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for ReferenceBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawBucket {
            Int(i64),
            Float(f64),
        }

        match RawBucket::deserialize(deserializer)? {
            RawBucket::Int(value) => Ok(Self(value)),
            RawBucket::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                Ok(Self(value as i64))
            }
            RawBucket::Float(value) => Err(serde::de::Error::custom(format!(
                "reference bucket must be a whole number, got {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_validation() {
        assert!(EnvelopeRule::new(0, 0).is_ok());
        assert!(EnvelopeRule::new(1, 3).is_ok());
        assert!(EnvelopeRule::new(-1, 3).is_err());
        assert!(EnvelopeRule::new(4, 3).is_err());
        assert_eq!(EnvelopeRule::new(1, 3).unwrap().bounds(), [1, 3]);
    }

    #[test]
    fn test_rule_deserialization_validates() {
        let ok: EnvelopeRule = serde_json::from_str(r#"{"min": 1, "max": 4}"#).unwrap();
        assert_eq!(ok.max(), 4);

        let bad = serde_json::from_str::<EnvelopeRule>(r#"{"min": 5, "max": 4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_bucket_accepts_whole_floats() {
        let bucket: ReferenceBucket = serde_json::from_str("2.0").unwrap();
        assert_eq!(bucket.value(), 2);
        let bucket: ReferenceBucket = serde_json::from_str("3").unwrap();
        assert_eq!(bucket.to_string(), "3");
        assert!(serde_json::from_str::<ReferenceBucket>("2.5").is_err());
    }
}
