//! Brand ordinals - the `BRAND<n>` placeholders used in interaction keys
//!
//! Two numbering schemes exist and they are deliberately separate types:
//!
//! - [`SelectionOrdinal`] follows the order in which brands were selected.
//!   It drives interaction keys, historical envelope keys and capacity.
//! - [`SortedOrdinal`] follows the alphabetical order of brand names. Only
//!   segment-mode envelope keys use it.
//!
//! For multibrand bundles whose selection order is not alphabetical the two
//! disagree on which brand is `BRAND1`. Which one the optimization engine
//! expects for segment envelopes has not been confirmed, so neither is
//! converted into the other.

use crate::entities::Brand;
use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based position of a brand in selection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectionOrdinal(usize);

impl SelectionOrdinal {
    pub fn position(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SelectionOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BRAND{}", self.0)
    }
}

/// 1-based position of a brand in alphabetical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortedOrdinal(usize);

impl SortedOrdinal {
    pub fn position(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SortedOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BRAND{}", self.0)
    }
}

/// Selection-order ordinals for one compilation run
#[derive(Debug, Clone, PartialEq)]
pub struct BrandRoster {
    entries: Vec<(String, SelectionOrdinal)>,
}

impl BrandRoster {
    /// Assign ordinals in the order brands appear in the bundle
    pub fn from_brands(brands: &[Brand]) -> Self {
        let entries = brands
            .iter()
            .enumerate()
            .map(|(index, brand)| (brand.name.clone(), SelectionOrdinal(index + 1)))
            .collect();
        Self { entries }
    }

    pub fn ordinal(&self, brand: &str) -> DomainResult<SelectionOrdinal> {
        self.entries
            .iter()
            .find(|(name, _)| name == brand)
            .map(|(_, ordinal)| *ordinal)
            .ok_or_else(|| DomainError::UnassignedOrdinal(brand.to_string()))
    }

    /// Roster spelling of a brand label, matched case-insensitively
    pub fn canonical_name(&self, brand: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(brand.trim()))
            .map(|(name, _)| name.as_str())
    }

    /// Brand names in selection order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SelectionOrdinal)> {
        self.entries
            .iter()
            .map(|(name, ordinal)| (name.as_str(), *ordinal))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `BRAND1_AND_BRAND3` suffix for a brand combination
    pub fn combination_suffix(&self, combination: &[String]) -> DomainResult<String> {
        let labels = combination
            .iter()
            .map(|brand| self.ordinal(brand).map(|ordinal| ordinal.to_string()))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(labels.join("_AND_"))
    }
}

/// Alphabetical ordinals over an arbitrary set of brand labels
pub fn sorted_ordinals<'a, I>(brands: I) -> Vec<(String, SortedOrdinal)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<String> = brands.into_iter().map(str::to_string).collect();
    names.sort();
    names.dedup();
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name, SortedOrdinal(index + 1)))
        .collect()
}
