//! ConstraintBundle - the validated input of one compilation run
//!
//! Immutable once handed to the compiler. Every compiler service takes the
//! bundle (or a narrower borrow of it) and returns a fresh value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{Brand, CycleWindow, PlanningCycle};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{BrandRoster, ChannelMapper, EnvelopeRule, ReferenceBucket};

/// Single-brand or joint-promotion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccpMode {
    #[serde(alias = "monobrand", alias = "MONOBRAND")]
    Monobrand,
    #[serde(alias = "multibrand", alias = "MULTIBRAND")]
    Multibrand,
}

impl OccpMode {
    pub fn is_multibrand(&self) -> bool {
        matches!(self, OccpMode::Multibrand)
    }

    /// OCCP_TYPE column value in DS_SALES_LINE
    pub fn occp_type(&self) -> &'static str {
        match self {
            OccpMode::Monobrand => "MONOBRAND",
            OccpMode::Multibrand => "MULTIBRAND",
        }
    }
}

/// Brand -> share of the promotion effort, in percent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandDistribution {
    ratios: BTreeMap<String, u32>,
}

impl BrandDistribution {
    pub fn new(ratios: BTreeMap<String, u32>) -> Self {
        Self { ratios }
    }

    /// Percent for a brand, matched case-insensitively
    pub fn percent_for(&self, brand: &str) -> Option<u32> {
        self.ratios
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(brand.trim()))
            .map(|(_, percent)| *percent)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some((brand, percent)) = self.ratios.iter().find(|(_, p)| **p > 100) {
            return Err(DomainError::InvalidBrandDistribution(format!(
                "{brand} has {percent}%, above 100%"
            )));
        }
        let total: u32 = self.ratios.values().sum();
        if total != 100 {
            return Err(DomainError::InvalidBrandDistribution(format!(
                "ratios sum to {total}%, expected 100%"
            )));
        }
        Ok(())
    }
}

/// Market step: where, what and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Country display name, e.g. `Italy`
    pub country: String,
    /// Sales line identifier, e.g. `IT_Diab_PM`
    pub sales_line: String,
    /// Brands in selection order
    pub brands: Vec<Brand>,
    pub mode: OccpMode,
    /// `"BrandA and BrandB" -> "Cardiology"`
    #[serde(default)]
    pub specialties: BTreeMap<String, String>,
    #[serde(default)]
    pub distribution: Option<BrandDistribution>,
    #[serde(default)]
    pub veeva_align_format: bool,
}

impl Market {
    pub fn brand_names(&self) -> Vec<String> {
        self.brands.iter().map(|brand| brand.name.clone()).collect()
    }

    /// Specialty whose key names every brand of the market
    pub fn joint_specialty(&self) -> Option<&str> {
        self.specialties
            .iter()
            .find(|(brands, _)| {
                let brands = brands.to_lowercase();
                self.brands
                    .iter()
                    .all(|brand| brands.contains(&brand.name.to_lowercase()))
            })
            .map(|(_, specialty)| specialty.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonPrescriberPriority {
    Low,
    Medium,
    High,
}

/// Channel step: which channels, how much capacity per rep per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCapacity {
    pub channels: Vec<String>,
    /// Channels eligible for joint brand interactions
    #[serde(default)]
    pub multibrand_channels: Vec<String>,
    /// Interactions per rep per day, keyed by channel label
    #[serde(default)]
    pub daily_capacity: BTreeMap<String, f64>,
    #[serde(default)]
    pub non_prescriber_included: bool,
    #[serde(default)]
    pub non_prescriber_priority: Option<NonPrescriberPriority>,
    #[serde(default)]
    pub e_consent_rte: bool,
}

impl ChannelCapacity {
    pub fn is_multibrand_channel(&self, channel: &str) -> bool {
        self.multibrand_channels
            .iter()
            .any(|eligible| ChannelMapper::same_channel(eligible, channel))
    }

    /// Daily capacity for the channel whose canonical token matches; a
    /// channel without an entry has no capacity
    pub fn daily_capacity_for(&self, channel: &str) -> f64 {
        self.daily_capacity
            .iter()
            .find(|(label, _)| ChannelMapper::same_channel(label, channel))
            .map(|(_, value)| *value)
            .unwrap_or(0.0)
    }
}

/// Bound for HCPs with a given interaction count in the reference cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEnvelope {
    pub channel: String,
    pub reference_cycle_actual: ReferenceBucket,
    pub rule: EnvelopeRule,
}

/// Bound for HCPs of one segment, per brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentEnvelope {
    pub channel: String,
    pub brand: String,
    pub segment: String,
    pub rule: EnvelopeRule,
}

/// Channel-level bound for non-prescribing HCPs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonPrescriberEnvelope {
    pub channel: String,
    pub rule: EnvelopeRule,
}

/// Envelope matrix in exactly one addressing mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rules", rename_all = "snake_case")]
pub enum EnvelopeMatrix {
    Historical(Vec<HistoricalEnvelope>),
    Segment(Vec<SegmentEnvelope>),
}

impl EnvelopeMatrix {
    pub fn mode_name(&self) -> &'static str {
        match self {
            EnvelopeMatrix::Historical(_) => "historical",
            EnvelopeMatrix::Segment(_) => "segment",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EnvelopeMatrix::Historical(rules) => rules.len(),
            EnvelopeMatrix::Segment(rules) => rules.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintBundle {
    pub market: Market,
    pub cycle: PlanningCycle,
    pub reference: CycleWindow,
    pub capacity: ChannelCapacity,
    pub envelopes: EnvelopeMatrix,
    #[serde(default)]
    pub non_prescriber: Vec<NonPrescriberEnvelope>,
}

impl ConstraintBundle {
    /// Selection-order ordinals for this run
    pub fn roster(&self) -> BrandRoster {
        BrandRoster::from_brands(&self.market.brands)
    }

    pub fn is_multibrand(&self) -> bool {
        self.market.mode.is_multibrand()
    }

    /// Reject anything the compiler would otherwise turn into a corrupt
    /// payload
    pub fn validate(&self) -> DomainResult<()> {
        self.validate_brands()?;
        self.validate_channels()?;
        self.validate_envelopes()?;

        if self.cycle.window.months == 0 || self.reference.months == 0 {
            return Err(DomainError::ZeroLengthCycle);
        }

        if let Some(distribution) = &self.market.distribution {
            distribution.validate()?;
        }

        Ok(())
    }

    fn validate_brands(&self) -> DomainResult<()> {
        if self.market.brands.is_empty() {
            return Err(DomainError::EmptyBrandList);
        }
        let mut seen = HashSet::new();
        for brand in &self.market.brands {
            if !seen.insert(brand.name.trim().to_uppercase()) {
                return Err(DomainError::DuplicateBrand(brand.name.clone()));
            }
        }
        Ok(())
    }

    fn validate_channels(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for channel in &self.capacity.channels {
            if !seen.insert(ChannelMapper::normalize(channel)) {
                return Err(DomainError::DuplicateChannel(channel.clone()));
            }
        }

        if let Some(unknown) = self
            .capacity
            .multibrand_channels
            .iter()
            .find(|channel| !seen.contains(&ChannelMapper::normalize(channel)))
        {
            return Err(DomainError::UnknownMultibrandChannel(unknown.clone()));
        }

        for (channel, value) in &self.capacity.daily_capacity {
            if !value.is_finite() || *value < 0.0 {
                return Err(DomainError::InvalidCapacity {
                    channel: channel.clone(),
                    value: *value,
                });
            }
        }
        Ok(())
    }

    fn validate_envelopes(&self) -> DomainResult<()> {
        let known_channel = |channel: &str| {
            self.capacity
                .channels
                .iter()
                .any(|known| ChannelMapper::same_channel(known, channel))
        };

        let channels: Vec<&str> = match &self.envelopes {
            EnvelopeMatrix::Historical(rules) => {
                rules.iter().map(|rule| rule.channel.as_str()).collect()
            }
            EnvelopeMatrix::Segment(rules) => {
                if let Some(rule) = rules
                    .iter()
                    .find(|rule| !self.market.brands.iter().any(|b| b.matches(&rule.brand)))
                {
                    return Err(DomainError::UnknownEnvelopeBrand(rule.brand.clone()));
                }
                rules.iter().map(|rule| rule.channel.as_str()).collect()
            }
        };

        let non_prescriber = self.non_prescriber.iter().map(|rule| rule.channel.as_str());
        if let Some(unknown) = channels
            .into_iter()
            .chain(non_prescriber)
            .find(|channel| !known_channel(channel))
        {
            return Err(DomainError::UnknownEnvelopeChannel(unknown.to_string()));
        }
        Ok(())
    }
}
