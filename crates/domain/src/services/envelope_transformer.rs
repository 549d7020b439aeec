//! EnvelopeTransformer - envelope matrices reshaped into payload bounds
//!
//! Historical rules are defined once per channel and copied to the bare key
//! and every brand and combination key of that channel. Segment rules are
//! keyed per brand using alphabetical ordinals, a numbering independent of
//! the selection order used everywhere else.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::InteractionChannelBuilder;
use crate::entities::{
    ChannelCapacity, EnvelopeMatrix, HistoricalEnvelope, NonPrescriberEnvelope, SegmentEnvelope,
};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{sorted_ordinals, Bounds, BrandRoster, ChannelMapper, ReferenceBucket};

/// Bucket -> bounds for one channel
pub type BucketBounds = BTreeMap<ReferenceBucket, Bounds>;

/// Segment label -> bounds for one channel and brand
pub type SegmentBounds = BTreeMap<String, Bounds>;

/// `ENVELOPE_RULES` in the addressing mode of the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeRules {
    Historical(BTreeMap<String, BucketBounds>),
    Segment(BTreeMap<String, SegmentBounds>),
}

impl EnvelopeRules {
    pub fn keys(&self) -> Vec<&str> {
        match self {
            EnvelopeRules::Historical(rules) => rules.keys().map(String::as_str).collect(),
            EnvelopeRules::Segment(rules) => rules.keys().map(String::as_str).collect(),
        }
    }
}

pub struct EnvelopeTransformer;

impl EnvelopeTransformer {
    pub fn transform(
        matrix: &EnvelopeMatrix,
        capacity: &ChannelCapacity,
        roster: &BrandRoster,
    ) -> DomainResult<EnvelopeRules> {
        let rules = match matrix {
            EnvelopeMatrix::Historical(entries) => {
                EnvelopeRules::Historical(Self::historical(entries, capacity, roster)?)
            }
            EnvelopeMatrix::Segment(entries) => {
                EnvelopeRules::Segment(Self::segment(entries, roster)?)
            }
        };

        debug!(
            mode = matrix.mode_name(),
            entries = matrix.len(),
            keys = rules.keys().len(),
            "Transformed envelope matrix"
        );
        Ok(rules)
    }

    pub fn historical(
        entries: &[HistoricalEnvelope],
        capacity: &ChannelCapacity,
        roster: &BrandRoster,
    ) -> DomainResult<BTreeMap<String, BucketBounds>> {
        // Channel label and its buckets, grouped by canonical token in first-seen order
        let mut by_channel: Vec<(String, &str, BucketBounds)> = Vec::new();

        for entry in entries {
            let token = ChannelMapper::canonical_token(&entry.channel);
            let position = match by_channel.iter().position(|(t, _, _)| *t == token) {
                Some(position) => position,
                None => {
                    by_channel.push((token, entry.channel.as_str(), BucketBounds::new()));
                    by_channel.len() - 1
                }
            };

            let buckets = &mut by_channel[position].2;
            if buckets
                .insert(entry.reference_cycle_actual, entry.rule.bounds())
                .is_some()
            {
                return Err(DomainError::DuplicateEnvelopeRule {
                    channel: entry.channel.clone(),
                    key: format!("bucket {}", entry.reference_cycle_actual),
                });
            }
        }

        let mut transformed = BTreeMap::new();
        for (_, channel, buckets) in by_channel {
            let keys = InteractionChannelBuilder::keys_for_channel(
                channel,
                roster,
                capacity.is_multibrand_channel(channel),
            )?;
            transformed.insert(ChannelMapper::bare_key(channel), buckets.clone());
            for key in keys {
                transformed.insert(key, buckets.clone());
            }
        }
        Ok(transformed)
    }

    pub fn segment(
        entries: &[SegmentEnvelope],
        roster: &BrandRoster,
    ) -> DomainResult<BTreeMap<String, SegmentBounds>> {
        let brands = entries
            .iter()
            .map(|entry| {
                roster
                    .canonical_name(&entry.brand)
                    .ok_or_else(|| DomainError::UnassignedOrdinal(entry.brand.clone()))
            })
            .collect::<DomainResult<Vec<&str>>>()?;
        let ordinals = sorted_ordinals(brands.iter().copied());
        let mut transformed: BTreeMap<String, SegmentBounds> = BTreeMap::new();

        for (entry, brand) in entries.iter().zip(&brands) {
            let ordinal = ordinals
                .iter()
                .find(|(name, _)| name == brand)
                .map(|(_, ordinal)| *ordinal)
                .ok_or_else(|| DomainError::UnassignedOrdinal(entry.brand.clone()))?;

            let key = format!("{}_{ordinal}", ChannelMapper::bare_key(&entry.channel));
            let segments = transformed.entry(key.clone()).or_default();
            if segments
                .insert(entry.segment.clone(), entry.rule.bounds())
                .is_some()
            {
                return Err(DomainError::DuplicateEnvelopeRule {
                    channel: entry.channel.clone(),
                    key: format!("{key} segment {}", entry.segment),
                });
            }
        }
        Ok(transformed)
    }

    /// Channel-level bounds, no brand suffix
    pub fn non_prescriber(entries: &[NonPrescriberEnvelope]) -> DomainResult<BTreeMap<String, Bounds>> {
        let mut transformed = BTreeMap::new();
        for entry in entries {
            let key = ChannelMapper::bare_key(&entry.channel);
            if transformed.insert(key.clone(), entry.rule.bounds()).is_some() {
                return Err(DomainError::DuplicateEnvelopeRule {
                    channel: entry.channel.clone(),
                    key,
                });
            }
        }
        Ok(transformed)
    }
}
