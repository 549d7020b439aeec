//! InteractionChannelBuilder - the interaction-feature vocabulary
//!
//! Every channel contributes its bare key `REP_<token>`, one key per brand
//! (`REP_<token>_BRAND1`) and, when it is eligible for joint promotion, one
//! key per brand combination (`REP_<token>_BRAND1_AND_BRAND2`).

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::BrandCombinator;
use crate::entities::ChannelCapacity;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{BrandRoster, ChannelMapper};

/// Interaction keys of one bundle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionVocabulary {
    /// Brand and combination keys, channel by channel
    pub interactions: Vec<String>,
    /// Bare key -> its brand and combination keys
    pub channel_index: BTreeMap<String, Vec<String>>,
    /// Bare `REP_<token>` keys, used for capacity
    pub bare_keys: Vec<String>,
}

impl InteractionVocabulary {
    /// Interaction keys followed by bare keys
    pub fn all_columns(&self) -> Vec<String> {
        self.interactions
            .iter()
            .chain(self.bare_keys.iter())
            .cloned()
            .collect()
    }
}

pub struct InteractionChannelBuilder;

impl InteractionChannelBuilder {
    /// Brand keys then, if `multibrand`, combination keys for one channel
    pub fn keys_for_channel(
        channel: &str,
        roster: &BrandRoster,
        multibrand: bool,
    ) -> DomainResult<Vec<String>> {
        let bare = ChannelMapper::bare_key(channel);
        let mut keys: Vec<String> = roster
            .iter()
            .map(|(_, ordinal)| format!("{bare}_{ordinal}"))
            .collect();

        if multibrand {
            for combination in BrandCombinator::combinations(&roster.names()) {
                keys.push(format!("{bare}_{}", roster.combination_suffix(&combination)?));
            }
        }

        Ok(keys)
    }

    pub fn build(
        capacity: &ChannelCapacity,
        roster: &BrandRoster,
    ) -> DomainResult<InteractionVocabulary> {
        let mut vocabulary = InteractionVocabulary::default();
        // key -> channel label that produced it
        let mut owners: HashMap<String, &str> = HashMap::new();

        for channel in &capacity.channels {
            let bare = ChannelMapper::bare_key(channel);
            let keys =
                Self::keys_for_channel(channel, roster, capacity.is_multibrand_channel(channel))?;

            for key in std::iter::once(&bare).chain(keys.iter()) {
                if let Some(first) = owners.insert(key.clone(), channel.as_str()) {
                    return Err(DomainError::InteractionKeyCollision {
                        key: key.clone(),
                        first: first.to_string(),
                        second: channel.clone(),
                    });
                }
            }

            vocabulary.interactions.extend(keys.iter().cloned());
            vocabulary.channel_index.insert(bare.clone(), keys);
            vocabulary.bare_keys.push(bare);
        }

        debug!(
            channels = vocabulary.bare_keys.len(),
            interactions = vocabulary.interactions.len(),
            "Built interaction vocabulary"
        );

        Ok(vocabulary)
    }
}
