//! PayloadAssembler - the optimization engine payload
//!
//! Pure composition of the interaction vocabulary, envelope rules and
//! capacity constraints plus cycle metadata. Calling it twice on the same
//! bundle yields byte-identical JSON.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{
    CapacityCompiler, CapacityConstraints, EnvelopeRules, EnvelopeTransformer,
    InteractionChannelBuilder, MonthPlanner,
};
use crate::config::{DeepMerger, MergeOptions, RemapTable};
use crate::entities::{ConstraintBundle, NonPrescriberPriority};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{Bounds, CountryCodes};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadConstraints {
    #[serde(rename = "ENVELOPE_RULES")]
    pub envelope_rules: EnvelopeRules,

    #[serde(
        rename = "NON_PRESCRIBERS_ENVELOPE_RULES",
        skip_serializing_if = "Option::is_none"
    )]
    pub non_prescribers: Option<BTreeMap<String, Bounds>>,
}

/// Document handed to the optimization client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    /// Empty when the country has no engine code
    pub country_code: String,
    pub country: String,
    pub brand: Vec<String>,
    pub all_channel_cols: Vec<String>,
    pub interaction_channels: Vec<String>,
    pub channel_cols: Vec<String>,
    pub channel_cols_all: Vec<String>,
    pub feature_list: Vec<String>,
    pub multibrand_data: bool,
    pub max_country: bool,
    pub occp_length: u32,
    pub months_to_optimize: Vec<String>,
    pub actual_date_range: Vec<String>,
    #[serde(rename = "CYCLE_NAME")]
    pub cycle_name: String,
    #[serde(rename = "CYCLE_START_DATE")]
    pub cycle_start_date: String,
    #[serde(rename = "CYCLE_END_DATE")]
    pub cycle_end_date: String,
    pub e_consent: bool,
    pub combined_interactions_dict: BTreeMap<String, Vec<String>>,
    pub n_months: usize,
    pub channel_brand_dict: BTreeMap<String, Vec<String>>,
    pub capacity_constraints: CapacityConstraints,
    pub constraints: PayloadConstraints,
    pub is_non_prescriber: bool,
    pub non_prescribers_priority: Option<NonPrescriberPriority>,
}

impl Payload {
    pub fn to_json(&self) -> DomainResult<Value> {
        serde_json::to_value(self).map_err(|e| DomainError::PayloadEncoding(e.to_string()))
    }

    /// Compact JSON text, as embedded in the submission envelope
    pub fn to_json_string(&self) -> DomainResult<String> {
        serde_json::to_string(self).map_err(|e| DomainError::PayloadEncoding(e.to_string()))
    }

    /// Lowercase hex SHA-256 of the compact JSON form
    pub fn digest(&self) -> DomainResult<String> {
        let hash = Sha256::digest(self.to_json_string()?.as_bytes());
        Ok(hash.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// This payload layered onto a base configuration tree
    pub fn merged_into(
        &self,
        base: &Value,
        remap: &RemapTable,
        options: MergeOptions,
    ) -> DomainResult<Value> {
        Ok(DeepMerger::new(options).merge(base, &self.to_json()?, remap))
    }
}

pub struct PayloadAssembler {
    default_features: Vec<String>,
}

impl PayloadAssembler {
    pub fn new(default_features: Vec<String>) -> Self {
        Self { default_features }
    }

    pub fn assemble(&self, bundle: &ConstraintBundle) -> DomainResult<Payload> {
        bundle.validate()?;

        let roster = bundle.roster();
        let vocabulary = InteractionChannelBuilder::build(&bundle.capacity, &roster)?;
        let envelope_rules =
            EnvelopeTransformer::transform(&bundle.envelopes, &bundle.capacity, &roster)?;
        let non_prescribers = if bundle.capacity.non_prescriber_included {
            Some(EnvelopeTransformer::non_prescriber(&bundle.non_prescriber)?)
        } else {
            None
        };
        let capacity_constraints = CapacityCompiler::compile(
            &bundle.market.sales_line,
            &bundle.capacity,
            &bundle.cycle.window,
        )?;

        let country = bundle.market.country.trim().to_uppercase();
        let country_code = match CountryCodes::code_for(&country) {
            Some(code) => code.to_string(),
            None => {
                warn!(country = %country, "No country code known, payload carries an empty code");
                String::new()
            }
        };

        let window = &bundle.cycle.window;
        let months_to_optimize = MonthPlanner::month_labels(window.start, window.months);
        let actual_date_range =
            MonthPlanner::month_labels(bundle.reference.start, bundle.reference.months);

        let feature_list = vocabulary
            .interactions
            .iter()
            .chain(self.default_features.iter())
            .cloned()
            .collect();

        debug!(
            country = %country,
            interactions = vocabulary.interactions.len(),
            envelope_keys = envelope_rules.keys().len(),
            "Assembled payload"
        );

        Ok(Payload {
            country_code,
            country,
            brand: bundle.market.brand_names(),
            all_channel_cols: vocabulary.interactions.clone(),
            interaction_channels: vocabulary.interactions.clone(),
            channel_cols: vocabulary.interactions.clone(),
            channel_cols_all: vocabulary.all_columns(),
            feature_list,
            multibrand_data: bundle.is_multibrand(),
            max_country: true,
            occp_length: window.months,
            n_months: months_to_optimize.len(),
            months_to_optimize,
            actual_date_range,
            cycle_name: bundle.cycle.payload_name(),
            cycle_start_date: window.start.to_string(),
            cycle_end_date: window.end.to_string(),
            e_consent: bundle.capacity.e_consent_rte,
            combined_interactions_dict: vocabulary.channel_index.clone(),
            channel_brand_dict: vocabulary.channel_index,
            capacity_constraints,
            constraints: PayloadConstraints {
                envelope_rules,
                non_prescribers,
            },
            is_non_prescriber: bundle.capacity.non_prescriber_included,
            non_prescribers_priority: bundle.capacity.non_prescriber_priority,
        })
    }
}
