//! SubmissionEnvelope - the request body posted to the optimization API

use serde::{Deserialize, Serialize};

use super::Payload;
use crate::config::OccpConfig;
use crate::entities::Brand;
use crate::errors::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    pub gbu: String,
    pub countrycode: String,
    /// Brand codes joined with `_`
    pub brand: String,
    pub subtype: String,
    /// The payload as a JSON string
    pub constraints: String,
}

impl SubmissionEnvelope {
    /// A brand's own code wins over the configured code table
    pub fn from_payload(
        payload: &Payload,
        brands: &[Brand],
        config: &OccpConfig,
    ) -> DomainResult<Self> {
        let brand = brands
            .iter()
            .map(|brand| {
                brand
                    .code
                    .clone()
                    .unwrap_or_else(|| config.brand_code_for(&brand.name))
            })
            .collect::<Vec<_>>()
            .join("_");

        Ok(Self {
            gbu: config.compiler.gbu.clone(),
            countrycode: payload.country_code.clone(),
            brand,
            subtype: config.compiler.subtype.clone(),
            constraints: payload.to_json_string()?,
        })
    }
}
