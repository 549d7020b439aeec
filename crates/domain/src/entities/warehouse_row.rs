//! Warehouse rows for DS_BUSINESS_CONSTRAINTS,
//! DS_BRAND_SPECIFIC_BUSINESS_CONSTRAINTS and DS_OCCP_HCP_CONSTRAINTS
//!
//! Rows are append-only. A resubmission never edits a stored row; it emits
//! superseding copies of the prior rows with the most-recent flag cleared.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::SurrogateId;
use crate::value_objects::{ReferenceBucket, RunId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MostRecentFlag {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

/// Load-audit columns shared by all three tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EtlAudit {
    pub etl_load_id: String,
    #[serde(with = "etl_timestamp")]
    pub etl_insert: NaiveDateTime,
    #[serde(with = "etl_timestamp::optional")]
    pub etl_update: Option<NaiveDateTime>,
    pub most_recent_flag: MostRecentFlag,
}

impl EtlAudit {
    /// Audit columns for a fresh insert: `<prefix><YYYYMMDD>`, no update
    pub fn inserted(prefix: &str, at: NaiveDateTime) -> Self {
        Self {
            etl_load_id: format!("{prefix}{}", at.format("%Y%m%d")),
            etl_insert: at,
            etl_update: None,
            most_recent_flag: MostRecentFlag::Yes,
        }
    }

    pub fn is_most_recent(&self) -> bool {
        self.most_recent_flag == MostRecentFlag::Yes
    }

    fn superseded(&self, at: NaiveDateTime) -> Self {
        Self {
            etl_update: Some(at),
            most_recent_flag: MostRecentFlag::No,
            ..self.clone()
        }
    }
}

/// Average capacity for one sales-line/channel fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BusinessConstraintRow {
    pub id: RunId,
    pub fact_id: SurrogateId,
    pub upcoming_time_id: SurrogateId,
    pub reference_time_id: SurrogateId,
    pub avg_rep_capacity: f64,
    #[serde(flatten)]
    pub audit: EtlAudit,
}

/// Per-brand distribution and specialty for multibrand runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BrandSpecificRow {
    pub id: RunId,
    pub brand_id: SurrogateId,
    /// Percent as text, empty when the brand has no distribution entry
    pub brand_distribution: String,
    pub specialties: Option<String>,
    /// `VEEVA` or `None`
    pub file_format: String,
    #[serde(flatten)]
    pub audit: EtlAudit,
}

/// REF_CYCLE_ACTUAL holds a bucket in historical mode and a segment label in
/// segment mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefCycleActual {
    Bucket(ReferenceBucket),
    Segment(String),
}

/// One envelope bound for one sales-line/channel fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct HcpConstraintRow {
    pub id: RunId,
    pub fact_id: SurrogateId,
    pub upcoming_time_id: SurrogateId,
    pub reference_time_id: SurrogateId,
    pub ref_cycle_actual: RefCycleActual,
    pub min_val: i64,
    pub max_val: i64,
    #[serde(flatten)]
    pub audit: EtlAudit,
}

/// All rows of one submission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WarehouseRows {
    pub business_constraints: Vec<BusinessConstraintRow>,
    pub brand_specific: Vec<BrandSpecificRow>,
    pub hcp_constraints: Vec<HcpConstraintRow>,
}

impl WarehouseRows {
    pub fn len(&self) -> usize {
        self.business_constraints.len() + self.brand_specific.len() + self.hcp_constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of the prior rows that this submission replaces, flagged `N`
    /// and stamped with `at`. A prior row is replaced when it is still the
    /// most recent and its natural key (FACT_ID, or BRAND_ID for brand rows)
    /// reappears here. `prior` is left untouched.
    pub fn supersede(&self, prior: &WarehouseRows, at: NaiveDateTime) -> WarehouseRows {
        let facts: HashSet<&SurrogateId> = self
            .business_constraints
            .iter()
            .map(|row| &row.fact_id)
            .collect();
        let hcp_facts: HashSet<&SurrogateId> =
            self.hcp_constraints.iter().map(|row| &row.fact_id).collect();
        let brands: HashSet<&SurrogateId> =
            self.brand_specific.iter().map(|row| &row.brand_id).collect();

        WarehouseRows {
            business_constraints: prior
                .business_constraints
                .iter()
                .filter(|row| row.audit.is_most_recent() && facts.contains(&row.fact_id))
                .map(|row| BusinessConstraintRow {
                    audit: row.audit.superseded(at),
                    ..row.clone()
                })
                .collect(),
            brand_specific: prior
                .brand_specific
                .iter()
                .filter(|row| row.audit.is_most_recent() && brands.contains(&row.brand_id))
                .map(|row| BrandSpecificRow {
                    audit: row.audit.superseded(at),
                    ..row.clone()
                })
                .collect(),
            hcp_constraints: prior
                .hcp_constraints
                .iter()
                .filter(|row| row.audit.is_most_recent() && hcp_facts.contains(&row.fact_id))
                .map(|row| HcpConstraintRow {
                    audit: row.audit.superseded(at),
                    ..row.clone()
                })
                .collect(),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` timestamps as loaded by the ETL
mod etl_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod optional {
        use super::FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(&value.format(FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| NaiveDateTime::parse_from_str(&raw, FORMAT))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}
