//! ReferenceDataRepository - reference tables the warehouse ids resolve against
//!
//! The domain only knows the shape of the rows; fetching them from the
//! warehouse or from extracts is an infrastructure concern.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::SurrogateId;
use crate::errors::DomainResult;

/// DS_BRAND
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BrandRef {
    pub brand_id: SurrogateId,
    pub global_brand: String,
    #[serde(default)]
    pub indication_name: Option<String>,
}

/// DS_CHANNEL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ChannelRef {
    pub channel_id: SurrogateId,
    pub channel: String,
}

/// DS_SALES_LINE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SalesLineRef {
    pub id: SurrogateId,
    pub brand_id: SurrogateId,
    pub sales_team: String,
    pub occp_type: String,
}

/// Master fact table: one row per sales-line/channel pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FactRef {
    pub m_id: SurrogateId,
    pub sales_table_id: SurrogateId,
    pub channel_id: SurrogateId,
}

/// Time dimension: one row per calendar cycle month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TimeDimensionRef {
    pub cycle_id: SurrogateId,
    #[serde(with = "us_date")]
    pub cycle_start_date: NaiveDate,
    #[serde(with = "us_date")]
    pub cycle_end_date: NaiveDate,
}

/// Snapshot of every reference table one resolution needs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub brands: Vec<BrandRef>,
    pub channels: Vec<ChannelRef>,
    pub sales_lines: Vec<SalesLineRef>,
    pub facts: Vec<FactRef>,
    pub time_dimension: Vec<TimeDimensionRef>,
}

/// Reference data collaborator
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    async fn brands(&self) -> DomainResult<Vec<BrandRef>>;

    async fn channels(&self) -> DomainResult<Vec<ChannelRef>>;

    async fn sales_lines(&self) -> DomainResult<Vec<SalesLineRef>>;

    async fn facts(&self) -> DomainResult<Vec<FactRef>>;

    async fn time_dimension(&self) -> DomainResult<Vec<TimeDimensionRef>>;

    /// Fetch every table
    async fn snapshot(&self) -> DomainResult<ReferenceTables> {
        Ok(ReferenceTables {
            brands: self.brands().await?,
            channels: self.channels().await?,
            sales_lines: self.sales_lines().await?,
            facts: self.facts().await?,
            time_dimension: self.time_dimension().await?,
        })
    }
}

/// `MM/DD/YYYY`, as exported from the time dimension
mod us_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%m/%d/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_dimension_dates() {
        let row: TimeDimensionRef = serde_json::from_str(
            r#"{"CYCLE_ID": 202601, "CYCLE_START_DATE": "01/01/2026", "CYCLE_END_DATE": "03/31/2026"}"#,
        )
        .unwrap();
        assert_eq!(row.cycle_id.as_str(), "202601");
        assert_eq!(row.cycle_end_date, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(
            serde_json::to_value(&row).unwrap()["CYCLE_START_DATE"],
            "01/01/2026"
        );
    }

    #[test]
    fn test_brand_without_indication() {
        let row: BrandRef =
            serde_json::from_str(r#"{"BRAND_ID": "B1", "GLOBAL_BRAND": "TOUJEO"}"#).unwrap();
        assert_eq!(row.indication_name, None);
    }
}
