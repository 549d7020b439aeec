//! IdResolver - names to warehouse surrogate ids
//!
//! Every lookup either finds a reference row or fails with a lookup-miss
//! error naming what was searched for. Name comparisons are trimmed and
//! case-insensitive.

use crate::entities::{OccpMode, SurrogateId};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::ReferenceTables;
use crate::value_objects::{canonical_month_date, ChannelMapper, CycleRange, MonthEdge};

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub struct IdResolver<'a> {
    tables: &'a ReferenceTables,
    marker_brand: String,
}

impl<'a> IdResolver<'a> {
    /// `marker_brand` names the brand whose reference rows are split by
    /// indication, e.g. `DUPIXENT Asthma`
    pub fn new(tables: &'a ReferenceTables, marker_brand: &str) -> Self {
        Self {
            tables,
            marker_brand: marker_brand.trim().to_uppercase(),
        }
    }

    /// RTE channels are qualified by the e-consent flag before the lookup
    pub fn channel_id(&self, channel: &str, e_consent: bool) -> DomainResult<SurrogateId> {
        let label = ChannelMapper::warehouse_label(channel, e_consent);
        self.tables
            .channels
            .iter()
            .find(|row| same_name(&row.channel, &label))
            .map(|row| row.channel_id.clone())
            .ok_or(DomainError::ChannelNotFound(label))
    }

    pub fn brand_id(&self, brand: &str) -> DomainResult<SurrogateId> {
        let brand = brand.trim().to_uppercase();

        let Some(rest) = brand.strip_prefix(&self.marker_brand) else {
            return self.plain_brand_id(&brand);
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return self.plain_brand_id(&brand);
        }

        let indication = rest.trim();
        if indication.is_empty() {
            return self.plain_brand_id(&self.marker_brand);
        }

        self.tables
            .brands
            .iter()
            .find(|row| {
                same_name(&row.global_brand, &self.marker_brand)
                    && row
                        .indication_name
                        .as_deref()
                        .is_some_and(|name| same_name(name, indication))
            })
            .map(|row| row.brand_id.clone())
            .ok_or_else(|| DomainError::BrandIndicationNotFound {
                brand: self.marker_brand.clone(),
                indication: indication.to_string(),
            })
    }

    fn plain_brand_id(&self, brand: &str) -> DomainResult<SurrogateId> {
        self.tables
            .brands
            .iter()
            .find(|row| same_name(&row.global_brand, brand))
            .map(|row| row.brand_id.clone())
            .ok_or_else(|| DomainError::BrandNotFound(brand.to_string()))
    }

    pub fn sales_line_id(
        &self,
        brand_id: &SurrogateId,
        sales_line: &str,
        mode: OccpMode,
    ) -> DomainResult<SurrogateId> {
        self.tables
            .sales_lines
            .iter()
            .find(|row| {
                row.brand_id == *brand_id
                    && same_name(&row.sales_team, sales_line)
                    && same_name(&row.occp_type, mode.occp_type())
            })
            .map(|row| row.id.clone())
            .ok_or_else(|| DomainError::SalesLineNotFound {
                brand_id: brand_id.to_string(),
                sales_line: sales_line.to_string(),
                occp_type: mode.occp_type().to_string(),
            })
    }

    pub fn fact_id(
        &self,
        sales_table_id: &SurrogateId,
        channel_id: &SurrogateId,
    ) -> DomainResult<SurrogateId> {
        self.tables
            .facts
            .iter()
            .find(|row| row.sales_table_id == *sales_table_id && row.channel_id == *channel_id)
            .map(|row| row.m_id.clone())
            .ok_or_else(|| DomainError::FactNotFound {
                sales_table_id: sales_table_id.to_string(),
                channel_id: channel_id.to_string(),
            })
    }

    /// Time-dimension row whose start (or end) date is the first (or last)
    /// day of the calendar month of `date`
    pub fn time_id(&self, date: &str, edge: MonthEdge) -> DomainResult<SurrogateId> {
        let wanted = canonical_month_date(date, edge)?;
        self.tables
            .time_dimension
            .iter()
            .find(|row| match edge {
                MonthEdge::Start => row.cycle_start_date == wanted,
                MonthEdge::End => row.cycle_end_date == wanted,
            })
            .map(|row| row.cycle_id.clone())
            .ok_or_else(|| DomainError::TimeWindowNotFound {
                input: date.trim().to_string(),
                date: wanted,
            })
    }

    /// Time id of the first month of a `start - end` cycle range
    pub fn cycle_start_time_id(&self, cycle_range: &str) -> DomainResult<SurrogateId> {
        let range = CycleRange::parse(cycle_range)?;
        self.time_id(&range.start, MonthEdge::Start)
    }
}
