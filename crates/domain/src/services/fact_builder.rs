//! FactBuilder - warehouse rows for one submission
//!
//! The run id and load timestamp are passed in; allocating the id is the
//! caller's job so the builder itself stays deterministic.

use chrono::NaiveDateTime;
use tracing::debug;

use super::IdResolver;
use crate::entities::{
    Brand, BrandSpecificRow, BusinessConstraintRow, ConstraintBundle, EnvelopeMatrix, EtlAudit,
    HcpConstraintRow, RefCycleActual, SurrogateId, WarehouseRows,
};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::RunId;

const VEEVA_FORMAT: &str = "VEEVA";
const NO_FORMAT: &str = "None";

/// Resolved ids of one bundle brand
struct ResolvedBrand<'b> {
    brand: &'b Brand,
    brand_id: SurrogateId,
    sales_table_id: SurrogateId,
}

pub struct FactBuilder<'a> {
    resolver: IdResolver<'a>,
    etl_load_prefix: String,
}

impl<'a> FactBuilder<'a> {
    pub fn new(resolver: IdResolver<'a>, etl_load_prefix: impl Into<String>) -> Self {
        Self {
            resolver,
            etl_load_prefix: etl_load_prefix.into(),
        }
    }

    pub fn build(
        &self,
        bundle: &ConstraintBundle,
        run_id: RunId,
        loaded_at: NaiveDateTime,
    ) -> DomainResult<WarehouseRows> {
        bundle.validate()?;

        let e_consent = bundle.capacity.e_consent_rte;
        let upcoming_time_id = self
            .resolver
            .cycle_start_time_id(&bundle.cycle.window.range_label())?;
        let reference_time_id = self
            .resolver
            .cycle_start_time_id(&bundle.reference.range_label())?;

        let brands = bundle
            .market
            .brands
            .iter()
            .map(|brand| {
                let brand_id = self.resolver.brand_id(&brand.name)?;
                let sales_table_id = self.resolver.sales_line_id(
                    &brand_id,
                    &bundle.market.sales_line,
                    bundle.market.mode,
                )?;
                Ok(ResolvedBrand {
                    brand,
                    brand_id,
                    sales_table_id,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let audit = EtlAudit::inserted(&self.etl_load_prefix, loaded_at);
        let mut rows = WarehouseRows::default();

        for resolved in &brands {
            for channel in &bundle.capacity.channels {
                let channel_id = self.resolver.channel_id(channel, e_consent)?;
                rows.business_constraints.push(BusinessConstraintRow {
                    id: run_id,
                    fact_id: self.resolver.fact_id(&resolved.sales_table_id, &channel_id)?,
                    upcoming_time_id: upcoming_time_id.clone(),
                    reference_time_id: reference_time_id.clone(),
                    avg_rep_capacity: bundle.capacity.daily_capacity_for(channel),
                    audit: audit.clone(),
                });
            }
        }

        if brands.len() > 1 {
            let specialties = bundle.market.joint_specialty().map(str::to_string);
            let file_format = if bundle.market.veeva_align_format {
                VEEVA_FORMAT
            } else {
                NO_FORMAT
            };
            for resolved in &brands {
                let percent = bundle
                    .market
                    .distribution
                    .as_ref()
                    .and_then(|distribution| distribution.percent_for(&resolved.brand.name))
                    .map(|percent| percent.to_string())
                    .unwrap_or_default();
                rows.brand_specific.push(BrandSpecificRow {
                    id: run_id,
                    brand_id: resolved.brand_id.clone(),
                    brand_distribution: percent,
                    specialties: specialties.clone(),
                    file_format: file_format.to_string(),
                    audit: audit.clone(),
                });
            }
        }

        let hcp_row = |fact_id: SurrogateId, actual: RefCycleActual, min: i64, max: i64| {
            HcpConstraintRow {
                id: run_id,
                fact_id,
                upcoming_time_id: upcoming_time_id.clone(),
                reference_time_id: reference_time_id.clone(),
                ref_cycle_actual: actual,
                min_val: min,
                max_val: max,
                audit: audit.clone(),
            }
        };

        match &bundle.envelopes {
            EnvelopeMatrix::Historical(entries) => {
                for entry in entries {
                    let channel_id = self.resolver.channel_id(&entry.channel, e_consent)?;
                    for resolved in &brands {
                        let fact_id = self.resolver.fact_id(&resolved.sales_table_id, &channel_id)?;
                        rows.hcp_constraints.push(hcp_row(
                            fact_id,
                            RefCycleActual::Bucket(entry.reference_cycle_actual),
                            entry.rule.min(),
                            entry.rule.max(),
                        ));
                    }
                }
            }
            EnvelopeMatrix::Segment(entries) => {
                for entry in entries {
                    let channel_id = self.resolver.channel_id(&entry.channel, e_consent)?;
                    let resolved = brands
                        .iter()
                        .find(|resolved| resolved.brand.matches(&entry.brand))
                        .ok_or_else(|| DomainError::UnknownEnvelopeBrand(entry.brand.clone()))?;
                    let fact_id = self.resolver.fact_id(&resolved.sales_table_id, &channel_id)?;
                    rows.hcp_constraints.push(hcp_row(
                        fact_id,
                        RefCycleActual::Segment(entry.segment.clone()),
                        entry.rule.min(),
                        entry.rule.max(),
                    ));
                }
            }
        }

        debug!(
            run_id = %run_id,
            business = rows.business_constraints.len(),
            brand_specific = rows.brand_specific.len(),
            hcp = rows.hcp_constraints.len(),
            "Built warehouse rows"
        );

        Ok(rows)
    }
}
