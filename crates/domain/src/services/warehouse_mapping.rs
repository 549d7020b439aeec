//! WarehouseMappingService - reference fetch, run id allocation, row build
//!
//! The only place the compiler talks to collaborators. The run id comes from
//! the injected allocator, never from in-process state.

use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, info};

use super::{FactBuilder, IdResolver};
use crate::config::WarehouseConfig;
use crate::entities::{ConstraintBundle, WarehouseRows};
use crate::errors::DomainResult;
use crate::repositories::{ReferenceDataRepository, RunIdAllocator, WarehouseTable};
use crate::value_objects::RunId;

/// Rows of one submission and the id they share
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseSubmission {
    pub run_id: RunId,
    pub rows: WarehouseRows,
}

pub struct WarehouseMappingService<R, A>
where
    R: ReferenceDataRepository,
    A: RunIdAllocator,
{
    reference_repo: Arc<R>,
    allocator: Arc<A>,
    config: WarehouseConfig,
}

impl<R, A> WarehouseMappingService<R, A>
where
    R: ReferenceDataRepository,
    A: RunIdAllocator,
{
    pub fn new(reference_repo: Arc<R>, allocator: Arc<A>, config: WarehouseConfig) -> Self {
        Self {
            reference_repo,
            allocator,
            config,
        }
    }

    pub async fn map_submission(
        &self,
        bundle: &ConstraintBundle,
        loaded_at: NaiveDateTime,
    ) -> DomainResult<WarehouseSubmission> {
        bundle.validate()?;

        let tables = self.reference_repo.snapshot().await?;
        debug!(
            brands = tables.brands.len(),
            channels = tables.channels.len(),
            facts = tables.facts.len(),
            "Fetched reference tables"
        );

        let run_id = self
            .allocator
            .allocate(WarehouseTable::BusinessConstraints)
            .await?;
        debug!(run_id = %run_id, "Allocated run id");

        let resolver = IdResolver::new(&tables, &self.config.marker_brand);
        let rows = FactBuilder::new(resolver, self.config.etl_load_prefix.clone())
            .build(bundle, run_id, loaded_at)?;

        info!(run_id = %run_id, rows = rows.len(), "Mapped submission to warehouse rows");
        Ok(WarehouseSubmission { run_id, rows })
    }
}
