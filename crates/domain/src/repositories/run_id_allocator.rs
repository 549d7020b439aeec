//! RunIdAllocator - source of the per-submission `C_<7-digit>` identifier
//!
//! Allocation is a read of the stored maximum followed, much later, by the
//! write of rows carrying the new id. Implementations must serialize
//! allocations so two submissions never receive the same id.

use async_trait::async_trait;
use std::fmt;

use crate::errors::DomainResult;
use crate::value_objects::RunId;

/// Warehouse tables keyed by a run identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarehouseTable {
    BusinessConstraints,
    BrandSpecific,
    HcpConstraints,
}

impl WarehouseTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            WarehouseTable::BusinessConstraints => "DS_BUSINESS_CONSTRAINTS",
            WarehouseTable::BrandSpecific => "DS_BRAND_SPECIFIC_BUSINESS_CONSTRAINTS",
            WarehouseTable::HcpConstraints => "DS_OCCP_HCP_CONSTRAINTS",
        }
    }
}

impl fmt::Display for WarehouseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[async_trait]
pub trait RunIdAllocator: Send + Sync {
    /// Next unused identifier for `table`; never returns the same id twice
    async fn allocate(&self, table: WarehouseTable) -> DomainResult<RunId>;
}
