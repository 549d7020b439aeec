//! Repository Abstractions - Ports for Infrastructure Layer
//!
//! The domain defines these contracts; the infrastructure crate implements
//! them.

pub mod reference_data;
mod run_id_allocator;

pub use reference_data::{
    BrandRef, ChannelRef, FactRef, ReferenceDataRepository, ReferenceTables, SalesLineRef,
    TimeDimensionRef,
};
pub use run_id_allocator::{RunIdAllocator, WarehouseTable};
