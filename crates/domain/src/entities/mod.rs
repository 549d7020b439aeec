//! Domain Entities - Core business objects
//!
//! The constraint bundle and everything compiled from it.

mod brand;
pub mod bundle;
mod cycle;
mod surrogate_id;
pub mod warehouse_row;

pub use brand::Brand;
pub use bundle::{
    BrandDistribution, ChannelCapacity, ConstraintBundle, EnvelopeMatrix, HistoricalEnvelope,
    Market, NonPrescriberEnvelope, NonPrescriberPriority, OccpMode, SegmentEnvelope,
};
pub use cycle::{CycleWindow, PlanningCycle};
pub use surrogate_id::SurrogateId;
pub use warehouse_row::{
    BrandSpecificRow, BusinessConstraintRow, EtlAudit, HcpConstraintRow, MostRecentFlag,
    RefCycleActual, WarehouseRows,
};
