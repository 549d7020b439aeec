//! Domain Layer - OCCP constraint compiler
//!
//! Contains ONLY the compiler core, with no dependencies on:
//! - Infrastructure (reference data stores, file systems, networks)
//! - Frameworks (CLI, UI)
//! - External systems (the optimization API, the warehouse)
//!
//! Layout:
//! - Entities: the constraint bundle and the warehouse rows compiled from it
//! - Value Objects: channel names, brand ordinals, envelope rules, run ids
//! - Services: payload compilation and warehouse id resolution
//! - Repository Abstractions: reference data and run-id allocation ports
//! - Config: compiler settings and the configuration deep-merger

pub mod config;
pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod value_objects;

// Re-export core domain types
pub use config::{DeepMerger, MergeOptions, OccpConfig, RemapEntry, RemapTable};
pub use entities::{ConstraintBundle, CycleWindow, PlanningCycle, SurrogateId, WarehouseRows};
pub use errors::{DomainError, DomainResult, ErrorCategory};
pub use repositories::{ReferenceDataRepository, ReferenceTables, RunIdAllocator, WarehouseTable};
pub use services::{
    Payload, PayloadAssembler, SubmissionEnvelope, WarehouseMappingService, WarehouseSubmission,
};
pub use value_objects::{ChannelMapper, RunId};
