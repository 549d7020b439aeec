//! Domain Services - the constraint compiler
//!
//! Pure functions of the bundle, apart from the warehouse mapping service
//! which drives the reference-data and run-id collaborators.

mod brand_combinator;
mod capacity_compiler;
pub mod envelope_transformer;
mod fact_builder;
mod interaction_builder;
mod month_planner;
pub mod payload_assembler;
mod submission;
mod warehouse_mapping;
mod warehouse_resolver;

pub use brand_combinator::BrandCombinator;
pub use capacity_compiler::{CapacityCompiler, CapacityConstraints};
pub use envelope_transformer::{BucketBounds, EnvelopeRules, EnvelopeTransformer, SegmentBounds};
pub use fact_builder::FactBuilder;
pub use interaction_builder::{InteractionChannelBuilder, InteractionVocabulary};
pub use month_planner::MonthPlanner;
pub use payload_assembler::{Payload, PayloadAssembler, PayloadConstraints};
pub use submission::SubmissionEnvelope;
pub use warehouse_mapping::{WarehouseMappingService, WarehouseSubmission};
pub use warehouse_resolver::IdResolver;
