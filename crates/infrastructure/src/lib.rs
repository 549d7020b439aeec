//! Infrastructure layer: configuration files, reference tables, run ids

pub mod allocator;
pub mod config;
pub mod reference;

pub use allocator::SequenceRunIdAllocator;
pub use config::{ConfigLoader, ConfigSource, ConfigValidator};
pub use reference::JsonReferenceRepository;
