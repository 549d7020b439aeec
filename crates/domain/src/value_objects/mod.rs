//! Domain Value Objects - Immutable domain concepts
//!
//! Value objects carry no identity and are immutable once built.

pub mod brand_ordinal;
pub mod channel_name;
mod country_code;
pub mod cycle_range;
mod envelope_rule;
mod run_id;

pub use brand_ordinal::{sorted_ordinals, BrandRoster, SelectionOrdinal, SortedOrdinal};
pub use channel_name::ChannelMapper;
pub use country_code::CountryCodes;
pub use cycle_range::{canonical_month_date, CycleRange, MonthEdge};
pub use envelope_rule::{Bounds, EnvelopeRule, ReferenceBucket};
pub use run_id::RunId;
