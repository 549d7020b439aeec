//! CapacityCompiler - per-day rep capacity prorated to the planning cycle

use std::collections::BTreeMap;

use crate::entities::{ChannelCapacity, CycleWindow};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::ChannelMapper;

/// Sales line -> bare channel key -> interactions per rep for one month of
/// the cycle
pub type CapacityConstraints = BTreeMap<String, BTreeMap<String, i64>>;

pub struct CapacityCompiler;

impl CapacityCompiler {
    /// `floor(capacity * working_days / months)`
    pub fn prorate(channel: &str, capacity: f64, working_days: u32, months: u32) -> DomainResult<i64> {
        if months == 0 {
            return Err(DomainError::ZeroLengthCycle);
        }
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(DomainError::InvalidCapacity {
                channel: channel.to_string(),
                value: capacity,
            });
        }
        Ok((capacity * f64::from(working_days) / f64::from(months)).floor() as i64)
    }

    pub fn compile(
        sales_line: &str,
        capacity: &ChannelCapacity,
        cycle: &CycleWindow,
    ) -> DomainResult<CapacityConstraints> {
        let mut per_channel = BTreeMap::new();
        for channel in &capacity.channels {
            let prorated = Self::prorate(
                channel,
                capacity.daily_capacity_for(channel),
                cycle.working_days,
                cycle.months,
            )?;
            per_channel.insert(ChannelMapper::bare_key(channel), prorated);
        }
        Ok(BTreeMap::from([(sales_line.to_string(), per_channel)]))
    }
}
