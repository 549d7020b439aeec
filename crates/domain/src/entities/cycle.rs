//! Planning and reference cycle windows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MONTH_YEAR: &str = "%b %Y";

/// A run of calendar months with its working-day count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Length in months, the proration divisor
    pub months: u32,
    pub working_days: u32,
}

impl CycleWindow {
    /// `Jan 2025 - Mar 2025`, the form written to the submission summary
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(MONTH_YEAR),
            self.end.format(MONTH_YEAR)
        )
    }
}

/// The upcoming cycle being planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningCycle {
    /// Display name, e.g. `C1 2026`
    pub name: String,
    #[serde(flatten)]
    pub window: CycleWindow,
}

impl PlanningCycle {
    /// Cycle name as used in payload identifiers
    pub fn payload_name(&self) -> String {
        self.name.replace(' ', "_")
    }
}
