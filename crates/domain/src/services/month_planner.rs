//! MonthPlanner - literal month sequences for feature naming

use chrono::{Months, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct MonthPlanner;

impl MonthPlanner {
    /// `start`, `start + 1 month`, ... for `count` months. Day-of-month is
    /// clamped to the length of shorter months.
    pub fn months(start: NaiveDate, count: u32) -> Vec<NaiveDate> {
        (0..count)
            .map_while(|offset| start.checked_add_months(Months::new(offset)))
            .collect()
    }

    /// Same sequence rendered as `YYYY-MM-DD`
    pub fn month_labels(start: NaiveDate, count: u32) -> Vec<String> {
        Self::months(start, count)
            .into_iter()
            .map(|month| month.format(DATE_FORMAT).to_string())
            .collect()
    }
}
