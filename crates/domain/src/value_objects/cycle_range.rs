//! Cycle ranges as entered on the submission summary
//!
//! Two textual forms are accepted: `2025-01-01 - 2025-03-31` and
//! `Jan 2025 - Mar 2025` (full month names too). Only the calendar month of
//! each side matters for time-dimension lookups.

use crate::errors::{DomainError, DomainResult};
use chrono::{Datelike, Months, NaiveDate};

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Which edge of a calendar month a date is reduced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthEdge {
    Start,
    End,
}

/// A `start - end` pair, still in its textual form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRange {
    pub start: String,
    pub end: String,
}

impl CycleRange {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();

        if let Some((start, end)) = split_iso(raw) {
            return Ok(Self { start, end });
        }

        if let Some((left, right)) = raw.split_once('-') {
            let (left, right) = (left.trim(), right.trim());
            if is_month_year(left) && is_month_year(right) {
                return Ok(Self {
                    start: left.to_string(),
                    end: right.to_string(),
                });
            }
        }

        Err(DomainError::UnparsableCycleRange(raw.to_string()))
    }
}

fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn split_iso(raw: &str) -> Option<(String, String)> {
    let left = raw.get(..10)?;
    if !is_iso_date(left) {
        return None;
    }
    let right = raw.get(10..)?.trim_start().strip_prefix('-')?.trim_start();
    is_iso_date(right).then(|| (left.to_string(), right.to_string()))
}

fn is_month_year(s: &str) -> bool {
    let mut parts = s.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(month), Some(year), None) => {
            (3..=9).contains(&month.len())
                && month.chars().all(|c| c.is_ascii_alphabetic())
                && year.len() == 4
                && year.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// First day of a calendar month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of a calendar month
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Reduce an ISO date or a `Month YYYY` string to the start or end of its
/// calendar month
pub fn canonical_month_date(raw: &str, edge: MonthEdge) -> DomainResult<NaiveDate> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {raw}"), "%d %B %Y"))
        .map_err(|_| DomainError::UnparsableDate(raw.to_string()))?;

    Ok(match edge {
        MonthEdge::Start => month_start(date),
        MonthEdge::End => month_end(date),
    })
}
