use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::types::{FundingRound, SelectionRecord};

/// Newest first; undated entries sink to the bottom
pub fn compare_dates_desc(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of rounds by announcement date, newest first
pub fn sort_rounds(rounds: &mut [FundingRound]) {
    rounds.sort_by(|a, b| compare_dates_desc(a.announced_on, b.announced_on));
}

/// Stable sort of accepted records by announcement date, newest first
pub fn rank_records(records: &mut [SelectionRecord]) {
    records.sort_by(|a, b| compare_dates_desc(a.announced_date, b.announced_date));
}
