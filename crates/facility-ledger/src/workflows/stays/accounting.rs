use chrono::{Datelike, NaiveDate};

use super::domain::{MonthFlags, ReportMonth};

/// Number of days of `month` elapsed as of the cutoff.
pub fn limit_day(month: ReportMonth, as_of: NaiveDate) -> u32 {
    if as_of > month.last_day() {
        month.days_in_month()
    } else if as_of < month.first_day() {
        0
    } else {
        as_of.day()
    }
}

/// Billable days up to the cutoff: every elapsed day on which the resident
/// was neither hospitalized nor away overnight.
pub fn enrolled_days(
    hospitalization: &MonthFlags,
    overnight_absence: &MonthFlags,
    as_of: NaiveDate,
) -> u32 {
    let limit = limit_day(hospitalization.month(), as_of);
    let active = (1..=limit)
        .filter(|day| hospitalization.get(*day) || overnight_absence.get(*day))
        .count() as u32;

    limit.saturating_sub(active)
}
