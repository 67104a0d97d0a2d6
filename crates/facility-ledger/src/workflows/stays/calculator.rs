use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use super::accounting::enrolled_days;
use super::domain::{
    DailyStatusRecord, MonthFlags, MonthlyAccounting, ReportMonth, ResidentId, StatusInterval,
    StatusKind, StayError,
};
use super::intervals::extract_intervals;

/// Derived stay data for one resident and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentStaySummary {
    pub resident_id: ResidentId,
    pub intervals: Vec<StatusInterval>,
    pub accounting: MonthlyAccounting,
}

impl ResidentStaySummary {
    pub fn enrolled_days(&self) -> u32 {
        self.accounting.enrolled_days
    }

    pub fn intervals_of(&self, kind: StatusKind) -> impl Iterator<Item = &StatusInterval> {
        self.intervals
            .iter()
            .filter(move |interval| interval.kind == kind)
    }
}

#[derive(Debug)]
struct ResidentFlags {
    hospitalization: MonthFlags,
    overnight_absence: MonthFlags,
}

impl ResidentFlags {
    fn new(month: ReportMonth) -> Self {
        Self {
            hospitalization: MonthFlags::new(month),
            overnight_absence: MonthFlags::new(month),
        }
    }

    fn for_kind(&self, kind: StatusKind) -> &MonthFlags {
        match kind {
            StatusKind::Hospitalization => &self.hospitalization,
            StatusKind::OvernightAbsence => &self.overnight_absence,
        }
    }
}

/// Groups a facility's daily records by resident and derives each resident's
/// intervals and enrollment days for one month.
///
/// The cutoff is fixed at construction so repeated runs over the same input
/// produce identical output.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyStayCalculator {
    month: ReportMonth,
    as_of: NaiveDate,
}

impl MonthlyStayCalculator {
    pub fn new(month: ReportMonth, as_of: NaiveDate) -> Self {
        Self { month, as_of }
    }

    pub fn month(&self) -> ReportMonth {
        self.month
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// `month_records` are the month's rows for every resident;
    /// `previous_day_records` are the rows dated on the previous month's last
    /// day. Residents are returned in ascending id order, one entry per
    /// resident that has at least one row inside the month.
    pub fn summarize(
        &self,
        month_records: &[DailyStatusRecord],
        previous_day_records: &[DailyStatusRecord],
    ) -> Result<Vec<ResidentStaySummary>, StayError> {
        let mut residents: BTreeMap<ResidentId, ResidentFlags> = BTreeMap::new();
        let mut seen: HashSet<(&ResidentId, NaiveDate)> = HashSet::new();

        for record in month_records {
            if !self.month.contains(record.date) {
                warn!(
                    resident = %record.resident_id,
                    date = %record.date,
                    month = %self.month,
                    "skipping daily record outside the reporting month"
                );
                continue;
            }
            if !seen.insert((&record.resident_id, record.date)) {
                return Err(StayError::DuplicateRecord {
                    resident_id: record.resident_id.clone(),
                    date: record.date,
                });
            }

            let flags = residents
                .entry(record.resident_id.clone())
                .or_insert_with(|| ResidentFlags::new(self.month));
            let day = record.date.day();
            flags.hospitalization.set(day, record.hospitalization_active);
            flags
                .overnight_absence
                .set(day, record.overnight_absence_active);
        }

        let previous_month_end = self.month.previous_month_end();
        let mut seeded: HashSet<&ResidentId> = HashSet::new();
        for record in previous_day_records {
            if record.date != previous_month_end {
                warn!(
                    resident = %record.resident_id,
                    date = %record.date,
                    expected = %previous_month_end,
                    "skipping continuity record not dated on the previous month end"
                );
                continue;
            }
            if !seeded.insert(&record.resident_id) {
                return Err(StayError::DuplicateRecord {
                    resident_id: record.resident_id.clone(),
                    date: record.date,
                });
            }
            // Residents without rows this month have nothing to continue into.
            if let Some(flags) = residents.get_mut(&record.resident_id) {
                flags
                    .hospitalization
                    .set_previous_day(record.hospitalization_active);
                flags
                    .overnight_absence
                    .set_previous_day(record.overnight_absence_active);
            }
        }

        let summaries: Vec<ResidentStaySummary> = residents
            .into_iter()
            .map(|(resident_id, flags)| self.summarize_flags(resident_id, &flags))
            .collect();

        debug!(
            month = %self.month,
            as_of = %self.as_of,
            residents = summaries.len(),
            "summarized monthly stays"
        );

        Ok(summaries)
    }

    /// Summary for a resident with no rows in the month: no intervals and
    /// every elapsed day billable.
    pub fn summarize_resident_without_records(
        &self,
        resident_id: ResidentId,
    ) -> ResidentStaySummary {
        self.summarize_flags(resident_id, &ResidentFlags::new(self.month))
    }

    fn summarize_flags(
        &self,
        resident_id: ResidentId,
        flags: &ResidentFlags,
    ) -> ResidentStaySummary {
        let intervals = StatusKind::ordered()
            .into_iter()
            .flat_map(|kind| extract_intervals(flags.for_kind(kind), kind))
            .collect();

        let accounting = MonthlyAccounting {
            resident_id: resident_id.clone(),
            year: self.month.year(),
            month: self.month.month(),
            enrolled_days: enrolled_days(
                &flags.hospitalization,
                &flags.overnight_absence,
                self.as_of,
            ),
        };

        ResidentStaySummary {
            resident_id,
            intervals,
            accounting,
        }
    }
}
