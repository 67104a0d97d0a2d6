use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    DailyStatusRecord, DateLabel, FacilityId, IntervalStart, ReportMonth, ResidentId,
    StatusInterval, StatusKind,
};

/// Stored form of one derived interval, keyed by resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub resident_id: ResidentId,
    pub kind: StatusKind,
    pub start: IntervalStart,
    pub end: DateLabel,
}

impl PeriodRow {
    pub fn from_interval(resident_id: &ResidentId, interval: &StatusInterval) -> Self {
        Self {
            resident_id: resident_id.clone(),
            kind: interval.kind,
            start: interval.start,
            end: interval.end,
        }
    }

    pub fn interval(&self) -> StatusInterval {
        StatusInterval {
            kind: self.kind,
            start: self.start,
            end: self.end,
        }
    }
}

/// Resident roster entry; the name is only used for labeling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentListing {
    pub id: ResidentId,
    pub name: String,
}

/// Read side: the daily entries kept by the facility staff workflow.
pub trait DailyRecordSource: Send + Sync {
    fn fetch_month_records(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError>;

    /// Every resident's record for a single day.
    fn fetch_day_records(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError>;

    fn list_active_residents(
        &self,
        facility: &FacilityId,
    ) -> Result<Vec<ResidentListing>, RepositoryError>;

    fn facility_name(&self, facility: &FacilityId) -> Result<Option<String>, RepositoryError>;
}

/// Write side for the derived intervals.
pub trait PeriodStore: Send + Sync {
    /// Deletes every stored row for the facility and month and inserts `rows`
    /// in one transaction. Readers see either the old rows or the new ones.
    fn replace_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
        rows: &[PeriodRow],
    ) -> Result<(), RepositoryError>;

    fn load_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<PeriodRow>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("transaction aborted: {0}")]
    Transaction(String),
}
