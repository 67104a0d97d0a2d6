//! Resident stay periods and enrollment-day accounting.
//!
//! Daily hospitalization and overnight-absence flags are turned into
//! contiguous intervals per month, and the elapsed days not covered by either
//! flag are counted as billable enrollment days. The month sync job and the
//! facility stay report both go through [`MonthlyStayCalculator`].

pub mod accounting;
pub mod calculator;
pub mod domain;
pub mod intervals;
pub mod report;
pub mod repository;
pub mod router;
pub mod sync;

#[cfg(test)]
mod tests;

pub use accounting::{enrolled_days, limit_day};
pub use calculator::{MonthlyStayCalculator, ResidentStaySummary};
pub use domain::{
    DailyStatusRecord, DateLabel, FacilityId, IntervalStart, MonthFlags, MonthlyAccounting,
    ReportMonth, ResidentId, StatusInterval, StatusKind, StayError,
};
pub use intervals::extract_intervals;
pub use report::{StayReport, StayReportError, StayReportRow, StayReportService};
pub use repository::{DailyRecordSource, PeriodRow, PeriodStore, RepositoryError, ResidentListing};
pub use router::{stay_router, StayRouterState};
pub use sync::{period_rows, StayPeriodSyncService, StaySyncError, SyncOutcome};
