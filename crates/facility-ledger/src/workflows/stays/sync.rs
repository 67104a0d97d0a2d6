use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::calculator::{MonthlyStayCalculator, ResidentStaySummary};
use super::domain::{FacilityId, ReportMonth, StayError};
use super::repository::{DailyRecordSource, PeriodRow, PeriodStore, RepositoryError};

/// Recomputes a facility's stay periods for a month and rewrites them.
pub struct StayPeriodSyncService<S, P> {
    source: Arc<S>,
    store: Arc<P>,
    max_attempts: u32,
}

/// Result of a successful month rewrite.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub facility: FacilityId,
    pub month: ReportMonth,
    pub as_of: NaiveDate,
    pub residents: usize,
    pub rows_written: usize,
    pub attempts: u32,
    pub summaries: Vec<ResidentStaySummary>,
}

impl<S, P> StayPeriodSyncService<S, P>
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    /// `max_attempts` is clamped to at least one.
    pub fn new(source: Arc<S>, store: Arc<P>, max_attempts: u32) -> Self {
        Self {
            source,
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Rows currently stored for the month, as written by the last sync.
    pub fn stored_periods(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<PeriodRow>, RepositoryError> {
        self.store.load_month(facility, month)
    }

    /// Reads the month and the previous month end, derives every resident's
    /// intervals and replaces the stored rows for the month.
    ///
    /// A failed write recomputes the whole month before trying again; rows
    /// are never patched individually.
    pub fn sync_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
        as_of: NaiveDate,
    ) -> Result<SyncOutcome, StaySyncError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let summaries = self.compute(facility, month, as_of)?;
            let rows = period_rows(&summaries);

            match self.store.replace_month(facility, month, &rows) {
                Ok(()) => {
                    info!(
                        %facility,
                        %month,
                        %as_of,
                        residents = summaries.len(),
                        rows = rows.len(),
                        attempt,
                        "stay periods replaced"
                    );
                    return Ok(SyncOutcome {
                        facility: facility.clone(),
                        month,
                        as_of,
                        residents: summaries.len(),
                        rows_written: rows.len(),
                        attempts: attempt,
                        summaries,
                    });
                }
                Err(source) if attempt >= self.max_attempts => {
                    warn!(
                        %facility,
                        %month,
                        attempt,
                        error = %source,
                        "giving up on stay period sync"
                    );
                    return Err(StaySyncError::Persistence {
                        attempts: attempt,
                        source,
                    });
                }
                Err(source) => {
                    warn!(
                        %facility,
                        %month,
                        attempt,
                        error = %source,
                        "stay period write failed; recomputing month"
                    );
                }
            }
        }
    }

    fn compute(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
        as_of: NaiveDate,
    ) -> Result<Vec<ResidentStaySummary>, StaySyncError> {
        let month_records = self
            .source
            .fetch_month_records(facility, month)
            .map_err(StaySyncError::Source)?;
        let previous_day_records = self
            .source
            .fetch_day_records(facility, month.previous_month_end())
            .map_err(StaySyncError::Source)?;

        let summaries = MonthlyStayCalculator::new(month, as_of)
            .summarize(&month_records, &previous_day_records)?;
        Ok(summaries)
    }
}

/// Flattens summaries into stored rows, preserving resident and interval order.
pub fn period_rows(summaries: &[ResidentStaySummary]) -> Vec<PeriodRow> {
    summaries
        .iter()
        .flat_map(|summary| {
            summary
                .intervals
                .iter()
                .map(|interval| PeriodRow::from_interval(&summary.resident_id, interval))
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum StaySyncError {
    #[error("failed to read daily records: {0}")]
    Source(#[source] RepositoryError),
    #[error(transparent)]
    Calculation(#[from] StayError),
    #[error("failed to replace stay periods after {attempts} attempt(s): {source}")]
    Persistence {
        attempts: u32,
        #[source]
        source: RepositoryError,
    },
}
