use super::super::calculator::{MonthlyStayCalculator, ResidentStaySummary};
use super::super::domain::{
    FacilityId, ReportMonth, ResidentId, StatusInterval, StatusKind, StayError,
};
use super::super::repository::{DailyRecordSource, RepositoryError, ResidentListing};
use super::views::StayReportRowView;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StayReportRow {
    pub resident_id: ResidentId,
    pub resident_name: String,
    pub facility_name: String,
    pub enrolled_days: u32,
    pub intervals: Vec<StatusInterval>,
}

impl StayReportRow {
    pub fn intervals_of(&self, kind: StatusKind) -> impl Iterator<Item = &StatusInterval> {
        self.intervals
            .iter()
            .filter(move |interval| interval.kind == kind)
    }

    pub fn view(&self, slots: usize) -> StayReportRowView {
        StayReportRowView::from_row(self, slots)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StayReportTotals {
    pub residents: usize,
    pub enrolled_days: u32,
    pub hospitalized_residents: usize,
    pub absent_residents: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StayReport {
    pub facility_name: String,
    pub month: ReportMonth,
    pub as_of: NaiveDate,
    pub rows: Vec<StayReportRow>,
}

impl StayReport {
    /// Joins the roster with computed summaries. Roster residents without
    /// summaries are reported with no intervals and every elapsed day
    /// enrolled; summaries for residents missing from the roster are dropped.
    pub fn assemble(
        calculator: &MonthlyStayCalculator,
        facility_name: String,
        roster: Vec<ResidentListing>,
        summaries: Vec<ResidentStaySummary>,
    ) -> Self {
        let mut by_resident: HashMap<ResidentId, ResidentStaySummary> = summaries
            .into_iter()
            .map(|summary| (summary.resident_id.clone(), summary))
            .collect();

        let mut roster = roster;
        roster.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let rows = roster
            .into_iter()
            .map(|listing| {
                let summary = by_resident.remove(&listing.id).unwrap_or_else(|| {
                    calculator.summarize_resident_without_records(listing.id.clone())
                });
                StayReportRow {
                    resident_id: listing.id,
                    resident_name: listing.name,
                    facility_name: facility_name.clone(),
                    enrolled_days: summary.enrolled_days(),
                    intervals: summary.intervals,
                }
            })
            .collect();

        Self {
            facility_name,
            month: calculator.month(),
            as_of: calculator.as_of(),
            rows,
        }
    }

    pub fn totals(&self) -> StayReportTotals {
        self.rows
            .iter()
            .fold(StayReportTotals::default(), |mut totals, row| {
                totals.residents += 1;
                totals.enrolled_days += row.enrolled_days;
                if row.intervals_of(StatusKind::Hospitalization).next().is_some() {
                    totals.hospitalized_residents += 1;
                }
                if row.intervals_of(StatusKind::OvernightAbsence).next().is_some() {
                    totals.absent_residents += 1;
                }
                totals
            })
    }

    pub fn views(&self, slots: usize) -> Vec<StayReportRowView> {
        self.rows.iter().map(|row| row.view(slots)).collect()
    }
}

/// Builds the per-facility stay report from the same calculator the sync
/// job uses.
pub struct StayReportService<S> {
    source: Arc<S>,
}

impl<S> StayReportService<S>
where
    S: DailyRecordSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn monthly_report(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
        as_of: NaiveDate,
    ) -> Result<StayReport, StayReportError> {
        let facility_name = self
            .source
            .facility_name(facility)?
            .unwrap_or_else(|| facility.to_string());
        let roster = self.source.list_active_residents(facility)?;
        let month_records = self.source.fetch_month_records(facility, month)?;
        let previous_day_records = self
            .source
            .fetch_day_records(facility, month.previous_month_end())?;

        let calculator = MonthlyStayCalculator::new(month, as_of);
        let summaries = calculator.summarize(&month_records, &previous_day_records)?;
        let report = StayReport::assemble(&calculator, facility_name, roster, summaries);

        info!(
            %facility,
            %month,
            %as_of,
            rows = report.rows.len(),
            "stay report assembled"
        );

        Ok(report)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StayReportError {
    #[error(transparent)]
    Source(#[from] RepositoryError),
    #[error(transparent)]
    Calculation(#[from] StayError),
}
