use chrono::NaiveDate;
use facility_ledger::error::AppError;
use facility_ledger::workflows::stays::{
    DailyRecordSource, DailyStatusRecord, FacilityId, PeriodRow, PeriodStore, ReportMonth,
    RepositoryError, ResidentId, ResidentListing,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// A facility's roster and daily entries as exported from the entry workflow.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacilitySnapshot {
    pub(crate) facility_id: FacilityId,
    #[serde(default)]
    pub(crate) facility_name: Option<String>,
    #[serde(default)]
    pub(crate) residents: Vec<ResidentListing>,
    #[serde(default)]
    pub(crate) records: Vec<DailyStatusRecord>,
}

impl FacilitySnapshot {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read(path)?;
        let snapshot = serde_json::from_slice(&raw)?;
        Ok(snapshot)
    }
}

/// Roster keyed by resident and entries keyed by `(resident, date)`, so a
/// later snapshot overwrites overlapping data instead of duplicating it.
#[derive(Default)]
struct Facility {
    name: Option<String>,
    residents: BTreeMap<ResidentId, ResidentListing>,
    records: BTreeMap<(ResidentId, NaiveDate), DailyStatusRecord>,
}

/// Process-local stand-in for the facility database.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStayStore {
    facilities: Arc<Mutex<HashMap<FacilityId, Facility>>>,
    periods: Arc<Mutex<HashMap<(FacilityId, ReportMonth), Vec<PeriodRow>>>>,
}

impl InMemoryStayStore {
    pub(crate) fn load(&self, snapshot: FacilitySnapshot) -> Result<(), RepositoryError> {
        let mut guard = self.facilities()?;
        let facility = guard.entry(snapshot.facility_id).or_default();
        if snapshot.facility_name.is_some() {
            facility.name = snapshot.facility_name;
        }
        facility.residents.extend(
            snapshot
                .residents
                .into_iter()
                .map(|listing| (listing.id.clone(), listing)),
        );
        facility.records.extend(
            snapshot
                .records
                .into_iter()
                .map(|record| ((record.resident_id.clone(), record.date), record)),
        );
        Ok(())
    }

    fn facilities(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<FacilityId, Facility>>, RepositoryError> {
        self.facilities
            .lock()
            .map_err(|_| RepositoryError::Unavailable("facility store poisoned".to_string()))
    }

    fn select(
        &self,
        facility: &FacilityId,
        matches: impl Fn(NaiveDate) -> bool,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        let guard = self.facilities()?;
        Ok(guard
            .get(facility)
            .map(|entry| {
                entry
                    .records
                    .values()
                    .filter(|record| matches(record.date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl DailyRecordSource for InMemoryStayStore {
    fn fetch_month_records(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        self.select(facility, |date| month.contains(date))
    }

    fn fetch_day_records(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        self.select(facility, |candidate| candidate == date)
    }

    fn list_active_residents(
        &self,
        facility: &FacilityId,
    ) -> Result<Vec<ResidentListing>, RepositoryError> {
        let guard = self.facilities()?;
        Ok(guard
            .get(facility)
            .map(|entry| entry.residents.values().cloned().collect())
            .unwrap_or_default())
    }

    fn facility_name(&self, facility: &FacilityId) -> Result<Option<String>, RepositoryError> {
        let guard = self.facilities()?;
        Ok(guard.get(facility).and_then(|entry| entry.name.clone()))
    }
}

impl PeriodStore for InMemoryStayStore {
    fn replace_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
        rows: &[PeriodRow],
    ) -> Result<(), RepositoryError> {
        // One lock covers the delete and the insert.
        let mut guard = self
            .periods
            .lock()
            .map_err(|_| RepositoryError::Transaction("period store poisoned".to_string()))?;
        guard.insert((facility.clone(), month), rows.to_vec());
        Ok(())
    }

    fn load_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<PeriodRow>, RepositoryError> {
        let guard = self
            .periods
            .lock()
            .map_err(|_| RepositoryError::Unavailable("period store poisoned".to_string()))?;
        Ok(guard
            .get(&(facility.clone(), month))
            .cloned()
            .unwrap_or_default())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
