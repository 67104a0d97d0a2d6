use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::stays::domain::{DailyStatusRecord, FacilityId, ReportMonth, ResidentId};
use crate::workflows::stays::repository::{
    DailyRecordSource, PeriodRow, PeriodStore, RepositoryError, ResidentListing,
};
use crate::workflows::stays::{StayPeriodSyncService, StayReportService, StayRouterState};

pub(super) fn facility() -> FacilityId {
    FacilityId("maple".to_string())
}

pub(super) fn february() -> ReportMonth {
    ReportMonth::new(2026, 2).expect("valid month")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn record(
    resident: &str,
    date: NaiveDate,
    hospital: bool,
    away: bool,
) -> DailyStatusRecord {
    DailyStatusRecord {
        resident_id: ResidentId(resident.to_string()),
        date,
        hospitalization_active: hospital,
        overnight_absence_active: away,
    }
}

#[derive(Default)]
pub(super) struct MemorySource {
    records: Mutex<Vec<(FacilityId, DailyStatusRecord)>>,
    roster: Mutex<HashMap<FacilityId, Vec<ResidentListing>>>,
    names: Mutex<HashMap<FacilityId, String>>,
    month_reads: AtomicU32,
    day_reads: AtomicU32,
}

impl MemorySource {
    pub(super) fn push(&self, facility: &FacilityId, record: DailyStatusRecord) {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .push((facility.clone(), record));
    }

    pub(super) fn enroll(&self, facility: &FacilityId, id: &str, name: &str) {
        self.roster
            .lock()
            .expect("roster mutex poisoned")
            .entry(facility.clone())
            .or_default()
            .push(ResidentListing {
                id: ResidentId(id.to_string()),
                name: name.to_string(),
            });
    }

    pub(super) fn name_facility(&self, facility: &FacilityId, name: &str) {
        self.names
            .lock()
            .expect("names mutex poisoned")
            .insert(facility.clone(), name.to_string());
    }

    pub(super) fn reads(&self) -> (u32, u32) {
        (
            self.month_reads.load(Ordering::Relaxed),
            self.day_reads.load(Ordering::Relaxed),
        )
    }

    fn select(
        &self,
        facility: &FacilityId,
        matches: impl Fn(NaiveDate) -> bool,
    ) -> Vec<DailyStatusRecord> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .filter(|(owner, record)| owner == facility && matches(record.date))
            .map(|(_, record)| record.clone())
            .collect()
    }
}

impl DailyRecordSource for MemorySource {
    fn fetch_month_records(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        self.month_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.select(facility, |date| month.contains(date)))
    }

    fn fetch_day_records(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        self.day_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.select(facility, |candidate| candidate == date))
    }

    fn list_active_residents(
        &self,
        facility: &FacilityId,
    ) -> Result<Vec<ResidentListing>, RepositoryError> {
        let guard = self.roster.lock().expect("roster mutex poisoned");
        Ok(guard.get(facility).cloned().unwrap_or_default())
    }

    fn facility_name(&self, facility: &FacilityId) -> Result<Option<String>, RepositoryError> {
        let guard = self.names.lock().expect("names mutex poisoned");
        Ok(guard.get(facility).cloned())
    }
}

pub(super) struct UnavailableSource;

impl DailyRecordSource for UnavailableSource {
    fn fetch_month_records(
        &self,
        _facility: &FacilityId,
        _month: ReportMonth,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("daily records offline".to_string()))
    }

    fn fetch_day_records(
        &self,
        _facility: &FacilityId,
        _date: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("daily records offline".to_string()))
    }

    fn list_active_residents(
        &self,
        _facility: &FacilityId,
    ) -> Result<Vec<ResidentListing>, RepositoryError> {
        Err(RepositoryError::Unavailable("roster offline".to_string()))
    }

    fn facility_name(&self, _facility: &FacilityId) -> Result<Option<String>, RepositoryError> {
        Err(RepositoryError::Unavailable("roster offline".to_string()))
    }
}

/// Store that fails the first `failures` writes, then behaves normally.
#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<BTreeMap<(FacilityId, ReportMonth), Vec<PeriodRow>>>,
    failures: AtomicU32,
    writes: AtomicU32,
}

impl MemoryStore {
    pub(super) fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub(super) fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }

    pub(super) fn seed(&self, facility: &FacilityId, month: ReportMonth, rows: Vec<PeriodRow>) {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .insert((facility.clone(), month), rows);
    }
}

impl PeriodStore for MemoryStore {
    fn replace_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
        rows: &[PeriodRow],
    ) -> Result<(), RepositoryError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let remaining = self.failures.load(Ordering::Relaxed);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::Relaxed);
            return Err(RepositoryError::Transaction("deadlock detected".to_string()));
        }

        let mut guard = self.rows.lock().expect("rows mutex poisoned");
        guard.insert((facility.clone(), month), rows.to_vec());
        Ok(())
    }

    fn load_month(
        &self,
        facility: &FacilityId,
        month: ReportMonth,
    ) -> Result<Vec<PeriodRow>, RepositoryError> {
        let guard = self.rows.lock().expect("rows mutex poisoned");
        Ok(guard
            .get(&(facility.clone(), month))
            .cloned()
            .unwrap_or_default())
    }
}

pub(super) fn router_state<S, P>(source: Arc<S>, store: Arc<P>) -> StayRouterState<S, P>
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    StayRouterState {
        sync: Arc::new(StayPeriodSyncService::new(source.clone(), store, 3)),
        report: Arc::new(StayReportService::new(source)),
        report_slots: 10,
    }
}

/// A small facility: one resident hospitalized across the month boundary,
/// one with two overnight absences, one with no records at all.
pub(super) fn seeded_source() -> Arc<MemorySource> {
    let source = Arc::new(MemorySource::default());
    let facility = facility();
    source.name_facility(&facility, "Maple House");
    source.enroll(&facility, "r-1", "Abe");
    source.enroll(&facility, "r-2", "Sato");
    source.enroll(&facility, "r-3", "Kato");

    source.push(&facility, record("r-1", date(2026, 1, 31), true, false));
    for day in 1..=3 {
        source.push(&facility, record("r-1", date(2026, 2, day), true, false));
    }
    source.push(&facility, record("r-1", date(2026, 2, 4), false, false));

    for day in [6, 7, 12] {
        source.push(&facility, record("r-2", date(2026, 2, day), false, true));
    }

    source.push(
        &FacilityId("birch".to_string()),
        record("r-1", date(2026, 2, 9), true, true),
    );

    source
}
