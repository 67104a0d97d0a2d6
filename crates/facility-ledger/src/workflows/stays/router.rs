use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{FacilityId, ReportMonth};
use super::report::{checked_slots, StayReportError, StayReportService};
use super::repository::{DailyRecordSource, PeriodStore};
use super::sync::{StayPeriodSyncService, StaySyncError};

/// Shared handles for the stay endpoints.
pub struct StayRouterState<S, P> {
    pub sync: Arc<StayPeriodSyncService<S, P>>,
    pub report: Arc<StayReportService<S>>,
    pub report_slots: usize,
}

impl<S, P> Clone for StayRouterState<S, P> {
    fn clone(&self) -> Self {
        Self {
            sync: Arc::clone(&self.sync),
            report: Arc::clone(&self.report),
            report_slots: self.report_slots,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyncRequest {
    pub(crate) as_of: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    pub(crate) as_of: NaiveDate,
    #[serde(default)]
    pub(crate) slots: Option<usize>,
}

/// Router builder exposing month sync, stored periods and report endpoints.
pub fn stay_router<S, P>(state: StayRouterState<S, P>) -> Router
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/facilities/:facility_id/stays/:year/:month/sync",
            post(sync_handler::<S, P>),
        )
        .route(
            "/api/v1/facilities/:facility_id/stays/:year/:month/report",
            get(report_handler::<S, P>),
        )
        .route(
            "/api/v1/facilities/:facility_id/stays/:year/:month/periods",
            get(periods_handler::<S, P>),
        )
        .with_state(state)
}

pub(crate) async fn sync_handler<S, P>(
    State(state): State<StayRouterState<S, P>>,
    Path((facility_id, year, month)): Path<(String, i32, u32)>,
    Json(request): Json<SyncRequest>,
) -> Response
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    let month = match ReportMonth::new(year, month) {
        Ok(month) => month,
        Err(error) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, error),
    };
    let facility = FacilityId(facility_id);

    match state.sync.sync_month(&facility, month, request.as_of) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error @ StaySyncError::Calculation(_)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error)
        }
        Err(error) => error_response(StatusCode::SERVICE_UNAVAILABLE, error),
    }
}

pub(crate) async fn report_handler<S, P>(
    State(state): State<StayRouterState<S, P>>,
    Path((facility_id, year, month)): Path<(String, i32, u32)>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    let month = match ReportMonth::new(year, month) {
        Ok(month) => month,
        Err(error) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, error),
    };
    let slots = match checked_slots(query.slots.unwrap_or(state.report_slots)) {
        Ok(slots) => slots,
        Err(error) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, error),
    };
    let facility = FacilityId(facility_id);

    match state.report.monthly_report(&facility, month, query.as_of) {
        Ok(report) => {
            let totals = report.totals();
            let rows = report.views(slots);
            let payload = json!({
                "facility_name": report.facility_name,
                "month": report.month,
                "as_of": report.as_of,
                "totals": totals,
                "rows": rows,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error @ StayReportError::Calculation(_)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error)
        }
        Err(error) => error_response(StatusCode::SERVICE_UNAVAILABLE, error),
    }
}

pub(crate) async fn periods_handler<S, P>(
    State(state): State<StayRouterState<S, P>>,
    Path((facility_id, year, month)): Path<(String, i32, u32)>,
) -> Response
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    let month = match ReportMonth::new(year, month) {
        Ok(month) => month,
        Err(error) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, error),
    };
    let facility = FacilityId(facility_id);

    match state.sync.stored_periods(&facility, month) {
        Ok(periods) => {
            let payload = json!({
                "facility": facility,
                "month": month,
                "periods": periods,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(StatusCode::SERVICE_UNAVAILABLE, error),
    }
}

fn error_response(status: StatusCode, error: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
