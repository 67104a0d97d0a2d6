use crate::infra::{AppState, FacilitySnapshot};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use facility_ledger::error::AppError;
use facility_ledger::workflows::stays::report::views::StayReportRowView;
use facility_ledger::workflows::stays::report::{checked_slots, StayReportTotals};
use facility_ledger::workflows::stays::{
    period_rows, stay_router, DailyRecordSource, MonthlyStayCalculator, PeriodRow, PeriodStore,
    ReportMonth, StayReport, StayRouterState,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Computes a month straight from a posted snapshot, without touching the
/// store.
#[derive(Debug, Deserialize)]
pub(crate) struct StayCalculationRequest {
    #[serde(flatten)]
    pub(crate) snapshot: FacilitySnapshot,
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) as_of: NaiveDate,
    #[serde(default)]
    pub(crate) slots: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StayCalculationResponse {
    pub(crate) facility_name: String,
    pub(crate) month: ReportMonth,
    pub(crate) as_of: NaiveDate,
    pub(crate) totals: StayReportTotals,
    pub(crate) rows: Vec<StayReportRowView>,
    pub(crate) periods: Vec<PeriodRow>,
}

pub(crate) fn with_stay_routes<S, P>(state: StayRouterState<S, P>) -> axum::Router
where
    S: DailyRecordSource + 'static,
    P: PeriodStore + 'static,
{
    stay_router(state)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/stays/calculate",
            axum::routing::post(stay_calculation_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn stay_calculation_endpoint(
    Json(payload): Json<StayCalculationRequest>,
) -> Result<Json<StayCalculationResponse>, AppError> {
    let StayCalculationRequest {
        snapshot,
        year,
        month,
        as_of,
        slots,
    } = payload;

    let month = ReportMonth::new(year, month)?;
    let slots = checked_slots(slots.unwrap_or(10))?;
    let (report, periods) = calculate_snapshot(snapshot, month, as_of)?;

    Ok(Json(report_response(&report, periods, slots)))
}

/// Runs the calculator over a snapshot the same way the store-backed
/// services do: month rows plus the previous month end.
pub(crate) fn calculate_snapshot(
    snapshot: FacilitySnapshot,
    month: ReportMonth,
    as_of: NaiveDate,
) -> Result<(StayReport, Vec<PeriodRow>), AppError> {
    let FacilitySnapshot {
        facility_id,
        facility_name,
        residents,
        records,
    } = snapshot;

    let previous_month_end = month.previous_month_end();
    let (previous_day, month_records): (Vec<_>, Vec<_>) = records
        .into_iter()
        .filter(|record| record.date == previous_month_end || month.contains(record.date))
        .partition(|record| record.date == previous_month_end);

    let calculator = MonthlyStayCalculator::new(month, as_of);
    let summaries = calculator.summarize(&month_records, &previous_day)?;
    let periods = period_rows(&summaries);
    let facility_name = facility_name.unwrap_or_else(|| facility_id.to_string());
    let report = StayReport::assemble(&calculator, facility_name, residents, summaries);

    Ok((report, periods))
}

fn report_response(
    report: &StayReport,
    periods: Vec<PeriodRow>,
    slots: usize,
) -> StayCalculationResponse {
    StayCalculationResponse {
        facility_name: report.facility_name.clone(),
        month: report.month,
        as_of: report.as_of,
        totals: report.totals(),
        rows: report.views(slots),
        periods,
    }
}
