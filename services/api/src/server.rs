use crate::cli::ServeArgs;
use crate::infra::{AppState, FacilitySnapshot, InMemoryStayStore};
use crate::routes::with_stay_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use facility_ledger::config::AppConfig;
use facility_ledger::error::AppError;
use facility_ledger::telemetry;
use facility_ledger::workflows::stays::{
    StayPeriodSyncService, StayReportService, StayRouterState,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStayStore::default());
    for path in &args.seed {
        let snapshot = FacilitySnapshot::from_path(path)?;
        info!(
            facility = %snapshot.facility_id,
            path = %path.display(),
            "seeding facility snapshot"
        );
        if let Err(err) = store.load(snapshot) {
            warn!(error = %err, "failed to seed facility snapshot");
        }
    }

    let stay_state = StayRouterState {
        sync: Arc::new(StayPeriodSyncService::new(
            store.clone(),
            store.clone(),
            config.ledger.sync_attempts,
        )),
        report: Arc::new(StayReportService::new(store)),
        report_slots: config.ledger.report_slots,
    };

    let app = with_stay_routes(stay_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "facility ledger service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
