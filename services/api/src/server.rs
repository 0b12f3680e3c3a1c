use crate::auth::AuthState;
use crate::cli::ServeArgs;
use crate::infra::{
    AppState, FileModelStorage, InMemoryCaseRepository, InMemoryClientRepository,
    InMemoryOutcomeRepository,
};
use crate::routes::{api_router, ApiState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use casework::assessment::{AssessmentService, ModelStore};
use casework::clients::CaseManagementService;
use casework::config::AppConfig;
use casework::error::AppError;
use casework::telemetry;
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

    let cases = Arc::new(CaseManagementService::new(
        Arc::new(InMemoryClientRepository::default()),
        Arc::new(InMemoryCaseRepository::default()),
        Arc::new(InMemoryOutcomeRepository::default()),
    ));
    let assessments = Arc::new(AssessmentService::new(
        Arc::new(ModelStore::empty()),
        Arc::new(FileModelStorage::new(&config.model.path)),
    ));

    match assessments.load_persisted_model() {
        Ok(true) => {}
        Ok(false) => info!(path = %config.model.path.display(), "no persisted model found"),
        Err(err) => warn!(%err, "failed to restore persisted model; continuing untrained"),
    }

    let app = api_router(ApiState { cases, assessments })
        .layer(Extension(AuthState::from_config(&config.auth)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "case management service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
