use crate::cli::ServeArgs;
use crate::infra::{AppState, Backend};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use society_care::catalog::CategoryBoard;
use society_care::config::AppConfig;
use society_care::error::AppError;
use society_care::location::LocationImporter;
use society_care::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend = Backend::seeded();
    if let Some(path) = &config.seed.locations_csv {
        let nodes = LocationImporter::from_path(path)?;
        let summary = LocationImporter::import_into(backend.locations.as_ref(), nodes).await?;
        info!(path = %path.display(), total = summary.total(), "location seed imported");
    }

    let board = Arc::new(CategoryBoard::new(Arc::clone(&backend.categories)));
    if let Some(message) = board.fetch_categories().await.error_message() {
        warn!(error = message, "initial category fetch failed");
    }

    let app = app_router(&backend, board)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "society care service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
