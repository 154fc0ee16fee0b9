use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use melcoffee::auth::AdminAuth;
use melcoffee::catalog::{CatalogService, JsonFileCatalog};
use melcoffee::config::{AppConfig, AppEnvironment};
use melcoffee::error::AppError;
use melcoffee::recommend::RecommendationEngine;
use melcoffee::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
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

    if config.environment == AppEnvironment::Production && config.admin.uses_default_credentials()
    {
        warn!("admin password or token left at the default value");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(JsonFileCatalog::new(config.catalog.data_file.clone()));
    let engine = RecommendationEngine::with_config(config.recommend.clone());
    let catalog_service = Arc::new(CatalogService::new(repository, engine));
    let auth = Arc::new(AdminAuth::new(&config.admin));

    let app = app_router(catalog_service, auth, &config.catalog.public_dir)
        .layer(Extension(app_state))
        .layer(CorsLayer::permissive())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_file = %config.catalog.data_file.display(),
        "melcoffee catalog service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
