use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_lookup_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use courier_risk::checks::ResponseParser;
use courier_risk::config::AppConfig;
use courier_risk::error::AppError;
use courier_risk::lookup::{HttpCourierSource, PhoneCheckService};
use courier_risk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let source = Arc::new(HttpCourierSource::from_config(&config.lookup)?);
    let service = Arc::new(
        PhoneCheckService::new(source, ResponseParser::default())
            .with_default_language(config.lookup.language),
    );

    let app = with_lookup_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        lookup_base_url = %config.lookup.base_url,
        "courier risk service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
