use crate::cli::ServeArgs;
use crate::infra::{
    default_rules, default_templates, sample_leads, AppState, InMemoryEmailOutbox,
    InMemoryLeadScoringRepository,
};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use funnel_ai::config::AppConfig;
use funnel_ai::error::AppError;
use funnel_ai::telemetry;
use funnel_ai::workflows::leads::{LeadScoringService, LeadScoringServiceError};
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

    let repository = InMemoryLeadScoringRepository::seeded(
        default_rules(),
        default_templates(),
        sample_leads(),
    )
    .map_err(LeadScoringServiceError::from)?;
    let outbox = InMemoryEmailOutbox::default();
    let scoring_service = Arc::new(LeadScoringService::new(
        Arc::new(repository),
        Arc::new(outbox),
        config.scoring,
    ));

    let app = with_scoring_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        premium_threshold = config.scoring.premium_threshold,
        "lead scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
