use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    artifacts::Artifacts,
    config::Config,
    handlers::{self, AppState},
    metrics,
    prediction::PredictionService,
    rates::ExchangeRateClient,
    session::SessionStore,
    signals::setup_signal_handlers,
};

/// Start the salary predictor server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Sets up signal handlers for graceful shutdown
/// 3. Builds the shared state and starts session cleanup
/// 4. Binds to the configured address
/// 5. Serves requests until a shutdown signal arrives
pub async fn start_server(config: Config, artifacts: Artifacts) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let state = build_state(config.clone(), Arc::new(artifacts))?;

    tokio::spawn({
        let sessions = state.sessions.clone();
        let every = Duration::from_secs(config.session.cleanup_interval_seconds);
        async move {
            sessions.cleanup_loop(every).await;
        }
    });

    let app = create_router(state, metrics_handle.map(|h| (config.metrics.endpoint.clone(), h)));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    if config.exchange_rates.api_key.is_empty() {
        warn!("No exchange rate API key configured; sessions will use fallback rates");
    }
    info!("Starting salary predictor on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Shared state from configuration and loaded artifacts
pub fn build_state(config: Config, artifacts: Arc<Artifacts>) -> Result<AppState> {
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("salary-predictor/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(AppState {
        predictor: PredictionService::with_inr_fallback(
            artifacts,
            config.exchange_rates.fallback_inr_rate,
        ),
        rates_client: ExchangeRateClient::new(http_client, &config.exchange_rates),
        sessions: Arc::new(SessionStore::new(Duration::from_secs(
            config.session.ttl_seconds,
        ))),
        config: Arc::new(config),
    })
}

/// Create the Axum router with all routes and middleware
///
/// `metrics` is the endpoint path and exporter handle, when metrics are enabled.
pub fn create_router(state: AppState, metrics: Option<(String, Arc<PrometheusHandle>)>) -> Router {
    let app_routes = Router::new()
        .route("/", get(handlers::page::index))
        .route("/predict", post(handlers::page::predict))
        .route("/static/home.png", get(handlers::static_files::placeholder_image))
        .route("/api/v1/options", get(handlers::api::options))
        .route("/api/v1/predict", post(handlers::api::predict))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(state);

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(app_routes);

    if let Some((endpoint, handle)) = metrics {
        router = router.merge(
            Router::new()
                .route(&endpoint, get(handlers::metrics_handler::render_metrics))
                .with_state(handle),
        );
    }

    router
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route() {
        let app = create_router(testing::state(), None);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_only_when_enabled() {
        let app = create_router(testing::state(), None);
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = Arc::new(recorder.handle());
        let app = create_router(testing::state(), Some(("/metrics".to_string(), handle)));
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_post_route() {
        let state = testing::state();
        let (_, cookie) = testing::session_with_rates(&state, &[("INR", 83.0)]);
        let app = create_router(state, None);

        let body = "education=Bachelor%27s+degree&employment=Full-time\
                    &dev_type=Developer%2C+back-end&experience=5.0&country=India\
                    &org_size=Medium&target_currency=INR";
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header(header::COOKIE, cookie[header::COOKIE].clone())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Predicted Annual Salary: INR 2,075,000"));
    }
}
