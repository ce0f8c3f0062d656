//! CampaignHub API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Identity resolution and route guarding
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod extract;
mod handlers;
mod middleware;

use axum::{
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use campaignhub_common::{
    auth::{create_auth_provider, AuthProvider},
    config::{AppConfig, ObservabilityConfig},
    db::{create_store, Store},
    metrics, Services,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Services,
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            config,
            services: Services::new(store.clone()),
            store,
            auth,
        }
    }
}

impl FromRef<AppState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    init_tracing(&config.observability);

    info!("Starting CampaignHub API Gateway v{}", campaignhub_common::VERSION);

    // Initialize metrics
    init_metrics(&config.observability)?;
    metrics::register_metrics();

    info!(backend = ?config.database.backend, "Initializing store...");
    let store = create_store(&config.database).await?;
    let auth = create_auth_provider(&config.auth)?;

    // Built once; every request shares the same router
    let app = create_router(AppState::new(config.clone(), store, auth));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_metrics(config: &ObservabilityConfig) -> anyhow::Result<()> {
    if config.metrics_port == 0 {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::LATENCY_BUCKETS,
        )?
        .install()?;

    info!(port = config.metrics_port, "Metrics exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let api_routes = Router::new()
        // Campaign endpoints
        .route(
            "/campaigns",
            get(handlers::campaigns::list_campaigns).post(handlers::campaigns::create_campaign),
        )
        .route("/campaigns/{id}", get(handlers::campaigns::get_campaign))
        .route("/campaigns/{id}/close", post(handlers::campaigns::close_campaign))
        .route("/campaigns/{id}/select", post(handlers::campaigns::select_influencers))

        // Application and submission endpoints
        .route("/applications", post(handlers::applications::create_application))
        .route("/submissions", post(handlers::submissions::submit_review))

        // Onboarding endpoints
        .route("/auth/onboarding/status", get(handlers::onboarding::get_status))
        .route("/auth/onboarding/profile", post(handlers::onboarding::create_profile))
        .route("/auth/onboarding/advertiser", post(handlers::onboarding::create_advertiser))
        .route("/auth/onboarding/influencer", post(handlers::onboarding::create_influencer));

    let mut app = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::route_guard::route_guard))
        .layer(from_fn(middleware::request_metrics::track_metrics));

    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        app = app.layer(from_fn_with_state(limiter, middleware::rate_limit::rate_limit_middleware));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use campaignhub_common::{auth::StaticAuthProvider, MemoryStore};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    const ADVERTISER_TOKEN: &str = "advertiser-token";
    const INFLUENCER_TOKEN: &str = "influencer-token";

    fn test_router() -> Router {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;

        let auth = StaticAuthProvider::new()
            .with_user(ADVERTISER_TOKEN, Uuid::from_u128(1))
            .with_user(INFLUENCER_TOKEN, Uuid::from_u128(2));

        create_router(AppState::new(
            Arc::new(config),
            Arc::new(MemoryStore::new()),
            Arc::new(auth),
        ))
    }

    async fn call(router: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        router.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn onboard(router: &Router, token: &str, role: &str) {
        let response = call(
            router,
            "POST",
            "/api/auth/onboarding/profile",
            Some(token),
            Some(json!({ "role": role, "name": "Tester", "dob": "1990-01-01", "phone": "010-1234-5678" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let (path, body) = if role == "ADVERTISER" {
            (
                "/api/auth/onboarding/advertiser",
                json!({
                    "companyName": "Mapo Brunch",
                    "businessNumber": "123-45-67890",
                    "representative": "Lee",
                    "storePhone": "02-123-4567",
                    "address": "Seoul"
                }),
            )
        } else {
            (
                "/api/auth/onboarding/influencer",
                json!({
                    "channelPlatform": "INSTAGRAM",
                    "channelName": "daily",
                    "channelUrl": "https://instagram.com/daily",
                    "followers": 100
                }),
            )
        };
        let response = call(router, "POST", path, Some(token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    fn campaign_body() -> Value {
        json!({
            "title": "Brunch tasting",
            "category": "FOOD",
            "region": "SEOUL",
            "benefitDesc": "Free brunch",
            "storeInfo": "Mapo-gu",
            "mission": "Post a review",
            "capacity": 3,
            "startDate": "2026-03-01",
            "endDate": "2026-03-31"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router();
        let response = call(&router, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");

        let response = call(&router, "GET", "/ready", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"]["store"]["status"], "up");
    }

    #[tokio::test]
    async fn test_campaign_workflow_over_http() {
        let router = test_router();
        onboard(&router, ADVERTISER_TOKEN, "ADVERTISER").await;
        onboard(&router, INFLUENCER_TOKEN, "INFLUENCER").await;

        let response = call(&router, "POST", "/api/campaigns", Some(ADVERTISER_TOKEN), Some(campaign_body())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["ok"], true);
        let campaign_id = body["data"]["id"].as_str().unwrap().to_string();

        let response = call(&router, "GET", "/api/campaigns?sort=popular&limit=5", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let feed = json_body(response).await;
        assert_eq!(feed["data"]["items"][0]["id"], campaign_id);
        assert_eq!(feed["data"]["hasMore"], false);
        assert_eq!(feed["data"]["nextCursor"], Value::Null);

        let response = call(
            &router,
            "POST",
            "/api/applications",
            Some(INFLUENCER_TOKEN),
            Some(json!({ "campaignId": campaign_id, "visitDate": "2026-03-31" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let application_id = json_body(response).await["data"]["id"].as_str().unwrap().to_string();

        let response = call(
            &router,
            "POST",
            &format!("/api/campaigns/{}/select", campaign_id),
            Some(ADVERTISER_TOKEN),
            Some(json!({ "selectedApplicationIds": [application_id] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["updated"], 1);

        let review = json!({ "applicationId": application_id, "reviewUrl": "https://instagram.com/p/1" });
        let response = call(&router, "POST", "/api/submissions", Some(INFLUENCER_TOKEN), Some(review.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = call(&router, "POST", "/api/submissions", Some(INFLUENCER_TOKEN), Some(review)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "CONFLICT");

        let response = call(
            &router,
            "POST",
            &format!("/api/campaigns/{}/close", campaign_id),
            Some(ADVERTISER_TOKEN),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["status"], "CLOSED");

        let response = call(&router, "GET", &format!("/api/campaigns/{}", campaign_id), None, None).await;
        let detail = json_body(response).await;
        assert_eq!(detail["data"]["status"], "CLOSED");
        assert_eq!(detail["data"]["applicationCount"], 1);
        assert_eq!(detail["data"]["selectionDeadline"], Value::Null);
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        let router = test_router();

        let response = call(&router, "GET", "/api/auth/onboarding/status", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let response = call(&router, "GET", "/api/campaigns?limit=100", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_FAILED");

        let response = call(&router, "GET", "/api/campaigns?sort=oldest", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = call(&router, "GET", &format!("/api/campaigns/{}", Uuid::new_v4()), None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");

        let response = call(&router, "GET", "/api/campaigns/not-a-uuid", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let mut bad = campaign_body();
        bad["startDate"] = json!("March 1st");
        let response = call(&router, "POST", "/api/campaigns", Some(ADVERTISER_TOKEN), Some(bad)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_FAILED");

        let response = call(&router, "POST", "/api/campaigns", None, Some(campaign_body())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_route_guard_redirects_browser_navigation() {
        let router = test_router();

        let response = call(&router, "GET", "/dashboard/campaigns", None, None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?redirectedFrom=%2Fdashboard%2Fcampaigns"
        );

        // Signed in: passes the guard and reaches the fallback
        let response = call(&router, "GET", "/dashboard/campaigns", Some(ADVERTISER_TOKEN), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // API routes are never redirected
        let response = call(&router, "GET", "/api/auth/onboarding/status", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let router = test_router();
        let response = call(&router, "GET", "/health", None, None).await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
