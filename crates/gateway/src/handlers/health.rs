//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use campaignhub_common::errors::Result;
use serde::Serialize;
use std::time::Instant;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: CheckResult,
    pub auth_provider: String,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: campaignhub_common::VERSION,
    })
}

/// The cause is logged, never returned to the caller
fn store_check(outcome: Result<()>, started: Instant) -> CheckResult {
    match outcome {
        Ok(_) => CheckResult {
            status: "up".to_string(),
            latency_ms: Some(started.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Readiness check: store unreachable");
            CheckResult {
                status: "down".to_string(),
                latency_ms: None,
                error: Some("unavailable".to_string()),
            }
        }
    }
}

/// Readiness probe - checks the backing store
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let started = Instant::now();
    let store = store_check(state.store.ping().await, started);

    let (code, status) = if store.is_up() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        code,
        Json(ReadyResponse {
            status: status.to_string(),
            checks: HealthChecks {
                store,
                // Provider reachability is only known per request
                auth_provider: state.auth.name().to_string(),
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaignhub_common::AppError;

    #[test]
    fn test_store_check_up() {
        let check = store_check(Ok(()), Instant::now());
        assert!(check.is_up());
        assert!(check.latency_ms.is_some());
        assert!(check.error.is_none());
    }

    #[test]
    fn test_store_check_hides_connection_details() {
        let err = AppError::DatabaseConnection {
            message: "Primary ping failed: password authentication failed for user campaignhub@10.0.0.5".into(),
        };
        let check = store_check(Err(err), Instant::now());

        assert!(!check.is_up());
        assert_eq!(check.error.as_deref(), Some("unavailable"));
    }
}
