//! Redirects signed-out browser navigations away from protected pages
//!
//! API routes are never redirected; handlers answer them with `UNAUTHORIZED`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use campaignhub_common::{auth::access_token, config::AuthConfig};
use crate::AppState;

const PUBLIC_PATHS: &[&str] = &["/", "/auth/signup"];
const PUBLIC_PREFIXES: &[&str] = &["/api", "/health", "/ready"];

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `path` needs a signed-in user
pub fn is_protected(config: &AuthConfig, path: &str) -> bool {
    let path = path.to_lowercase();

    if PUBLIC_PATHS.contains(&path.as_str()) || path == config.login_path {
        return false;
    }
    if PUBLIC_PREFIXES.iter().any(|prefix| has_prefix(&path, prefix)) {
        return false;
    }

    config
        .protected_prefixes
        .iter()
        .any(|prefix| has_prefix(&path, &prefix.to_lowercase()))
}

/// `/auth/login?redirectedFrom=%2Fdashboard`
pub fn login_redirect(config: &AuthConfig, path: &str) -> String {
    format!(
        "{}?redirectedFrom={}",
        config.login_path,
        urlencoding::encode(path)
    )
}

pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let config = &state.config.auth;
    let path = request.uri().path().to_string();

    if !is_protected(config, &path) {
        return next.run(request).await;
    }

    let user = match access_token(request.headers()) {
        Some(token) => state.auth.user_for_token(&token).await,
        None => Ok(None),
    };

    match user {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => {
            tracing::debug!(path = %path, "Redirecting signed-out navigation to login");
            Redirect::temporary(&login_redirect(config, &path)).into_response()
        }
        // A provider outage must not lock users out of pages
        Err(e) => {
            tracing::warn!(error = %e, path = %path, "Identity lookup failed, passing through");
            next.run(request).await
        }
    }
}
