//! Identity resolution for incoming requests
//!
//! Provides:
//! - Access token extraction from `Authorization` headers and session cookies
//! - The `AuthProvider` trait with hosted, JWT and static implementations
//! - The `Identity` extractor used by handlers

use crate::config::{AuthConfig, AuthProviderKind};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use regex_lite::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use uuid::Uuid;

/// Session cookies that carry an access token
const ACCESS_TOKEN_COOKIES: [&str; 3] = [
    "sb-access-token",
    "supabase-auth-token",
    "supabase-access-token",
];

fn session_cookie_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^sb-.*-auth-token$").expect("valid cookie pattern"))
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Token from `Authorization: Bearer <token>`; exactly two parts, scheme case-insensitive
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Decoded `name=value` pairs in header order
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (name, value) = part.split_once('=')?;
            Some((percent_decode(name.trim()), percent_decode(value.trim())))
        })
        .collect()
}

fn is_session_cookie(name: &str) -> bool {
    ACCESS_TOKEN_COOKIES.contains(&name) || session_cookie_pattern().is_match(name)
}

/// A session cookie holds either a JSON session object or the bare token
fn token_from_cookie_value(value: &str) -> Option<String> {
    let decoded = percent_decode(value);

    if let Ok(serde_json::Value::Object(session)) = serde_json::from_str(&decoded) {
        if let Some(token) = session.get("access_token").and_then(|v| v.as_str()) {
            return Some(token.to_string());
        }
    }

    (!decoded.is_empty()).then_some(decoded)
}

/// Find the access token on a request: bearer header first, then session cookies
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        return Some(token.to_string());
    }

    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;

    parse_cookies(cookie_header)
        .into_iter()
        .filter(|(name, _)| is_session_cookie(name))
        .find_map(|(_, value)| token_from_cookie_value(&value))
}

/// Verifies access tokens issued by the identity provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// User id for a token; `Ok(None)` when the token is not accepted
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Resolve the calling user. Provider failures count as unauthenticated.
pub async fn resolve_user_id(headers: &HeaderMap, provider: &dyn AuthProvider) -> Option<Uuid> {
    let token = access_token(headers)?;

    match provider.user_for_token(&token).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "Token verification failed");
            None
        }
    }
}

/// Hosted provider: `GET {url}/auth/v1/user`
pub struct SupabaseAuthProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct ProviderUser {
    id: Uuid,
}

impl SupabaseAuthProvider {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build auth client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::AuthProvider {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Auth provider rejected token");
            return Ok(None);
        }

        let user: ProviderUser = response.json().await.map_err(|e| AppError::AuthProvider {
            message: format!("Malformed user payload: {}", e),
        })?;

        Ok(Some(user.id))
    }

    fn name(&self) -> &str {
        "supabase"
    }
}

/// JWT claims issued by the identity provider
#[derive(Debug, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Local HS256 verification with the project secret
pub struct JwtAuthProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Provider tokens carry `aud: authenticated`; audience is not checked
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>> {
        let claims = match decode::<AccessClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                return Ok(None);
            }
        };

        Ok(Uuid::parse_str(&claims.sub).ok())
    }

    fn name(&self) -> &str {
        "jwt"
    }
}

/// Fixed token table for tests and local development
#[derive(Default)]
pub struct StaticAuthProvider {
    users: HashMap<String, Uuid>,
}

impl StaticAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user_id: Uuid) -> Self {
        self.users.insert(token.into(), user_id);
        self
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>> {
        Ok(self.users.get(token).copied())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Create the provider selected by configuration
pub fn create_auth_provider(config: &AuthConfig) -> Result<Arc<dyn AuthProvider>> {
    match config.provider {
        AuthProviderKind::Supabase => {
            let url = config.provider_url.as_deref().ok_or_else(|| AppError::Configuration {
                message: "auth.provider_url is required for the supabase provider".to_string(),
            })?;
            let anon_key = config.anon_key.as_deref().unwrap_or_default();

            Ok(Arc::new(SupabaseAuthProvider::new(
                url,
                anon_key,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        AuthProviderKind::Jwt => {
            let secret = config.jwt_secret.as_deref().ok_or_else(|| AppError::Configuration {
                message: "auth.jwt_secret is required for the jwt provider".to_string(),
            })?;

            Ok(Arc::new(JwtAuthProvider::new(secret)))
        }
    }
}

/// The calling user, if any. Extraction never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<Uuid>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// The user id, or `UNAUTHORIZED`
    pub fn require(&self) -> Result<Uuid> {
        self.user_id.ok_or_else(AppError::unauthorized)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    Arc<dyn AuthProvider>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Infallible> {
        let provider = Arc::<dyn AuthProvider>::from_ref(state);
        let user_id = resolve_user_id(&parts.headers, provider.as_ref()).await;

        Ok(Identity { user_id })
    }
}
