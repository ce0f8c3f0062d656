//! API handlers module

pub mod applications;
pub mod campaigns;
pub mod health;
pub mod onboarding;
pub mod submissions;

use axum::http::Uri;
use campaignhub_common::errors::AppError;

/// Unknown routes get the JSON envelope instead of an empty 404
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found("Route", uri.path())
}
