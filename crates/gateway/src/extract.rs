//! Extractors that reject with the standard error envelope

use axum::extract::{FromRequest, FromRequestParts};
use campaignhub_common::errors::{AppError, Result};
use uuid::Uuid;

/// JSON body; a body that does not parse is `VALIDATION_FAILED`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// Query string, rejected the same way as bodies
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path ids that are not UUIDs cannot name an existing row
pub fn parse_id(raw: &str, resource: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(resource, raw))
}
