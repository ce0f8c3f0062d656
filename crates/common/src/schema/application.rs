//! Application request shape

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// `POST /api/applications` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub campaign_id: Uuid,

    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,

    pub visit_date: NaiveDate,
}
