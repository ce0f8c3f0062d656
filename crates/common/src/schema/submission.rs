//! Review submission request shape

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// `POST /api/submissions` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub application_id: Uuid,

    #[validate(url(message = "reviewUrl must be a URL"))]
    pub review_url: String,
}
