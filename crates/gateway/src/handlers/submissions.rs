use axum::extract::State;
use campaignhub_common::{
    auth::Identity,
    errors::Result,
    schema::{CreatedId, SubmitReviewRequest},
    ApiResponse,
};
use crate::extract::Payload;
use crate::AppState;

/// POST /api/submissions
pub async fn submit_review(
    State(state): State<AppState>,
    identity: Identity,
    Payload(request): Payload<SubmitReviewRequest>,
) -> Result<ApiResponse<CreatedId>> {
    let created = state.services.submissions.submit(identity, request).await?;
    Ok(ApiResponse::created(created))
}
