use axum::extract::State;
use campaignhub_common::{
    auth::Identity,
    errors::Result,
    schema::{CreateApplicationRequest, CreatedId},
    ApiResponse,
};
use crate::extract::Payload;
use crate::AppState;

/// POST /api/applications
pub async fn create_application(
    State(state): State<AppState>,
    identity: Identity,
    Payload(request): Payload<CreateApplicationRequest>,
) -> Result<ApiResponse<CreatedId>> {
    let created = state.services.applications.create(identity, request).await?;
    Ok(ApiResponse::created(created))
}
