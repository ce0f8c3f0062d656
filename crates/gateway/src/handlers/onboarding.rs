//! Signup follow-up: profile, then the role-specific record

use axum::extract::State;
use campaignhub_common::{
    auth::Identity,
    errors::Result,
    schema::{
        CreateAdvertiserRequest, CreateInfluencerRequest, CreateProfileRequest, CreatedId,
        OnboardingStatus, ProfileCreated,
    },
    ApiResponse,
};
use crate::extract::Payload;
use crate::AppState;

/// GET /api/auth/onboarding/status
pub async fn get_status(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<ApiResponse<OnboardingStatus>> {
    let status = state.services.onboarding.status(identity).await?;
    Ok(ApiResponse::ok(status))
}

/// POST /api/auth/onboarding/profile
pub async fn create_profile(
    State(state): State<AppState>,
    identity: Identity,
    Payload(request): Payload<CreateProfileRequest>,
) -> Result<ApiResponse<ProfileCreated>> {
    let created = state.services.onboarding.create_profile(identity, request).await?;
    Ok(ApiResponse::created(created))
}

/// POST /api/auth/onboarding/advertiser
pub async fn create_advertiser(
    State(state): State<AppState>,
    identity: Identity,
    Payload(request): Payload<CreateAdvertiserRequest>,
) -> Result<ApiResponse<CreatedId>> {
    let created = state.services.onboarding.create_advertiser(identity, request).await?;
    Ok(ApiResponse::created(created))
}

/// POST /api/auth/onboarding/influencer
pub async fn create_influencer(
    State(state): State<AppState>,
    identity: Identity,
    Payload(request): Payload<CreateInfluencerRequest>,
) -> Result<ApiResponse<CreatedId>> {
    let created = state.services.onboarding.create_influencer(identity, request).await?;
    Ok(ApiResponse::created(created))
}
