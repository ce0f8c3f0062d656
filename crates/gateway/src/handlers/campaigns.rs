//! Campaign feed, detail, creation, and advertiser management

use axum::extract::{Path, State};
use campaignhub_common::{
    auth::Identity,
    errors::Result,
    schema::{
        CampaignDetail, CampaignFeed, CampaignListQuery, ClosedCampaign, CreateCampaignRequest,
        CreatedId, SelectInfluencersRequest, SelectionResult,
    },
    ApiResponse,
};
use crate::extract::{parse_id, ApiQuery, Payload};
use crate::AppState;

/// List campaigns with keyset pagination
///
/// GET /api/campaigns?status=OPEN&category=FOOD&region=SEOUL&sort=latest&limit=12&cursor=...
pub async fn list_campaigns(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CampaignListQuery>,
) -> Result<ApiResponse<CampaignFeed>> {
    let feed = state.services.campaigns.list(query).await?;
    Ok(ApiResponse::ok(feed))
}

/// GET /api/campaigns/{id}
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<CampaignDetail>> {
    let id = parse_id(&id, "Campaign")?;
    let detail = state.services.campaigns.detail(id).await?;
    Ok(ApiResponse::ok(detail))
}

/// POST /api/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    identity: Identity,
    Payload(request): Payload<CreateCampaignRequest>,
) -> Result<ApiResponse<CreatedId>> {
    let created = state.services.campaigns.create(identity, request).await?;
    Ok(ApiResponse::created(created))
}

/// POST /api/campaigns/{id}/close
pub async fn close_campaign(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<ApiResponse<ClosedCampaign>> {
    let id = parse_id(&id, "Campaign")?;
    let closed = state.services.campaigns.close(identity, id).await?;
    Ok(ApiResponse::ok(closed))
}

/// POST /api/campaigns/{id}/select
pub async fn select_influencers(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Payload(request): Payload<SelectInfluencersRequest>,
) -> Result<ApiResponse<SelectionResult>> {
    let id = parse_id(&id, "Campaign")?;
    let result = state.services.campaigns.select(identity, id, request).await?;
    Ok(ApiResponse::ok(result))
}
