//! Campaign lifecycle: feed, detail, creation, closing and selection

use super::fetch_failed;
use crate::auth::Identity;
use crate::db::models::{Campaign, CampaignStatus};
use crate::db::{CampaignFilter, FeedCursor, NewCampaign, Store};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::schema::{
    CampaignCard, CampaignDetail, CampaignFeed, CampaignListQuery, ClosedCampaign, CreatedId,
    CreateCampaignRequest, SelectInfluencersRequest, SelectionResult,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

fn access_denied(message: &str) -> AppError {
    AppError::CampaignAccessDenied {
        message: message.to_string(),
    }
}

#[derive(Clone)]
pub struct CampaignService {
    store: Arc<dyn Store>,
}

impl CampaignService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// One page of the campaign feed.
    ///
    /// Reads `limit + 1` rows; the extra row only decides `hasMore`.
    pub async fn list(&self, query: CampaignListQuery) -> Result<CampaignFeed> {
        query.validate()?;

        let after = match query.cursor {
            Some(id) => Some(self.cursor_position(id).await?),
            None => None,
        };

        let filter = CampaignFilter {
            status: query.status,
            category: query.category,
            region: query.region,
            sort: query.sort,
        };

        let mut rows = self
            .store
            .list_campaigns(&filter, after.as_ref(), query.limit + 1)
            .await
            .map_err(fetch_failed("Failed to load campaigns"))?;

        let has_more = rows.len() as u64 > query.limit;
        rows.truncate(query.limit as usize);

        let next_cursor = if has_more { rows.last().map(|row| row.id) } else { None };

        Ok(CampaignFeed {
            items: rows.into_iter().map(CampaignCard::from).collect(),
            next_cursor,
            has_more,
        })
    }

    async fn cursor_position(&self, id: Uuid) -> Result<FeedCursor> {
        let campaign = self
            .store
            .find_campaign(id)
            .await
            .map_err(fetch_failed("Failed to load campaigns"))?
            .ok_or_else(|| AppError::validation("Unknown cursor"))?;

        let application_count = self
            .store
            .count_applications(id)
            .await
            .map_err(fetch_failed("Failed to load campaigns"))?;

        Ok(FeedCursor {
            id,
            created_at: campaign.created_at,
            application_count,
        })
    }

    pub async fn detail(&self, id: Uuid) -> Result<CampaignDetail> {
        let campaign = self
            .store
            .find_campaign(id)
            .await
            .map_err(fetch_failed("Failed to load campaign"))?
            .ok_or_else(|| AppError::not_found("Campaign", id))?;

        let application_count = self
            .store
            .count_applications(id)
            .await
            .map_err(fetch_failed("Failed to load campaign"))?;

        Ok(CampaignDetail::new(campaign, application_count))
    }

    /// Create an `OPEN` campaign owned by the caller's advertiser record
    pub async fn create(&self, identity: Identity, request: CreateCampaignRequest) -> Result<CreatedId> {
        request.validate()?;
        let user_id = identity.require()?;

        let advertiser = self
            .store
            .find_advertiser_by_user(user_id)
            .await
            .map_err(fetch_failed("Failed to load advertiser"))?
            .ok_or_else(|| access_denied("Only advertisers can create campaigns"))?;

        let campaign = self
            .store
            .insert_campaign(NewCampaign {
                advertiser_id: advertiser.id,
                title: request.title,
                category: request.category,
                region: request.region,
                benefit_desc: request.benefit_desc,
                store_info: request.store_info,
                mission: request.mission,
                capacity: request.capacity,
                start_date: request.start_date,
                end_date: request.end_date,
                selection_deadline: request.selection_deadline,
            })
            .await
            .map_err(fetch_failed("Failed to create campaign"))?;

        metrics::record_campaign_created();
        info!(campaign_id = %campaign.id, advertiser_id = %advertiser.id, "Campaign created");

        Ok(campaign.id.into())
    }

    /// Load a campaign and check the caller's advertiser record owns it
    async fn owned_campaign(&self, user_id: Uuid, id: Uuid) -> Result<Campaign> {
        let campaign = self
            .store
            .find_campaign(id)
            .await
            .map_err(fetch_failed("Failed to load campaign"))?
            .ok_or_else(|| AppError::not_found("Campaign", id))?;

        let advertiser = self
            .store
            .find_advertiser_by_user(user_id)
            .await
            .map_err(fetch_failed("Failed to load advertiser"))?;

        match advertiser {
            Some(advertiser) if campaign.is_owned_by(advertiser.id) => Ok(campaign),
            _ => Err(access_denied("Not allowed to manage this campaign")),
        }
    }

    /// Stop recruitment. Closing an already closed campaign is allowed.
    pub async fn close(&self, identity: Identity, id: Uuid) -> Result<ClosedCampaign> {
        let user_id = identity.require()?;
        self.owned_campaign(user_id, id).await?;

        let updated = self
            .store
            .update_campaign_status(id, CampaignStatus::Closed)
            .await
            .map_err(fetch_failed("Failed to close campaign"))?;

        metrics::record_campaign_closed();
        info!(campaign_id = %id, user_id = %user_id, "Campaign closed");

        Ok(ClosedCampaign {
            id: updated.id,
            status: updated.status,
        })
    }

    /// Mark applications as selected or waitlisted.
    ///
    /// Only applications of this campaign are touched, and `updated` counts
    /// the rows that changed. An id present in both lists is selected.
    /// Nothing is written once the deadline has passed.
    pub async fn select(
        &self,
        identity: Identity,
        id: Uuid,
        request: SelectInfluencersRequest,
    ) -> Result<SelectionResult> {
        let user_id = identity.require()?;
        let campaign = self.owned_campaign(user_id, id).await?;

        request.validate()?;

        if campaign.selection_closed_on(Utc::now().date_naive()) {
            return Err(access_denied("The selection deadline has passed"));
        }

        let selected = request.selected_application_ids;
        let waitlisted: Vec<Uuid> = request
            .waitlist_application_ids
            .into_iter()
            .filter(|application_id| !selected.contains(application_id))
            .collect();

        let outcome = self
            .store
            .apply_selection(id, &selected, &waitlisted)
            .await
            .map_err(fetch_failed("Failed to update applications"))?;

        metrics::record_selection(outcome.selected, outcome.waitlisted);
        info!(
            campaign_id = %id,
            selected = outcome.selected,
            waitlisted = outcome.waitlisted,
            "Selection applied"
        );

        Ok(SelectionResult {
            updated: outcome.total(),
        })
    }
}
