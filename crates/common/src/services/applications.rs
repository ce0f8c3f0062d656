//! Influencer applications to open campaigns

use crate::auth::Identity;
use crate::db::{NewApplication, Store};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::schema::{CreateApplicationRequest, CreatedId};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

const ALREADY_APPLIED: &str = "Already applied to this campaign";

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Apply to an `OPEN` campaign with a visit date inside its period
    pub async fn create(&self, identity: Identity, request: CreateApplicationRequest) -> Result<CreatedId> {
        let user_id = identity.require()?;
        request.validate()?;

        let influencer = self
            .store
            .find_influencer_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::forbidden("Only influencers can apply"))?;

        let campaign = self
            .store
            .find_campaign(request.campaign_id)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", request.campaign_id))?;

        if !campaign.status.accepts_applications() {
            return Err(AppError::forbidden("Recruitment for this campaign is closed"));
        }

        if !campaign.covers_visit_date(request.visit_date) {
            return Err(AppError::validation("Visit date is outside the campaign period"));
        }

        if self
            .store
            .find_application_by_pair(campaign.id, influencer.id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(ALREADY_APPLIED));
        }

        // The unique (campaign, influencer) constraint catches a concurrent duplicate
        let application = self
            .store
            .insert_application(NewApplication {
                campaign_id: campaign.id,
                influencer_id: influencer.id,
                note: request.note,
                visit_date: request.visit_date,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => AppError::conflict(ALREADY_APPLIED),
                other => other,
            })?;

        metrics::record_application_created();
        info!(
            application_id = %application.id,
            campaign_id = %campaign.id,
            influencer_id = %influencer.id,
            "Application created"
        );

        Ok(application.id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::*;
    use crate::errors::ErrorCode;
    use crate::services::testing::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn apply(campaign_id: Uuid, visit_date: NaiveDate) -> CreateApplicationRequest {
        CreateApplicationRequest {
            campaign_id,
            note: Some("Weekend visit".into()),
            visit_date,
        }
    }

    #[tokio::test]
    async fn test_visit_date_boundaries_are_inclusive() {
        let h = harness();
        let (_, advertiser_id) = advertiser(&h).await;
        let on_start = campaign(advertiser_id, 0);
        let on_end = campaign(advertiser_id, 1);
        h.store.seed_campaign(on_start.clone()).await;
        h.store.seed_campaign(on_end.clone()).await;
        let (identity, _) = influencer(&h).await;

        h.services
            .applications
            .create(identity, apply(on_start.id, on_start.start_date))
            .await
            .unwrap();
        h.services
            .applications
            .create(identity, apply(on_end.id, on_end.end_date))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_visit_date_outside_period() {
        let h = harness();
        let (_, advertiser_id) = advertiser(&h).await;
        let campaign = campaign(advertiser_id, 0);
        h.store.seed_campaign(campaign.clone()).await;
        let (identity, _) = influencer(&h).await;

        for visit in [date(2026, 2, 28), date(2026, 4, 1)] {
            let err = h
                .services
                .applications
                .create(identity, apply(campaign.id, visit))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationFailed);
        }
    }

    #[tokio::test]
    async fn test_second_application_conflicts() {
        let h = harness();
        let (_, advertiser_id) = advertiser(&h).await;
        let campaign = campaign(advertiser_id, 0);
        h.store.seed_campaign(campaign.clone()).await;
        let (identity, _) = influencer(&h).await;

        let first = h
            .services
            .applications
            .create(identity, apply(campaign.id, date(2026, 3, 5)))
            .await
            .unwrap();

        let mut second = apply(campaign.id, date(2026, 3, 20));
        second.note = Some("changed my mind".into());
        let err = h.services.applications.create(identity, second).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let stored = h.store.application(first.id).await.unwrap();
        assert_eq!(stored.visit_date, date(2026, 3, 5));
        assert_eq!(stored.note.as_deref(), Some("Weekend visit"));
        assert_eq!(stored.status, ApplicationStatus::Applied);
    }

    #[tokio::test]
    async fn test_closed_campaign_rejects_even_valid_dates() {
        let h = harness();
        let (_, advertiser_id) = advertiser(&h).await;
        let mut campaign = campaign(advertiser_id, 0);
        campaign.status = CampaignStatus::Closed;
        h.store.seed_campaign(campaign.clone()).await;
        let (identity, _) = influencer(&h).await;

        let err = h
            .services
            .applications
            .create(identity, apply(campaign.id, date(2026, 3, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_caller_must_be_influencer() {
        let h = harness();
        let (advertiser, advertiser_id) = advertiser(&h).await;
        let campaign = campaign(advertiser_id, 0);
        h.store.seed_campaign(campaign.clone()).await;

        let err = h
            .services
            .applications
            .create(advertiser, apply(campaign.id, date(2026, 3, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let err = h
            .services
            .applications
            .create(Identity::anonymous(), apply(campaign.id, date(2026, 3, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_missing_campaign() {
        let h = harness();
        let (identity, _) = influencer(&h).await;

        let err = h
            .services
            .applications
            .create(identity, apply(Uuid::new_v4(), date(2026, 3, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_long_note_is_rejected() {
        let h = harness();
        let (identity, _) = influencer(&h).await;
        let mut request = apply(Uuid::new_v4(), date(2026, 3, 10));
        request.note = Some("x".repeat(501));

        let err = h.services.applications.create(identity, request).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}
