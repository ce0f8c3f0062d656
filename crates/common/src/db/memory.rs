//! In-memory `Store` used by tests and the `memory` storage backend
//!
//! Enforces the same uniqueness rules as the SQL schema. Every write holds
//! the table lock for its whole duration, so multi-step writes are atomic.

use crate::db::models::*;
use crate::db::store::*;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    advertisers: Vec<Advertiser>,
    influencers: Vec<Influencer>,
    channels: Vec<Channel>,
    campaigns: Vec<Campaign>,
    applications: Vec<Application>,
    submissions: Vec<Submission>,
}

impl Tables {
    fn application_counts(&self) -> HashMap<Uuid, i64> {
        let mut counts = HashMap::new();
        for application in &self.applications {
            *counts.entry(application.campaign_id).or_insert(0) += 1;
        }
        counts
    }
}

/// Thread-safe in-memory store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a campaign row as-is (fixed ids, timestamps, statuses)
    pub async fn seed_campaign(&self, campaign: Campaign) {
        self.tables.write().await.campaigns.push(campaign);
    }

    /// Insert an application row as-is
    pub async fn seed_application(&self, application: Application) {
        self.tables.write().await.applications.push(application);
    }

    /// Snapshot of an application, for assertions
    pub async fn application(&self, id: Uuid) -> Option<Application> {
        self.tables
            .read()
            .await
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub async fn submissions_for(&self, application_id: Uuid) -> Vec<Submission> {
        self.tables
            .read()
            .await
            .submissions
            .iter()
            .filter(|s| s.application_id == application_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(AppError::conflict("Profile already exists"));
        }

        let model = Profile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            role: profile.role,
            name: profile.name,
            dob: profile.dob,
            phone: profile.phone,
            created_at: Utc::now().into(),
        };
        tables.profiles.push(model.clone());
        Ok(model)
    }

    async fn find_advertiser_by_user(&self, user_id: Uuid) -> Result<Option<Advertiser>> {
        let tables = self.tables.read().await;
        Ok(tables.advertisers.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn insert_advertiser(&self, advertiser: NewAdvertiser) -> Result<Advertiser> {
        let mut tables = self.tables.write().await;
        if tables.advertisers.iter().any(|a| a.user_id == advertiser.user_id) {
            return Err(AppError::conflict("Advertiser already exists"));
        }

        let model = Advertiser {
            id: Uuid::new_v4(),
            user_id: advertiser.user_id,
            company_name: advertiser.company_name,
            business_number: advertiser.business_number,
            representative: advertiser.representative,
            store_phone: advertiser.store_phone,
            address: advertiser.address,
            created_at: Utc::now().into(),
        };
        tables.advertisers.push(model.clone());
        Ok(model)
    }

    async fn find_influencer(&self, id: Uuid) -> Result<Option<Influencer>> {
        let tables = self.tables.read().await;
        Ok(tables.influencers.iter().find(|i| i.id == id).cloned())
    }

    async fn find_influencer_by_user(&self, user_id: Uuid) -> Result<Option<Influencer>> {
        let tables = self.tables.read().await;
        Ok(tables.influencers.iter().find(|i| i.user_id == user_id).cloned())
    }

    async fn insert_influencer(&self, user_id: Uuid, channel: NewChannel) -> Result<Influencer> {
        let mut tables = self.tables.write().await;
        if tables.influencers.iter().any(|i| i.user_id == user_id) {
            return Err(AppError::conflict("Influencer already exists"));
        }

        let now = Utc::now();
        let influencer = Influencer {
            id: Uuid::new_v4(),
            user_id,
            created_at: now.into(),
        };
        tables.channels.push(Channel {
            id: Uuid::new_v4(),
            influencer_id: influencer.id,
            platform: channel.platform,
            name: channel.name,
            url: channel.url,
            followers: channel.followers,
            created_at: now.into(),
        });
        tables.influencers.push(influencer.clone());
        Ok(influencer)
    }

    async fn list_channels(&self, influencer_id: Uuid) -> Result<Vec<Channel>> {
        let tables = self.tables.read().await;
        Ok(tables
            .channels
            .iter()
            .filter(|c| c.influencer_id == influencer_id)
            .cloned()
            .collect())
    }

    async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
        after: Option<&FeedCursor>,
        limit: u64,
    ) -> Result<Vec<CampaignSummary>> {
        let tables = self.tables.read().await;
        let counts = tables.application_counts();

        let mut rows: Vec<CampaignSummary> = tables
            .campaigns
            .iter()
            .filter(|c| c.status == filter.status)
            .filter(|c| filter.category.map_or(true, |category| c.category == category))
            .filter(|c| filter.region.map_or(true, |region| c.region == region))
            .map(|c| CampaignSummary {
                id: c.id,
                title: c.title.clone(),
                category: c.category,
                region: c.region,
                end_date: c.end_date,
                capacity: c.capacity,
                status: c.status,
                created_at: c.created_at,
                application_count: counts.get(&c.id).copied().unwrap_or(0),
            })
            .filter(|row| {
                after.map_or(true, |cursor| {
                    filter.sort.compare(cursor, &row.feed_key()).is_lt()
                })
            })
            .collect();

        rows.sort_by(|a, b| filter.sort.compare(&a.feed_key(), &b.feed_key()));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn find_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
        let tables = self.tables.read().await;
        Ok(tables.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn count_applications(&self, campaign_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.campaign_id == campaign_id)
            .count() as i64)
    }

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign> {
        let model = Campaign {
            id: Uuid::new_v4(),
            advertiser_id: campaign.advertiser_id,
            title: campaign.title,
            category: campaign.category,
            region: campaign.region,
            benefit_desc: campaign.benefit_desc,
            store_info: campaign.store_info,
            mission: campaign.mission,
            capacity: campaign.capacity,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            selection_deadline: campaign.selection_deadline,
            status: CampaignStatus::Open,
            created_at: Utc::now().into(),
        };
        self.tables.write().await.campaigns.push(model.clone());
        Ok(model)
    }

    async fn update_campaign_status(&self, id: Uuid, status: CampaignStatus) -> Result<Campaign> {
        let mut tables = self.tables.write().await;
        let campaign = tables
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Campaign", id))?;

        campaign.status = status;
        Ok(campaign.clone())
    }

    async fn apply_selection(
        &self,
        campaign_id: Uuid,
        selected: &[Uuid],
        waitlisted: &[Uuid],
    ) -> Result<SelectionOutcome> {
        let mut tables = self.tables.write().await;
        let mut outcome = SelectionOutcome::default();

        for application in tables
            .applications
            .iter_mut()
            .filter(|a| a.campaign_id == campaign_id)
        {
            if selected.contains(&application.id) {
                application.status = ApplicationStatus::Selected;
                outcome.selected += 1;
            }
        }

        // Runs after the selected batch, same as the SQL store
        for application in tables
            .applications
            .iter_mut()
            .filter(|a| a.campaign_id == campaign_id)
        {
            if waitlisted.contains(&application.id) {
                application.status = ApplicationStatus::Waitlisted;
                outcome.waitlisted += 1;
            }
        }

        Ok(outcome)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application_by_pair(
        &self,
        campaign_id: Uuid,
        influencer_id: Uuid,
    ) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.campaign_id == campaign_id && a.influencer_id == influencer_id)
            .cloned())
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let mut tables = self.tables.write().await;
        if tables.applications.iter().any(|a| {
            a.campaign_id == application.campaign_id && a.influencer_id == application.influencer_id
        }) {
            return Err(AppError::conflict("Application already exists"));
        }

        let model = Application {
            id: Uuid::new_v4(),
            campaign_id: application.campaign_id,
            influencer_id: application.influencer_id,
            note: application.note,
            visit_date: application.visit_date,
            status: ApplicationStatus::Applied,
            created_at: Utc::now().into(),
        };
        tables.applications.push(model.clone());
        Ok(model)
    }

    async fn find_submission_by_application(&self, application_id: Uuid) -> Result<Option<Submission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .iter()
            .find(|s| s.application_id == application_id)
            .cloned())
    }

    async fn insert_submission(&self, submission: NewSubmission) -> Result<Submission> {
        let mut tables = self.tables.write().await;
        if tables
            .submissions
            .iter()
            .any(|s| s.application_id == submission.application_id)
        {
            return Err(AppError::conflict("Submission already exists"));
        }

        let model = Submission {
            id: Uuid::new_v4(),
            application_id: submission.application_id,
            review_url: submission.review_url,
            created_at: Utc::now().into(),
        };
        tables.submissions.push(model.clone());
        Ok(model)
    }
}
