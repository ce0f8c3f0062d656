//! Storage abstraction for the campaign workflow
//!
//! Services talk to a `Store`; the SeaORM `Repository` backs it in production
//! and `MemoryStore` backs it in tests and local development.

use crate::db::models::*;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Feed ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignSort {
    /// Newest first
    #[default]
    Latest,
    /// Most applications first, newest first among equals
    Popular,
}

impl CampaignSort {
    /// Total feed order; `Less` means `a` is listed before `b`.
    /// `id` is the final tie-break so keyset pagination never skips or repeats rows.
    pub fn compare(&self, a: &FeedCursor, b: &FeedCursor) -> Ordering {
        let by_recency = b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id));

        match self {
            CampaignSort::Latest => by_recency,
            CampaignSort::Popular => b
                .application_count
                .cmp(&a.application_count)
                .then(by_recency),
        }
    }
}

/// Position of a campaign within the feed, resolved from the cursor id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCursor {
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub application_count: i64,
}

/// Filters applied to the campaign feed
#[derive(Debug, Clone)]
pub struct CampaignFilter {
    pub status: CampaignStatus,
    pub category: Option<Category>,
    pub region: Option<Region>,
    pub sort: CampaignSort,
}

/// Campaign feed row with its derived application count
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CampaignSummary {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub region: Region,
    pub end_date: NaiveDate,
    pub capacity: i32,
    pub status: CampaignStatus,
    pub created_at: DateTimeWithTimeZone,
    pub application_count: i64,
}

impl CampaignSummary {
    pub fn feed_key(&self) -> FeedCursor {
        FeedCursor {
            id: self.id,
            created_at: self.created_at,
            application_count: self.application_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub role: UserRole,
    pub name: String,
    pub dob: NaiveDate,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NewAdvertiser {
    pub user_id: Uuid,
    pub company_name: String,
    pub business_number: String,
    pub representative: String,
    pub store_phone: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct NewChannel {
    pub platform: ChannelPlatform,
    pub name: String,
    pub url: String,
    pub followers: i64,
}

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub advertiser_id: Uuid,
    pub title: String,
    pub category: Category,
    pub region: Region,
    pub benefit_desc: String,
    pub store_info: String,
    pub mission: String,
    pub capacity: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub selection_deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub campaign_id: Uuid,
    pub influencer_id: Uuid,
    pub note: Option<String>,
    pub visit_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub application_id: Uuid,
    pub review_url: String,
}

/// Rows changed by one selection call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub selected: u64,
    pub waitlisted: u64,
}

impl SelectionOutcome {
    pub fn total(&self) -> u64 {
        self.selected + self.waitlisted
    }
}

/// Persistence operations needed by the services.
///
/// Inserts that race a uniqueness constraint fail with `AppError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;

    // Profiles and role records
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;
    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile>;
    async fn find_advertiser_by_user(&self, user_id: Uuid) -> Result<Option<Advertiser>>;
    async fn insert_advertiser(&self, advertiser: NewAdvertiser) -> Result<Advertiser>;
    async fn find_influencer(&self, id: Uuid) -> Result<Option<Influencer>>;
    async fn find_influencer_by_user(&self, user_id: Uuid) -> Result<Option<Influencer>>;

    /// Create the influencer and its first channel as one unit
    async fn insert_influencer(&self, user_id: Uuid, channel: NewChannel) -> Result<Influencer>;
    async fn list_channels(&self, influencer_id: Uuid) -> Result<Vec<Channel>>;

    // Campaigns
    /// Up to `limit` feed rows strictly after `after` in `filter.sort` order
    async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
        after: Option<&FeedCursor>,
        limit: u64,
    ) -> Result<Vec<CampaignSummary>>;
    async fn find_campaign(&self, id: Uuid) -> Result<Option<Campaign>>;
    async fn count_applications(&self, campaign_id: Uuid) -> Result<i64>;
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign>;
    async fn update_campaign_status(&self, id: Uuid, status: CampaignStatus) -> Result<Campaign>;

    /// Mark applications of `campaign_id` as selected / waitlisted in one unit.
    /// Ids belonging to other campaigns are left untouched.
    async fn apply_selection(
        &self,
        campaign_id: Uuid,
        selected: &[Uuid],
        waitlisted: &[Uuid],
    ) -> Result<SelectionOutcome>;

    // Applications
    async fn find_application(&self, id: Uuid) -> Result<Option<Application>>;
    async fn find_application_by_pair(
        &self,
        campaign_id: Uuid,
        influencer_id: Uuid,
    ) -> Result<Option<Application>>;
    async fn insert_application(&self, application: NewApplication) -> Result<Application>;

    // Submissions
    async fn find_submission_by_application(&self, application_id: Uuid) -> Result<Option<Submission>>;
    async fn insert_submission(&self, submission: NewSubmission) -> Result<Submission>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn key(id: u128, minute: u32, count: i64) -> FeedCursor {
        FeedCursor {
            id: Uuid::from_u128(id),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap().into(),
            application_count: count,
        }
    }

    #[test]
    fn test_latest_orders_newest_first() {
        let older = key(1, 0, 10);
        let newer = key(2, 5, 0);
        assert_eq!(CampaignSort::Latest.compare(&newer, &older), Ordering::Less);
    }

    #[test]
    fn test_popular_breaks_ties_by_recency() {
        let a = key(1, 0, 5);
        let b = key(2, 5, 5);
        let c = key(3, 9, 3);

        let mut keys = vec![c.clone(), a.clone(), b.clone()];
        keys.sort_by(|x, y| CampaignSort::Popular.compare(x, y));

        assert_eq!(keys, vec![b, a, c]);
    }

    #[test]
    fn test_identical_keys_fall_back_to_id() {
        let a = key(1, 0, 2);
        let b = key(2, 0, 2);
        assert_eq!(CampaignSort::Popular.compare(&b, &a), Ordering::Less);
        assert_eq!(CampaignSort::Latest.compare(&a, &a), Ordering::Equal);
    }
}
