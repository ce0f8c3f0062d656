//! Repository pattern for database operations
//!
//! SeaORM-backed `Store`. Multi-step writes (influencer + channel,
//! selection + waitlist) run inside a single transaction.

use crate::db::models::*;
use crate::db::store::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }
}

/// Build the feed query. Keyset conditions compare row tuples so ties never
/// split across pages.
fn feed_statement(
    filter: &CampaignFilter,
    after: Option<&FeedCursor>,
    limit: u64,
) -> Statement {
    let mut values: Vec<sea_orm::Value> = vec![filter.status.to_value().into()];
    let mut conditions = vec!["c.status = $1".to_string()];

    if let Some(category) = filter.category {
        values.push(category.to_value().into());
        conditions.push(format!("c.category = ${}", values.len()));
    }

    if let Some(region) = filter.region {
        values.push(region.to_value().into());
        conditions.push(format!("c.region = ${}", values.len()));
    }

    if let Some(cursor) = after {
        match filter.sort {
            CampaignSort::Latest => {
                values.push(cursor.created_at.into());
                values.push(cursor.id.into());
                conditions.push(format!(
                    "(c.created_at, c.id) < (${}, ${})",
                    values.len() - 1,
                    values.len()
                ));
            }
            CampaignSort::Popular => {
                values.push(cursor.application_count.into());
                values.push(cursor.created_at.into());
                values.push(cursor.id.into());
                conditions.push(format!(
                    "(COALESCE(a.application_count, 0), c.created_at, c.id) < (${}, ${}, ${})",
                    values.len() - 2,
                    values.len() - 1,
                    values.len()
                ));
            }
        }
    }

    let order_by = match filter.sort {
        CampaignSort::Latest => "c.created_at DESC, c.id DESC",
        CampaignSort::Popular => "application_count DESC, c.created_at DESC, c.id DESC",
    };

    values.push((limit as i64).into());

    let sql = format!(
        r#"
        SELECT
            c.id,
            c.title,
            c.category,
            c.region,
            c.end_date,
            c.capacity,
            c.status,
            c.created_at,
            COALESCE(a.application_count, 0)::BIGINT AS application_count
        FROM campaigns c
        LEFT JOIN (
            SELECT campaign_id, COUNT(*) AS application_count
            FROM applications
            GROUP BY campaign_id
        ) a ON a.campaign_id = c.id
        WHERE {}
        ORDER BY {}
        LIMIT ${}
        "#,
        conditions.join(" AND "),
        order_by,
        values.len()
    );

    Statement::from_sql_and_values(DbBackend::Postgres, &sql, values)
}

#[async_trait]
impl Store for Repository {
    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Profile Operations
    // ========================================================================

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        ProfileEntity::find()
            .filter(ProfileColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile> {
        let model = ProfileActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(profile.user_id),
            role: Set(profile.role),
            name: Set(profile.name),
            dob: Set(profile.dob),
            phone: Set(profile.phone),
            created_at: Set(chrono::Utc::now().into()),
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }

    async fn find_advertiser_by_user(&self, user_id: Uuid) -> Result<Option<Advertiser>> {
        AdvertiserEntity::find()
            .filter(AdvertiserColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn insert_advertiser(&self, advertiser: NewAdvertiser) -> Result<Advertiser> {
        let model = AdvertiserActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(advertiser.user_id),
            company_name: Set(advertiser.company_name),
            business_number: Set(advertiser.business_number),
            representative: Set(advertiser.representative),
            store_phone: Set(advertiser.store_phone),
            address: Set(advertiser.address),
            created_at: Set(chrono::Utc::now().into()),
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }

    async fn find_influencer(&self, id: Uuid) -> Result<Option<Influencer>> {
        InfluencerEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_influencer_by_user(&self, user_id: Uuid) -> Result<Option<Influencer>> {
        InfluencerEntity::find()
            .filter(InfluencerColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn insert_influencer(&self, user_id: Uuid, channel: NewChannel) -> Result<Influencer> {
        let now = chrono::Utc::now();
        let txn = self.write_conn().begin().await?;

        let influencer = InfluencerActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        ChannelActiveModel {
            id: Set(Uuid::new_v4()),
            influencer_id: Set(influencer.id),
            platform: Set(channel.platform),
            name: Set(channel.name),
            url: Set(channel.url),
            followers: Set(channel.followers),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(influencer)
    }

    async fn list_channels(&self, influencer_id: Uuid) -> Result<Vec<Channel>> {
        ChannelEntity::find()
            .filter(ChannelColumn::InfluencerId.eq(influencer_id))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Campaign Operations
    // ========================================================================

    async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
        after: Option<&FeedCursor>,
        limit: u64,
    ) -> Result<Vec<CampaignSummary>> {
        let stmt = feed_statement(filter, after, limit);

        CampaignSummary::find_by_statement(stmt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
        CampaignEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn count_applications(&self, campaign_id: Uuid) -> Result<i64> {
        let count = ApplicationEntity::find()
            .filter(ApplicationColumn::CampaignId.eq(campaign_id))
            .count(self.read_conn())
            .await?;

        Ok(count as i64)
    }

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign> {
        let model = CampaignActiveModel {
            id: Set(Uuid::new_v4()),
            advertiser_id: Set(campaign.advertiser_id),
            title: Set(campaign.title),
            category: Set(campaign.category),
            region: Set(campaign.region),
            benefit_desc: Set(campaign.benefit_desc),
            store_info: Set(campaign.store_info),
            mission: Set(campaign.mission),
            capacity: Set(campaign.capacity),
            start_date: Set(campaign.start_date),
            end_date: Set(campaign.end_date),
            selection_deadline: Set(campaign.selection_deadline),
            status: Set(CampaignStatus::Open),
            created_at: Set(chrono::Utc::now().into()),
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }

    async fn update_campaign_status(&self, id: Uuid, status: CampaignStatus) -> Result<Campaign> {
        let mut campaign: CampaignActiveModel = CampaignEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", id))?
            .into();

        campaign.status = Set(status);
        campaign.update(self.write_conn()).await.map_err(Into::into)
    }

    async fn apply_selection(
        &self,
        campaign_id: Uuid,
        selected: &[Uuid],
        waitlisted: &[Uuid],
    ) -> Result<SelectionOutcome> {
        let txn = self.write_conn().begin().await?;
        let mut outcome = SelectionOutcome::default();

        for (ids, status) in [
            (selected, ApplicationStatus::Selected),
            (waitlisted, ApplicationStatus::Waitlisted),
        ] {
            if ids.is_empty() {
                continue;
            }

            let result = ApplicationEntity::update_many()
                .col_expr(ApplicationColumn::Status, Expr::value(status.to_value()))
                .filter(ApplicationColumn::CampaignId.eq(campaign_id))
                .filter(ApplicationColumn::Id.is_in(ids.iter().copied()))
                .exec(&txn)
                .await?;

            match status {
                ApplicationStatus::Selected => outcome.selected = result.rows_affected,
                _ => outcome.waitlisted = result.rows_affected,
            }
        }

        txn.commit().await?;
        Ok(outcome)
    }

    // ========================================================================
    // Application Operations
    // ========================================================================

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        ApplicationEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_application_by_pair(
        &self,
        campaign_id: Uuid,
        influencer_id: Uuid,
    ) -> Result<Option<Application>> {
        ApplicationEntity::find()
            .filter(ApplicationColumn::CampaignId.eq(campaign_id))
            .filter(ApplicationColumn::InfluencerId.eq(influencer_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let model = ApplicationActiveModel {
            id: Set(Uuid::new_v4()),
            campaign_id: Set(application.campaign_id),
            influencer_id: Set(application.influencer_id),
            note: Set(application.note),
            visit_date: Set(application.visit_date),
            status: Set(ApplicationStatus::Applied),
            created_at: Set(chrono::Utc::now().into()),
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // Submission Operations
    // ========================================================================

    async fn find_submission_by_application(&self, application_id: Uuid) -> Result<Option<Submission>> {
        SubmissionEntity::find()
            .filter(SubmissionColumn::ApplicationId.eq(application_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn insert_submission(&self, submission: NewSubmission) -> Result<Submission> {
        let model = SubmissionActiveModel {
            id: Set(Uuid::new_v4()),
            application_id: Set(submission.application_id),
            review_url: Set(submission.review_url),
            created_at: Set(chrono::Utc::now().into()),
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(sort: CampaignSort) -> CampaignFilter {
        CampaignFilter {
            status: CampaignStatus::Open,
            category: Some(Category::Food),
            region: None,
            sort,
        }
    }

    #[test]
    fn test_feed_statement_latest_without_cursor() {
        let stmt = feed_statement(&filter(CampaignSort::Latest), None, 13);

        assert!(stmt.sql.contains("c.status = $1 AND c.category = $2"));
        assert!(stmt.sql.contains("ORDER BY c.created_at DESC, c.id DESC"));
        assert!(stmt.sql.contains("LIMIT $3"));
    }

    #[test]
    fn test_feed_statement_popular_uses_tuple_keyset() {
        let cursor = FeedCursor {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now().into(),
            application_count: 4,
        };
        let stmt = feed_statement(&filter(CampaignSort::Popular), Some(&cursor), 3);

        assert!(stmt
            .sql
            .contains("(COALESCE(a.application_count, 0), c.created_at, c.id) < ($3, $4, $5)"));
        assert!(stmt.sql.contains("ORDER BY application_count DESC"));
        assert!(stmt.sql.contains("LIMIT $6"));

        // $3..$5 bind count, created_at, id in that order
        let values = stmt.values.unwrap().0;
        assert_eq!(values.len(), 6);
        assert_eq!(values[2], sea_orm::Value::from(4i64));
        assert_eq!(values[3], sea_orm::Value::from(cursor.created_at));
        assert_eq!(values[4], sea_orm::Value::from(cursor.id));
        assert_eq!(values[5], sea_orm::Value::from(3i64));
    }
}
