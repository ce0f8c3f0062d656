//! Campaign request and response shapes

use crate::db::models::{Campaign, CampaignStatus, Category, Region};
use crate::db::{CampaignSort, CampaignSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 50;

fn default_status() -> CampaignStatus {
    CampaignStatus::Open
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// `GET /api/campaigns` query string
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CampaignListQuery {
    #[serde(default = "default_status")]
    pub status: CampaignStatus,

    pub category: Option<Category>,

    pub region: Option<Region>,

    #[serde(default)]
    pub sort: CampaignSort,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    pub limit: u64,

    /// Id of the last campaign on the previous page
    pub cursor: Option<Uuid>,
}

impl Default for CampaignListQuery {
    fn default() -> Self {
        Self {
            status: default_status(),
            category: None,
            region: None,
            sort: CampaignSort::default(),
            limit: DEFAULT_PAGE_SIZE,
            cursor: None,
        }
    }
}

fn cover_image_url(id: Uuid, width: u32, height: u32) -> String {
    format!("https://picsum.photos/seed/{}/{}/{}", id, width, height)
}

/// Feed item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCard {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub region: Region,
    pub end_date: NaiveDate,
    pub capacity: i32,
    pub application_count: i64,
    pub cover_image_url: String,
    pub status: CampaignStatus,
}

impl From<CampaignSummary> for CampaignCard {
    fn from(row: CampaignSummary) -> Self {
        Self {
            cover_image_url: cover_image_url(row.id, 600, 400),
            id: row.id,
            title: row.title,
            category: row.category,
            region: row.region,
            end_date: row.end_date,
            capacity: row.capacity,
            application_count: row.application_count,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignFeed {
    pub items: Vec<CampaignCard>,
    pub next_cursor: Option<Uuid>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    pub id: Uuid,
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
    pub status: CampaignStatus,
    pub application_count: i64,
    pub cover_image_url: String,
}

impl CampaignDetail {
    pub fn new(campaign: Campaign, application_count: i64) -> Self {
        Self {
            cover_image_url: cover_image_url(campaign.id, 1200, 800),
            id: campaign.id,
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
            status: campaign.status,
            application_count,
        }
    }
}

/// `POST /api/campaigns` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_campaign_period", skip_on_field_errors = false))]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    pub category: Category,

    pub region: Region,

    #[validate(length(min = 1, message = "benefitDesc is required"))]
    pub benefit_desc: String,

    #[validate(length(min = 1, message = "storeInfo is required"))]
    pub store_info: String,

    #[validate(length(min = 1, message = "mission is required"))]
    pub mission: String,

    #[validate(range(min = 1, message = "capacity must be positive"))]
    pub capacity: i32,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    #[serde(default)]
    pub selection_deadline: Option<NaiveDate>,
}

fn validate_campaign_period(request: &CreateCampaignRequest) -> Result<(), ValidationError> {
    if request.end_date < request.start_date {
        let mut error = ValidationError::new("date_range");
        error.message = Some("endDate must not be before startDate".into());
        return Err(error);
    }
    Ok(())
}

/// `POST /api/campaigns/{id}/select` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectInfluencersRequest {
    #[validate(length(min = 1, message = "select at least one application"))]
    pub selected_application_ids: Vec<Uuid>,

    #[serde(default)]
    pub waitlist_application_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedCampaign {
    pub id: Uuid,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionResult {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> serde_json::Value {
        serde_json::json!({
            "title": "Brunch tasting",
            "category": "FOOD",
            "region": "SEOUL",
            "benefitDesc": "Free brunch for two",
            "storeInfo": "Mapo-gu",
            "mission": "Post a review with three photos",
            "capacity": 5,
            "startDate": "2026-03-01",
            "endDate": "2026-03-31"
        })
    }

    #[test]
    fn test_query_defaults() {
        let query: CampaignListQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.status, CampaignStatus::Open);
        assert_eq!(query.sort, CampaignSort::Latest);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_query_limit_bounds() {
        let mut query = CampaignListQuery::default();
        query.limit = 0;
        assert!(query.validate().is_err());
        query.limit = MAX_PAGE_SIZE + 1;
        assert!(query.validate().is_err());
        query.limit = MAX_PAGE_SIZE;
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_create_request_parses_and_validates() {
        let request: CreateCampaignRequest = serde_json::from_value(create_request()).unwrap();
        assert!(request.selection_deadline.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_inverted_period() {
        let mut body = create_request();
        body["endDate"] = "2026-02-01".into();
        let request: CreateCampaignRequest = serde_json::from_value(body).unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_create_request_rejects_empty_title_and_capacity() {
        let mut body = create_request();
        body["title"] = "".into();
        body["capacity"] = 0.into();
        let request: CreateCampaignRequest = serde_json::from_value(body).unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("capacity"));
    }

    #[test]
    fn test_malformed_date_fails_to_parse() {
        let mut body = create_request();
        body["startDate"] = "03/01/2026".into();
        assert!(serde_json::from_value::<CreateCampaignRequest>(body).is_err());
    }

    #[test]
    fn test_select_request_requires_selection() {
        let request: SelectInfluencersRequest = serde_json::from_value(serde_json::json!({
            "selectedApplicationIds": []
        }))
        .unwrap();
        assert!(request.waitlist_application_ids.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_card_cover_image() {
        let id = Uuid::nil();
        let card = CampaignCard::from(CampaignSummary {
            id,
            title: "t".into(),
            category: Category::Food,
            region: Region::Busan,
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            capacity: 3,
            status: CampaignStatus::Open,
            created_at: chrono::Utc::now().into(),
            application_count: 2,
        });

        assert_eq!(
            card.cover_image_url,
            format!("https://picsum.photos/seed/{}/600/400", id)
        );
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["endDate"], "2026-03-31");
        assert_eq!(json["applicationCount"], 2);
    }
}
