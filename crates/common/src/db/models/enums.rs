//! Enumerations shared by entities and request schemas
//!
//! Stored as text columns; serialized in SCREAMING_SNAKE_CASE on the wire.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADVERTISER")]
    Advertiser,
    #[sea_orm(string_value = "INFLUENCER")]
    Influencer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[sea_orm(string_value = "FOOD")]
    Food,
    #[sea_orm(string_value = "BEAUTY")]
    Beauty,
    #[sea_orm(string_value = "TRAVEL")]
    Travel,
    #[sea_orm(string_value = "LIFE")]
    Life,
    #[sea_orm(string_value = "CULTURE")]
    Culture,
    #[sea_orm(string_value = "DIGITAL")]
    Digital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    #[sea_orm(string_value = "SEOUL")]
    Seoul,
    #[sea_orm(string_value = "INCHEON")]
    Incheon,
    #[sea_orm(string_value = "GYEONGGI")]
    Gyeonggi,
    #[sea_orm(string_value = "BUSAN")]
    Busan,
}

/// Campaign lifecycle: `OPEN -> CLOSED`.
///
/// `Selected` is part of the stored vocabulary but no operation assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
    #[sea_orm(string_value = "SELECTED")]
    Selected,
}

impl CampaignStatus {
    /// Whether influencers may still apply
    pub fn accepts_applications(&self) -> bool {
        matches!(self, CampaignStatus::Open)
    }
}

/// Application lifecycle: `APPLIED -> SELECTED | WAITLISTED`, driven by the owning advertiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "APPLIED")]
    Applied,
    #[sea_orm(string_value = "SELECTED")]
    Selected,
    #[sea_orm(string_value = "WAITLISTED")]
    Waitlisted,
}

impl ApplicationStatus {
    /// Only selected applicants may submit a review
    pub fn can_submit_review(&self) -> bool {
        matches!(self, ApplicationStatus::Selected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelPlatform {
    #[sea_orm(string_value = "NAVER_BLOG")]
    NaverBlog,
    #[sea_orm(string_value = "INSTAGRAM")]
    Instagram,
    #[sea_orm(string_value = "YOUTUBE")]
    Youtube,
    #[sea_orm(string_value = "THREADS")]
    Threads,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_stored_values() {
        assert_eq!(serde_json::to_string(&ChannelPlatform::NaverBlog).unwrap(), "\"NAVER_BLOG\"");
        assert_eq!(ChannelPlatform::NaverBlog.to_value(), "NAVER_BLOG");
        assert_eq!(serde_json::to_string(&Region::Gyeonggi).unwrap(), "\"GYEONGGI\"");
        assert_eq!(ApplicationStatus::Waitlisted.to_value(), "WAITLISTED");
    }

    #[test]
    fn test_status_guards() {
        assert!(CampaignStatus::Open.accepts_applications());
        assert!(!CampaignStatus::Closed.accepts_applications());
        assert!(!CampaignStatus::Selected.accepts_applications());
        assert!(ApplicationStatus::Selected.can_submit_review());
        assert!(!ApplicationStatus::Applied.can_submit_review());
        assert!(!ApplicationStatus::Waitlisted.can_submit_review());
    }
}
