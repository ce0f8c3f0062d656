//! Campaign entity

use super::enums::{CampaignStatus, Category, Region};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub advertiser_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    pub category: Category,

    pub region: Region,

    #[sea_orm(column_type = "Text")]
    pub benefit_desc: String,

    #[sea_orm(column_type = "Text")]
    pub store_info: String,

    #[sea_orm(column_type = "Text")]
    pub mission: String,

    pub capacity: i32,

    pub start_date: Date,

    pub end_date: Date,

    pub selection_deadline: Option<Date>,

    pub status: CampaignStatus,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Visit dates are accepted inside `[start_date, end_date]`, both ends inclusive
    pub fn covers_visit_date(&self, visit_date: Date) -> bool {
        self.start_date <= visit_date && visit_date <= self.end_date
    }

    /// Selection is blocked once `today` is past the deadline; no deadline never blocks
    pub fn selection_closed_on(&self, today: Date) -> bool {
        self.selection_deadline
            .map(|deadline| today > deadline)
            .unwrap_or(false)
    }

    pub fn is_owned_by(&self, advertiser_id: Uuid) -> bool {
        self.advertiser_id == advertiser_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::advertiser::Entity",
        from = "Column::AdvertiserId",
        to = "super::advertiser::Column::Id"
    )]
    Advertiser,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
}

impl Related<super::advertiser::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Advertiser.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
