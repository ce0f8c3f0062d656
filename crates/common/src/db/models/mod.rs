//! SeaORM entity models
//!
//! Database entities for the campaign marketplace

mod enums;
mod profile;
mod advertiser;
mod influencer;
mod influencer_channel;
mod campaign;
mod application;
mod submission;

pub use enums::{
    ApplicationStatus, CampaignStatus, Category, ChannelPlatform, Region, UserRole,
};

pub use profile::{
    Entity as ProfileEntity,
    Model as Profile,
    ActiveModel as ProfileActiveModel,
    Column as ProfileColumn,
};

pub use advertiser::{
    Entity as AdvertiserEntity,
    Model as Advertiser,
    ActiveModel as AdvertiserActiveModel,
    Column as AdvertiserColumn,
};

pub use influencer::{
    Entity as InfluencerEntity,
    Model as Influencer,
    ActiveModel as InfluencerActiveModel,
    Column as InfluencerColumn,
};

pub use influencer_channel::{
    Entity as ChannelEntity,
    Model as Channel,
    ActiveModel as ChannelActiveModel,
    Column as ChannelColumn,
};

pub use campaign::{
    Entity as CampaignEntity,
    Model as Campaign,
    ActiveModel as CampaignActiveModel,
    Column as CampaignColumn,
};

pub use application::{
    Entity as ApplicationEntity,
    Model as Application,
    ActiveModel as ApplicationActiveModel,
    Column as ApplicationColumn,
};

pub use submission::{
    Entity as SubmissionEntity,
    Model as Submission,
    ActiveModel as SubmissionActiveModel,
    Column as SubmissionColumn,
};
