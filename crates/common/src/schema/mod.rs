//! Request and response contracts for the HTTP API
//!
//! Field names are camelCase on the wire and dates are `YYYY-MM-DD`.
//! Structural checks happen during deserialization; the remaining rules
//! are `validator` derives checked by the services.

pub mod application;
pub mod campaign;
pub mod onboarding;
pub mod submission;

pub use application::CreateApplicationRequest;
pub use campaign::{
    CampaignCard, CampaignDetail, CampaignFeed, CampaignListQuery, ClosedCampaign,
    CreateCampaignRequest, SelectInfluencersRequest, SelectionResult,
};
pub use onboarding::{
    CreateAdvertiserRequest, CreateInfluencerRequest, CreateProfileRequest, OnboardingStatus,
    ProfileCreated,
};
pub use submission::SubmitReviewRequest;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `{ "id": ... }` returned by create operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedId {
    pub id: Uuid,
}

impl From<Uuid> for CreatedId {
    fn from(id: Uuid) -> Self {
        Self { id }
    }
}
