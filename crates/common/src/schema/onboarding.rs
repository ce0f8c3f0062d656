//! Onboarding request and status shapes

use crate::db::models::{ChannelPlatform, UserRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /api/auth/onboarding/profile` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub role: UserRole,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    pub dob: NaiveDate,

    #[validate(length(min = 8, message = "phone must be at least 8 characters"))]
    pub phone: String,
}

/// `POST /api/auth/onboarding/advertiser` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdvertiserRequest {
    #[validate(length(min = 1, message = "companyName is required"))]
    pub company_name: String,

    #[validate(length(min = 5, message = "businessNumber must be at least 5 characters"))]
    pub business_number: String,

    #[validate(length(min = 1, message = "representative is required"))]
    pub representative: String,

    #[validate(length(min = 8, message = "storePhone must be at least 8 characters"))]
    pub store_phone: String,

    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

/// `POST /api/auth/onboarding/influencer` body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInfluencerRequest {
    pub channel_platform: ChannelPlatform,

    #[validate(length(min = 1, message = "channelName is required"))]
    pub channel_name: String,

    #[validate(url(message = "channelUrl must be a URL"))]
    pub channel_url: String,

    #[validate(range(min = 0, message = "followers must not be negative"))]
    pub followers: i64,
}

/// Completion flags are `None` for the role the user does not hold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub has_profile: bool,
    pub role: Option<UserRole>,
    pub advertiser_completed: Option<bool>,
    pub influencer_completed: Option<bool>,
}

impl OnboardingStatus {
    pub fn without_profile() -> Self {
        Self {
            has_profile: false,
            role: None,
            advertiser_completed: None,
            influencer_completed: None,
        }
    }
}

/// `POST /api/auth/onboarding/profile` result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileCreated {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_phone_length() {
        let request: CreateProfileRequest = serde_json::from_value(serde_json::json!({
            "role": "INFLUENCER",
            "name": "Kim",
            "dob": "1995-04-12",
            "phone": "0101234"
        }))
        .unwrap();
        assert!(request.validate().unwrap_err().field_errors().contains_key("phone"));
    }

    #[test]
    fn test_influencer_followers_non_negative() {
        let request: CreateInfluencerRequest = serde_json::from_value(serde_json::json!({
            "channelPlatform": "YOUTUBE",
            "channelName": "daily",
            "channelUrl": "https://youtube.com/@daily",
            "followers": -1
        }))
        .unwrap();
        assert!(request.validate().unwrap_err().field_errors().contains_key("followers"));
    }

    #[test]
    fn test_fractional_followers_fail_to_parse() {
        let result = serde_json::from_value::<CreateInfluencerRequest>(serde_json::json!({
            "channelPlatform": "YOUTUBE",
            "channelName": "daily",
            "channelUrl": "https://youtube.com/@daily",
            "followers": 10.5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_status_without_profile_serializes_nulls() {
        let json = serde_json::to_value(OnboardingStatus::without_profile()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hasProfile": false,
                "role": null,
                "advertiserCompleted": null,
                "influencerCompleted": null
            })
        );
    }
}
