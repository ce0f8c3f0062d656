//! Profile creation and role-specific onboarding

use crate::auth::Identity;
use crate::db::models::{Profile, UserRole};
use crate::db::{NewAdvertiser, NewChannel, NewProfile, Store};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::schema::{
    CreateAdvertiserRequest, CreateInfluencerRequest, CreateProfileRequest, CreatedId,
    OnboardingStatus, ProfileCreated,
};
use sea_orm::ActiveEnum;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Map a uniqueness violation from the store to a friendly conflict
fn conflict_as(message: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |err| match err {
        AppError::Conflict { .. } => AppError::conflict(message),
        other => other,
    }
}

#[derive(Clone)]
pub struct OnboardingService {
    store: Arc<dyn Store>,
}

impl OnboardingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn status(&self, identity: Identity) -> Result<OnboardingStatus> {
        let user_id = identity.require()?;

        let Some(profile) = self.store.find_profile(user_id).await? else {
            return Ok(OnboardingStatus::without_profile());
        };

        let status = match profile.role {
            UserRole::Advertiser => OnboardingStatus {
                has_profile: true,
                role: Some(UserRole::Advertiser),
                advertiser_completed: Some(
                    self.store.find_advertiser_by_user(user_id).await?.is_some(),
                ),
                influencer_completed: None,
            },
            UserRole::Influencer => OnboardingStatus {
                has_profile: true,
                role: Some(UserRole::Influencer),
                advertiser_completed: None,
                influencer_completed: Some(
                    self.store.find_influencer_by_user(user_id).await?.is_some(),
                ),
            },
        };

        Ok(status)
    }

    /// Create the caller's profile. The role cannot be changed afterwards.
    pub async fn create_profile(&self, identity: Identity, request: CreateProfileRequest) -> Result<ProfileCreated> {
        let user_id = identity.require()?;
        request.validate()?;

        if self.store.find_profile(user_id).await?.is_some() {
            return Err(AppError::conflict("Profile already exists"));
        }

        self.store
            .insert_profile(NewProfile {
                user_id,
                role: request.role,
                name: request.name,
                dob: request.dob,
                phone: request.phone,
            })
            .await
            .map_err(conflict_as("Profile already exists"))?;

        metrics::record_onboarding("profile");
        info!(user_id = %user_id, role = ?request.role, "Profile created");

        Ok(ProfileCreated { ok: true })
    }

    /// The caller's profile must hold `role`
    async fn require_role(&self, user_id: Uuid, role: UserRole) -> Result<Profile> {
        match self.store.find_profile(user_id).await? {
            Some(profile) if profile.role == role => Ok(profile),
            _ => Err(AppError::DuplicateRole {
                message: format!("Profile role is not {}", role.to_value()),
            }),
        }
    }

    pub async fn create_advertiser(&self, identity: Identity, request: CreateAdvertiserRequest) -> Result<CreatedId> {
        let user_id = identity.require()?;
        self.require_role(user_id, UserRole::Advertiser).await?;
        request.validate()?;

        if self.store.find_advertiser_by_user(user_id).await?.is_some() {
            return Err(AppError::conflict("Advertiser already exists"));
        }

        let advertiser = self
            .store
            .insert_advertiser(NewAdvertiser {
                user_id,
                company_name: request.company_name,
                business_number: request.business_number,
                representative: request.representative,
                store_phone: request.store_phone,
                address: request.address,
            })
            .await
            .map_err(conflict_as("Advertiser already exists"))?;

        metrics::record_onboarding("advertiser");
        info!(user_id = %user_id, advertiser_id = %advertiser.id, "Advertiser onboarded");

        Ok(advertiser.id.into())
    }

    /// Creates the influencer together with its first channel
    pub async fn create_influencer(&self, identity: Identity, request: CreateInfluencerRequest) -> Result<CreatedId> {
        let user_id = identity.require()?;
        self.require_role(user_id, UserRole::Influencer).await?;
        request.validate()?;

        if self.store.find_influencer_by_user(user_id).await?.is_some() {
            return Err(AppError::conflict("Influencer already exists"));
        }

        let influencer = self
            .store
            .insert_influencer(
                user_id,
                NewChannel {
                    platform: request.channel_platform,
                    name: request.channel_name,
                    url: request.channel_url,
                    followers: request.followers,
                },
            )
            .await
            .map_err(conflict_as("Influencer already exists"))?;

        metrics::record_onboarding("influencer");
        info!(user_id = %user_id, influencer_id = %influencer.id, "Influencer onboarded");

        Ok(influencer.id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ChannelPlatform;
    use crate::errors::ErrorCode;
    use crate::services::testing::*;

    fn profile_request(role: UserRole) -> CreateProfileRequest {
        CreateProfileRequest {
            role,
            name: "Park".into(),
            dob: date(1992, 7, 1),
            phone: "010-9876-5432".into(),
        }
    }

    fn advertiser_request() -> CreateAdvertiserRequest {
        CreateAdvertiserRequest {
            company_name: "Busan Bakery".into(),
            business_number: "987-65-43210".into(),
            representative: "Choi".into(),
            store_phone: "051-123-4567".into(),
            address: "Busan, Haeundae-gu".into(),
        }
    }

    fn influencer_request() -> CreateInfluencerRequest {
        CreateInfluencerRequest {
            channel_platform: ChannelPlatform::Instagram,
            channel_name: "bakery_hunter".into(),
            channel_url: "https://instagram.com/bakery_hunter".into(),
            followers: 4200,
        }
    }

    #[tokio::test]
    async fn test_status_progression_for_advertiser() {
        let h = harness();
        let onboarding = &h.services.onboarding;
        let identity = Identity::user(Uuid::new_v4());

        assert_eq!(
            onboarding.status(identity).await.unwrap(),
            OnboardingStatus::without_profile()
        );

        onboarding
            .create_profile(identity, profile_request(UserRole::Advertiser))
            .await
            .unwrap();
        let status = onboarding.status(identity).await.unwrap();
        assert!(status.has_profile);
        assert_eq!(status.role, Some(UserRole::Advertiser));
        assert_eq!(status.advertiser_completed, Some(false));
        assert_eq!(status.influencer_completed, None);

        onboarding.create_advertiser(identity, advertiser_request()).await.unwrap();
        let status = onboarding.status(identity).await.unwrap();
        assert_eq!(status.advertiser_completed, Some(true));
    }

    #[tokio::test]
    async fn test_status_requires_login() {
        let h = harness();
        let err = h.services.onboarding.status(Identity::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_profile_is_created_once() {
        let h = harness();
        let onboarding = &h.services.onboarding;
        let identity = Identity::user(Uuid::new_v4());

        let created = onboarding
            .create_profile(identity, profile_request(UserRole::Influencer))
            .await
            .unwrap();
        assert!(created.ok);

        let err = onboarding
            .create_profile(identity, profile_request(UserRole::Advertiser))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let status = onboarding.status(identity).await.unwrap();
        assert_eq!(status.role, Some(UserRole::Influencer));
    }

    #[tokio::test]
    async fn test_role_mismatch_both_ways() {
        let h = harness();
        let onboarding = &h.services.onboarding;

        let influencer = Identity::user(Uuid::new_v4());
        onboarding
            .create_profile(influencer, profile_request(UserRole::Influencer))
            .await
            .unwrap();
        let err = onboarding
            .create_advertiser(influencer, advertiser_request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRole);

        let advertiser = Identity::user(Uuid::new_v4());
        onboarding
            .create_profile(advertiser, profile_request(UserRole::Advertiser))
            .await
            .unwrap();
        let err = onboarding
            .create_influencer(advertiser, influencer_request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRole);

        // No profile at all is a role mismatch too
        let err = onboarding
            .create_influencer(Identity::user(Uuid::new_v4()), influencer_request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRole);
    }

    #[tokio::test]
    async fn test_influencer_gets_channel_and_conflicts_on_repeat() {
        let h = harness();
        let onboarding = &h.services.onboarding;
        let identity = Identity::user(Uuid::new_v4());
        onboarding
            .create_profile(identity, profile_request(UserRole::Influencer))
            .await
            .unwrap();

        let created = onboarding.create_influencer(identity, influencer_request()).await.unwrap();
        let channels = h.store.list_channels(created.id).await.unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].followers, 4200);

        let err = onboarding
            .create_influencer(identity, influencer_request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_role_is_checked_before_body() {
        let h = harness();
        let identity = Identity::user(Uuid::new_v4());
        let mut request = advertiser_request();
        request.business_number = "1".into();

        let err = h
            .services
            .onboarding
            .create_advertiser(identity, request)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRole);
    }
}
