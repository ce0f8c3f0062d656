//! Business rules of the campaign workflow
//!
//! Each service validates its input, enforces role, ownership and state
//! invariants against the `Store`, then performs the mutation or query.
//! Failures are returned as `AppError` and rendered by the HTTP layer.

pub mod applications;
pub mod campaigns;
pub mod onboarding;
pub mod submissions;

pub use applications::ApplicationService;
pub use campaigns::CampaignService;
pub use onboarding::OnboardingService;
pub use submissions::SubmissionService;

use crate::db::Store;
use crate::errors::AppError;
use std::sync::Arc;

/// All services over one shared store
#[derive(Clone)]
pub struct Services {
    pub campaigns: CampaignService,
    pub applications: ApplicationService,
    pub submissions: SubmissionService,
    pub onboarding: OnboardingService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            campaigns: CampaignService::new(store.clone()),
            applications: ApplicationService::new(store.clone()),
            submissions: SubmissionService::new(store.clone()),
            onboarding: OnboardingService::new(store),
        }
    }
}

/// Report backend failures as `FETCH_FAILED` with a fixed message.
/// Client errors pass through unchanged.
pub(crate) fn fetch_failed(message: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |err| {
        if err.is_server_error() {
            tracing::error!(error = %err, "{}", message);
            AppError::Fetch {
                message: message.to_string(),
            }
        } else {
            err
        }
    }
}
