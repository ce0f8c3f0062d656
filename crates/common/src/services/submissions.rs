//! Review submissions by selected influencers

use crate::auth::Identity;
use crate::db::{NewSubmission, Store};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::schema::{CreatedId, SubmitReviewRequest};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

const ALREADY_SUBMITTED: &str = "A review was already submitted";

#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Submit the review URL for the caller's own `SELECTED` application
    pub async fn submit(&self, identity: Identity, request: SubmitReviewRequest) -> Result<CreatedId> {
        let user_id = identity.require()?;
        request.validate()?;

        let application = self
            .store
            .find_application(request.application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application", request.application_id))?;

        if !application.status.can_submit_review() {
            return Err(AppError::forbidden("Only selected applications can submit a review"));
        }

        let influencer = self.store.find_influencer(application.influencer_id).await?;
        if influencer.map(|i| i.user_id) != Some(user_id) {
            return Err(AppError::forbidden("Not allowed to submit for this application"));
        }

        if self
            .store
            .find_submission_by_application(application.id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(ALREADY_SUBMITTED));
        }

        let submission = self
            .store
            .insert_submission(NewSubmission {
                application_id: application.id,
                review_url: request.review_url,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => AppError::conflict(ALREADY_SUBMITTED),
                other => other,
            })?;

        metrics::record_submission_created();
        info!(
            submission_id = %submission.id,
            application_id = %application.id,
            user_id = %user_id,
            "Review submitted"
        );

        Ok(submission.id.into())
    }
}
