//! Submission guard: one live submission per identity.

use std::sync::Arc;

use chrono::Duration;

use crate::{
    error::SubmitError,
    models::submission::{AnswerMap, SubmissionDraft, SubmissionRecord, answers_in_order},
    quiz::{expiry::ExpiryScheduler, identity::Identity},
    storage::{CreateOutcome, Store},
};

pub struct SubmissionGuard {
    store: Arc<dyn Store>,
    lock_window: Duration,
    expiry: ExpiryScheduler,
}

impl SubmissionGuard {
    pub fn new(store: Arc<dyn Store>, lock_window: Duration, expiry: ExpiryScheduler) -> Self {
        Self {
            store,
            lock_window,
            expiry,
        }
    }

    /// Persists `answers` for `identity` unless a live submission exists.
    ///
    /// * No identity → `Unauthenticated`, and the store is never touched.
    /// * A record whose `expires_at` is still ahead → `AlreadySubmitted`.
    /// * Otherwise the record is written (replacing an expired one) and its
    ///   deletion is scheduled for `expires_at`.
    pub async fn submit(
        &self,
        identity: Option<Identity>,
        quiz_id: &str,
        answers: &AnswerMap,
    ) -> Result<SubmissionRecord, SubmitError> {
        let identity = identity.ok_or(SubmitError::Unauthenticated)?;

        let draft = SubmissionDraft {
            identity: identity.clone(),
            quiz_id: quiz_id.to_string(),
            answers: answers_in_order(answers),
        };

        match self.store.create_unless_locked(draft, self.lock_window).await {
            Ok(CreateOutcome::Created(record)) => {
                tracing::info!(
                    %identity,
                    answers = record.answers.len(),
                    expires_at = %record.expires_at,
                    "quiz submitted"
                );
                self.expiry.schedule(identity, record.expires_at);
                Ok(record)
            }
            Ok(CreateOutcome::Locked { expires_at }) => {
                tracing::info!(%identity, %expires_at, "resubmission refused");
                Err(SubmitError::AlreadySubmitted { expires_at })
            }
            Err(e) => {
                tracing::error!(%identity, "Failed to persist submission: {}", e);
                Err(e.into())
            }
        }
    }
}
