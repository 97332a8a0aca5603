use std::sync::Arc;

use crate::{
    error::SubmitError,
    models::submission::{AnswerMap, SubmissionReceipt},
    quiz::{
        guard::SubmissionGuard,
        identity::{Identity, IdentityProvider},
    },
};

/// Everything a mounted quiz needs to know about its surroundings.
///
/// Passed in explicitly; nothing about the signed-in user lives in globals.
#[derive(Clone)]
pub struct SessionContext {
    identity: Arc<dyn IdentityProvider>,
    quiz_id: String,
}

impl SessionContext {
    pub fn new(identity: Arc<dyn IdentityProvider>, quiz_id: impl Into<String>) -> Self {
        Self {
            identity,
            quiz_id: quiz_id.into(),
        }
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.current_identity()
    }

    /// Submits `answers` as whoever is signed in right now.
    pub async fn submit(
        &self,
        guard: &SubmissionGuard,
        answers: &AnswerMap,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let record = guard
            .submit(self.current_identity(), &self.quiz_id, answers)
            .await?;
        Ok(SubmissionReceipt::for_record(&record))
    }
}
