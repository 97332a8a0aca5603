use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use super::{CreateOutcome, Store};
use crate::{
    error::StoreError,
    models::{
        student::{Account, StudentProfile},
        submission::{SubmissionDraft, SubmissionRecord},
    },
    quiz::identity::Identity,
    utils::clock::{Clock, SystemClock},
};

#[derive(Default)]
struct Collections {
    submissions: HashMap<Identity, SubmissionRecord>,
    students: HashMap<Identity, StudentProfile>,
    /// Keyed by email.
    accounts: HashMap<String, Account>,
}

/// Process-local store. Used by tests and when no database is configured.
pub struct MemoryStore {
    inner: Mutex<Collections>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Collections::default()),
            clock,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_submission(
        &self,
        identity: &Identity,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(self.inner.lock().await.submissions.get(identity).cloned())
    }

    async fn create_unless_locked(
        &self,
        draft: SubmissionDraft,
        lock_window: Duration,
    ) -> Result<CreateOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = self.clock.now();

        if let Some(existing) = inner.submissions.get(&draft.identity) {
            if existing.is_live(now) {
                return Ok(CreateOutcome::Locked {
                    expires_at: existing.expires_at,
                });
            }
        }

        let record = SubmissionRecord {
            identity: draft.identity,
            quiz_id: draft.quiz_id,
            answers: draft.answers,
            created_at: now,
            expires_at: now + lock_window,
        };
        inner
            .submissions
            .insert(record.identity.clone(), record.clone());

        Ok(CreateOutcome::Created(record))
    }

    async fn delete_if_expired(&self, identity: &Identity) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = self.clock.now();

        let expired = inner
            .submissions
            .get(identity)
            .is_some_and(|record| !record.is_live(now));
        if expired {
            inner.submissions.remove(identity);
        }
        Ok(expired)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = self.clock.now();

        let before = inner.submissions.len();
        inner.submissions.retain(|_, record| record.is_live(now));
        Ok((before - inner.submissions.len()) as u64)
    }

    async fn get_student(&self, identity: &Identity) -> Result<Option<StudentProfile>, StoreError> {
        Ok(self.inner.lock().await.students.get(identity).cloned())
    }

    async fn put_student(
        &self,
        identity: &Identity,
        profile: &StudentProfile,
    ) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .students
            .insert(identity.clone(), profile.clone());
        Ok(())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.accounts.contains_key(&account.email) {
            return Err(StoreError::Conflict(format!(
                "account '{}' already exists",
                account.email
            )));
        }
        inner.accounts.insert(account.email.clone(), account.clone());
        Ok(())
    }

    async fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.lock().await.accounts.get(email).cloned())
    }
}
