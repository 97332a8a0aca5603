//! Persistence seam.
//!
//! The quiz core only needs keyed get/set/delete over three collections
//! (submissions, students, accounts) plus one conditional write that makes
//! the submission lock atomic.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    error::StoreError,
    models::{
        student::{Account, StudentProfile},
        submission::{SubmissionDraft, SubmissionRecord},
    },
    quiz::identity::Identity,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of `Store::create_unless_locked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The draft was written, replacing any expired record.
    Created(SubmissionRecord),
    /// A live record exists; nothing was written.
    Locked { expires_at: DateTime<Utc> },
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_submission(
        &self,
        identity: &Identity,
    ) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Writes `draft` unless a record for the same identity is still live.
    ///
    /// The existence check and the write happen as one atomic step.
    /// `created_at` comes from the store's clock and
    /// `expires_at = created_at + lock_window`.
    async fn create_unless_locked(
        &self,
        draft: SubmissionDraft,
        lock_window: Duration,
    ) -> Result<CreateOutcome, StoreError>;

    /// Deletes the record for `identity` if it has expired. Idempotent.
    async fn delete_if_expired(&self, identity: &Identity) -> Result<bool, StoreError>;

    /// Deletes every expired submission, returning how many went.
    async fn purge_expired(&self) -> Result<u64, StoreError>;

    async fn get_student(&self, identity: &Identity) -> Result<Option<StudentProfile>, StoreError>;

    /// Full overwrite of the profile document.
    async fn put_student(
        &self,
        identity: &Identity,
        profile: &StudentProfile,
    ) -> Result<(), StoreError>;

    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    async fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError>;
}
