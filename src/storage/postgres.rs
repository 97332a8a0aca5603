use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, types::Json};

use super::{CreateOutcome, Store};
use crate::{
    error::StoreError,
    models::{
        student::{Account, StudentProfile},
        submission::{AnswerEntry, SubmissionDraft, SubmissionRecord},
    },
    quiz::identity::Identity,
};

/// Row shape of the 'submissions' table.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    identity: String,
    quiz_id: String,
    answers: Json<Vec<AnswerEntry>>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SubmissionRow> for SubmissionRecord {
    fn from(row: SubmissionRow) -> Self {
        SubmissionRecord {
            identity: Identity::new(row.identity),
            quiz_id: row.quiz_id,
            answers: row.answers.0,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Postgres-backed store. Timestamps come from the database clock (`NOW()`).
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_submission(
        &self,
        identity: &Identity,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT identity, quiz_id, answers, created_at, expires_at
            FROM submissions
            WHERE identity = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SubmissionRecord::from))
    }

    async fn create_unless_locked(
        &self,
        draft: SubmissionDraft,
        lock_window: Duration,
    ) -> Result<CreateOutcome, StoreError> {
        // The WHERE on the conflict branch makes check-and-write one statement:
        // a live row suppresses the update and RETURNING yields nothing.
        let written = sqlx::query_as::<_, SubmissionRow>(
            r#"
            INSERT INTO submissions (identity, quiz_id, answers, created_at, expires_at)
            VALUES ($1, $2, $3, NOW(), NOW() + make_interval(secs => $4))
            ON CONFLICT (identity) DO UPDATE SET
                quiz_id = EXCLUDED.quiz_id,
                answers = EXCLUDED.answers,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            WHERE submissions.expires_at <= NOW()
            RETURNING identity, quiz_id, answers, created_at, expires_at
            "#,
        )
        .bind(draft.identity.as_str())
        .bind(&draft.quiz_id)
        .bind(Json(&draft.answers))
        .bind(lock_window.num_seconds() as f64)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = written {
            return Ok(CreateOutcome::Created(row.into()));
        }

        let expires_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT expires_at FROM submissions WHERE identity = $1",
        )
        .bind(draft.identity.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StoreError::Conflict(format!(
                "submission for {} was removed during the write",
                draft.identity
            ))
        })?;

        Ok(CreateOutcome::Locked { expires_at })
    }

    async fn delete_if_expired(&self, identity: &Identity) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM submissions WHERE identity = $1 AND expires_at <= NOW()")
                .bind(identity.as_str())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM submissions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn get_student(&self, identity: &Identity) -> Result<Option<StudentProfile>, StoreError> {
        let profile = sqlx::query_as::<_, StudentProfile>(
            "SELECT username, roll_no, email FROM students WHERE identity = $1",
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn put_student(
        &self,
        identity: &Identity,
        profile: &StudentProfile,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO students (identity, username, roll_no, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (identity) DO UPDATE SET
                username = EXCLUDED.username,
                roll_no = EXCLUDED.roll_no,
                email = EXCLUDED.email
            "#,
        )
        .bind(identity.as_str())
        .bind(&profile.username)
        .bind(&profile.roll_no)
        .bind(&profile.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO accounts (identity, email, password_hash) VALUES ($1, $2, $3)")
            .bind(&account.identity)
            .bind(&account.email)
            .bind(&account.password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT identity, email, password_hash FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
