// src/models/submission.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::question::OptionSlot, quiz::identity::Identity};

/// Selected slot per question index. Ordered so that persisting it yields
/// ascending question indices.
pub type AnswerMap = BTreeMap<usize, OptionSlot>;

/// One persisted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_index: usize,
    pub selected_option: OptionSlot,
}

/// Flattens an answer map into entries in ascending question order.
pub fn answers_in_order(answers: &AnswerMap) -> Vec<AnswerEntry> {
    answers
        .iter()
        .map(|(&question_index, &selected_option)| AnswerEntry {
            question_index,
            selected_option,
        })
        .collect()
}

/// A submission before the store stamps its timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub identity: Identity,
    pub quiz_id: String,
    pub answers: Vec<AnswerEntry>,
}

/// Represents the 'submissions' collection, keyed by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub identity: Identity,
    pub quiz_id: String,
    pub answers: Vec<AnswerEntry>,

    /// Assigned by the store's clock.
    pub created_at: DateTime<Utc>,

    /// `created_at` plus the lock window. The record is dead from this instant on.
    pub expires_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Whether the record still blocks a retake at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Response DTO for a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub message: String,
    /// Where the client navigates next (the confirmation view).
    pub redirect: String,
    pub expires_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn for_record(record: &SubmissionRecord) -> Self {
        Self {
            message: "Your answers have been submitted successfully!".to_string(),
            redirect: format!("/student/{}/final", record.identity),
            expires_at: record.expires_at,
        }
    }
}
