use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::mode::InterviewMode;

/// One asked question. Append-only: the engine adds exactly one per turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTurn {
    pub question: String,
    pub asked_at: DateTime<Utc>,
}

/// One recorded answer. `question_index` equals the answer's position in the
/// answers array at insertion time, pairing it with `questions[question_index]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerTurn {
    pub question_index: usize,
    pub answer: String,
    /// 0–100, clamped at evaluation time.
    pub score: u32,
    pub feedback: String,
    pub answered_at: DateTime<Utc>,
}

/// Capability flags fixed at session creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    #[serde(default)]
    pub voice_enabled: bool,
    #[serde(default)]
    pub video_enabled: bool,
}

/// A mock-interview session. One row per session; the turn arrays live in
/// JSONB columns. Once `completed_at` is set the session is terminal and
/// read-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_role: String,
    pub mode: InterviewMode,
    pub questions: Json<Vec<QuestionTurn>>,
    pub answers: Json<Vec<AnswerTurn>>,
    pub settings: Json<SessionSettings>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Rounded mean of per-answer scores; set only on completion.
    pub overall_score: Option<i32>,
}

impl InterviewSession {
    pub fn total_questions(&self) -> usize {
        self.mode.total_questions()
    }

    /// The sole completion predicate: every question slot has an answer.
    pub fn is_complete(&self) -> bool {
        self.answers.len() >= self.total_questions()
    }
}
