//! Interview Session Engine — the question/answer/scoring state machine.
//!
//! A session moves `ACTIVE(1) → ACTIVE(2) → … → COMPLETE`, where the count
//! is the number of questions asked. It completes exactly when the recorded
//! answer count reaches the mode's question total, and a completed session
//! is terminal: further submissions are rejected, nothing is appended.
//!
//! Every AI call is a single attempt. Question generation, answer
//! evaluation, and closing feedback all degrade to deterministic fallback
//! content on failure, so the caller never sees an upstream error on these
//! paths. Persistence is the caller's concern (see `store`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{complete_json, TextModel};
use crate::models::session::{AnswerTurn, InterviewSession, QuestionTurn, SessionSettings};

use super::fallback;
use super::mode::InterviewMode;
use super::prompts;

/// Optional candidate background folded into the first-question prompt.
/// Opaque text inputs; the engine never interprets them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateContext {
    pub headline: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub years_experience: Option<u32>,
    pub resume_excerpt: Option<String>,
}

/// Inputs to `start_session`, validated by the handler layer.
#[derive(Debug)]
pub struct StartInput {
    pub user_id: Uuid,
    pub target_role: String,
    pub mode: InterviewMode,
    pub settings: SessionSettings,
    pub candidate_context: Option<CandidateContext>,
}

/// Structured evaluation of one answer, as requested from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub score: u32,
    pub feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// Outcome of one answer submission.
#[derive(Debug)]
pub enum TurnOutcome {
    Continue {
        score: u32,
        feedback: String,
        next_question: String,
        question_number: usize,
        total_questions: usize,
    },
    Complete {
        overall_score: u32,
        total_questions: usize,
        feedback: String,
    },
}

/// Creates a new session in `ACTIVE(1)`: exactly one question, no answers.
///
/// One generation attempt; on any failure the per-mode canned first question
/// is used instead, so this never fails on the AI path.
pub async fn start_session(llm: &dyn TextModel, input: StartInput) -> InterviewSession {
    let prompt = prompts::FIRST_QUESTION_TEMPLATE
        .replace("{mode_description}", input.mode.description())
        .replace("{target_role}", &input.target_role)
        .replace(
            "{candidate_context}",
            &prompts::format_candidate_context(input.candidate_context.as_ref()),
        );

    let question = match llm.complete(&prompt, prompts::QUESTION_SYSTEM).await {
        Ok(text) => text,
        Err(e) => {
            warn!("First-question generation failed, using fallback: {e}");
            fallback::first_question(input.mode, &input.target_role)
        }
    };

    let now = Utc::now();
    InterviewSession {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        target_role: input.target_role,
        mode: input.mode,
        questions: Json(vec![QuestionTurn {
            question: clean_question_text(&question),
            asked_at: now,
        }]),
        answers: Json(Vec::new()),
        settings: Json(input.settings),
        started_at: now,
        completed_at: None,
        overall_score: None,
    }
}

/// Records one answer: evaluates it, appends it, and either asks the next
/// question or completes the session.
///
/// Guards, in order: ownership (mismatch reads as `NotFound`, so foreign and
/// missing sessions are indistinguishable), terminal state (`InvalidState`,
/// nothing appended), empty answer (`Validation`).
pub async fn submit_answer(
    llm: &dyn TextModel,
    session: &mut InterviewSession,
    user_id: Uuid,
    answer: &str,
) -> Result<TurnOutcome, AppError> {
    if session.user_id != user_id {
        return Err(AppError::NotFound(format!(
            "Session {} not found",
            session.id
        )));
    }

    if session.completed_at.is_some() || session.is_complete() {
        return Err(AppError::InvalidState(
            "Session is already complete".to_string(),
        ));
    }

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let total = session.total_questions();
    let current_index = session.answers.len();

    let question = session
        .questions
        .get(current_index)
        .ok_or_else(|| AppError::InvalidState("Session has no pending question".to_string()))?
        .question
        .clone();

    let evaluation = evaluate_answer(llm, session.mode, &session.target_role, &question, answer)
        .await;

    let now = Utc::now();
    session.answers.push(AnswerTurn {
        question_index: current_index,
        answer: answer.to_string(),
        score: evaluation.score,
        feedback: evaluation.feedback.clone(),
        answered_at: now,
    });

    // This was the last slot: the session is complete.
    if current_index >= total - 1 {
        let overall_score = round_mean(session.answers.iter().map(|a| a.score));
        session.completed_at = Some(now);
        session.overall_score = Some(overall_score as i32);

        let feedback = closing_feedback(llm, session, overall_score).await;
        return Ok(TurnOutcome::Complete {
            overall_score,
            total_questions: total,
            feedback,
        });
    }

    let next_index = current_index + 1;
    let next_question = generate_next_question(llm, session, next_index).await;
    session.questions.push(QuestionTurn {
        question: next_question.clone(),
        asked_at: Utc::now(),
    });

    Ok(TurnOutcome::Continue {
        score: evaluation.score,
        feedback: evaluation.feedback,
        next_question,
        question_number: next_index + 1,
        total_questions: total,
    })
}

/// One evaluation attempt, then the neutral fallback. Scores are clamped to
/// the 0–100 contract regardless of what the model returns.
async fn evaluate_answer(
    llm: &dyn TextModel,
    mode: InterviewMode,
    target_role: &str,
    question: &str,
    answer: &str,
) -> AnswerEvaluation {
    let prompt = prompts::EVALUATION_TEMPLATE
        .replace("{mode}", mode.as_str())
        .replace("{target_role}", target_role)
        .replace("{question}", question)
        .replace("{answer}", answer);

    match complete_json::<AnswerEvaluation>(llm, &prompt, prompts::EVALUATION_SYSTEM).await {
        Ok(mut eval) => {
            eval.score = eval.score.min(100);
            eval
        }
        Err(e) => {
            warn!("Answer evaluation failed, using neutral fallback: {e}");
            fallback::neutral_evaluation()
        }
    }
}

/// One generation attempt for the question at `next_index` (0-based), then
/// the per-mode bank indexed `next_index mod len` so repeated fallbacks
/// cycle instead of running past the end.
async fn generate_next_question(
    llm: &dyn TextModel,
    session: &InterviewSession,
    next_index: usize,
) -> String {
    let prompt = prompts::NEXT_QUESTION_TEMPLATE
        .replace("{mode_description}", session.mode.description())
        .replace("{target_role}", &session.target_role)
        .replace(
            "{history}",
            &prompts::format_history(&session.questions, &session.answers),
        );

    let question = match llm.complete(&prompt, prompts::QUESTION_SYSTEM).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Next-question generation failed, using fallback: {e}");
            fallback::next_question(session.mode, next_index)
        }
    };

    clean_question_text(&question)
}

/// One attempt at a holistic closing assessment over the full transcript,
/// then the templated summary embedding the overall score and mode.
async fn closing_feedback(
    llm: &dyn TextModel,
    session: &InterviewSession,
    overall_score: u32,
) -> String {
    let prompt = prompts::FINAL_FEEDBACK_TEMPLATE
        .replace("{mode_description}", session.mode.description())
        .replace("{target_role}", &session.target_role)
        .replace(
            "{history}",
            &prompts::format_history(&session.questions, &session.answers),
        )
        .replace("{overall_score}", &overall_score.to_string());

    match llm.complete(&prompt, prompts::QUESTION_SYSTEM).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Closing-feedback generation failed, using fallback: {e}");
            fallback::final_summary(session.mode, overall_score)
        }
    }
}

/// Trims generated question text and strips a single stray leading/trailing
/// quote character left over from model output.
fn clean_question_text(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix(&['"', '\''][..]).unwrap_or(text);
    let text = text.strip_suffix(&['"', '\''][..]).unwrap_or(text);
    text.trim().to_string()
}

/// Arithmetic mean rounded half-up. Callers guarantee at least one score.
fn round_mean(scores: impl Iterator<Item = u32>) -> u32 {
    let (sum, count) = scores.fold((0u64, 0u64), |(s, c), v| (s + v as u64, c + 1));
    debug_assert!(count > 0);
    (sum as f64 / count as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Always fails — forces every fallback path.
    struct FailingModel;

    #[async_trait]
    impl TextModel for FailingModel {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    /// Pops a queued reply per call; fails once the script runs out.
    struct ScriptedModel {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyContent)
        }
    }

    fn eval_json(score: u32) -> String {
        format!(
            r#"{{"score": {score}, "feedback": "Good depth.", "strengths": ["specific"], "improvements": ["pacing"]}}"#
        )
    }

    async fn started(mode: InterviewMode) -> InterviewSession {
        start_session(
            &FailingModel,
            StartInput {
                user_id: Uuid::new_v4(),
                target_role: "Engineer".to_string(),
                mode,
                settings: SessionSettings::default(),
                candidate_context: None,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_start_session_fallback_is_deterministic() {
        let a = started(InterviewMode::Hr).await;
        let b = started(InterviewMode::Hr).await;
        assert_eq!(a.questions.len(), 1);
        assert_eq!(a.questions[0].question, b.questions[0].question);
        assert_eq!(
            a.questions[0].question,
            fallback::first_question(InterviewMode::Hr, "Engineer")
        );
        assert!(a.answers.is_empty());
        assert!(a.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_start_session_cleans_quoted_model_output() {
        let model = ScriptedModel::new(vec!["\"What excites you about backend work?\"  "]);
        let session = start_session(
            &model,
            StartInput {
                user_id: Uuid::new_v4(),
                target_role: "Backend Engineer".to_string(),
                mode: InterviewMode::Technical,
                settings: SessionSettings::default(),
                candidate_context: None,
            },
        )
        .await;
        assert_eq!(
            session.questions[0].question,
            "What excites you about backend work?"
        );
    }

    #[tokio::test]
    async fn test_monotonic_growth_per_turn() {
        let mut session = started(InterviewMode::Technical).await;
        let user_id = session.user_id;

        for turn in 0..7 {
            let q_before = session.questions.len();
            let a_before = session.answers.len();
            assert_eq!(a_before, turn);

            let outcome = submit_answer(&FailingModel, &mut session, user_id, "An answer.")
                .await
                .unwrap();

            assert!(matches!(outcome, TurnOutcome::Continue { .. }));
            assert_eq!(session.answers.len(), a_before + 1);
            assert_eq!(session.questions.len(), q_before + 1);
            assert_eq!(session.answers[turn].question_index, turn);
        }
    }

    #[tokio::test]
    async fn test_completion_predicate_per_mode() {
        for (mode, total) in [
            (InterviewMode::Hr, 6),
            (InterviewMode::Technical, 8),
            (InterviewMode::Behavioral, 5),
        ] {
            let mut session = started(mode).await;
            let user_id = session.user_id;

            for turn in 0..total {
                let outcome = submit_answer(&FailingModel, &mut session, user_id, "Answer.")
                    .await
                    .unwrap();
                if turn < total - 1 {
                    assert!(matches!(outcome, TurnOutcome::Continue { .. }));
                    assert!(session.completed_at.is_none());
                } else {
                    assert!(matches!(outcome, TurnOutcome::Complete { .. }));
                    assert!(session.completed_at.is_some());
                }
            }
            assert_eq!(session.answers.len(), total);
            assert_eq!(session.questions.len(), total);
        }
    }

    #[tokio::test]
    async fn test_fallback_scores_are_neutral_75() {
        let mut session = started(InterviewMode::Behavioral).await;
        let user_id = session.user_id;
        submit_answer(&FailingModel, &mut session, user_id, "Answer.")
            .await
            .unwrap();
        assert_eq!(session.answers[0].score, 75);
    }

    #[tokio::test]
    async fn test_fallback_next_questions_cycle_for_behavioral() {
        // Bank length is 4, totals 5: the 5th question wraps to the bank's
        // first entry instead of erroring.
        let mut session = started(InterviewMode::Behavioral).await;
        let user_id = session.user_id;
        for _ in 0..4 {
            submit_answer(&FailingModel, &mut session, user_id, "Answer.")
                .await
                .unwrap();
        }
        assert_eq!(session.questions.len(), 5);
        assert_eq!(
            session.questions[4].question,
            fallback::next_question(InterviewMode::Behavioral, 0)
        );
    }

    #[tokio::test]
    async fn test_score_clamped_to_100() {
        let model = ScriptedModel::new(vec![
            "Opening question?",
            &eval_json(150),
            "Next question?",
        ]);
        let mut session = start_session(
            &model,
            StartInput {
                user_id: Uuid::new_v4(),
                target_role: "Engineer".to_string(),
                mode: InterviewMode::Hr,
                settings: SessionSettings::default(),
                candidate_context: None,
            },
        )
        .await;
        let user_id = session.user_id;
        submit_answer(&model, &mut session, user_id, "Answer.")
            .await
            .unwrap();
        assert_eq!(session.answers[0].score, 100);
    }

    #[tokio::test]
    async fn test_overall_score_is_rounded_mean() {
        // Scores [70, 80, 90] on the first three turns, then two more 75s
        // would shift the mean, so script all five: behavioral has 5 slots.
        let mut replies = vec!["Q1?".to_string()];
        for score in [70u32, 80, 90, 80, 80] {
            replies.push(eval_json(score));
            replies.push("Next?".to_string());
        }
        let model = ScriptedModel::new(replies.iter().map(String::as_str).collect());
        let mut session = start_session(
            &model,
            StartInput {
                user_id: Uuid::new_v4(),
                target_role: "Engineer".to_string(),
                mode: InterviewMode::Behavioral,
                settings: SessionSettings::default(),
                candidate_context: None,
            },
        )
        .await;
        let user_id = session.user_id;

        let mut last = None;
        for _ in 0..5 {
            last = Some(
                submit_answer(&model, &mut session, user_id, "Answer.")
                    .await
                    .unwrap(),
            );
        }

        // mean([70,80,90,80,80]) = 80
        match last.unwrap() {
            TurnOutcome::Complete { overall_score, .. } => assert_eq!(overall_score, 80),
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(session.overall_score, Some(80));
    }

    #[tokio::test]
    async fn test_end_to_end_technical_session() {
        // 8 answers scoring [60,65,70,75,80,85,90,95] → overall round(77.5) = 78.
        let scores = [60u32, 65, 70, 75, 80, 85, 90, 95];
        let mut replies = vec!["Q1?".to_string()];
        for score in scores {
            replies.push(eval_json(score));
            replies.push("Next?".to_string());
        }
        let model = ScriptedModel::new(replies.iter().map(String::as_str).collect());
        let mut session = start_session(
            &model,
            StartInput {
                user_id: Uuid::new_v4(),
                target_role: "Engineer".to_string(),
                mode: InterviewMode::Technical,
                settings: SessionSettings::default(),
                candidate_context: None,
            },
        )
        .await;
        let user_id = session.user_id;

        for turn in 0..8 {
            let outcome = submit_answer(&model, &mut session, user_id, "Answer.")
                .await
                .unwrap();
            match outcome {
                TurnOutcome::Continue {
                    score,
                    question_number,
                    total_questions,
                    ..
                } => {
                    assert!(turn < 7, "completed early at turn {turn}");
                    assert_eq!(score, scores[turn]);
                    assert_eq!(question_number, turn + 2);
                    assert_eq!(total_questions, 8);
                }
                TurnOutcome::Complete {
                    overall_score,
                    total_questions,
                    ..
                } => {
                    assert_eq!(turn, 7);
                    assert_eq!(total_questions, 8);
                    assert_eq!(overall_score, 78);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_terminal_session_rejects_submission_without_append() {
        let mut session = started(InterviewMode::Behavioral).await;
        let user_id = session.user_id;
        for _ in 0..5 {
            submit_answer(&FailingModel, &mut session, user_id, "Answer.")
                .await
                .unwrap();
        }
        assert!(session.completed_at.is_some());

        let q_len = session.questions.len();
        let a_len = session.answers.len();
        let err = submit_answer(&FailingModel, &mut session, user_id, "One more.")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(session.questions.len(), q_len);
        assert_eq!(session.answers.len(), a_len);
    }

    #[tokio::test]
    async fn test_foreign_user_reads_as_not_found() {
        let mut session = started(InterviewMode::Hr).await;
        let stranger = Uuid::new_v4();
        let err = submit_answer(&FailingModel, &mut session, stranger, "Answer.")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(session.answers.is_empty());
    }

    #[tokio::test]
    async fn test_empty_answer_is_rejected() {
        let mut session = started(InterviewMode::Hr).await;
        let user_id = session.user_id;
        let err = submit_answer(&FailingModel, &mut session, user_id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(session.answers.is_empty());
    }

    #[test]
    fn test_clean_question_text_strips_single_quotes_and_whitespace() {
        assert_eq!(clean_question_text("  \"Why us?\"  "), "Why us?");
        assert_eq!(clean_question_text("'Why us?'"), "Why us?");
        assert_eq!(clean_question_text("Why us?"), "Why us?");
        // Only one quote character is stripped per side.
        assert_eq!(clean_question_text("\"\"Why us?\"\""), "\"Why us?\"");
    }

    #[test]
    fn test_round_mean_rounds_half_up() {
        assert_eq!(round_mean([70u32, 80, 90].into_iter()), 80);
        assert_eq!(round_mean([60u32, 65, 70, 75, 80, 85, 90, 95].into_iter()), 78);
        assert_eq!(round_mean([75u32].into_iter()), 75);
    }
}
