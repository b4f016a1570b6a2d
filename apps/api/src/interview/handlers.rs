//! Axum route handlers for the Interview API.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::interview::engine::{self, CandidateContext, StartInput, TurnOutcome};
use crate::interview::mode::InterviewMode;
use crate::interview::store;
use crate::models::session::{InterviewSession, SessionSettings};
use crate::speech::SpeechModel;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    pub target_role: String,
    pub mode: InterviewMode,
    #[serde(default)]
    pub options: Option<SessionSettings>,
    #[serde(default)]
    pub candidate_context: Option<CandidateContext>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub current_question: String,
    pub question_number: usize,
    pub total_questions: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub session_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub id: Uuid,
    pub overall_score: u32,
    pub total_questions: usize,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmitAnswerResponse {
    #[serde(rename_all = "camelCase")]
    Continue {
        complete: bool,
        current_score: u32,
        feedback: String,
        next_question: String,
        question_number: usize,
        total_questions: usize,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        complete: bool,
        session: CompletedSession,
    },
}

#[derive(Debug, Deserialize)]
pub struct VoiceQuery {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VoiceAnswerResponse {
    #[serde(rename_all = "camelCase")]
    Continue {
        complete: bool,
        transcript: String,
        current_score: u32,
        feedback: String,
        feedback_audio: String,
        next_question: String,
        next_question_audio: String,
        question_number: usize,
        total_questions: usize,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        complete: bool,
        transcript: String,
        current_score: u32,
        feedback: String,
        feedback_audio: String,
        final_feedback_audio: String,
        session: CompletedSession,
    },
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub completed: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Starts a session in ACTIVE(1): the opening question is generated (or
/// drawn from the fallback bank) before the session is persisted, so a
/// half-built session never hits the store.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let target_role = request.target_role.trim().to_string();
    if target_role.is_empty() {
        return Err(AppError::Validation(
            "targetRole cannot be empty".to_string(),
        ));
    }

    let session = engine::start_session(
        state.llm.as_ref(),
        StartInput {
            user_id,
            target_role,
            mode: request.mode,
            settings: request.options.unwrap_or_default(),
            candidate_context: request.candidate_context,
        },
    )
    .await;

    store::insert_session(&state.db, &session).await?;

    activity::record(
        state.db.clone(),
        user_id,
        "interview_started",
        json!({ "sessionId": session.id, "mode": session.mode, "targetRole": session.target_role }),
    );

    Ok(Json(StartInterviewResponse {
        session_id: session.id,
        current_question: session.questions[0].question.clone(),
        question_number: 1,
        total_questions: session.total_questions(),
    }))
}

/// POST /api/v1/interviews/answer
///
/// Records a typed answer and returns either the next question or the
/// completion summary.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let (_, outcome) =
        run_answer_turn(&state, user_id, request.session_id, &request.answer).await?;

    let response = match outcome {
        TurnOutcome::Continue {
            score,
            feedback,
            next_question,
            question_number,
            total_questions,
        } => SubmitAnswerResponse::Continue {
            complete: false,
            current_score: score,
            feedback,
            next_question,
            question_number,
            total_questions,
        },
        TurnOutcome::Complete {
            overall_score,
            total_questions,
            feedback,
        } => SubmitAnswerResponse::Complete {
            complete: true,
            session: CompletedSession {
                id: request.session_id,
                overall_score,
                total_questions,
                feedback,
            },
        },
    };

    Ok(Json(response))
}

/// POST /api/v1/interviews/answer/voice?session_id=…
///
/// Same semantics as the text route, with a transcription step in front and
/// spoken feedback behind: the raw body is audio, and the response carries
/// base64 audio for the evaluation feedback plus the next question (or the
/// closing feedback on completion). Both syntheses run concurrently and both
/// must succeed; there is no silent fallback for audio.
pub async fn handle_submit_answer_voice(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<VoiceQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VoiceAnswerResponse>, AppError> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.starts_with("audio/") {
        return Err(AppError::Validation(
            "content-type must be an audio/* type".to_string(),
        ));
    }
    if body.is_empty() {
        return Err(AppError::Validation("audio body is empty".to_string()));
    }

    let transcript = state
        .speech
        .transcribe(body, &content_type)
        .await
        .map_err(|e| AppError::Speech(e.to_string()))?;
    if transcript.trim().is_empty() {
        return Err(AppError::Validation(
            "transcription produced no text".to_string(),
        ));
    }

    let (session, outcome) = run_answer_turn(&state, user_id, query.session_id, &transcript).await?;

    // The per-answer evaluation just recorded; always spoken back.
    let eval = session
        .answers
        .last()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("turn recorded no answer")))?;
    let eval_feedback = eval.feedback.clone();
    let eval_score = eval.score;

    let response = match outcome {
        TurnOutcome::Continue {
            next_question,
            question_number,
            total_questions,
            ..
        } => {
            let (feedback_audio, question_audio) = tokio::try_join!(
                state.speech.synthesize(&eval_feedback),
                state.speech.synthesize(&next_question),
            )
            .map_err(|e| AppError::Speech(e.to_string()))?;

            VoiceAnswerResponse::Continue {
                complete: false,
                transcript,
                current_score: eval_score,
                feedback: eval_feedback,
                feedback_audio: BASE64.encode(&feedback_audio),
                next_question,
                next_question_audio: BASE64.encode(&question_audio),
                question_number,
                total_questions,
            }
        }
        TurnOutcome::Complete {
            overall_score,
            total_questions,
            feedback,
        } => {
            let (feedback_audio, final_audio) = tokio::try_join!(
                state.speech.synthesize(&eval_feedback),
                state.speech.synthesize(&feedback),
            )
            .map_err(|e| AppError::Speech(e.to_string()))?;

            VoiceAnswerResponse::Complete {
                complete: true,
                transcript,
                current_score: eval_score,
                feedback: eval_feedback,
                feedback_audio: BASE64.encode(&feedback_audio),
                final_feedback_audio: BASE64.encode(&final_audio),
                session: CompletedSession {
                    id: session.id,
                    overall_score,
                    total_questions,
                    feedback,
                },
            }
        }
    };

    Ok(Json(response))
}

/// GET /api/v1/interviews?completed=true|false
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<InterviewSession>>, AppError> {
    let sessions = store::list_sessions(&state.db, user_id, query.completed).await?;
    Ok(Json(sessions))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = store::load_session(&state.db, session_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    Ok(Json(session))
}

/// Shared load → engine → compare-and-swap persist path for both answer
/// routes. The answer count read here keys the CAS at write time.
async fn run_answer_turn(
    state: &AppState,
    user_id: Uuid,
    session_id: Uuid,
    answer: &str,
) -> Result<(InterviewSession, TurnOutcome), AppError> {
    let mut session = store::load_session(&state.db, session_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let answers_at_read = session.answers.len();

    let outcome = engine::submit_answer(state.llm.as_ref(), &mut session, user_id, answer).await?;

    store::update_session_turn(&state.db, &session, answers_at_read).await?;

    if let TurnOutcome::Complete { overall_score, .. } = &outcome {
        activity::record(
            state.db.clone(),
            user_id,
            "interview_completed",
            json!({ "sessionId": session.id, "overallScore": overall_score }),
        );
    }

    Ok((session, outcome))
}
