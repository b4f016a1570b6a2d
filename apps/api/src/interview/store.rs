//! Session persistence. All reads are scoped by `(id, user_id)` so a
//! foreign session is indistinguishable from a missing one, and the turn
//! update is a compare-and-swap keyed on the answer count read at the start
//! of the operation.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::InterviewSession;

/// Inserts a freshly started session. Single statement, so the session is
/// either fully persisted with its opening question or not at all.
pub async fn insert_session(pool: &PgPool, session: &InterviewSession) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO interview_sessions
            (id, user_id, target_role, mode, questions, answers, settings,
             started_at, completed_at, overall_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.target_role)
    .bind(session.mode)
    .bind(&session.questions)
    .bind(&session.answers)
    .bind(&session.settings)
    .bind(session.started_at)
    .bind(session.completed_at)
    .bind(session.overall_score)
    .execute(pool)
    .await?;

    Ok(())
}

/// Loads a session owned by `user_id`, or `None`.
pub async fn load_session(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
) -> Result<Option<InterviewSession>, AppError> {
    let session = sqlx::query_as::<_, InterviewSession>(
        "SELECT * FROM interview_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Persists the turn just applied to `session`. `answers_at_read` is the
/// answer count observed when the session was loaded; if another submission
/// advanced the session in the meantime the row no longer matches and the
/// write is rejected with `InvalidState`.
pub async fn update_session_turn(
    pool: &PgPool,
    session: &InterviewSession,
    answers_at_read: usize,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE interview_sessions
        SET questions = $1, answers = $2, completed_at = $3, overall_score = $4
        WHERE id = $5 AND user_id = $6
          AND completed_at IS NULL
          AND jsonb_array_length(answers) = $7
        "#,
    )
    .bind(&session.questions)
    .bind(&session.answers)
    .bind(session.completed_at)
    .bind(session.overall_score)
    .bind(session.id)
    .bind(session.user_id)
    .bind(answers_at_read as i32)
    .execute(pool)
    .await?;

    if result.rows_affected() != 1 {
        return Err(AppError::InvalidState(
            "Session was modified concurrently".to_string(),
        ));
    }

    Ok(())
}

/// Lists the caller's sessions, newest first, optionally filtered by
/// completion (presence of `completed_at`).
pub async fn list_sessions(
    pool: &PgPool,
    user_id: Uuid,
    completed: Option<bool>,
) -> Result<Vec<InterviewSession>, AppError> {
    let sessions = match completed {
        Some(true) => {
            sqlx::query_as::<_, InterviewSession>(
                "SELECT * FROM interview_sessions
                 WHERE user_id = $1 AND completed_at IS NOT NULL
                 ORDER BY started_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        Some(false) => {
            sqlx::query_as::<_, InterviewSession>(
                "SELECT * FROM interview_sessions
                 WHERE user_id = $1 AND completed_at IS NULL
                 ORDER BY started_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, InterviewSession>(
                "SELECT * FROM interview_sessions
                 WHERE user_id = $1
                 ORDER BY started_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(sessions)
}
