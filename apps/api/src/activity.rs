//! Best-effort activity logging.
//!
//! Log writes run in a detached task: a failure is recorded at `warn` and
//! never affects the primary response.

use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Records an activity event without blocking or failing the caller.
pub fn record(pool: PgPool, user_id: Uuid, action: &'static str, detail: Value) {
    tokio::spawn(async move {
        let result = sqlx::query(
            "INSERT INTO activity_logs (id, user_id, action, detail, created_at)
             VALUES ($1, $2, $3, $4, now())",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action)
        .bind(&detail)
        .execute(&pool)
        .await;

        if let Err(e) = result {
            warn!("Activity log write failed for action '{action}': {e}");
        }
    });
}
