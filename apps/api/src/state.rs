use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::TextModel;
use crate::speech::SpeechModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Text generation backend. Trait object so tests can substitute a
    /// scripted or failing model without an HTTP server.
    pub llm: Arc<dyn TextModel>,
    /// Speech backend (transcription + synthesis) for the voice interview path.
    pub speech: Arc<dyn SpeechModel>,
    pub config: Config,
}
