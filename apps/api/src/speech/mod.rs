//! Speech backend — transcription (speech-to-text) and synthesis
//! (text-to-speech) for the voice interview path.
//!
//! Unlike text generation there is no fallback content for audio, so every
//! failure here propagates to the caller as a request failure.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const SYNTHESIS_URL: &str = "https://api.openai.com/v1/audio/speech";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const SYNTHESIS_MODEL: &str = "tts-1";
const SYNTHESIS_VOICE: &str = "alloy";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The speech seam used by the voice interview handlers.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Transcribes spoken audio to text. The content type is the
    /// client-supplied audio MIME type (e.g. `audio/webm`).
    async fn transcribe(&self, audio: Bytes, content_type: &str) -> Result<String, SpeechError>;

    /// Synthesizes speech for the given text, returning encoded audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Production `SpeechModel` backed by the OpenAI audio endpoints.
#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    api_key: String,
}

impl SpeechClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeechModel for SpeechClient {
    async fn transcribe(&self, audio: Bytes, content_type: &str) -> Result<String, SpeechError> {
        // Filename extension is advisory only; the upstream sniffs the container.
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("answer.webm")
            .mime_str(content_type)
            .map_err(SpeechError::Http)?;

        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part("file", part);

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body: TranscriptionResponse = response.json().await?;
        Ok(body.text)
    }

    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError> {
        let response = self
            .client
            .post(SYNTHESIS_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": SYNTHESIS_MODEL,
                "voice": SYNTHESIS_VOICE,
                "input": text,
            }))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?)
    }
}
