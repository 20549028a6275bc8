//! OpenAI-compatible API client: transcription, embeddings, chat.
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::config::OpenAiConfig;
use crate::error::{AppError, Result};

/// Default per-request timeout; transcription gets a longer one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const TRANSCRIPTION_TIMEOUT: Duration = Duration::from_secs(600);

const MAX_COMPLETION_TOKENS: u32 = 400;
const CHAT_TEMPERATURE: f32 = 0.2;

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_base: String,
    transcription_model: String,
    embedding_model: String,
    chat_model: String,
}

// ============================================
// Wire types
// ============================================

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiClient {
    pub fn new(cfg: &OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: cfg.api_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            transcription_model: cfg.transcription_model.clone(),
            embedding_model: cfg.embedding_model.clone(),
            chat_model: cfg.chat_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Transcribe an audio/video file. The file is streamed, not
    /// buffered in memory.
    pub async fn transcribe(&self, path: &Path, file_name: &str) -> Result<String> {
        info!(file = %path.display(), "Transcribing video");

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to open video file: {e}")))?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        let part = Part::stream(body)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .timeout(TRANSCRIPTION_TIMEOUT)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::upstream("transcription", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "transcription",
                format!("{status}: {error_text}"),
            ));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("transcription", format!("bad response: {e}")))?;

        debug!(chars = parsed.text.len(), "Transcript received");
        Ok(parsed.text)
    }

    /// Embed a single text input, returning its vector.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            input,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::upstream("embeddings", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "embeddings",
                format!("{status}: {error_text}"),
            ));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("embeddings", format!("bad response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::upstream("embeddings", "response carried no vectors"))
    }

    /// Single-turn chat completion, returning the assistant text.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: CHAT_TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::upstream("chat completion", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "chat completion",
                format!("{status}: {error_text}"),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("chat completion", format!("bad response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::upstream("chat completion", "response carried no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transcription_response() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "hello world"}"#).unwrap();
        assert_eq!(parsed.text, "hello world");
    }

    #[test]
    fn parses_embeddings_response() {
        let raw = r#"{
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, -0.2, 0.3]}],
            "model": "text-embedding-3-small"
        }"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn parses_chat_response() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"summary\":\"x\"}"}, "finish_reason": "stop"}]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "{\"summary\":\"x\"}");
    }

    #[test]
    fn chat_request_wire_shape() {
        let req = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: CHAT_TEMPERATURE,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["max_tokens"], 400);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
