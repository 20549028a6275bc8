/// AI study-pack pipeline (RAG)
///
/// For a video: transcribe the file, chunk the transcript, embed each
/// chunk, upsert the vectors, retrieve the most relevant chunks for the
/// whole transcript, then prompt the chat model for a summary plus a
/// three-question quiz. The LLM is asked for strict JSON but its output
/// is parsed tolerantly: strict parse, then an extracted JSON block,
/// then the raw text as a summary-only fallback.
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::config::VectorStoreConfig;
use crate::db::embedding_repo;
use crate::error::{AppError, Result};
use crate::models::VideoWithCreator;
use crate::providers::{OpenAiClient, PineconeClient, VectorMetadata, VectorRecord};

/// Transcript chunk size, in characters.
pub const CHUNK_MAX_CHARS: usize = 800;
/// Separator between retrieved context chunks in the prompt.
const CONTEXT_SEPARATOR: &str = "\n---\n";

/// One multiple-choice question in a study pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "answerIndex")]
    pub answer_index: u32,
}

/// The pipeline's product: a short summary and a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudyPack {
    pub summary: String,
    pub quiz: Vec<QuizQuestion>,
}

pub struct SummaryPipeline {
    pool: PgPool,
    openai: Arc<OpenAiClient>,
    vector_store: Option<PineconeClient>,
    top_k: usize,
    upsert_batch_size: usize,
}

impl SummaryPipeline {
    pub fn new(
        pool: PgPool,
        openai: Arc<OpenAiClient>,
        vector_store: Option<PineconeClient>,
        cfg: &VectorStoreConfig,
    ) -> Self {
        Self {
            pool,
            openai,
            vector_store,
            top_k: cfg.top_k,
            upsert_batch_size: cfg.upsert_batch_size.max(1),
        }
    }

    /// Run the full pipeline for one video.
    pub async fn generate(&self, video: &VideoWithCreator, file_path: &Path) -> Result<StudyPack> {
        let store = self.vector_store.as_ref().ok_or_else(|| {
            AppError::upstream(
                "vector store",
                "not configured: set PINECONE_API_KEY and PINECONE_INDEX_HOST",
            )
        })?;

        // 1. Transcribe
        let transcript = self.openai.transcribe(file_path, &video.filename).await?;
        if transcript.trim().is_empty() {
            return Err(AppError::upstream("transcription", "returned empty text"));
        }

        // 2. Chunk and embed, one call per chunk
        let chunks = chunk_text(&transcript, CHUNK_MAX_CHARS);
        let mut records = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let values = self.openai.embed(chunk).await?;
            records.push(VectorRecord {
                id: format!("{}-{}", video.id, index),
                values,
                metadata: VectorMetadata {
                    video_id: video.id,
                    text: chunk.clone(),
                },
            });
        }

        // 3. Upsert in fixed-size batches, then record the mapping row
        for batch in records.chunks(self.upsert_batch_size) {
            store.upsert(batch).await?;
        }
        embedding_repo::record_indexed(&self.pool, video.id, chunks.len() as i32).await?;

        // 4. Retrieve context for the whole transcript
        let query_vector = self.openai.embed(&transcript).await?;
        let matches = store.query(&query_vector, self.top_k).await?;
        let contexts: String = matches
            .iter()
            .filter_map(|m| m.metadata.as_ref().map(|md| md.text.as_str()))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        // 5. Prompt the chat model and parse tolerantly
        let prompt = build_prompt(&video.title, &contexts, &transcript);
        let raw = self.openai.chat(&prompt).await?;

        info!(video_id = %video.id, chunks = chunks.len(), "Study pack generated");
        Ok(parse_study_pack(&raw))
    }
}

/// Split text into chunks of at most `max_chars` characters,
/// respecting character boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn build_prompt(title: &str, contexts: &str, transcript: &str) -> String {
    format!(
        r#"You are an educational assistant. Given the transcript context below (from a short educational reel) and the video title "{title}", produce:
1) a concise 2-3 sentence summary (the key takeaways a learner should remember),
2) three short multiple-choice questions. For each question produce 3 options and indicate which option index (0,1,2) is the correct one.

Return a JSON object exactly with:
{{
  "summary": "...",
  "quiz": [
    {{ "question": "...", "options": ["...","...","..."], "answer_index": 0 }}
  ]
}}

CONTEXT:
{contexts}

TRANSCRIPT:
{transcript}
"#
    )
}

/// Parse the LLM's output into a StudyPack, degrading gracefully:
/// strict JSON first, then the widest `{...}` block inside prose, then
/// the raw text as a summary with an empty quiz.
pub fn parse_study_pack(raw: &str) -> StudyPack {
    if let Some(pack) = try_parse_object(raw) {
        return pack;
    }

    if let Some(block) = extract_json_block(raw) {
        if let Some(pack) = try_parse_object(block) {
            return pack;
        }
    }

    StudyPack {
        summary: raw.to_string(),
        quiz: Vec::new(),
    }
}

fn try_parse_object(input: &str) -> Option<StudyPack> {
    let value: serde_json::Value = serde_json::from_str(input).ok()?;
    let obj = value.as_object()?;

    // Missing or malformed fields degrade to placeholders rather than
    // failing the whole request.
    let summary = obj
        .get("summary")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| "No summary produced".to_string());

    let quiz = obj
        .get("quiz")
        .cloned()
        .and_then(|q| serde_json::from_value::<Vec<QuizQuestion>>(q).ok())
        .unwrap_or_default();

    Some(StudyPack { summary, quiz })
}

/// Widest `{...}` span in the text; the LLM sometimes wraps its JSON in
/// prose or code fences.
fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_splits_on_char_boundaries() {
        let text = "héllo wörld".repeat(100);
        let chunks = chunk_text(&text, 80);
        assert!(chunks.iter().all(|c| c.chars().count() <= 80));
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined, text);
    }

    #[test]
    fn chunking_empty_text() {
        assert!(chunk_text("", 800).is_empty());
    }

    #[test]
    fn chunking_exact_multiple() {
        let text = "ab".repeat(800);
        let chunks = chunk_text(&text, 800);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 800);
    }

    #[test]
    fn parses_strict_json() {
        let raw = r#"{"summary": "Short and sweet.", "quiz": [
            {"question": "Q1?", "options": ["a", "b", "c"], "answer_index": 2}
        ]}"#;
        let pack = parse_study_pack(raw);
        assert_eq!(pack.summary, "Short and sweet.");
        assert_eq!(pack.quiz.len(), 1);
        assert_eq!(pack.quiz[0].answer_index, 2);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let raw = "Sure! Here is the JSON you asked for:\n```json\n{\"summary\": \"Wrapped.\", \"quiz\": []}\n```\nLet me know if you need more.";
        let pack = parse_study_pack(raw);
        assert_eq!(pack.summary, "Wrapped.");
        assert!(pack.quiz.is_empty());
    }

    #[test]
    fn falls_back_to_raw_text() {
        let raw = "I could not produce JSON, sorry.";
        let pack = parse_study_pack(raw);
        assert_eq!(pack.summary, raw);
        assert!(pack.quiz.is_empty());
    }

    #[test]
    fn missing_summary_gets_placeholder() {
        let pack = parse_study_pack(r#"{"quiz": []}"#);
        assert_eq!(pack.summary, "No summary produced");
    }

    #[test]
    fn malformed_quiz_degrades_to_empty() {
        let pack = parse_study_pack(r#"{"summary": "ok", "quiz": "not-a-list"}"#);
        assert_eq!(pack.summary, "ok");
        assert!(pack.quiz.is_empty());
    }

    #[test]
    fn accepts_camel_case_answer_index() {
        let raw = r#"{"summary": "s", "quiz": [
            {"question": "Q?", "options": ["a", "b", "c"], "answerIndex": 1}
        ]}"#;
        let pack = parse_study_pack(raw);
        assert_eq!(pack.quiz[0].answer_index, 1);
    }

    #[test]
    fn prompt_mentions_title_and_sections() {
        let prompt = build_prompt("Intro to Rust", "ctx", "transcript text");
        assert!(prompt.contains("\"Intro to Rust\""));
        assert!(prompt.contains("CONTEXT:\nctx"));
        assert!(prompt.contains("TRANSCRIPT:\ntranscript text"));
    }
}
