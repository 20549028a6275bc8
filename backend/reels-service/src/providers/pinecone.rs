//! Pinecone-style vector store client (serverless REST API).
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::VectorStoreConfig;
use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Vector store client bound to a single serverless index host.
pub struct PineconeClient {
    client: Client,
    api_key: String,
    index_host: String,
}

// ============================================
// Wire types
// ============================================

/// Metadata stored alongside each chunk vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub video_id: Uuid,
    pub text: String,
}

/// One vector to upsert
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UpsertResponse {
    upserted_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct QueryResponse {
    matches: Vec<QueryMatch>,
}

/// One scored match from a similarity query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    pub metadata: Option<VectorMetadata>,
}

impl PineconeClient {
    /// Build a client if the vector store is configured; None otherwise.
    pub fn from_config(cfg: &VectorStoreConfig) -> Option<Self> {
        if !cfg.is_configured() {
            return None;
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        let raw_host = cfg.index_host.as_deref().unwrap_or_default();
        let index_host = if raw_host.starts_with("http://") || raw_host.starts_with("https://") {
            raw_host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", raw_host.trim_end_matches('/'))
        };

        Some(Self {
            client,
            api_key: cfg.api_key.clone().unwrap_or_default(),
            index_host,
        })
    }

    /// Upsert a batch of vectors into the index.
    pub async fn upsert(&self, vectors: &[VectorRecord]) -> Result<u64> {
        if vectors.is_empty() {
            return Ok(0);
        }

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { vectors })
            .send()
            .await
            .map_err(|e| AppError::upstream("vector upsert", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "vector upsert",
                format!("{status}: {error_text}"),
            ));
        }

        let parsed: UpsertResponse = response.json().await.unwrap_or_default();
        debug!(count = parsed.upserted_count, "Vectors upserted");
        Ok(parsed.upserted_count)
    }

    /// Query the index for the nearest neighbours of `vector`.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .client
            .post(format!("{}/query", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::upstream("vector query", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "vector query",
                format!("{status}: {error_text}"),
            ));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("vector query", format!("bad response: {e}")))?;

        Ok(parsed.matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_uses_camel_case() {
        let vector = vec![0.1_f32, 0.2];
        let req = QueryRequest {
            vector: &vector,
            top_k: 5,
            include_metadata: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["topK"], 5);
        assert_eq!(json["includeMetadata"], true);
    }

    #[test]
    fn parses_query_response_with_metadata() {
        let video_id = Uuid::new_v4();
        let raw = format!(
            r#"{{"matches": [{{"id": "{video_id}-0", "score": 0.91,
                "metadata": {{"video_id": "{video_id}", "text": "a chunk"}}}}]}}"#
        );
        let parsed: QueryResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(
            parsed.matches[0].metadata.as_ref().unwrap().text,
            "a chunk"
        );
    }

    #[test]
    fn missing_matches_defaults_to_empty() {
        let parsed: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.matches.is_empty());
    }

    #[test]
    fn unconfigured_store_yields_no_client() {
        let cfg = VectorStoreConfig {
            api_key: None,
            index_host: None,
            top_k: 5,
            upsert_batch_size: 50,
        };
        assert!(PineconeClient::from_config(&cfg).is_none());
    }
}
