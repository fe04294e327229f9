//! Pinecone data-plane client implementing [`VectorIndex`].
//!
//! Talks to the index host directly (`https://{index}-{project}.svc.{env}.pinecone.io`)
//! over the REST API. Index creation is an operator concern and is not done here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, TailorError};
use crate::traits::store::VectorIndex;
use crate::types::document::{IndexedVector, Metadata, RetrievedDocument};

const API_VERSION: &str = "2024-07";
const UPSERT_BATCH: usize = 100;

/// Connection settings for one Pinecone index.
#[derive(Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Index host, with or without scheme
    pub index_host: String,
    /// Namespace within the index; `None` uses the default namespace
    pub namespace: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("index_host", &self.index_host)
            .field("namespace", &self.namespace)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>, index_host: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index_host: index_host.into(),
            namespace: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn base_url(&self) -> String {
        let host = self.index_host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

/// Pinecone-backed index.
pub struct PineconeIndex {
    client: Client,
    base_url: String,
    namespace: String,
}

impl PineconeIndex {
    pub fn new(config: PineconeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TailorError::IndexUnavailable(
                "Pinecone API key is required".into(),
            ));
        }
        if config.index_host.trim().is_empty() {
            return Err(TailorError::IndexUnavailable(
                "Pinecone index host is required".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "api-key",
            HeaderValue::from_str(config.api_key.trim())
                .map_err(|_| TailorError::Config("invalid Pinecone API key".into()))?,
        );
        headers.insert(
            "x-pinecone-api-version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TailorError::Config(format!("failed to build Pinecone client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            namespace: config.namespace.unwrap_or_default(),
        })
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, path, "Pinecone request failed");
                TailorError::Storage(e.to_string())
            })?;

        Ok(response)
    }

    async fn error_from(response: reqwest::Response, path: &str) -> TailorError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        warn!(status = %status, error = %body, path, "Pinecone API error");
        TailorError::Storage(format!("Pinecone {} failed ({}): {}", path, status, body))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertRequest<'a> {
    vectors: &'a [IndexedVector],
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAllRequest<'a> {
    delete_all: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}

/// Pinecone metadata values must be strings, numbers, bools or string lists.
fn check_flat_metadata(vectors: &[IndexedVector]) -> Result<()> {
    for vector in vectors {
        for (key, value) in &vector.metadata {
            let flat = match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
                Value::Array(items) => items.iter().all(Value::is_string),
                Value::Null | Value::Object(_) => false,
            };
            if !flat {
                return Err(TailorError::Storage(format!(
                    "metadata key '{}' on vector {} is not a string, number, bool or string list",
                    key, vector.id
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vectors), fields(count = vectors.len()))]
    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<()> {
        check_flat_metadata(&vectors)?;

        for batch in vectors.chunks(UPSERT_BATCH) {
            let request = UpsertRequest {
                vectors: batch,
                namespace: &self.namespace,
            };
            let response = self.post("vectors/upsert", &request).await?;
            if !response.status().is_success() {
                return Err(Self::error_from(response, "vectors/upsert").await);
            }
        }
        info!(count = vectors.len(), "Upserted vectors to Pinecone");
        Ok(())
    }

    #[instrument(skip(self, embedding))]
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let request = QueryRequest {
            vector: embedding,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: &self.namespace,
        };
        let response = self.post("query", &request).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, "query").await);
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| TailorError::Storage(format!("invalid Pinecone query response: {}", e)))?;

        let mut documents: Vec<_> = parsed
            .matches
            .into_iter()
            .map(|m| RetrievedDocument::new(m.score, m.metadata.unwrap_or_default()))
            .collect();
        documents.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        documents.truncate(top_k);

        debug!(matches = documents.len(), "Pinecone query");
        Ok(documents)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let request = DeleteAllRequest {
            delete_all: true,
            namespace: &self.namespace,
        };
        let response = self.post("vectors/delete", &request).await?;

        // Deleting from a namespace that was never written is a 404; already empty.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(namespace = %self.namespace, "Pinecone namespace already empty");
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response, "vectors/delete").await);
        }

        info!(namespace = %self.namespace, "Cleared Pinecone namespace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_credentials_is_unavailable() {
        let err = PineconeIndex::new(PineconeConfig::new("", "idx.svc.pinecone.io"))
            .err()
            .unwrap();
        assert!(matches!(err, TailorError::IndexUnavailable(_)));

        let err = PineconeIndex::new(PineconeConfig::new("key", " ")).err().unwrap();
        assert!(matches!(err, TailorError::IndexUnavailable(_)));
    }

    #[test]
    fn test_base_url_adds_scheme() {
        let config = PineconeConfig::new("key", "cv-index-abc.svc.us-east-1.pinecone.io/");
        assert_eq!(
            config.base_url(),
            "https://cv-index-abc.svc.us-east-1.pinecone.io"
        );
        let local = PineconeConfig::new("key", "http://localhost:5080");
        assert_eq!(local.base_url(), "http://localhost:5080");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = PineconeConfig::new("pc-secret", "host");
        assert!(!format!("{:?}", config).contains("pc-secret"));
    }

    #[test]
    fn test_request_wire_format() {
        let mut metadata = Metadata::new();
        metadata.insert("text".into(), "Python".into());
        let vectors = vec![IndexedVector {
            id: "doc_0_chunk_0".into(),
            embedding: vec![0.5],
            metadata,
        }];

        let upsert = serde_json::to_value(UpsertRequest {
            vectors: &vectors,
            namespace: "cv",
        })
        .unwrap();
        assert_eq!(upsert["vectors"][0]["values"], json!([0.5]));
        assert_eq!(upsert["vectors"][0]["id"], "doc_0_chunk_0");

        let query = serde_json::to_value(QueryRequest {
            vector: &[0.1],
            top_k: 5,
            include_metadata: true,
            include_values: false,
            namespace: "",
        })
        .unwrap();
        assert_eq!(query["topK"], 5);
        assert_eq!(query["includeMetadata"], true);

        let delete = serde_json::to_value(DeleteAllRequest {
            delete_all: true,
            namespace: "",
        })
        .unwrap();
        assert_eq!(delete["deleteAll"], true);
    }

    #[tokio::test]
    async fn test_nested_metadata_rejected_before_upsert() {
        let index = PineconeIndex::new(PineconeConfig::new("key", "http://127.0.0.1:9")).unwrap();

        let mut metadata = Metadata::new();
        metadata.insert("text".into(), "Python".into());
        metadata.insert("tags".into(), json!(["ml", "python"]));
        metadata.insert("employer".into(), json!({"name": "Acme"}));
        let vectors = vec![IndexedVector {
            id: "doc_0_chunk_0".into(),
            embedding: vec![0.5],
            metadata,
        }];

        let err = index.upsert(vectors).await.unwrap_err();
        match err {
            TailorError::Storage(message) => assert!(message.contains("'employer'")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_flat_metadata_accepted() {
        let mut metadata = Metadata::new();
        metadata.insert("text".into(), "Python".into());
        metadata.insert("chunk_index".into(), json!(2));
        metadata.insert("current".into(), json!(true));
        metadata.insert("tags".into(), json!(["ml"]));
        let vectors = [IndexedVector {
            id: "doc_0_chunk_2".into(),
            embedding: vec![0.5],
            metadata: metadata.clone(),
        }];
        assert!(check_flat_metadata(&vectors).is_ok());

        metadata.insert("scores".into(), json!([1, 2]));
        let vectors = [IndexedVector {
            id: "doc_0_chunk_2".into(),
            embedding: vec![0.5],
            metadata,
        }];
        assert!(matches!(
            check_flat_metadata(&vectors),
            Err(TailorError::Storage(_))
        ));
    }

    #[test]
    fn test_query_response_parsing() {
        let parsed: QueryResponse = serde_json::from_value(json!({
            "matches": [
                {"id": "doc_0_chunk_1", "score": 0.82, "metadata": {"text": "ML pipelines"}},
                {"id": "doc_0_chunk_0", "score": 0.4}
            ],
            "namespace": ""
        }))
        .unwrap();

        assert_eq!(parsed.matches.len(), 2);
        assert_eq!(
            parsed.matches[0].metadata.as_ref().unwrap()["text"],
            "ML pipelines"
        );
        assert!(parsed.matches[1].metadata.is_none());
    }
}
