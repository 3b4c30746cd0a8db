//! Document indexing and similarity search against the vector store.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{
    DEFAULT_EMBEDDING_MODEL, DEFAULT_LITELLM_EMBEDDING_MODEL, LlmConfig, RagConfig,
};
use crate::domain::types::{FieldError, RequestError};
use crate::infrastructure::vector::{
    DEFAULT_VECTOR_SIZE, EmbeddingsClient, PointStruct, QdrantClient, VectorError,
};

const DEFAULT_SEARCH_LIMIT: u64 = 4;
const MAX_SEARCH_LIMIT: i64 = 20;

const QDRANT_URL_MISSING: &str = "QDRANT_URL is not configured";
const LITELLM_EMBEDDING_MISSING: &str =
    "LITELLM_API_KEY and LITELLM_BASE_URL are required for embedding via LiteLLM";
const OPENAI_EMBEDDING_MISSING: &str = "OPENAI_API_KEY is required when USE_LITELLM is disabled";

#[derive(Debug, Error)]
pub enum RagError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("{detail}")]
    Configuration { detail: &'static str },
    #[error(transparent)]
    Vector(#[from] VectorError),
}

pub struct RagService {
    qdrant: Option<QdrantClient>,
    embeddings: Option<EmbeddingsClient>,
    embeddings_missing: &'static str,
    default_collection: String,
}

impl RagService {
    /// Embeddings follow the chat transport selection: the gateway when
    /// gateway mode is on, the direct OpenAI endpoint otherwise.
    pub fn from_config(rag: &RagConfig, llm: &LlmConfig) -> Self {
        let qdrant = rag
            .qdrant_url
            .as_deref()
            .map(|url| QdrantClient::new(url, rag.qdrant_api_key.clone()));

        let (embeddings, embeddings_missing) = if llm.use_litellm {
            let client = match (&llm.litellm_api_key, &llm.litellm_base_url) {
                (Some(key), Some(url)) => Some(EmbeddingsClient::new(
                    Some(url.as_str()),
                    key.clone(),
                    rag.embedding_model
                        .clone()
                        .unwrap_or_else(|| DEFAULT_LITELLM_EMBEDDING_MODEL.to_string()),
                )),
                _ => None,
            };
            (client, LITELLM_EMBEDDING_MISSING)
        } else {
            let client = llm.openai_api_key.as_ref().map(|key| {
                EmbeddingsClient::new(
                    None,
                    key.clone(),
                    rag.embedding_model
                        .clone()
                        .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                )
            });
            (client, OPENAI_EMBEDDING_MISSING)
        };

        Self {
            qdrant,
            embeddings,
            embeddings_missing,
            default_collection: rag.collection.clone(),
        }
    }

    pub async fn index(&self, raw: &Value) -> Result<RagIndexResponse, RagError> {
        let request = RagIndexRequest::from_value(raw)?;
        let (qdrant, embeddings) = self.clients()?;
        let collection = request
            .collection_name
            .unwrap_or_else(|| self.default_collection.clone());

        qdrant
            .ensure_collection(&collection, DEFAULT_VECTOR_SIZE)
            .await?;

        let texts: Vec<&str> = request
            .documents
            .iter()
            .map(|document| document.text.as_str())
            .collect();
        let vectors = embeddings.embed(&texts).await?;

        let indexed_at = Utc::now().to_rfc3339();
        let mut ids = Vec::with_capacity(request.documents.len());
        let points: Vec<PointStruct> = request
            .documents
            .into_iter()
            .zip(vectors)
            .map(|(document, vector)| {
                let id = Uuid::new_v4().to_string();
                ids.push(id.clone());
                PointStruct {
                    id,
                    vector,
                    payload: document_payload(document, &indexed_at),
                }
            })
            .collect();

        qdrant.upsert_points(&collection, &points).await?;
        info!(
            collection = collection.as_str(),
            count = points.len(),
            "Indexed documents"
        );

        Ok(RagIndexResponse {
            collection_name: collection,
            indexed_count: points.len(),
            ids,
        })
    }

    pub async fn search(&self, raw: &Value) -> Result<RagSearchResponse, RagError> {
        let request = RagSearchRequest::from_value(raw)?;
        let (qdrant, embeddings) = self.clients()?;
        let collection = request
            .collection_name
            .unwrap_or_else(|| self.default_collection.clone());
        let k = request.k.unwrap_or(DEFAULT_SEARCH_LIMIT);

        let vectors = embeddings.embed(&[request.query.as_str()]).await?;
        let Some(vector) = vectors.into_iter().next() else {
            return Ok(RagSearchResponse {
                collection_name: collection,
                query: request.query,
                k,
                results: Vec::new(),
            });
        };

        let hits = qdrant.search(&collection, &vector, k).await?;
        let results = hits
            .into_iter()
            .map(|hit| {
                let mut payload = hit.payload;
                RagSearchHit {
                    page_content: payload
                        .remove("content")
                        .and_then(|value| value.as_str().map(str::to_string))
                        .unwrap_or_default(),
                    metadata: match payload.remove("metadata") {
                        Some(Value::Object(map)) => map,
                        _ => Map::new(),
                    },
                    score: hit.score,
                }
            })
            .collect();

        Ok(RagSearchResponse {
            collection_name: collection,
            query: request.query,
            k,
            results,
        })
    }

    fn clients(&self) -> Result<(&QdrantClient, &EmbeddingsClient), RagError> {
        let qdrant = self.qdrant.as_ref().ok_or(RagError::Configuration {
            detail: QDRANT_URL_MISSING,
        })?;
        let embeddings = self.embeddings.as_ref().ok_or(RagError::Configuration {
            detail: self.embeddings_missing,
        })?;
        Ok((qdrant, embeddings))
    }
}

/// Payload layout: the document text under `content`, everything else under
/// `metadata`, stamped with a source id and index time.
fn document_payload(document: RagDocument, indexed_at: &str) -> Map<String, Value> {
    let mut metadata = document.metadata.unwrap_or_default();
    metadata.insert(
        "sourceId".to_string(),
        Value::String(document.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
    );
    metadata.insert(
        "indexedAt".to_string(),
        Value::String(indexed_at.to_string()),
    );

    let mut payload = Map::new();
    payload.insert("content".to_string(), Value::String(document.text));
    payload.insert("metadata".to_string(), Value::Object(metadata));
    payload
}

#[derive(Debug)]
struct RagDocument {
    id: Option<String>,
    text: String,
    metadata: Option<Map<String, Value>>,
}

#[derive(Debug)]
struct RagIndexRequest {
    collection_name: Option<String>,
    documents: Vec<RagDocument>,
}

impl RagIndexRequest {
    fn from_value(value: &Value) -> Result<Self, RequestError> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            collection_name: Option<String>,
            documents: Option<Vec<RawDocument>>,
        }
        #[derive(serde::Deserialize)]
        struct RawDocument {
            id: Option<String>,
            text: Option<String>,
            metadata: Option<Map<String, Value>>,
        }

        let raw: Raw =
            serde_json::from_value(value.clone()).map_err(|_| RequestError::malformed_body())?;

        let mut errors = Vec::new();
        if raw.collection_name.as_deref() == Some("") {
            errors.push(FieldError::new(
                "collectionName",
                "collectionName must not be empty",
            ));
        }
        let raw_documents = raw.documents.unwrap_or_default();
        if raw_documents.is_empty() {
            errors.push(FieldError::new(
                "documents",
                "documents must contain at least one entry",
            ));
        }
        if raw_documents
            .iter()
            .any(|document| document.text.as_deref().unwrap_or("").is_empty())
        {
            errors.push(FieldError::new(
                "documents",
                "every document needs non-empty text",
            ));
        }
        if !errors.is_empty() {
            return Err(RequestError::invalid(errors));
        }

        Ok(Self {
            collection_name: raw.collection_name,
            documents: raw_documents
                .into_iter()
                .map(|document| RagDocument {
                    id: document.id,
                    text: document.text.unwrap_or_default(),
                    metadata: document.metadata,
                })
                .collect(),
        })
    }
}

#[derive(Debug)]
struct RagSearchRequest {
    collection_name: Option<String>,
    query: String,
    k: Option<u64>,
}

impl RagSearchRequest {
    fn from_value(value: &Value) -> Result<Self, RequestError> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            collection_name: Option<String>,
            query: Option<String>,
            k: Option<i64>,
        }

        let raw: Raw =
            serde_json::from_value(value.clone()).map_err(|_| RequestError::malformed_body())?;

        let mut errors = Vec::new();
        if raw.collection_name.as_deref() == Some("") {
            errors.push(FieldError::new(
                "collectionName",
                "collectionName must not be empty",
            ));
        }
        let query = raw.query.unwrap_or_default();
        if query.is_empty() {
            errors.push(FieldError::new("query", "query is required"));
        }
        if let Some(k) = raw.k {
            if k < 1 || k > MAX_SEARCH_LIMIT {
                errors.push(FieldError::new("k", "k must be between 1 and 20"));
            }
        }
        if !errors.is_empty() {
            return Err(RequestError::invalid(errors));
        }

        Ok(Self {
            collection_name: raw.collection_name,
            query,
            k: raw.k.map(|k| k as u64),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagIndexResponse {
    pub collection_name: String,
    pub indexed_count: usize,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagSearchHit {
    pub page_content: String,
    pub metadata: Map<String, Value>,
    pub score: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagSearchResponse {
    pub collection_name: String,
    pub query: String,
    pub k: u64,
    pub results: Vec<RagSearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unconfigured() -> RagService {
        RagService::from_config(&RagConfig::default(), &LlmConfig::default())
    }

    #[tokio::test]
    async fn index_requires_documents() {
        let error = unconfigured()
            .index(&json!({"documents": []}))
            .await
            .unwrap_err();
        assert!(matches!(error, RagError::Request(_)));
    }

    #[tokio::test]
    async fn index_rejects_empty_document_text() {
        let error = unconfigured()
            .index(&json!({"documents": [{"text": ""}]}))
            .await
            .unwrap_err();
        assert!(matches!(error, RagError::Request(_)));
    }

    #[tokio::test]
    async fn missing_qdrant_url_is_a_configuration_error() {
        let error = unconfigured()
            .index(&json!({"documents": [{"text": "hello"}]}))
            .await
            .unwrap_err();
        match error {
            RagError::Configuration { detail } => assert_eq!(detail, QDRANT_URL_MISSING),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_embedding_credentials_name_the_right_settings() {
        let rag = RagConfig {
            qdrant_url: Some("http://localhost:6333".into()),
            collection: "documents".into(),
            ..RagConfig::default()
        };

        let service = RagService::from_config(&rag, &LlmConfig::default());
        let error = service
            .search(&json!({"query": "hello"}))
            .await
            .unwrap_err();
        match error {
            RagError::Configuration { detail } => assert_eq!(detail, OPENAI_EMBEDDING_MISSING),
            other => panic!("expected configuration error, got {other:?}"),
        }

        let service = RagService::from_config(
            &rag,
            &LlmConfig {
                use_litellm: true,
                ..LlmConfig::default()
            },
        );
        let error = service
            .search(&json!({"query": "hello"}))
            .await
            .unwrap_err();
        match error {
            RagError::Configuration { detail } => assert_eq!(detail, LITELLM_EMBEDDING_MISSING),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_validates_k_bounds() {
        for bad in [0, -3, 21] {
            let error = unconfigured()
                .search(&json!({"query": "hello", "k": bad}))
                .await
                .unwrap_err();
            assert!(matches!(error, RagError::Request(_)), "k={bad}");
        }
    }

    #[test]
    fn payload_carries_source_id_and_index_time() {
        let payload = document_payload(
            RagDocument {
                id: Some("doc-1".into()),
                text: "hello".into(),
                metadata: None,
            },
            "2026-08-04T00:00:00Z",
        );

        assert_eq!(payload["content"], "hello");
        assert_eq!(payload["metadata"]["sourceId"], "doc-1");
        assert_eq!(payload["metadata"]["indexedAt"], "2026-08-04T00:00:00Z");
    }

    #[test]
    fn payload_generates_a_source_id_when_absent() {
        let payload = document_payload(
            RagDocument {
                id: None,
                text: "hello".into(),
                metadata: None,
            },
            "2026-08-04T00:00:00Z",
        );
        let source_id = payload["metadata"]["sourceId"].as_str().unwrap_or_default();
        assert!(!source_id.is_empty());
    }
}
