//! Qdrant vector store and OpenAI-shaped embeddings over HTTP.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::model::clients::normalize_v1_base_url;

pub const DEFAULT_VECTOR_SIZE: u64 = 1536;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("request to '{service}' failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{service}' returned an invalid response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
}

impl VectorError {
    fn network(service: &'static str, source: reqwest::Error) -> Self {
        Self::Network { service, source }
    }

    fn invalid_response(service: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            reason: reason.into(),
        }
    }
}

/// OpenAI-shaped embeddings endpoint, direct or behind the gateway.
pub struct EmbeddingsClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const EMBEDDINGS_SERVICE: &str = "embeddings";

impl EmbeddingsClient {
    pub fn new(base_url: Option<&str>, api_key: String, model: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url
                .map(normalize_v1_base_url)
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_key,
            model,
        }
    }

    pub async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        debug!(count = inputs.len(), model = self.model.as_str(), "Embedding texts");
        let response: EmbeddingsResponse = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({"model": self.model, "input": inputs}))
            .send()
            .await
            .map_err(|e| VectorError::network(EMBEDDINGS_SERVICE, e))?
            .error_for_status()
            .map_err(|e| VectorError::network(EMBEDDINGS_SERVICE, e))?
            .json()
            .await
            .map_err(|e| VectorError::network(EMBEDDINGS_SERVICE, e))?;

        if response.data.len() != inputs.len() {
            return Err(VectorError::invalid_response(
                EMBEDDINGS_SERVICE,
                format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    response.data.len()
                ),
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// A point to upsert: id, vector, and an arbitrary JSON payload.
#[derive(Debug, Serialize)]
pub struct PointStruct {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// A scored search hit with its payload.
#[derive(Debug, Deserialize)]
pub struct ScoredPoint {
    pub score: f64,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

const QDRANT_SERVICE: &str = "qdrant";

/// Minimal Qdrant REST client.
pub struct QdrantClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantClient {
    pub fn new(url: &str, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn send<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, VectorError>
    where
        T: serde::de::DeserializeOwned,
    {
        builder
            .send()
            .await
            .map_err(|e| VectorError::network(QDRANT_SERVICE, e))?
            .error_for_status()
            .map_err(|e| VectorError::network(QDRANT_SERVICE, e))?
            .json()
            .await
            .map_err(|e| VectorError::network(QDRANT_SERVICE, e))
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, VectorError> {
        let response: ApiResult<CollectionsResult> = self
            .send(self.request(reqwest::Method::GET, "/collections"))
            .await?;
        Ok(response
            .result
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    /// Create the collection when it does not exist yet (Cosine distance).
    pub async fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorError> {
        let existing = self.list_collections().await?;
        if existing.iter().any(|collection| collection == name) {
            return Ok(());
        }

        info!(collection = name, vector_size, "Creating Qdrant collection");
        let _: ApiResult<Value> = self
            .send(
                self.request(reqwest::Method::PUT, &format!("/collections/{name}"))
                    .json(&json!({
                        "vectors": {"size": vector_size, "distance": "Cosine"}
                    })),
            )
            .await?;
        Ok(())
    }

    pub async fn upsert_points(
        &self,
        collection: &str,
        points: &[PointStruct],
    ) -> Result<(), VectorError> {
        debug!(collection, count = points.len(), "Upserting points");
        let _: ApiResult<Value> = self
            .send(
                self.request(
                    reqwest::Method::PUT,
                    &format!("/collections/{collection}/points?wait=true"),
                )
                .json(&json!({"points": points})),
            )
            .await?;
        Ok(())
    }

    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorError> {
        let response: ApiResult<Vec<ScoredPoint>> = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/collections/{collection}/points/search"),
                )
                .json(&json!({
                    "vector": vector,
                    "limit": limit,
                    "with_payload": true
                })),
            )
            .await?;
        Ok(response.result)
    }
}

#[derive(Deserialize)]
struct ApiResult<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}
