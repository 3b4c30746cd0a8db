//! Ad-hoc Cypher execution and Neo4j connectivity checks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::config::Neo4jSettings;
use crate::domain::types::{FieldError, RequestError};
use crate::infrastructure::graph::{GraphDbError, Neo4jClient};

const NEO4J_MISSING: &str = "NEO4J config is missing";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("{detail}")]
    Configuration { detail: &'static str },
    #[error(transparent)]
    Db(#[from] GraphDbError),
}

pub struct GraphService {
    client: Option<Neo4jClient>,
}

impl GraphService {
    pub fn from_settings(settings: Option<&Neo4jSettings>) -> Self {
        Self {
            client: settings.map(Neo4jClient::from_settings),
        }
    }

    pub async fn health(&self) -> GraphHealth {
        let Some(client) = &self.client else {
            return GraphHealth {
                status: GraphHealthStatus::Skipped,
                detail: Some(NEO4J_MISSING.to_string()),
                checked_at: None,
            };
        };

        match client.verify().await {
            Ok(()) => GraphHealth {
                status: GraphHealthStatus::Ok,
                detail: None,
                checked_at: Some(Utc::now()),
            },
            Err(error) => GraphHealth {
                status: GraphHealthStatus::Error,
                detail: Some(error.to_string()),
                checked_at: Some(Utc::now()),
            },
        }
    }

    pub async fn query(&self, raw: &Value) -> Result<GraphQueryResponse, GraphError> {
        let client = self.client.as_ref().ok_or(GraphError::Configuration {
            detail: NEO4J_MISSING,
        })?;
        let request = GraphQueryRequest::from_value(raw)?;

        let rows = client.run(&request.query, &request.params).await?;
        info!(count = rows.len(), "Cypher query finished");

        Ok(GraphQueryResponse {
            count: rows.len(),
            rows,
        })
    }
}

#[derive(Debug)]
struct GraphQueryRequest {
    query: String,
    params: Map<String, Value>,
}

impl GraphQueryRequest {
    fn from_value(value: &Value) -> Result<Self, RequestError> {
        #[derive(serde::Deserialize)]
        struct Raw {
            query: Option<String>,
            params: Option<Map<String, Value>>,
        }

        let raw: Raw =
            serde_json::from_value(value.clone()).map_err(|_| RequestError::malformed_body())?;

        let query = raw.query.unwrap_or_default();
        if query.is_empty() {
            return Err(RequestError::invalid(vec![FieldError::new(
                "query",
                "query is required",
            )]));
        }

        Ok(Self {
            query,
            params: raw.params.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphHealthStatus {
    Ok,
    Error,
    Skipped,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphHealth {
    pub status: GraphHealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct GraphQueryResponse {
    pub count: usize,
    pub rows: Vec<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unconfigured() -> GraphService {
        GraphService::from_settings(None)
    }

    #[tokio::test]
    async fn health_is_skipped_without_settings() {
        let health = unconfigured().health().await;
        assert_eq!(health.status, GraphHealthStatus::Skipped);
        assert!(health.checked_at.is_none());
        assert_eq!(health.detail.as_deref(), Some(NEO4J_MISSING));
    }

    #[tokio::test]
    async fn query_without_settings_is_a_configuration_error() {
        let error = unconfigured()
            .query(&json!({"query": "RETURN 1"}))
            .await
            .unwrap_err();
        assert!(matches!(error, GraphError::Configuration { .. }));
    }

    #[tokio::test]
    async fn query_requires_a_statement() {
        let settings = Neo4jSettings {
            uri: "http://localhost:7474".into(),
            username: "neo4j".into(),
            password: "secret".into(),
        };
        let service = GraphService::from_settings(Some(&settings));
        let error = service.query(&json!({})).await.unwrap_err();
        assert!(matches!(error, GraphError::Request(_)));
    }
}
