//! Neo4j access over the HTTP transactional-commit endpoint.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

use crate::config::Neo4jSettings;

const TX_COMMIT_PATH: &str = "/db/neo4j/tx/commit";

#[derive(Debug, Error)]
pub enum GraphDbError {
    #[error("neo4j request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("neo4j rejected the statement ({code}): {message}")]
    Cypher { code: String, message: String },
}

pub struct Neo4jClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl Neo4jClient {
    pub fn from_settings(settings: &Neo4jSettings) -> Self {
        Self {
            http: Client::new(),
            base_url: settings.uri.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    /// Run a single Cypher statement and return one object per row, keyed by
    /// the statement's columns.
    pub async fn run(
        &self,
        statement: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Vec<Map<String, Value>>, GraphDbError> {
        debug!("Submitting Cypher statement");
        let response: TxResponse = self
            .http
            .post(format!("{}{TX_COMMIT_PATH}", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .json(&json!({
                "statements": [{"statement": statement, "parameters": parameters}]
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        rows_from_response(response)
    }

    pub async fn verify(&self) -> Result<(), GraphDbError> {
        self.run("RETURN 1 AS ok", &Map::new()).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    #[serde(default)]
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

fn rows_from_response(response: TxResponse) -> Result<Vec<Map<String, Value>>, GraphDbError> {
    if let Some(error) = response.errors.into_iter().next() {
        return Err(GraphDbError::Cypher {
            code: error.code,
            message: error.message,
        });
    }

    let Some(result) = response.results.into_iter().next() else {
        return Ok(Vec::new());
    };

    let rows = result
        .data
        .into_iter()
        .map(|entry| {
            result
                .columns
                .iter()
                .cloned()
                .zip(entry.row)
                .collect::<Map<String, Value>>()
        })
        .collect();
    Ok(rows)
}
