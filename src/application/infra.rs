//! Timed connectivity probes for the backing services.
//!
//! Four probes run concurrently; each reports its own state and latency, and
//! a missing setting downgrades the probe to `skipped` rather than failing the
//! whole check.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Instant;
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::graph::Neo4jClient;
use crate::infrastructure::vector::QdrantClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    Ok,
    Error,
    Skipped,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeStatus {
    pub state: ProbeState,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfraHealth {
    pub status: OverallStatus,
    pub checked_at: DateTime<Utc>,
    pub dependencies: Dependencies,
}

#[derive(Debug, Serialize)]
pub struct Dependencies {
    pub postgres: ProbeStatus,
    pub redis: ProbeStatus,
    pub qdrant: ProbeStatus,
    pub neo4j: ProbeStatus,
}

enum Probe {
    Ok,
    Skipped(&'static str),
}

pub struct InfraService {
    postgres: Option<PgPool>,
    redis: Option<redis::Client>,
    qdrant: Option<QdrantClient>,
    neo4j: Option<Neo4jClient>,
}

impl InfraService {
    pub fn from_config(config: &AppConfig) -> Self {
        let postgres = config.infra.database_url.as_deref().and_then(|url| {
            match PgPoolOptions::new().max_connections(2).connect_lazy(url) {
                Ok(pool) => Some(pool),
                Err(error) => {
                    warn!(%error, "Ignoring unusable DATABASE_URL");
                    None
                }
            }
        });
        let redis = config
            .infra
            .redis_url
            .as_deref()
            .and_then(|url| match redis::Client::open(url) {
                Ok(client) => Some(client),
                Err(error) => {
                    warn!(%error, "Ignoring unusable REDIS_URL");
                    None
                }
            });
        let qdrant = config
            .rag
            .qdrant_url
            .as_deref()
            .map(|url| QdrantClient::new(url, config.rag.qdrant_api_key.clone()));
        let neo4j = config.neo4j.as_ref().map(Neo4jClient::from_settings);

        Self {
            postgres,
            redis,
            qdrant,
            neo4j,
        }
    }

    pub async fn check(&self) -> InfraHealth {
        let (postgres, redis, qdrant, neo4j) = tokio::join!(
            timed(self.check_postgres()),
            timed(self.check_redis()),
            timed(self.check_qdrant()),
            timed(self.check_neo4j()),
        );

        let degraded = [&postgres, &redis, &qdrant, &neo4j]
            .iter()
            .any(|probe| probe.state == ProbeState::Error);

        InfraHealth {
            status: if degraded {
                OverallStatus::Degraded
            } else {
                OverallStatus::Ok
            },
            checked_at: Utc::now(),
            dependencies: Dependencies {
                postgres,
                redis,
                qdrant,
                neo4j,
            },
        }
    }

    async fn check_postgres(&self) -> Result<Probe, String> {
        let Some(pool) = &self.postgres else {
            return Ok(Probe::Skipped("DATABASE_URL is missing"));
        };
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(|error| error.to_string())?;
        Ok(Probe::Ok)
    }

    async fn check_redis(&self) -> Result<Probe, String> {
        let Some(client) = &self.redis else {
            return Ok(Probe::Skipped("REDIS_URL is missing"));
        };
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| error.to_string())?;
        let reply: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|error| error.to_string())?;
        if reply != "PONG" {
            return Err(format!("unexpected ping response: {reply}"));
        }
        Ok(Probe::Ok)
    }

    async fn check_qdrant(&self) -> Result<Probe, String> {
        let Some(client) = &self.qdrant else {
            return Ok(Probe::Skipped("QDRANT_URL is missing"));
        };
        client
            .list_collections()
            .await
            .map_err(|error| error.to_string())?;
        Ok(Probe::Ok)
    }

    async fn check_neo4j(&self) -> Result<Probe, String> {
        let Some(client) = &self.neo4j else {
            return Ok(Probe::Skipped(
                "NEO4J_URI/NEO4J_USERNAME/NEO4J_PASSWORD is missing",
            ));
        };
        client.verify().await.map_err(|error| error.to_string())?;
        Ok(Probe::Ok)
    }
}

async fn timed<F>(probe: F) -> ProbeStatus
where
    F: Future<Output = Result<Probe, String>>,
{
    let started = Instant::now();
    let result = probe.await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(Probe::Ok) => ProbeStatus {
            state: ProbeState::Ok,
            latency_ms,
            detail: None,
        },
        Ok(Probe::Skipped(detail)) => ProbeStatus {
            state: ProbeState::Skipped,
            latency_ms,
            detail: Some(detail.to_string()),
        },
        Err(detail) => ProbeStatus {
            state: ProbeState::Error,
            latency_ms,
            detail: Some(detail),
        },
    }
}
