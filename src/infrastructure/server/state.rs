use crate::application::agent::AgentRunner;
use crate::application::graph::GraphService;
use crate::application::infra::InfraService;
use crate::application::rag::RagService;
use crate::config::AppConfig;
use crate::infrastructure::model::LlmClient;
use std::sync::Arc;
use tracing::info;

pub struct ServerState {
    llm: Arc<LlmClient>,
    agent: AgentRunner<LlmClient>,
    rag: RagService,
    graph: GraphService,
    infra: InfraService,
}

impl ServerState {
    pub fn from_config(config: &AppConfig) -> Self {
        let llm = Arc::new(LlmClient::from_config(&config.llm));
        info!(
            providers = llm.available_providers().len(),
            "Provider client ready"
        );
        Self {
            agent: AgentRunner::new(llm.clone()),
            rag: RagService::from_config(&config.rag, &config.llm),
            graph: GraphService::from_settings(config.neo4j.as_ref()),
            infra: InfraService::from_config(config),
            llm,
        }
    }

    pub(crate) fn llm(&self) -> &LlmClient {
        &self.llm
    }

    pub(crate) fn agent(&self) -> &AgentRunner<LlmClient> {
        &self.agent
    }

    pub(crate) fn rag(&self) -> &RagService {
        &self.rag
    }

    pub(crate) fn graph(&self) -> &GraphService {
        &self.graph
    }

    pub(crate) fn infra(&self) -> &InfraService {
        &self.infra
    }
}
