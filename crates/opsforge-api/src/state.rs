//! Application state wiring all services together.
//!
//! AppState holds the orchestrators, session store, workflow engine, and
//! update logs shared by the CLI and the REST API. The gateway is pinned
//! to the Bedrock implementation; everything downstream only sees the
//! boxed trait.

use std::path::PathBuf;
use std::sync::Arc;

use opsforge_core::gateway::BoxGateway;
use opsforge_core::orchestrator::{PhaseOrchestrator, plans};
use opsforge_core::session::SessionStore;
use opsforge_core::tasks::registry::default_registry;
use opsforge_core::tasks::workflow::WorkflowEngine;
use opsforge_core::updates::UpdateLog;
use opsforge_infra::config::{bedrock_api_key, load_config};
use opsforge_infra::llm::bedrock::BedrockGateway;
use opsforge_infra::session::InMemorySessionStore;
use opsforge_types::config::GlobalConfig;
use opsforge_types::llm::InvokeOptions;
use opsforge_types::request::Domain;
use opsforge_types::update::UpdateChannel;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub incident: Arc<PhaseOrchestrator>,
    pub sql: Arc<PhaseOrchestrator>,
    pub nosql: Arc<PhaseOrchestrator>,
    pub sessions: Arc<dyn SessionStore>,
    pub workflows: Arc<WorkflowEngine>,
    pub dev_updates: Arc<UpdateLog>,
    pub automation_updates: Arc<UpdateLog>,
    pub config: GlobalConfig,
}

impl AppState {
    /// Initialize the application state: load config, build the gateway,
    /// and wire the orchestrators.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        let config = load_config(&data_dir).await;

        let api_key = bedrock_api_key();
        if api_key.is_none() {
            tracing::warn!(
                "AWS_BEDROCK_API_KEY is not set; analysis requests will be rejected until it is"
            );
        }
        let gateway = Arc::new(BoxGateway::new(BedrockGateway::new(
            api_key,
            &config.bedrock,
        )));

        let options = InvokeOptions {
            max_tokens: config.bedrock.max_tokens,
            temperature: config.bedrock.temperature,
        };

        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::new(config.max_sessions));

        Ok(Self {
            incident: Arc::new(PhaseOrchestrator::new(
                gateway.clone(),
                plans::incident::plan(),
                options.clone(),
            )),
            sql: Arc::new(PhaseOrchestrator::new(
                gateway.clone(),
                plans::sql::plan(),
                options.clone(),
            )),
            nosql: Arc::new(PhaseOrchestrator::new(
                gateway.clone(),
                plans::nosql::plan(),
                options.clone(),
            )),
            sessions,
            workflows: Arc::new(WorkflowEngine::new(gateway, default_registry(), options)),
            dev_updates: Arc::new(UpdateLog::new(UpdateChannel::Dev)),
            automation_updates: Arc::new(UpdateLog::new(UpdateChannel::Automation)),
            config,
        })
    }

    /// The orchestrator serving a domain.
    pub fn orchestrator(&self, domain: Domain) -> &PhaseOrchestrator {
        match domain {
            Domain::Incident => &self.incident,
            Domain::Sql => &self.sql,
            Domain::Nosql => &self.nosql,
        }
    }

    /// The update log backing a channel.
    pub fn updates(&self, channel: UpdateChannel) -> &UpdateLog {
        match channel {
            UpdateChannel::Dev => &self.dev_updates,
            UpdateChannel::Automation => &self.automation_updates,
        }
    }
}
