use watchtower_core::{Config, WorkflowOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: WorkflowOrchestrator,
}

impl AppState {
    pub fn new(config: Config, orchestrator: WorkflowOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &WorkflowOrchestrator {
        &self.orchestrator
    }
}
