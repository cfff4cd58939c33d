pub mod config;
pub mod events;
pub mod filter;
pub mod intake;
pub mod item;
pub mod metrics;
pub mod orchestrator;
pub mod steps;
pub mod testing;
pub mod workflow;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, ScorerBackend, ServerConfig, StepsConfig,
};
pub use events::{EventBroadcaster, WorkflowEvent};
pub use filter::{FilterCondition, FilterField, FilterOperator, ItemFilter};
pub use intake::{validate_edits, BulkImportRequest, IntakeError, NewItemRequest};
pub use item::{ItemStore, StateCounts, TranslationItem};
pub use orchestrator::{
    ItemStatus, ItemView, OrchestratorConfig, ProcessingRun, StepFailure, WorkflowError,
    WorkflowOrchestrator,
};
pub use steps::{
    DraftGenerator, QualityAssessment, QualityScorer, StepError, StepProviders,
    TranslationMemory, Translator,
};
pub use workflow::{
    ItemEdits, TransitionError, TranslationState, ValidationScore, WorkflowAction,
};
