//! Item store owner and workflow orchestrator.
//!
//! Manual actions are applied synchronously. Automatic steps run in the
//! background, one run per item at a time:
//! - **draft**: approve the generated draft
//! - **translated**: score the translation and branch on the result
//! - **validated**: hand the item to translation memory

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::WorkflowOrchestrator;
pub use types::{ItemStatus, ItemView, ProcessingRun, StepFailure, WorkflowError};
