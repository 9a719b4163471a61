// marine-flow library - deterministic workflow engine for import/export
// marine cargo trade and insurance, persisted in a byte key/value store

pub mod cli;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod observability;
pub mod store;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use config::MarineFlowConfig;
pub use controller::{decode_state, WorkflowController};
pub use dispatch::{Dispatcher, EntryPoint, OperationHandler, Response};
pub use error::{StoreError, WorkflowError};
pub use instance::InstanceId;
pub use observability::{OperationTimer, WorkflowMetrics, WorkflowStats};
pub use store::{FileStore, MemoryStore, StateStore};
pub use telemetry::{create_invocation_span, generate_correlation_id, init_telemetry};
pub use workflow::{
    transition, Participant, Transition, TransitionRule, TransitionTable, WorkflowEvent,
    WorkflowState,
};
