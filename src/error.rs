//! Error types for workflow operations.

use thiserror::Error;

use crate::workflow::{WorkflowEvent, WorkflowState};

/// Failures raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock acquisition failed: {reason}")]
    Lock { reason: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Every way a single invocation can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Incorrect number of arguments for {operation}: expecting {expected}, got {actual}")]
    ArgumentCount {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to read {key}: {source}")]
    StoreRead {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to write {key}: {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to get state for {key}")]
    NotFound { key: String },

    #[error("Received unknown function invocation: {name}")]
    UnknownOperation { name: String },

    #[error("Unknown workflow state: {0:?}")]
    UnknownState(String),

    #[error("Unknown workflow event: {0:?}")]
    UnknownEvent(String),

    #[error("Event {event} from {state} matches conflicting rules {candidates:?}")]
    AmbiguousTransition {
        state: WorkflowState,
        event: WorkflowEvent,
        candidates: Vec<WorkflowState>,
    },

    #[error("Workflow instance {instance} has not been initialised")]
    Uninitialized { instance: String },

    #[error("Invalid workflow instance id {id:?}: {reason}")]
    InvalidInstance { id: String, reason: String },
}

impl WorkflowError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkflowError::NotFound { .. })
    }

    /// Caller supplied something unusable; nothing was read or written.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            WorkflowError::ArgumentCount { .. }
                | WorkflowError::UnknownOperation { .. }
                | WorkflowError::UnknownState(_)
                | WorkflowError::UnknownEvent(_)
                | WorkflowError::InvalidInstance { .. }
        )
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            WorkflowError::StoreRead { .. } | WorkflowError::StoreWrite { .. }
        )
    }
}
