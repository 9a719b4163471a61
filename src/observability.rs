use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

use crate::workflow::Transition;

/// Counters for one dispatcher
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub invocations: AtomicU64,
    pub failures: AtomicU64,
    pub transitions_moved: AtomicU64,
    pub transitions_unchanged: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition(&self, outcome: &Transition) {
        if outcome.is_moved() {
            self.transitions_moved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.transitions_unchanged.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            transitions_moved: self.transitions_moved.load(Ordering::Relaxed),
            transitions_unchanged: self.transitions_unchanged.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Workflow metrics: invocations={}, failures={}, moved={}, unchanged={}",
            stats.invocations, stats.failures, stats.transitions_moved, stats.transitions_unchanged
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStats {
    pub invocations: u64,
    pub failures: u64,
    pub transitions_moved: u64,
    pub transitions_unchanged: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
