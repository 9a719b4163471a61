// Workflow Controller - read current state, apply the event, persist the result
//
// The read-modify-write cycle in `advance` is not atomic: two concurrent
// advances on one instance race and the last write wins.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::instance::InstanceId;
use crate::store::StateStore;
use crate::workflow::{Transition, TransitionRule, TransitionTable, WorkflowEvent, WorkflowState};

pub struct WorkflowController<S> {
    store: S,
    table: Arc<TransitionTable>,
}

impl<S: StateStore> WorkflowController<S> {
    /// Controller over `store` using the reference transition table.
    pub fn new(store: S) -> Self {
        Self::with_table(store, TransitionTable::reference())
    }

    pub fn with_table(store: S, table: Arc<TransitionTable>) -> Self {
        Self { store, table }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Seed the instance with `initial` as its current state.
    pub async fn bootstrap(
        &self,
        instance: &InstanceId,
        initial: &str,
    ) -> Result<WorkflowState, WorkflowError> {
        let state = WorkflowState::parse(initial)?;
        self.persist_state(instance, state).await?;
        info!(instance = %instance, state = %state, "Workflow instance initialised");
        Ok(state)
    }

    /// Apply `event` to the instance's current state and persist the result.
    ///
    /// Nothing is written when the event is unknown, the state cannot be
    /// read, or the event hits conflicting rules.
    pub async fn advance(
        &self,
        instance: &InstanceId,
        event: &str,
    ) -> Result<Transition, WorkflowError> {
        let event = WorkflowEvent::parse(event)?;
        let current = self.current_state(instance).await?;

        let outcome = self.table.lookup(current, event);
        if let Transition::Ambiguous {
            state,
            event,
            candidates,
        } = &outcome
        {
            warn!(
                instance = %instance,
                state = %state,
                event = %event,
                candidates = ?candidates,
                "Refusing to apply event with conflicting rules"
            );
            return Err(WorkflowError::AmbiguousTransition {
                state: *state,
                event: *event,
                candidates: candidates.clone(),
            });
        }

        let next = outcome.resulting_state();
        self.persist_state(instance, next).await?;

        info!(
            instance = %instance,
            from = %current,
            event = %event,
            to = %next,
            moved = outcome.is_moved(),
            "send {} -> ({}) -> {}",
            current,
            event,
            next
        );
        Ok(outcome)
    }

    /// Raw passthrough write, unrelated to the workflow.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), WorkflowError> {
        self.store
            .put(key, value.as_bytes())
            .await
            .map_err(|source| WorkflowError::StoreWrite {
                key: key.to_string(),
                source,
            })?;
        debug!(key = %key, "Value written");
        Ok(())
    }

    /// Raw passthrough read. Absent keys and backend failures both surface
    /// as `NotFound` naming the key.
    pub async fn get_value(&self, key: &str) -> Result<Vec<u8>, WorkflowError> {
        match self.store.get(key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(WorkflowError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => {
                warn!(key = %key, error = %e, "Store read failed");
                Err(WorkflowError::NotFound {
                    key: key.to_string(),
                })
            }
        }
    }

    pub async fn current_state(&self, instance: &InstanceId) -> Result<WorkflowState, WorkflowError> {
        let key = instance.state_key();
        let raw = self
            .store
            .get(&key)
            .await
            .map_err(|source| WorkflowError::StoreRead {
                key: key.clone(),
                source,
            })?
            .ok_or_else(|| WorkflowError::Uninitialized {
                instance: instance.to_string(),
            })?;
        decode_state(&raw)
    }

    /// Rules that can fire from the instance's current state.
    pub async fn available_events(
        &self,
        instance: &InstanceId,
    ) -> Result<Vec<TransitionRule>, WorkflowError> {
        let state = self.current_state(instance).await?;
        Ok(self.table.outgoing(state).into_iter().copied().collect())
    }

    async fn persist_state(
        &self,
        instance: &InstanceId,
        state: WorkflowState,
    ) -> Result<(), WorkflowError> {
        let key = instance.state_key();
        self.store
            .put(&key, state.as_str().as_bytes())
            .await
            .map_err(|source| WorkflowError::StoreWrite { key, source })
    }
}

/// Stored states may be NUL padded; only the bytes before the first NUL count.
/// Bytes that are not UTF-8 are reported escaped, as stored.
pub fn decode_state(raw: &[u8]) -> Result<WorkflowState, WorkflowError> {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    let name = std::str::from_utf8(&raw[..end])
        .map_err(|_| WorkflowError::UnknownState(raw[..end].escape_ascii().to_string()))?;
    WorkflowState::parse(name)
}
