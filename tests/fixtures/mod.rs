//! Shared test doubles for the workflow integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use marine_flow::{
    Dispatcher, InstanceId, MemoryStore, StateStore, StoreError, WorkflowController,
};

/// Memory store whose reads and writes can be made to fail on demand.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("injected read failure for {}", key)));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("injected write failure for {}", key)));
        }
        self.inner.put(key, value).await
    }
}

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn memory_dispatcher() -> (Dispatcher<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    (Dispatcher::new(WorkflowController::new(store.clone())), store)
}

pub fn flaky_dispatcher() -> (Dispatcher<FlakyStore>, FlakyStore) {
    let store = FlakyStore::new();
    (Dispatcher::new(WorkflowController::new(store.clone())), store)
}

pub fn instance(id: &str) -> InstanceId {
    InstanceId::new(id).expect("valid instance id")
}

/// Stored state of `instance` as text, `None` when unset.
pub async fn stored_state<S: StateStore>(store: &S, instance: &InstanceId) -> Option<String> {
    store
        .get(&instance.state_key())
        .await
        .expect("store read")
        .map(|raw| String::from_utf8_lossy(&raw).into_owned())
}
