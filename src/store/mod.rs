// State Store - byte-oriented key/value primitive the workflow persists into
//
// Backends offer last-write-wins get/put and nothing more. The controller
// never assumes transactions.

use async_trait::async_trait;
use std::sync::Arc;

pub mod file;
pub mod memory;

pub use crate::error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the bytes stored under `key`; `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing whatever was there.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value).await
    }
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Box<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value).await
    }
}
