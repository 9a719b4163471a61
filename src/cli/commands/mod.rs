use anyhow::Result;
use std::path::PathBuf;

use crate::config::MarineFlowConfig;
use crate::controller::WorkflowController;
use crate::dispatch::Dispatcher;
use crate::instance::InstanceId;
use crate::store::FileStore;

pub mod invoke;
pub mod rules;
pub mod status;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Store location and instance a command runs against
#[derive(Debug, Clone)]
pub struct Target {
    pub data_dir: PathBuf,
    pub instance: InstanceId,
}

impl Target {
    /// Command-line values win over configuration.
    pub fn resolve(
        config: &MarineFlowConfig,
        instance: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let instance = instance.unwrap_or_else(|| config.workflow.default_instance.clone());
        Ok(Self {
            data_dir: data_dir.unwrap_or_else(|| config.store.data_dir.clone()),
            instance: InstanceId::new(instance)?,
        })
    }
}

pub async fn with_dispatcher<F, Fut, R>(target: &Target, f: F) -> Result<R>
where
    F: FnOnce(Dispatcher<FileStore>) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    let store = FileStore::open(&target.data_dir).await?;
    let dispatcher = Dispatcher::new(WorkflowController::new(store));
    f(dispatcher).await
}
