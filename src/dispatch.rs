// Dispatcher - routes "function name + string arguments" to the controller
//
// Handlers are registered by name with a declared arity and the entry point
// they belong to. Invoke handlers may write; query handlers only read. A name
// not registered for the entry point it was called through is unknown.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn, Instrument};

use crate::controller::WorkflowController;
use crate::error::WorkflowError;
use crate::instance::InstanceId;
use crate::observability::{OperationTimer, WorkflowMetrics};
use crate::store::StateStore;
use crate::telemetry::{create_invocation_span, generate_correlation_id};
use crate::workflow::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Invoke,
    Query,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::Invoke => f.write_str("invoke"),
            EntryPoint::Query => f.write_str("query"),
        }
    }
}

/// Result of one dispatched call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Bytes returned to the caller, if the operation produces any.
    pub payload: Option<Vec<u8>>,
    /// Set by operations that run the transition engine.
    pub transition: Option<Transition>,
}

impl Response {
    fn empty() -> Self {
        Self::default()
    }

    fn payload(bytes: Vec<u8>) -> Self {
        Self {
            payload: Some(bytes),
            transition: None,
        }
    }
}

#[async_trait]
pub trait OperationHandler<S>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Exact number of arguments the operation takes.
    fn arity(&self) -> usize;

    fn entry_point(&self) -> EntryPoint;

    async fn call(
        &self,
        controller: &WorkflowController<S>,
        instance: &InstanceId,
        args: &[String],
    ) -> Result<Response, WorkflowError>;
}

/// `init <state>`
pub struct InitHandler;

#[async_trait]
impl<S: StateStore> OperationHandler<S> for InitHandler {
    fn name(&self) -> &'static str {
        "init"
    }

    fn arity(&self) -> usize {
        1
    }

    fn entry_point(&self) -> EntryPoint {
        EntryPoint::Invoke
    }

    async fn call(
        &self,
        controller: &WorkflowController<S>,
        instance: &InstanceId,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        controller.bootstrap(instance, &args[0]).await?;
        Ok(Response::empty())
    }
}

/// `send <event>`
pub struct SendHandler;

#[async_trait]
impl<S: StateStore> OperationHandler<S> for SendHandler {
    fn name(&self) -> &'static str {
        "send"
    }

    fn arity(&self) -> usize {
        1
    }

    fn entry_point(&self) -> EntryPoint {
        EntryPoint::Invoke
    }

    async fn call(
        &self,
        controller: &WorkflowController<S>,
        instance: &InstanceId,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        let outcome = controller.advance(instance, &args[0]).await?;
        Ok(Response {
            payload: None,
            transition: Some(outcome),
        })
    }
}

/// `write <key> <value>`
pub struct WriteHandler;

#[async_trait]
impl<S: StateStore> OperationHandler<S> for WriteHandler {
    fn name(&self) -> &'static str {
        "write"
    }

    fn arity(&self) -> usize {
        2
    }

    fn entry_point(&self) -> EntryPoint {
        EntryPoint::Invoke
    }

    async fn call(
        &self,
        controller: &WorkflowController<S>,
        _instance: &InstanceId,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        controller.set_value(&args[0], &args[1]).await?;
        Ok(Response::empty())
    }
}

/// `read <key>`
pub struct ReadHandler;

#[async_trait]
impl<S: StateStore> OperationHandler<S> for ReadHandler {
    fn name(&self) -> &'static str {
        "read"
    }

    fn arity(&self) -> usize {
        1
    }

    fn entry_point(&self) -> EntryPoint {
        EntryPoint::Query
    }

    async fn call(
        &self,
        controller: &WorkflowController<S>,
        _instance: &InstanceId,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        let value = controller.get_value(&args[0]).await?;
        Ok(Response::payload(value))
    }
}

/// `state` - current state of the instance
pub struct StateHandler;

#[async_trait]
impl<S: StateStore> OperationHandler<S> for StateHandler {
    fn name(&self) -> &'static str {
        "state"
    }

    fn arity(&self) -> usize {
        0
    }

    fn entry_point(&self) -> EntryPoint {
        EntryPoint::Query
    }

    async fn call(
        &self,
        controller: &WorkflowController<S>,
        instance: &InstanceId,
        _args: &[String],
    ) -> Result<Response, WorkflowError> {
        let state = controller.current_state(instance).await?;
        Ok(Response::payload(state.as_str().as_bytes().to_vec()))
    }
}

pub struct Dispatcher<S> {
    controller: WorkflowController<S>,
    handlers: HashMap<&'static str, Box<dyn OperationHandler<S>>>,
    metrics: WorkflowMetrics,
}

impl<S: StateStore> Dispatcher<S> {
    /// Dispatcher with the standard `init`, `send`, `write`, `read` and
    /// `state` operations registered.
    pub fn new(controller: WorkflowController<S>) -> Self {
        let mut dispatcher = Self {
            controller,
            handlers: HashMap::new(),
            metrics: WorkflowMetrics::new(),
        };
        dispatcher.register(Box::new(InitHandler));
        dispatcher.register(Box::new(SendHandler));
        dispatcher.register(Box::new(WriteHandler));
        dispatcher.register(Box::new(ReadHandler));
        dispatcher.register(Box::new(StateHandler));
        dispatcher
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(
        &mut self,
        handler: Box<dyn OperationHandler<S>>,
    ) -> Option<Box<dyn OperationHandler<S>>> {
        self.handlers.insert(handler.name(), handler)
    }

    /// `(name, arity, entry point)` for every registered operation, by name.
    pub fn operations(&self) -> Vec<(&'static str, usize, EntryPoint)> {
        let mut operations: Vec<_> = self
            .handlers
            .values()
            .map(|h| (h.name(), h.arity(), h.entry_point()))
            .collect();
        operations.sort_by_key(|(name, _, _)| *name);
        operations
    }

    pub fn controller(&self) -> &WorkflowController<S> {
        &self.controller
    }

    pub fn metrics(&self) -> &WorkflowMetrics {
        &self.metrics
    }

    /// Initialisation form: same as invoking `init`.
    pub async fn init(
        &self,
        instance: &InstanceId,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        self.dispatch(EntryPoint::Invoke, instance, "init", args).await
    }

    pub async fn invoke(
        &self,
        instance: &InstanceId,
        function: &str,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        self.dispatch(EntryPoint::Invoke, instance, function, args).await
    }

    pub async fn query(
        &self,
        instance: &InstanceId,
        function: &str,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        self.dispatch(EntryPoint::Query, instance, function, args).await
    }

    async fn dispatch(
        &self,
        entry_point: EntryPoint,
        instance: &InstanceId,
        function: &str,
        args: &[String],
    ) -> Result<Response, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_invocation_span(
            function,
            &entry_point.to_string(),
            instance.as_str(),
            &correlation_id,
        );

        async move {
            self.metrics.record_invocation();
            info!("{} is running {}", entry_point, function);

            let handler = match self.handlers.get(function) {
                Some(handler) if handler.entry_point() == entry_point => handler,
                _ => {
                    info!("{} did not find func: {}", entry_point, function);
                    self.metrics.record_failure();
                    return Err(WorkflowError::UnknownOperation {
                        name: function.to_string(),
                    });
                }
            };

            if args.len() != handler.arity() {
                self.metrics.record_failure();
                return Err(WorkflowError::ArgumentCount {
                    operation: function.to_string(),
                    expected: handler.arity(),
                    actual: args.len(),
                });
            }

            let timer = OperationTimer::new(function);
            let result = handler.call(&self.controller, instance, args).await;
            timer.finish();

            match &result {
                Ok(response) => {
                    if let Some(outcome) = &response.transition {
                        self.metrics.record_transition(outcome);
                    }
                }
                Err(e) => {
                    self.metrics.record_failure();
                    warn!(error = %e, "{} failed", function);
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn dispatcher() -> (Dispatcher<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (
            Dispatcher::new(WorkflowController::new(store.clone())),
            store,
        )
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_standard_operations_registered() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            dispatcher.operations(),
            vec![
                ("init", 1, EntryPoint::Invoke),
                ("read", 1, EntryPoint::Query),
                ("send", 1, EntryPoint::Invoke),
                ("state", 0, EntryPoint::Query),
                ("write", 2, EntryPoint::Invoke),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_operation_names_the_function() {
        let (dispatcher, _) = dispatcher();
        let instance = InstanceId::default();
        let err = dispatcher
            .invoke(&instance, "frobnicate", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownOperation { ref name } if name == "frobnicate"));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[tokio::test]
    async fn test_entry_points_do_not_cross() {
        let (dispatcher, _) = dispatcher();
        let instance = InstanceId::default();
        let err = dispatcher
            .invoke(&instance, "read", &args(&["k"]))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownOperation { .. }));

        let err = dispatcher
            .query(&instance, "write", &args(&["k", "v"]))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownOperation { .. }));
    }

    #[tokio::test]
    async fn test_init_arity_checked_before_any_write() {
        let (dispatcher, store) = dispatcher();
        let instance = InstanceId::default();

        for bad in [args(&[]), args(&["initial", "extra"])] {
            let err = dispatcher.init(&instance, &bad).await.unwrap_err();
            assert!(matches!(
                err,
                WorkflowError::ArgumentCount { expected: 1, .. }
            ));
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_metrics_track_outcomes() {
        let (dispatcher, _) = dispatcher();
        let instance = InstanceId::default();
        dispatcher.init(&instance, &args(&["initial"])).await.unwrap();
        dispatcher
            .invoke(&instance, "send", &args(&["Imp_PO_Template_Open"]))
            .await
            .unwrap();
        dispatcher
            .invoke(&instance, "send", &args(&["Imp_PO_Template_Open"]))
            .await
            .unwrap();
        let _ = dispatcher.query(&instance, "read", &args(&["nope"])).await;

        let stats = dispatcher.metrics().get_stats();
        assert_eq!(stats.invocations, 4);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.transitions_moved, 1);
        assert_eq!(stats.transitions_unchanged, 1);
    }

    #[tokio::test]
    async fn test_state_query_returns_wire_name() {
        let (dispatcher, _) = dispatcher();
        let instance = InstanceId::new("po-7").unwrap();
        dispatcher
            .init(&instance, &args(&["Exp_PO_Draft"]))
            .await
            .unwrap();
        let response = dispatcher.query(&instance, "state", &[]).await.unwrap();
        assert_eq!(response.payload, Some(b"Exp_PO_Draft".to_vec()));
    }
}
