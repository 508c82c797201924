//! Workflow registry for name-based dispatch
//!
//! The registry maps workflow type names to type-erased async handlers.
//! Workers hand it to the engine runtime, which resolves incoming workflow
//! tasks by name; tests use it to invoke workflows the same way the engine
//! does.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::context::WorkflowContext;
use crate::error::WorkflowError;

/// Type-erased workflow handler
///
/// Takes the execution context and the JSON input, returns the JSON result.
pub type WorkflowHandler = Arc<
    dyn Fn(Arc<dyn WorkflowContext>, Value) -> BoxFuture<'static, Result<Value, WorkflowError>>
        + Send
        + Sync,
>;

/// Registry of workflow handlers keyed by workflow type name
pub struct WorkflowRegistry {
    handlers: HashMap<String, WorkflowHandler>,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a raw handler under a workflow type name
    ///
    /// Panics if the name is already taken; duplicate registrations are a
    /// wiring bug, not a runtime condition.
    pub fn register(&mut self, workflow_type: impl Into<String>, handler: WorkflowHandler) {
        let workflow_type = workflow_type.into();
        if self
            .handlers
            .insert(workflow_type.clone(), handler)
            .is_some()
        {
            panic!("workflow type registered twice: {workflow_type}");
        }
    }

    /// Register a typed async workflow function
    ///
    /// # Example
    ///
    /// ```ignore
    /// registry.register_fn("CreateTenant", |ctx, tenant_id: String| async move {
    ///     create_tenant(ctx.as_ref(), &tenant_id).await
    /// });
    /// ```
    pub fn register_fn<I, O, F, Fut>(&mut self, workflow_type: impl Into<String>, f: F)
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + 'static,
        F: Fn(Arc<dyn WorkflowContext>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, WorkflowError>> + Send + 'static,
    {
        let f = Arc::new(f);
        let handler: WorkflowHandler = Arc::new(move |ctx, input| {
            let f = f.clone();
            Box::pin(async move {
                let typed: I = serde_json::from_value(input).map_err(|e| {
                    WorkflowError::new(format!("failed to deserialize workflow input: {e}"))
                })?;
                let output = f(ctx, typed).await?;
                serde_json::to_value(output).map_err(|e| {
                    WorkflowError::new(format!("failed to serialize workflow result: {e}"))
                })
            })
        });
        self.register(workflow_type, handler);
    }

    /// Check if a workflow type is registered
    pub fn contains(&self, workflow_type: &str) -> bool {
        self.handlers.contains_key(workflow_type)
    }

    /// Invoke a registered workflow by name
    pub async fn run(
        &self,
        workflow_type: &str,
        ctx: Arc<dyn WorkflowContext>,
        input: Value,
    ) -> Result<Value, RegistryError> {
        let handler = self
            .handlers
            .get(workflow_type)
            .ok_or_else(|| RegistryError::UnknownWorkflowType(workflow_type.to_string()))?;

        handler(ctx, input).await.map_err(RegistryError::Workflow)
    }

    /// Get the number of registered workflow types
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Get all registered workflow type names
    pub fn workflow_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|s| s.as_str())
    }
}

impl fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("WorkflowRegistry")
            .field("workflow_types", &types)
            .finish()
    }
}

/// Errors from registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Workflow type not registered
    #[error("unknown workflow type: {0}")]
    UnknownWorkflowType(String),

    /// The workflow handler returned an error
    #[error("workflow failed: {0}")]
    Workflow(#[source] WorkflowError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedContext;

    #[tokio::test]
    async fn test_register_and_run() {
        let mut registry = WorkflowRegistry::new();
        registry.register_fn("Double", |_ctx, n: i32| async move { Ok(n * 2) });

        assert!(registry.contains("Double"));
        assert!(!registry.contains("Unknown"));

        let ctx = Arc::new(ScriptedContext::new());
        let result = registry
            .run("Double", ctx, serde_json::json!(21))
            .await
            .unwrap();

        assert_eq!(result, serde_json::json!(42));
    }

    #[tokio::test]
    async fn test_unknown_workflow_type() {
        let registry = WorkflowRegistry::new();
        let ctx = Arc::new(ScriptedContext::new());
        let result = registry.run("Unknown", ctx, Value::Null).await;

        assert!(matches!(result, Err(RegistryError::UnknownWorkflowType(_))));
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let mut registry = WorkflowRegistry::new();
        registry.register_fn("Double", |_ctx, n: i32| async move { Ok(n * 2) });

        let ctx = Arc::new(ScriptedContext::new());
        let result = registry
            .run("Double", ctx, serde_json::json!("not a number"))
            .await;

        assert!(matches!(result, Err(RegistryError::Workflow(_))));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = WorkflowRegistry::new();
        registry.register_fn("Double", |_ctx, n: i32| async move { Ok(n * 2) });
        registry.register_fn("Double", |_ctx, n: i32| async move { Ok(n * 3) });
    }

    #[test]
    fn test_registry_debug() {
        let mut registry = WorkflowRegistry::new();
        registry.register_fn("Double", |_ctx, n: i32| async move { Ok(n * 2) });

        let debug_str = format!("{:?}", registry);
        assert!(debug_str.contains("Double"));
    }
}
