//! # Workflow Engine Interface
//!
//! The control plane executes its orchestration procedures on an external
//! durable workflow engine. Workflow histories are persisted and replayed by
//! that engine; this crate only defines the surface workflow code sees:
//!
//! - **Determinism**: workflow code must be replay-safe. Every
//!   nondeterministic value (UUIDs, clocks, random choice) is obtained via
//!   [`WorkflowContext::side_effect`], whose result is recorded on first
//!   execution and replayed verbatim afterwards.
//! - **Activities**: the only channel to the outside world. Invoked by name
//!   with JSON payloads and declarative [`ActivityOptions`] (timeouts, retry
//!   policy, task-queue routing).
//! - **Child workflows**: started by name with a caller-chosen workflow id
//!   that doubles as the engine-level dedup key.
//!
//! ## Example
//!
//! ```ignore
//! use hosting_engine::prelude::*;
//!
//! async fn greet(ctx: &dyn WorkflowContext, name: String) -> Result<(), WorkflowError> {
//!     let _: () = ctx
//!         .activity("SendGreeting", &name, ActivityOptions::default())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod options;
pub mod registry;
pub mod retry;
pub mod testing;

/// Prelude for common imports
pub mod prelude {
    pub use crate::context::{ChildWorkflowRequest, WorkflowContext, WorkflowContextExt};
    pub use crate::error::{ActivityError, WorkflowError};
    pub use crate::options::ActivityOptions;
    pub use crate::registry::{RegistryError, WorkflowHandler, WorkflowRegistry};
    pub use crate::retry::RetryPolicy;
}

pub use context::{ChildWorkflowRequest, WorkflowContext, WorkflowContextExt};
pub use error::{ActivityError, WorkflowError};
pub use options::ActivityOptions;
pub use registry::{RegistryError, WorkflowHandler, WorkflowRegistry};
pub use retry::RetryPolicy;
