pub mod config;

use async_trait::async_trait;

use crate::context::Context;
use crate::core::{Result, Value};

pub use config::ConnectionConfig;

/// Result of executing a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecResult {
    /// Number of rows the statement affected, if the server reported one.
    pub rows_affected: u64,
}

/// Server connection capability consumed by the driver core.
///
/// The transaction controller borrows a connection; opening, closing, and
/// handing it out again belong to the pooling collaborator. Implementations
/// should observe the context for their own wire-level waits; the controller
/// additionally races every call against the context, so a canceled
/// round-trip returns promptly either way.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Prepare a SQL statement for execution under the given context.
    async fn prepare<'a>(
        &'a self,
        ctx: &Context,
        sql: &str,
    ) -> Result<Box<dyn PreparedStatement + Send + 'a>>;
}

/// A statement prepared by a [`Connection`], ready to execute.
#[async_trait]
pub trait PreparedStatement: Send {
    /// Execute the statement with the given bound parameters.
    async fn execute(&mut self, params: &[Value]) -> Result<ExecResult>;
}
