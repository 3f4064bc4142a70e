// ============================================================================
// RustMemDB Client Driver
// ============================================================================
//
// Async client driver for RustMemDB. The visible core is transaction
// control: mapping isolation level + access mode to the exact
// START TRANSACTION statement the server expects, and driving the
// begin -> commit/rollback protocol over a borrowed connection under a
// cancellation-aware context.
//
// Connection establishment, pooling, and row decoding live in the
// collaborating crates; this one only consumes a "prepare and execute a SQL
// string under a context" capability.
//
// ============================================================================

pub mod connection;
pub mod context;
pub mod core;
pub mod transaction;

// Re-export main types for convenience
pub use crate::core::{DriverError, Result, Value};
pub use connection::{Connection, ConnectionConfig, ExecResult, PreparedStatement};
pub use context::{CancellationToken, Context};
pub use transaction::{
    AccessMode, IsolationLevel, Transaction, TransactionOptions, TransactionState,
};
