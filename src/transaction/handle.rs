use std::fmt;

use tracing::debug;

use crate::connection::{Connection, ExecResult};
use crate::context::Context;
use crate::core::{DriverError, Result};

use super::TransactionOptions;

const COMMIT_STATEMENT: &str = "COMMIT";
const ROLLBACK_STATEMENT: &str = "ROLLBACK";

/// Transaction lifecycle state
///
/// State transitions:
/// ```text
/// Active ──commit/rollback──> Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// The transaction is open; exactly one terminal call is allowed.
    Active,

    /// A commit or rollback has been attempted; the handle is spent.
    Finished,
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TransactionState::Finished)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Active => write!(f, "ACTIVE"),
            TransactionState::Finished => write!(f, "FINISHED"),
        }
    }
}

/// An open transaction on a borrowed connection.
///
/// Created by [`Transaction::begin`]. Commit and rollback run on the same
/// connection, under the same context, that begin was given. The handle
/// never opens or closes the connection; the pooling side owns it.
///
/// # Thread Safety
/// A handle is single-owner, as is the connection for the transaction's
/// duration. Mutual exclusion on the physical connection is the pool's job.
pub struct Transaction<'c, C: Connection + ?Sized> {
    conn: &'c C,
    context: Context,
    state: TransactionState,
}

impl<'c, C: Connection + ?Sized> Transaction<'c, C> {
    /// Start a transaction on `conn` with the given options.
    ///
    /// Issues the mapped `START TRANSACTION` statement as one prepare and
    /// one parameterless execute. On any failure no handle is produced and
    /// the server-side state of a partially-started transaction is left as
    /// the server reports it.
    pub async fn begin(
        context: Context,
        conn: &'c C,
        options: TransactionOptions,
    ) -> Result<Self> {
        let statement = options.start_statement();
        debug!(statement = %statement, "beginning transaction");

        run_statement(&context, conn, &statement).await?;

        Ok(Self {
            conn,
            context,
            state: TransactionState::Active,
        })
    }

    /// Commit the transaction.
    ///
    /// On failure the error is surfaced verbatim and the server-side
    /// outcome is unknown to the caller; the handle is spent either way and
    /// no recovery is attempted.
    pub async fn commit(&mut self) -> Result<()> {
        self.finish(COMMIT_STATEMENT).await
    }

    /// Roll back the transaction. Same contract as [`Transaction::commit`].
    pub async fn rollback(&mut self) -> Result<()> {
        self.finish(ROLLBACK_STATEMENT).await
    }

    async fn finish(&mut self, statement: &str) -> Result<()> {
        if self.state.is_finished() {
            return Err(DriverError::TransactionFinished);
        }
        self.state = TransactionState::Finished;

        debug!(statement = %statement, "finishing transaction");
        run_statement(&self.context, self.conn, statement).await?;
        Ok(())
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// The context captured at begin time.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The connection the transaction was started on.
    pub fn connection(&self) -> &C {
        self.conn
    }
}

/// One prepare + one parameterless execute, both raced against the context.
async fn run_statement<C: Connection + ?Sized>(
    context: &Context,
    conn: &C,
    statement: &str,
) -> Result<ExecResult> {
    let mut prepared = context.run(conn.prepare(context, statement)).await?;
    context.run(prepared.execute(&[])).await
}
