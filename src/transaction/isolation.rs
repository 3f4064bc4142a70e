use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{DriverError, Result};

/// Transaction isolation level; controls the degree to which a transaction
/// is isolated from the effects of concurrent transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IsolationLevel {
    /// Let the server pick its configured default.
    #[default]
    Default,

    /// Dirty reads are allowed: statements may see changes other
    /// transactions have not yet committed.
    ReadUncommitted,

    /// Statements only see data committed before each statement began.
    ReadCommitted,

    /// Statements only see data committed before the transaction began.
    RepeatableRead,

    /// Transactions behave as if executed one after another.
    Serializable,
}

impl IsolationLevel {
    /// Decode the raw level code carried by generic driver options.
    ///
    /// Unknown codes are rejected here, before any SQL is built, so a
    /// transaction never silently runs under an unintended isolation
    /// guarantee.
    pub fn from_raw(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Default),
            1 => Ok(Self::ReadUncommitted),
            2 => Ok(Self::ReadCommitted),
            3 => Ok(Self::RepeatableRead),
            4 => Ok(Self::Serializable),
            other => Err(DriverError::UnsupportedIsolation(other)),
        }
    }

    /// The clause appended to `START TRANSACTION`, leading space included.
    ///
    /// Keyword text is what the server parses; case and spacing matter.
    pub fn sql_clause(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::ReadUncommitted => " READ UNCOMMITTED",
            Self::ReadCommitted => " READ COMMITTED",
            Self::RepeatableRead => " REPEATABLE READ",
            Self::Serializable => " SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "DEFAULT"),
            Self::ReadUncommitted => write!(f, "READ UNCOMMITTED"),
            Self::ReadCommitted => write!(f, "READ COMMITTED"),
            Self::RepeatableRead => write!(f, "REPEATABLE READ"),
            Self::Serializable => write!(f, "SERIALIZABLE"),
        }
    }
}

/// Whether a transaction may modify data or only read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    #[default]
    ReadWrite,
    ReadOnly,
}

impl AccessMode {
    /// The clause appended after the isolation clause, leading space
    /// included. Exactly one of the two is always emitted.
    pub fn sql_clause(&self) -> &'static str {
        match self {
            Self::ReadWrite => " READ WRITE",
            Self::ReadOnly => " READ ONLY",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

impl From<bool> for AccessMode {
    /// `true` means read-only, mirroring the driver-level flag.
    fn from(read_only: bool) -> Self {
        if read_only {
            Self::ReadOnly
        } else {
            Self::ReadWrite
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadWrite => write!(f, "READ WRITE"),
            Self::ReadOnly => write!(f, "READ ONLY"),
        }
    }
}

/// Options a transaction is started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionOptions {
    pub isolation: IsolationLevel,
    pub access_mode: AccessMode,
}

impl TransactionOptions {
    /// Server-default isolation, read-write access.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the isolation level
    pub fn isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    /// Set the access mode
    pub fn access_mode(mut self, access_mode: AccessMode) -> Self {
        self.access_mode = access_mode;
        self
    }

    /// Mark the transaction read-only
    pub fn read_only(mut self) -> Self {
        self.access_mode = AccessMode::ReadOnly;
        self
    }

    /// Decode the raw (level code, read-only flag) pair used by generic
    /// driver frameworks.
    pub fn from_raw(isolation: u8, read_only: bool) -> Result<Self> {
        Ok(Self {
            isolation: IsolationLevel::from_raw(isolation)?,
            access_mode: AccessMode::from(read_only),
        })
    }

    /// Render the `START TRANSACTION` statement for these options.
    pub fn start_statement(&self) -> String {
        let mut statement = String::from("START TRANSACTION");
        statement.push_str(self.isolation.sql_clause());
        statement.push_str(self.access_mode.sql_clause());
        statement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_statement_covers_every_level_and_mode() {
        let cases = [
            (
                IsolationLevel::ReadUncommitted,
                AccessMode::ReadWrite,
                "START TRANSACTION READ UNCOMMITTED READ WRITE",
            ),
            (
                IsolationLevel::ReadUncommitted,
                AccessMode::ReadOnly,
                "START TRANSACTION READ UNCOMMITTED READ ONLY",
            ),
            (
                IsolationLevel::ReadCommitted,
                AccessMode::ReadWrite,
                "START TRANSACTION READ COMMITTED READ WRITE",
            ),
            (
                IsolationLevel::ReadCommitted,
                AccessMode::ReadOnly,
                "START TRANSACTION READ COMMITTED READ ONLY",
            ),
            (
                IsolationLevel::RepeatableRead,
                AccessMode::ReadWrite,
                "START TRANSACTION REPEATABLE READ READ WRITE",
            ),
            (
                IsolationLevel::RepeatableRead,
                AccessMode::ReadOnly,
                "START TRANSACTION REPEATABLE READ READ ONLY",
            ),
            (
                IsolationLevel::Serializable,
                AccessMode::ReadWrite,
                "START TRANSACTION SERIALIZABLE READ WRITE",
            ),
            (
                IsolationLevel::Serializable,
                AccessMode::ReadOnly,
                "START TRANSACTION SERIALIZABLE READ ONLY",
            ),
            (
                IsolationLevel::Default,
                AccessMode::ReadWrite,
                "START TRANSACTION READ WRITE",
            ),
            (
                IsolationLevel::Default,
                AccessMode::ReadOnly,
                "START TRANSACTION READ ONLY",
            ),
        ];

        for (isolation, access_mode, expected) in cases {
            let options = TransactionOptions::new()
                .isolation(isolation)
                .access_mode(access_mode);
            assert_eq!(options.start_statement(), expected);
        }
    }

    #[test]
    fn test_from_raw_known_codes() {
        assert_eq!(IsolationLevel::from_raw(0).unwrap(), IsolationLevel::Default);
        assert_eq!(
            IsolationLevel::from_raw(1).unwrap(),
            IsolationLevel::ReadUncommitted
        );
        assert_eq!(
            IsolationLevel::from_raw(2).unwrap(),
            IsolationLevel::ReadCommitted
        );
        assert_eq!(
            IsolationLevel::from_raw(3).unwrap(),
            IsolationLevel::RepeatableRead
        );
        assert_eq!(
            IsolationLevel::from_raw(4).unwrap(),
            IsolationLevel::Serializable
        );
    }

    #[test]
    fn test_from_raw_rejects_unknown_codes() {
        for code in [5u8, 17, 99, 255] {
            let err = IsolationLevel::from_raw(code).unwrap_err();
            assert!(matches!(err, DriverError::UnsupportedIsolation(c) if c == code));
        }

        let err = TransactionOptions::from_raw(99, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported transaction isolation level: 99"
        );
    }

    #[test]
    fn test_from_raw_read_only_flag() {
        let options = TransactionOptions::from_raw(2, true).unwrap();
        assert_eq!(options.isolation, IsolationLevel::ReadCommitted);
        assert!(options.access_mode.is_read_only());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(IsolationLevel::RepeatableRead.to_string(), "REPEATABLE READ");
        assert_eq!(AccessMode::ReadOnly.to_string(), "READ ONLY");
    }
}
