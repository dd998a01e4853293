//! Transaction error types.

use thiserror::Error;

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors that can occur during transaction operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// `COMMIT` or `ROLLBACK` was issued with no open transaction.
    #[error("NO TRANSACTION")]
    NoTransaction,
}

impl TransactionError {
    /// Check if the caller can keep using the store after this error.
    ///
    /// Every transaction error leaves the store untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TransactionError::NoTransaction)
    }
}
