//! Error types for the token ledger

use crate::types::{AccountId, Balance};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Source balance is lower than the requested amount
    #[error("Insufficient funds in {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Account that was debited
        account: AccountId,
        /// Balance before the operation
        available: Balance,
        /// Requested amount
        requested: Balance,
    },

    /// Negative or fractional amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Caller does not hold the burn capability
    #[error("Unauthorized caller: {0}")]
    Unauthorized(AccountId),

    /// Malformed event during replay
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Invariant violation (supply conservation)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Numeric error code.
    ///
    /// Insufficient funds keeps code 500 so existing callers that match on
    /// the numeric value continue to work.
    pub fn code(&self) -> u32 {
        match self {
            Error::InsufficientFunds { .. } => 500,
            Error::InvalidAmount(_) => 501,
            Error::Unauthorized(_) => 401,
            Error::InvalidEvent(_) => 422,
            Error::InvariantViolation(_) => 550,
            Error::Concurrency(_) => 503,
            Error::Config(_) | Error::Io(_) => 400,
        }
    }

    /// Expected, caller-visible outcome rather than a fault
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InsufficientFunds { .. } | Error::InvalidAmount(_) | Error::Unauthorized(_)
        )
    }
}
