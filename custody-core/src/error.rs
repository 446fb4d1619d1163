//! Error types for the custody engines

use thiserror::Error;

/// Result type for custody operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custody errors
///
/// Every mutating operation either fully commits or returns exactly one of
/// these; no partial state change is observable afterwards.
#[derive(Error, Debug)]
pub enum Error {
    /// Non-positive amount, self-trade, malformed identifier, lock below minimum
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller is not the required seller/buyer/owner for the transition
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Trade id or savings index does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Trade already completed/cancelled, or savings entry already withdrawn
    #[error("Already finalized: {0}")]
    AlreadyFinalized(String),

    /// Savings withdrawal attempted before the unlock time
    #[error("Not yet unlocked: {0} seconds remaining")]
    NotYetUnlocked(u64),

    /// Transfer primitive reports insufficient balance or allowance
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Unauthorized("caller is not the buyer".to_string());
        assert_eq!(err.to_string(), "Unauthorized: caller is not the buyer");

        let err = Error::NotYetUnlocked(86_400);
        assert!(err.to_string().contains("86400"));
    }
}
