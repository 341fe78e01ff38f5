//! Error types for the payout engine

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for payout engine operations
pub type Result<T> = std::result::Result<T, PayoutError>;

/// Errors that can occur while computing pools, payouts and calcutta settlements
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayoutError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown template: {key}")]
    UnknownTemplate { key: String },

    #[error("Empty standings cannot absorb a pool of {pool_cents} cents")]
    EmptyStandings { pool_cents: i64 },

    #[error("Malformed template {key}: {message}")]
    MalformedTemplate { key: String, message: String },

    #[error("Invalid standings: {message}")]
    InvalidStandings { message: String },

    #[error("Invalid calcutta bids: {message}")]
    InvalidBids { message: String },

    #[error("No paying place of template {key} is held by an eligible finisher")]
    NoEligibleSlots { key: String },

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),
}

impl PayoutError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        PayoutError::InvalidConfig { message: message.into() }
    }

    pub(crate) fn malformed(key: &str, message: impl Into<String>) -> Self {
        PayoutError::MalformedTemplate { key: key.to_string(), message: message.into() }
    }
}
