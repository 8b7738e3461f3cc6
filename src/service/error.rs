use thiserror::Error;

use crate::repository::RepositoryError;
use crate::uniswap::MathError;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    // Validation errors
    /// The provided address is invalid or malformed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The token was not found or is not supported.
    #[error("Token not found or not supported: {0}")]
    TokenNotFound(String),

    /// The requested amount is invalid (e.g., negative or malformed).
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The fee is not one of the tiers enabled on the factory.
    #[error("Invalid fee tier: {0}")]
    InvalidFeeTier(u32),

    /// A tick or tick range could not be used to build a position.
    #[error("Invalid tick range: {0}")]
    InvalidTickRange(String),

    /// The account has insufficient balance for the requested operation.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    /// The configured tokens are not the ones stored in the pool.
    #[error("Pool {pool} does not hold token {token}")]
    TokenNotInPool { pool: String, token: String },

    /// A write path was invoked without a signer.
    #[error("No signer available: {0}")]
    MissingSigner(String),

    /// A receipt lacked a field the operation depends on.
    #[error("Missing receipt data: {0}")]
    MissingReceiptData(String),

    // Infrastructure errors (abstracted from repository layer)
    /// An error occurred while communicating with the blockchain.
    #[error("Blockchain connection error: {0}")]
    BlockchainError(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::RpcError(msg)
            | RepositoryError::ContractError(msg)
            | RepositoryError::TransactionError(msg) => {
                ServiceError::BlockchainError(format!("Failed to interact with blockchain: {msg}"))
            }
            RepositoryError::ParseError(msg) => ServiceError::InvalidAddress(msg),
            RepositoryError::MissingSigner(msg) => ServiceError::MissingSigner(msg),
            RepositoryError::Other(msg) => ServiceError::InternalError(msg),
        }
    }
}

impl From<MathError> for ServiceError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InvalidFeeTier(fee) => ServiceError::InvalidFeeTier(fee),
            MathError::IdenticalTokens(token) => {
                ServiceError::TokenNotFound(format!("{token} cannot be paired with itself"))
            }
            MathError::TickOutOfBounds(_)
            | MathError::InvalidTickSpacing(_)
            | MathError::TickSpacingMismatch { .. } => {
                ServiceError::InvalidTickRange(err.to_string())
            }
            MathError::AmountTooLarge(_) => ServiceError::InvalidAmount(err.to_string()),
            MathError::Sdk(msg) => ServiceError::InternalError(msg),
        }
    }
}
