use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Tick {0} is outside of the supported range")]
    TickOutOfBounds(i64),

    #[error("Tick spacing must be positive, got {0}")]
    InvalidTickSpacing(i32),

    #[error("Unsupported fee tier: {0}")]
    InvalidFeeTier(u32),

    #[error("Token {0} cannot be paired with itself")]
    IdenticalTokens(Address),

    #[error("Pool tick spacing {actual} does not match fee tier {fee} (expected {expected})")]
    TickSpacingMismatch { fee: u32, expected: i32, actual: i32 },

    #[error("Amount {0} is too large to size a position")]
    AmountTooLarge(U256),

    #[error("Uniswap SDK: {0}")]
    Sdk(String),
}

impl From<uniswap_v3_sdk::error::Error> for MathError {
    fn from(err: uniswap_v3_sdk::error::Error) -> Self {
        MathError::Sdk(format!("{err:?}"))
    }
}

impl From<uniswap_sdk_core::error::Error> for MathError {
    fn from(err: uniswap_sdk_core::error::Error) -> Self {
        MathError::Sdk(format!("{err:?}"))
    }
}
