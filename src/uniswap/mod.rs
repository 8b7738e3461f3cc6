//! Glue between the services and the Uniswap SDK crates.
//!
//! Pool addresses, tick math and position sizing come from `uniswap-v3-sdk`;
//! this module maps raw on-chain values onto the SDK types and turns SDK
//! failures into `MathError`. Everything here is pure.

mod error;
mod pool_address;
mod position;

pub use error::MathError;
pub use pool_address::{POOL_INIT_CODE_HASH, fee_amount, pool_address};
pub use position::{MintPlan, minimum_amount, plan_mint, sdk_pool, tick_range_around};

pub type MathResult<T> = std::result::Result<T, MathError>;
