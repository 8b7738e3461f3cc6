use std::sync::Arc;

use alloy::primitives::{Address, B256};
use tracing::instrument;
use uniswap_sdk_core::prelude::*;

use crate::config::UniswapConfig;
use crate::repository::EthereumRepository;
use crate::service::ServiceResult;
use crate::service::types::{PoolInfo, Token, symbol_of};
use crate::uniswap::{fee_amount, pool_address};

/// Locates Uniswap V3 pools and reads their current state.
#[derive(Clone)]
pub struct PoolService {
    repository: Arc<dyn EthereumRepository>,
    factory: Address,
    init_code_hash: B256,
}

impl PoolService {
    pub fn new(repository: Arc<dyn EthereumRepository>, uniswap: &UniswapConfig) -> Self {
        Self {
            repository,
            factory: uniswap.factory,
            init_code_hash: uniswap.pool_init_code_hash,
        }
    }

    /// Deterministic address of the `token_a`/`token_b` pool at `fee`. No
    /// network access.
    pub fn pool_address(&self, token_a: &Token, token_b: &Token, fee: u32) -> ServiceResult<Address> {
        let pool = pool_address(
            self.factory,
            token_a.address(),
            token_b.address(),
            fee_amount(fee)?,
            self.init_code_hash,
        )?;
        Ok(pool)
    }

    /// Reads the full state of the `token_a`/`token_b` pool.
    ///
    /// The six underlying reads run concurrently; the snapshot is only
    /// returned once all of them succeeded.
    #[instrument(skip(self, token_a, token_b), fields(symbol_a = symbol_of(token_a), symbol_b = symbol_of(token_b)), err)]
    pub async fn pool_info(&self, token_a: &Token, token_b: &Token, fee: u32) -> ServiceResult<PoolInfo> {
        let address = self.pool_address(token_a, token_b, fee)?;
        tracing::debug!(
            "Resolved {}/{} pool at {}",
            symbol_of(token_a),
            symbol_of(token_b),
            address
        );

        let state = self.repository.get_pool_state(address).await?;

        let info = PoolInfo {
            address,
            token0: state.token0,
            token1: state.token1,
            fee: state.fee,
            tick_spacing: state.tick_spacing,
            liquidity: state.liquidity,
            sqrt_price_x96: state.sqrt_price_x96,
            tick: state.tick,
        };

        tracing::info!(
            "Pool {}: token0={}, token1={}, fee={}, tickSpacing={}, liquidity={}, sqrtPriceX96={}, tick={}",
            info.address,
            info.token0,
            info.token1,
            info.fee,
            info.tick_spacing,
            info.liquidity,
            info.sqrt_price_x96,
            info.tick
        );

        Ok(info)
    }
}
