use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tracing::instrument;
use uniswap_sdk_core::prelude::*;

use crate::config::UniswapConfig;
use crate::repository::EthereumRepository;
use crate::service::pool::PoolService;
use crate::service::types::{Quote, Token, symbol_of};
use crate::service::utils::{format_units, parse_amount, truncate_display};
use crate::service::{ServiceError, ServiceResult};

/// Prices single-hop exact-input swaps through the Uniswap V3 Quoter.
///
/// Read-only: the quoter is invoked through `eth_call` and nothing is signed.
pub struct QuoterService {
    repository: Arc<dyn EthereumRepository>,
    pools: PoolService,
    quoter: Address,
}

impl QuoterService {
    pub fn new(repository: Arc<dyn EthereumRepository>, uniswap: &UniswapConfig) -> Self {
        Self {
            pools: PoolService::new(repository.clone(), uniswap),
            repository,
            quoter: uniswap.quoter,
        }
    }

    /// Quotes `amount_in` (human units of `token_in`) into `token_out`.
    ///
    /// `formatted` holds the first `display_chars` characters of the output
    /// amount expressed in `token_out` units.
    #[instrument(skip(self, token_in, token_out), fields(symbol_in = symbol_of(token_in), symbol_out = symbol_of(token_out)), err)]
    pub async fn quote(
        &self,
        token_in: &Token,
        token_out: &Token,
        fee: u32,
        amount_in: &str,
        display_chars: usize,
    ) -> ServiceResult<Quote> {
        let pool = self.pools.pool_address(token_in, token_out, fee)?;

        let amount_in_raw = parse_amount(amount_in, token_in.decimals())?;
        if amount_in_raw.is_zero() {
            return Err(ServiceError::InvalidAmount(format!(
                "Amount must be greater than zero: {amount_in}"
            )));
        }

        let immutables = self.repository.get_pool_immutables(pool).await?;

        // route with the pool's own token addresses
        let (address_in, address_out) = (token_in.address(), token_out.address());
        let (pool_in, pool_out) = if immutables.token0 == address_in
            && immutables.token1 == address_out
        {
            (immutables.token0, immutables.token1)
        } else if immutables.token1 == address_in && immutables.token0 == address_out {
            (immutables.token1, immutables.token0)
        } else {
            return Err(ServiceError::TokenNotInPool {
                pool: pool.to_string(),
                token: format!("{}/{}", symbol_of(token_in), symbol_of(token_out)),
            });
        };

        let amount_out_raw = self
            .repository
            .quote_exact_input_single(
                self.quoter,
                pool_in,
                pool_out,
                immutables.fee,
                amount_in_raw,
                U256::ZERO,
            )
            .await?;

        let formatted = truncate_display(
            &format_units(amount_out_raw, token_out.decimals()),
            display_chars,
        );

        tracing::info!(
            "Quote: {} {} -> {} {} (pool {}, fee {})",
            amount_in,
            symbol_of(token_in),
            formatted,
            symbol_of(token_out),
            pool,
            immutables.fee
        );

        Ok(Quote {
            pool,
            token_in: pool_in,
            token_out: pool_out,
            fee: immutables.fee,
            amount_in_raw: amount_in_raw.to_string(),
            amount_out_raw: amount_out_raw.to_string(),
            formatted,
        })
    }
}
