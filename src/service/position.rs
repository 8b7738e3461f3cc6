use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{
    Address, TxHash, U256,
    aliases::{I24, U24},
};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use tracing::instrument;
use uniswap_sdk_core::prelude::*;

use crate::config::UniswapConfig;
use crate::repository::contract::{IERC20, INonfungiblePositionManager};
use crate::repository::{EthereumRepository, PositionInfo, TransactionRepository};
use crate::service::pool::PoolService;
use crate::service::types::{MintOutcome, MintRequest, Token, symbol_of};
use crate::service::{ServiceError, ServiceResult};
use crate::uniswap::{MathError, minimum_amount, plan_mint, sdk_pool, tick_range_around};

// Approvals are considered final after one confirmation
const APPROVAL_CONFIRMATIONS: u64 = 1;

/// Mints concentrated-liquidity positions through the NonfungiblePositionManager
/// and reads back the positions an account holds.
pub struct PositionService {
    reader: Arc<dyn EthereumRepository>,
    writer: Arc<dyn TransactionRepository>,
    pools: PoolService,
    position_manager: Address,
}

impl PositionService {
    pub fn new(
        reader: Arc<dyn EthereumRepository>,
        writer: Arc<dyn TransactionRepository>,
        uniswap: &UniswapConfig,
    ) -> Self {
        Self {
            pools: PoolService::new(reader.clone(), uniswap),
            reader,
            writer,
            position_manager: uniswap.position_manager,
        }
    }

    /// Approves both tokens, then mints a position centered on the pool's
    /// current tick.
    ///
    /// Approvals run one after the other and each is mined before the next
    /// step. When the second approval fails, the first one is reset to zero
    /// before the error is returned.
    #[instrument(skip(self), err)]
    pub async fn mint(&self, request: &MintRequest) -> ServiceResult<MintOutcome> {
        let signer = self
            .writer
            .signer_address()
            .ok_or_else(|| ServiceError::MissingSigner("mint requires a wallet".to_string()))?;

        if request.amount.is_zero() {
            return Err(ServiceError::InvalidAmount(
                "Mint amount must be greater than zero".to_string(),
            ));
        }

        // fail on a bad pair before anything is signed
        self.pools
            .pool_address(&request.token_a, &request.token_b, request.fee)?;

        self.approve(&request.token_a, request.amount).await?;

        if let Err(e) = self.approve(&request.token_b, request.amount).await {
            tracing::error!(
                "Approval of {} failed, resetting {} allowance: {}",
                symbol_of(&request.token_b),
                symbol_of(&request.token_a),
                e
            );
            if let Err(reset) = self.approve(&request.token_a, U256::ZERO).await {
                tracing::warn!(
                    "Failed to reset {} allowance: {}",
                    symbol_of(&request.token_a),
                    reset
                );
            }
            return Err(e);
        }

        let pool = self
            .pools
            .pool_info(&request.token_a, &request.token_b, request.fee)
            .await?;

        let (token0, token1) = if request
            .token_a
            .sorts_before(&request.token_b)
            .map_err(MathError::from)?
        {
            (&request.token_a, &request.token_b)
        } else {
            (&request.token_b, &request.token_a)
        };
        if pool.token0 != token0.address() || pool.token1 != token1.address() {
            return Err(ServiceError::TokenNotInPool {
                pool: pool.address.to_string(),
                token: format!("{}/{}", symbol_of(token0), symbol_of(token1)),
            });
        }

        let (tick_lower, tick_upper) = tick_range_around(
            pool.tick,
            pool.tick_spacing,
            request.tick_spacing_multiplier,
        )?;

        let pool_model = sdk_pool(
            token0.clone(),
            token1.clone(),
            pool.fee,
            pool.sqrt_price_x96,
            pool.liquidity,
            pool.tick_spacing,
        )?;
        let plan = plan_mint(
            pool_model,
            tick_lower,
            tick_upper,
            request.amount,
            request.amount,
        )?;
        if plan.liquidity == 0 {
            return Err(ServiceError::InvalidAmount(format!(
                "Amount {} is too small to mint any liquidity",
                request.amount
            )));
        }

        let liquidity = plan.liquidity;
        let (amount0_desired, amount1_desired) = (plan.amount0, plan.amount1);
        let amount0_min = minimum_amount(amount0_desired, request.slippage_bips);
        let amount1_min = minimum_amount(amount1_desired, request.slippage_bips);

        tracing::info!(
            "Minting position [{}, {}) with liquidity {} (amount0={}, amount1={})",
            tick_lower,
            tick_upper,
            liquidity,
            amount0_desired,
            amount1_desired
        );

        let deadline = chrono::Utc::now().timestamp().max(0) as u64 + request.deadline_secs;

        let params = INonfungiblePositionManager::MintParams {
            token0: token0.address(),
            token1: token1.address(),
            fee: U24::from(pool.fee),
            tickLower: to_i24(tick_lower)?,
            tickUpper: to_i24(tick_upper)?,
            amount0Desired: amount0_desired,
            amount1Desired: amount1_desired,
            amount0Min: amount0_min,
            amount1Min: amount1_min,
            recipient: signer,
            deadline: U256::from(deadline),
        };
        let calldata = INonfungiblePositionManager::mintCall { params }.abi_encode();

        let tx = TransactionRequest::default()
            .with_from(signer)
            .with_to(self.position_manager)
            .with_input(calldata)
            .with_value(U256::ZERO)
            .with_max_fee_per_gas(request.max_fee_per_gas)
            .with_max_priority_fee_per_gas(request.max_priority_fee_per_gas);

        let tx_hash = self.writer.send_transaction(tx).await?;
        tracing::info!("Mint transaction sent: {}", tx_hash);

        let outcome = self.writer.wait_for_receipt(tx_hash, 1).await?;
        tracing::info!(
            "Mint mined in block {:?}, transaction hash: {}",
            outcome.block_number,
            tx_hash
        );

        Ok(MintOutcome {
            tx_hash,
            block_number: outcome.block_number,
            tick_lower,
            tick_upper,
            liquidity,
            amount0_desired: amount0_desired.to_string(),
            amount1_desired: amount1_desired.to_string(),
            amount0_min: amount0_min.to_string(),
            amount1_min: amount1_min.to_string(),
        })
    }

    /// Position NFT ids held by `owner`, or by the signer when `owner` is `None`.
    #[instrument(skip(self), err)]
    pub async fn position_ids(&self, owner: Option<Address>) -> ServiceResult<Vec<U256>> {
        let owner = self.owner_or_signer(owner)?;

        let ids = self
            .reader
            .get_position_ids(self.position_manager, owner)
            .await?;

        tracing::info!("{} holds {} position(s)", owner, ids.len());
        Ok(ids)
    }

    #[instrument(skip(self), err)]
    pub async fn position(&self, token_id: U256) -> ServiceResult<PositionInfo> {
        let position = self
            .reader
            .get_position(self.position_manager, token_id)
            .await?;

        tracing::info!(
            "Position {}: ticks [{}, {}), liquidity {}, owed {}/{}",
            token_id,
            position.tick_lower,
            position.tick_upper,
            position.liquidity,
            position.tokens_owed0,
            position.tokens_owed1
        );
        Ok(position)
    }

    fn owner_or_signer(&self, owner: Option<Address>) -> ServiceResult<Address> {
        owner.or_else(|| self.writer.signer_address()).ok_or_else(|| {
            ServiceError::MissingSigner("no owner given and no wallet configured".to_string())
        })
    }

    /// Sets the position manager's allowance over `token` to `amount` and waits
    /// for the approval to be mined.
    async fn approve(&self, token: &Token, amount: U256) -> ServiceResult<TxHash> {
        let calldata = IERC20::approveCall {
            spender: self.position_manager,
            amount,
        }
        .abi_encode();

        let tx = TransactionRequest::default()
            .with_to(token.address())
            .with_input(calldata);

        let tx_hash = self.writer.send_transaction(tx).await?;
        self.writer
            .wait_for_receipt(tx_hash, APPROVAL_CONFIRMATIONS)
            .await?;

        tracing::info!(
            "Approved {} {} for {}: {}",
            amount,
            symbol_of(token),
            self.position_manager,
            tx_hash
        );
        Ok(tx_hash)
    }
}

fn to_i24(tick: i32) -> ServiceResult<I24> {
    I24::try_from(tick)
        .map_err(|e| ServiceError::InvalidTickRange(format!("Tick {tick} does not fit int24: {e}")))
}
