pub mod alloy;
pub mod contract;
pub mod error;

use ::alloy::primitives::{Address, TxHash, U160, U256};
use ::alloy::rpc::types::{Log, TransactionRequest};
pub use alloy::AlloyEthereumRepository;
use async_trait::async_trait;
pub use error::RepositoryError;
use serde::Serialize;

pub(crate) type RepoResult<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub balance: U256,
    pub decimals: u8,
    pub symbol: String,
}

/// Parameters of a pool that never change after deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolImmutables {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

/// Snapshot of a pool as returned by one round of reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub liquidity: u128,
    pub sqrt_price_x96: U160,
    pub tick: i32,
}

/// Liquidity position held by the position manager under a NFT id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionInfo {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

/// Mined transaction as seen in its receipt.
#[derive(Debug, Clone, Default)]
pub struct TransactionOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
}

/// Read capability: a connection able to query balances, pool state and
/// position state.
///
/// Every call goes to the network; nothing is cached between calls.
#[async_trait]
pub trait EthereumRepository: Send + Sync {
    /// Retrieves the native ETH balance (in wei) of `address`.
    async fn get_eth_balance(&self, address: Address) -> RepoResult<U256>;

    /// Retrieves the ERC20 balance of `owner` together with the token's
    /// decimals and symbol.
    async fn get_erc20_balance(&self, token: Address, owner: Address) -> RepoResult<TokenBalance>;

    /// Reads `token0`, `token1` and `fee` of the pool at `pool`.
    ///
    /// The three calls are issued concurrently.
    async fn get_pool_immutables(&self, pool: Address) -> RepoResult<PoolImmutables>;

    /// Reads the full state of the pool at `pool`.
    ///
    /// `token0`, `token1`, `fee`, `tickSpacing`, `liquidity` and `slot0` are
    /// issued concurrently and all of them must succeed; a single failure fails
    /// the whole read.
    async fn get_pool_state(&self, pool: Address) -> RepoResult<PoolState>;

    /// Quotes a single-hop exact-input swap through the quoter at `quoter`.
    ///
    /// # Returns
    ///
    /// * `Ok(U256)` - The raw output amount in `token_out`'s smallest unit
    /// * `Err(RepositoryError)` - If the pool does not exist or the call reverts
    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> RepoResult<U256>;

    /// Lists the position NFT ids owned by `owner` on the position manager.
    async fn get_position_ids(&self, manager: Address, owner: Address) -> RepoResult<Vec<U256>>;

    /// Retrieves the position stored under `token_id`.
    async fn get_position(&self, manager: Address, token_id: U256) -> RepoResult<PositionInfo>;
}

/// Write capability: something able to get transactions signed, broadcast and
/// mined.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Address of the locally held signer, if any.
    fn signer_address(&self) -> Option<Address>;

    /// Accounts unlocked on the connected node (`eth_accounts`).
    async fn get_accounts(&self) -> RepoResult<Vec<Address>>;

    /// Asks a development node to sign on behalf of `account`.
    async fn impersonate_account(&self, account: Address) -> RepoResult<()>;

    /// Broadcasts `tx` and returns its hash without waiting for it to be mined.
    ///
    /// A request without `from` is sent from the local signer. A request whose
    /// `from` is another account (a node account or an impersonated one) goes
    /// through `eth_sendTransaction` and is signed by the node.
    async fn send_transaction(&self, tx: TransactionRequest) -> RepoResult<TxHash>;

    /// Waits until `tx_hash` has `confirmations` confirmations and returns its
    /// receipt. A reverted transaction is reported as an error.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> RepoResult<TransactionOutcome>;
}
