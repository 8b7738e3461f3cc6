use std::str::FromStr;
use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::{
    Address, TxHash, U256,
    aliases::{I24, U24, U160},
};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use tracing::instrument;

use super::error::RepositoryError;
use crate::repository::contract::{INonfungiblePositionManager, IQuoter, IUniswapV3Pool, IERC20};
use crate::repository::{
    EthereumRepository, PoolImmutables, PoolState, PositionInfo, RepoResult, TokenBalance,
    TransactionOutcome, TransactionRepository,
};

pub struct AlloyEthereumRepository<P> {
    provider: Arc<P>,
    signer: Option<Address>,
}

/// Who signs an outgoing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SigningRoute {
    /// The local wallet attached to the provider.
    Wallet,
    /// The node, through `eth_sendTransaction` (unlocked or impersonated
    /// accounts).
    Node,
}

impl<P: Provider + Clone + 'static> AlloyEthereumRepository<P> {
    /// Read-only repository: transactions must carry an explicit `from` that
    /// the node itself can sign for.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            signer: None,
        }
    }

    /// Repository whose provider already holds a wallet for `signer`.
    pub fn new_with_signer(provider: Arc<P>, signer: Address) -> Self {
        Self {
            provider,
            signer: Some(signer),
        }
    }

    /// Picks the signer for `tx`, filling `from` with the local signer when it
    /// is unset.
    fn signing_route(&self, tx: &mut TransactionRequest) -> RepoResult<SigningRoute> {
        match (tx.from, self.signer) {
            (None, Some(signer)) => {
                tx.from = Some(signer);
                Ok(SigningRoute::Wallet)
            }
            (None, None) => Err(RepositoryError::MissingSigner(
                "transaction has no sender and no wallet is configured".to_string(),
            )),
            (Some(from), Some(signer)) if from == signer => Ok(SigningRoute::Wallet),
            (Some(_), _) => Ok(SigningRoute::Node),
        }
    }
}

impl AlloyEthereumRepository<DynProvider> {
    /// Connects to `rpc_url`, attaching a local wallet when `private_key` is
    /// not empty.
    pub fn connect(rpc_url: &str, private_key: &str) -> RepoResult<Self> {
        let url = Url::parse(rpc_url)
            .map_err(|e| RepositoryError::ParseError(format!("Invalid RPC URL {rpc_url}: {e}")))?;

        if private_key.is_empty() {
            let provider = ProviderBuilder::new().connect_http(url).erased();
            return Ok(Self::new(Arc::new(provider)));
        }

        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| RepositoryError::ParseError(format!("Invalid private key: {e}")))?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        Ok(Self::new_with_signer(Arc::new(provider), address))
    }
}

fn contract_error(what: &'static str) -> impl Fn(alloy::contract::Error) -> RepositoryError {
    move |e| RepositoryError::ContractError(format!("Failed to get {what}: {e}"))
}

fn tick_to_i32(value: I24) -> RepoResult<i32> {
    i32::try_from(value)
        .map_err(|e| RepositoryError::ParseError(format!("Tick {value} out of range: {e}")))
}

#[async_trait]
impl<P: Provider + Clone + Send + Sync + 'static> EthereumRepository
    for AlloyEthereumRepository<P>
{
    #[instrument(skip(self), err)]
    async fn get_eth_balance(&self, address: Address) -> RepoResult<U256> {
        self.provider.get_balance(address).await.map_err(|e| {
            if e.to_string().contains("429") {
                tracing::warn!("Rate limited while getting ETH balance for {}", address);
            }
            RepositoryError::RpcError(e.to_string())
        })
    }

    #[instrument(skip(self), err)]
    async fn get_erc20_balance(&self, token: Address, owner: Address) -> RepoResult<TokenBalance> {
        let contract = IERC20::new(token, self.provider.clone());

        let (balance, decimals, symbol) = tokio::try_join!(
            async { contract.balanceOf(owner).call().await.map_err(contract_error("balance")) },
            async { contract.decimals().call().await.map_err(contract_error("decimals")) },
            async { contract.symbol().call().await.map_err(contract_error("symbol")) },
        )?;

        Ok(TokenBalance {
            balance,
            decimals,
            symbol,
        })
    }

    #[instrument(skip(self), err)]
    async fn get_pool_immutables(&self, pool: Address) -> RepoResult<PoolImmutables> {
        let contract = IUniswapV3Pool::new(pool, self.provider.clone());

        let (token0, token1, fee) = tokio::try_join!(
            async { contract.token0().call().await.map_err(contract_error("token0")) },
            async { contract.token1().call().await.map_err(contract_error("token1")) },
            async { contract.fee().call().await.map_err(contract_error("fee")) },
        )?;

        Ok(PoolImmutables {
            token0,
            token1,
            fee: fee.to::<u32>(),
        })
    }

    #[instrument(skip(self), err)]
    async fn get_pool_state(&self, pool: Address) -> RepoResult<PoolState> {
        let contract = IUniswapV3Pool::new(pool, self.provider.clone());

        let (token0, token1, fee, tick_spacing, liquidity, slot0) = tokio::try_join!(
            async { contract.token0().call().await.map_err(contract_error("token0")) },
            async { contract.token1().call().await.map_err(contract_error("token1")) },
            async { contract.fee().call().await.map_err(contract_error("fee")) },
            async {
                contract
                    .tickSpacing()
                    .call()
                    .await
                    .map_err(contract_error("tickSpacing"))
            },
            async {
                contract
                    .liquidity()
                    .call()
                    .await
                    .map_err(contract_error("liquidity"))
            },
            async { contract.slot0().call().await.map_err(contract_error("slot0")) },
        )?;

        tracing::debug!(
            "Pool {} slot0: sqrtPriceX96={}, tick={}",
            pool,
            slot0.sqrtPriceX96,
            slot0.tick
        );

        Ok(PoolState {
            token0,
            token1,
            fee: fee.to::<u32>(),
            tick_spacing: tick_to_i32(tick_spacing)?,
            liquidity,
            sqrt_price_x96: slot0.sqrtPriceX96,
            tick: tick_to_i32(slot0.tick)?,
        })
    }

    #[instrument(skip(self), err)]
    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> RepoResult<U256> {
        let quoter = IQuoter::new(quoter, self.provider.clone());

        let amount_out = quoter
            .quoteExactInputSingle(
                token_in,
                token_out,
                U24::from(fee),
                amount_in,
                U160::saturating_from(sqrt_price_limit_x96),
            )
            .call()
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to get quote for {} -> {} (fee: {}): {}",
                    token_in,
                    token_out,
                    fee,
                    e
                );
                RepositoryError::ContractError(format!("Failed to get quote: {e}"))
            })?;

        tracing::debug!("Quote result - amountOut: {}", amount_out);

        Ok(amount_out)
    }

    #[instrument(skip(self), err)]
    async fn get_position_ids(&self, manager: Address, owner: Address) -> RepoResult<Vec<U256>> {
        let manager = INonfungiblePositionManager::new(manager, self.provider.clone());

        let count = manager
            .balanceOf(owner)
            .call()
            .await
            .map_err(contract_error("position count"))?;

        let mut token_ids = Vec::new();
        let mut index = U256::ZERO;
        while index < count {
            let token_id = manager
                .tokenOfOwnerByIndex(owner, index)
                .call()
                .await
                .map_err(contract_error("position id"))?;
            token_ids.push(token_id);
            index += U256::from(1);
        }

        Ok(token_ids)
    }

    #[instrument(skip(self), err)]
    async fn get_position(&self, manager: Address, token_id: U256) -> RepoResult<PositionInfo> {
        let manager = INonfungiblePositionManager::new(manager, self.provider.clone());

        let position = manager
            .positions(token_id)
            .call()
            .await
            .map_err(contract_error("position"))?;

        Ok(PositionInfo {
            tick_lower: tick_to_i32(position.tickLower)?,
            tick_upper: tick_to_i32(position.tickUpper)?,
            liquidity: position.liquidity,
            fee_growth_inside0_last_x128: position.feeGrowthInside0LastX128,
            fee_growth_inside1_last_x128: position.feeGrowthInside1LastX128,
            tokens_owed0: position.tokensOwed0,
            tokens_owed1: position.tokensOwed1,
        })
    }
}

#[async_trait]
impl<P: Provider + Clone + Send + Sync + 'static> TransactionRepository
    for AlloyEthereumRepository<P>
{
    fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    #[instrument(skip(self), err)]
    async fn get_accounts(&self) -> RepoResult<Vec<Address>> {
        self.provider
            .get_accounts()
            .await
            .map_err(|e| RepositoryError::RpcError(e.to_string()))
    }

    #[instrument(skip(self), err)]
    async fn impersonate_account(&self, account: Address) -> RepoResult<()> {
        self.provider
            .raw_request::<_, ()>("anvil_impersonateAccount".into(), (account,))
            .await
            .map_err(|e| RepositoryError::RpcError(format!("Failed to impersonate {account}: {e}")))
    }

    #[instrument(skip(self, tx), err)]
    async fn send_transaction(&self, mut tx: TransactionRequest) -> RepoResult<TxHash> {
        let route = self.signing_route(&mut tx)?;

        let tx_hash = match route {
            SigningRoute::Wallet => {
                let pending = self.provider.send_transaction(tx).await.map_err(|e| {
                    RepositoryError::TransactionError(format!("Failed to send transaction: {e}"))
                })?;
                *pending.tx_hash()
            }
            // the wallet filler would re-sign as the local key
            SigningRoute::Node => self
                .provider
                .raw_request::<_, TxHash>("eth_sendTransaction".into(), (tx,))
                .await
                .map_err(|e| {
                    RepositoryError::TransactionError(format!(
                        "Failed to send node-signed transaction: {e}"
                    ))
                })?,
        };

        tracing::debug!("Transaction sent ({:?}): {}", route, tx_hash);

        Ok(tx_hash)
    }

    #[instrument(skip(self), err)]
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> RepoResult<TransactionOutcome> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(confirmations)
            .get_receipt()
            .await
            .map_err(|e| {
                RepositoryError::TransactionError(format!("Failed to get receipt for {tx_hash}: {e}"))
            })?;

        if !receipt.status() {
            return Err(RepositoryError::TransactionError(format!(
                "Transaction {tx_hash} reverted"
            )));
        }

        Ok(TransactionOutcome {
            tx_hash,
            block_number: receipt.block_number,
            contract_address: receipt.contract_address,
            logs: receipt.inner.logs().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known anvil/hardhat development key #0
    const DEV_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    // Uniswap V3 USDC/DAI 0.05% pool on mainnet
    const USDC_DAI_POOL: &str = "0x6c6bc977e13df9b0de53b251522280bb72383700";
    const USDC_CONTRACT: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const BINANCE_HOT_WALLET: &str = "0x28C6c06298d514Db089934071355E5743bf21d60";

    const RPC_URL: &str = "https://eth.llamarpc.com";

    fn create_test_repository() -> AlloyEthereumRepository<DynProvider> {
        let rpc_url = std::env::var("RPC_URL").unwrap_or_else(|_| RPC_URL.to_string());
        AlloyEthereumRepository::connect(&rpc_url, "").expect("Failed to connect")
    }

    #[test]
    fn test_connect_with_valid_key_sets_signer() {
        let repo = AlloyEthereumRepository::connect(RPC_URL, DEV_PRIVATE_KEY)
            .expect("Failed to create repository with wallet");

        let expected = Address::from_str(DEV_ADDRESS).unwrap();
        assert_eq!(repo.signer_address(), Some(expected));
    }

    #[test]
    fn test_connect_with_invalid_key_should_fail() {
        let result = AlloyEthereumRepository::connect(RPC_URL, "not_a_valid_private_key");

        match result {
            Err(RepositoryError::ParseError(msg)) => {
                assert!(msg.contains("Invalid private key"));
            }
            Err(e) => panic!("Expected ParseError, got: {:?}", e),
            Ok(_) => panic!("Should fail with invalid private key"),
        }
    }

    #[test]
    fn test_connect_with_invalid_url_should_fail() {
        let result = AlloyEthereumRepository::connect("not a url", "");
        assert!(matches!(result, Err(RepositoryError::ParseError(_))));
    }

    #[test]
    fn test_connect_without_key_is_read_only() {
        let repo = create_test_repository();
        assert!(repo.signer_address().is_none());
    }

    #[test]
    fn test_signing_route_with_wallet() {
        let repo = AlloyEthereumRepository::connect(RPC_URL, DEV_PRIVATE_KEY).unwrap();
        let signer = Address::from_str(DEV_ADDRESS).unwrap();

        // no sender: filled with the wallet address
        let mut tx = TransactionRequest::default();
        assert_eq!(repo.signing_route(&mut tx).unwrap(), SigningRoute::Wallet);
        assert_eq!(tx.from, Some(signer));

        let mut tx = TransactionRequest::default().from(signer);
        assert_eq!(repo.signing_route(&mut tx).unwrap(), SigningRoute::Wallet);

        // node account or impersonated whale
        let whale = Address::from_str(BINANCE_HOT_WALLET).unwrap();
        let mut tx = TransactionRequest::default().from(whale);
        assert_eq!(repo.signing_route(&mut tx).unwrap(), SigningRoute::Node);
        assert_eq!(tx.from, Some(whale));
    }

    #[test]
    fn test_signing_route_without_wallet() {
        let repo = create_test_repository();

        let whale = Address::from_str(BINANCE_HOT_WALLET).unwrap();
        let mut tx = TransactionRequest::default().from(whale);
        assert_eq!(repo.signing_route(&mut tx).unwrap(), SigningRoute::Node);

        let mut tx = TransactionRequest::default();
        assert!(matches!(
            repo.signing_route(&mut tx),
            Err(RepositoryError::MissingSigner(_))
        ));
    }

    #[tokio::test]
    async fn test_send_transaction_without_signer_or_from_should_fail() {
        let repo = create_test_repository();

        let result = repo.send_transaction(TransactionRequest::default()).await;
        assert!(matches!(result, Err(RepositoryError::MissingSigner(_))));
    }

    #[tokio::test]
    #[serial_test::serial]
    #[ignore]
    async fn test_get_pool_state_should_work() {
        let repo = create_test_repository();
        let pool = Address::from_str(USDC_DAI_POOL).unwrap();

        let state = repo.get_pool_state(pool).await.expect("Failed to read pool");

        assert_eq!(state.fee, 500);
        assert_eq!(state.tick_spacing, 10);
        assert!(state.sqrt_price_x96 > U160::ZERO);
        assert!(state.token0 < state.token1);
    }

    #[tokio::test]
    #[serial_test::serial]
    #[ignore]
    async fn test_get_erc20_balance_usdc_should_work() {
        let repo = create_test_repository();
        let token = Address::from_str(USDC_CONTRACT).unwrap();
        let owner = Address::from_str(BINANCE_HOT_WALLET).unwrap();

        let balance = repo
            .get_erc20_balance(token, owner)
            .await
            .expect("Failed to get USDC balance");

        assert_eq!(balance.decimals, 6);
        assert_eq!(balance.symbol, "USDC");
    }
}
