use std::{collections::HashMap, fs, path::Path};

use alloy::primitives::{Address, B256};
use anyhow::Context;
use dotenv::dotenv;
use envsubst::substitute;
use serde::Deserialize;

use crate::uniswap::POOL_INIT_CODE_HASH;

// Only these environment variables are substituted into the YAML file
const ENV_PREFIXES: &[&str] = &["RPC_", "WALLET_", "USDC_", "INFURA_"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    pub wallet: WalletConfig,
    pub uniswap: UniswapConfig,
    pub quote: QuoteConfig,
    pub pool: PoolConfig,
    pub mint: MintConfig,
    pub governance: GovernanceConfig,
    pub flash_loan: FlashLoanConfig,
}

impl Config {
    pub async fn from_yaml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        dotenv().ok();

        let path = path.as_ref();
        let file_content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file from path: {}", path.display()))?;

        let env_vars: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| ENV_PREFIXES.iter().any(|prefix| key.starts_with(prefix)))
            .collect();

        let interpolated = substitute(&file_content, &env_vars)
            .context("Failed to substitute environment variables in YAML")?;

        let mut config: Config =
            serde_yaml::from_str(&interpolated).context("Failed to parse YAML configuration")?;

        // optional secrets left as `${VAR}` were not set in the environment
        if is_unresolved(&config.wallet.private_key) {
            config.wallet.private_key.clear();
        }
        if config.rpc.api_key.as_deref().is_some_and(is_unresolved) {
            config.rpc.api_key = None;
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.url.trim().is_empty() || is_unresolved(&self.rpc.url) {
            anyhow::bail!("rpc.url must be set, got {:?}", self.rpc.url);
        }
        if self.quote.display_chars == 0 {
            anyhow::bail!("quote.display_chars must be at least 1");
        }
        if self.mint.slippage_bips > 10_000 {
            anyhow::bail!(
                "mint.slippage_bips must be at most 10000, got {}",
                self.mint.slippage_bips
            );
        }
        if self.mint.tick_spacing_multiplier == 0 {
            anyhow::bail!("mint.tick_spacing_multiplier must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    /// Project key appended to `url` as its last path segment (Infura style)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl RpcConfig {
    /// Full endpoint URL including the API key, if any.
    pub fn endpoint(&self) -> String {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                format!("{}/{}", self.url.trim_end_matches('/'), key)
            }
            _ => self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub private_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniswapConfig {
    pub chain_id: u64,
    pub factory: Address,
    pub quoter: Address,
    pub position_manager: Address,
    #[serde(default = "default_pool_init_code_hash")]
    pub pool_init_code_hash: B256,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    pub token_in: String,
    pub token_out: String,
    pub fee: u32,
    /// Human-readable amount of `token_in`
    pub amount_in: String,
    #[serde(default = "default_display_chars")]
    pub display_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub token_a: String,
    pub token_b: String,
    pub fee: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintConfig {
    pub token_a: String,
    pub token_b: String,
    pub fee: u32,
    /// Raw amount (smallest unit) approved and offered for each token
    pub approve_amount: String,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    #[serde(default = "default_slippage_bips")]
    pub slippage_bips: u32,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_tick_spacing_multiplier")]
    pub tick_spacing_multiplier: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    pub governor: Address,
    pub ens_registry: Address,
    pub public_resolver: Address,
    pub timelock: Address,
    pub parent_domain: String,
    pub subdomain_label: String,
    pub text_key: String,
    pub text_value: String,
    pub description: String,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlashLoanConfig {
    pub token: Address,
    /// Account pre-funded with `token`; usually injected through `USDC_WHALE`
    pub whale: String,
    pub address_provider: Address,
    /// Already deployed harness; takes precedence over `harness_bytecode`
    #[serde(default)]
    pub harness: Option<Address>,
    /// Path to a file holding the harness creation bytecode as hex
    #[serde(default)]
    pub harness_bytecode: Option<String>,
    pub fund_amount: String,
    pub borrow_amount: String,
    #[serde(default = "default_gas_topup_eth")]
    pub gas_topup_eth: String,
    #[serde(default = "default_impersonate")]
    pub impersonate: bool,
}

fn is_unresolved(value: &str) -> bool {
    value.trim_start().starts_with("${")
}

fn default_pool_init_code_hash() -> B256 {
    POOL_INIT_CODE_HASH
}

fn default_display_chars() -> usize {
    4
}

fn default_slippage_bips() -> u32 {
    50
}

fn default_deadline_secs() -> u64 {
    20 * 60
}

fn default_tick_spacing_multiplier() -> u32 {
    2
}

fn default_confirmations() -> u64 {
    1
}

fn default_gas_topup_eth() -> String {
    "1".to_string()
}

fn default_impersonate() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[tokio::test]
    async fn test_load_config_from_yaml() {
        let config = Config::from_yaml("config/test.yaml").await.unwrap();

        assert_eq!(config.rpc.url, "http://127.0.0.1:8545");
        assert_eq!(config.wallet.private_key, "");

        assert_eq!(config.uniswap.chain_id, 1);
        assert_eq!(
            config.uniswap.factory,
            Address::from_str("0x1F98431c8aD98523631AE4a59f267346ea31F984").unwrap()
        );
        assert_eq!(config.uniswap.pool_init_code_hash, POOL_INIT_CODE_HASH);

        assert_eq!(config.quote.token_in, "WETH");
        assert_eq!(config.quote.fee, 3000);
        assert_eq!(config.quote.display_chars, 4);

        assert_eq!(config.mint.slippage_bips, 50);
        assert_eq!(config.mint.deadline_secs, 1200);
        assert_eq!(config.mint.tick_spacing_multiplier, 2);

        assert_eq!(config.governance.confirmations, 1);
        assert_eq!(config.governance.parent_domain, "uniswap.eth");

        assert_eq!(config.flash_loan.fund_amount, "2000");
        assert_eq!(config.flash_loan.borrow_amount, "1000");
        assert!(config.flash_loan.harness.is_none());
    }

    #[tokio::test]
    async fn test_pool_and_mint_use_low_fee_tier() {
        let config = Config::from_yaml("config/test.yaml").await.unwrap();
        assert_eq!(config.pool.fee, 500);
        assert_eq!(config.mint.fee, 500);

        let content = tokio::fs::read_to_string("config/default.yaml").await.unwrap();
        let raw: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(raw["pool"]["fee"].as_u64(), Some(500));
        assert_eq!(raw["mint"]["fee"].as_u64(), Some(500));
    }

    #[tokio::test]
    async fn test_missing_config_file_should_fail() {
        let result = Config::from_yaml("config/does-not-exist.yaml").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_rpc_endpoint_appends_api_key() {
        let rpc = RpcConfig {
            url: "https://mainnet.infura.io/v3/".to_string(),
            api_key: Some("abc123".to_string()),
        };
        assert_eq!(rpc.endpoint(), "https://mainnet.infura.io/v3/abc123");

        let rpc = RpcConfig {
            url: "http://127.0.0.1:8545".to_string(),
            api_key: Some(String::new()),
        };
        assert_eq!(rpc.endpoint(), "http://127.0.0.1:8545");
    }

    #[test]
    fn test_unresolved_placeholder_detection() {
        assert!(is_unresolved("${WALLET_PRIVATE_KEY}"));
        assert!(!is_unresolved("0xabc"));
        assert!(!is_unresolved(""));
    }

    #[tokio::test]
    async fn test_config_debug_format() {
        let config = Config::from_yaml("config/test.yaml").await.unwrap();

        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("Config"));
        assert!(debug_output.contains("uniswap"));
        assert!(debug_output.contains("flash_loan"));
    }
}
