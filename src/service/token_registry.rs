use std::collections::HashMap;

use uniswap_sdk_core::{prelude::*, token};

use super::ServiceResult;
use super::error::ServiceError;
use super::types::{Token, symbol_of};

/// Chain id of Ethereum mainnet
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Well-known mainnet tokens
fn mainnet_tokens() -> Vec<Token> {
    vec![
        // Wrapped tokens
        token!(
            MAINNET_CHAIN_ID,
            "C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            18,
            "WETH",
            "Wrapped Ether"
        ),
        token!(
            MAINNET_CHAIN_ID,
            "2260fac5e5542a773aa44fbcfedf7c193bc2c599",
            8,
            "WBTC",
            "Wrapped BTC"
        ),
        // Stablecoins
        token!(
            MAINNET_CHAIN_ID,
            "A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            6,
            "USDC",
            "USD//C"
        ),
        token!(
            MAINNET_CHAIN_ID,
            "dac17f958d2ee523a2206206994597c13d831ec7",
            6,
            "USDT",
            "Tether USD"
        ),
        token!(
            MAINNET_CHAIN_ID,
            "6B175474E89094C44Da98b954EedeAC495271d0F",
            18,
            "DAI",
            "Dai Stablecoin"
        ),
        // DeFi tokens
        token!(
            MAINNET_CHAIN_ID,
            "1f9840a85d5af5bf1d1762f925bdaddc4201f984",
            18,
            "UNI",
            "Uniswap"
        ),
        token!(
            MAINNET_CHAIN_ID,
            "7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9",
            18,
            "AAVE",
            "Aave Token"
        ),
        token!(
            MAINNET_CHAIN_ID,
            "514910771af9ca656af840dff83e8264ecf986ca",
            18,
            "LINK",
            "ChainLink Token"
        ),
    ]
}

/// Token registry mapping symbols to token descriptors
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    registry: HashMap<String, Token>,
}

impl TokenRegistry {
    /// Create a registry holding the well-known mainnet tokens
    pub fn new() -> Self {
        let mut registry = Self {
            registry: HashMap::new(),
        };
        for token in mainnet_tokens() {
            registry.insert(token);
        }
        registry
    }

    /// Register an additional token, replacing any token with the same symbol
    pub fn insert(&mut self, token: Token) {
        self.registry.insert(symbol_of(&token).to_uppercase(), token);
    }

    /// Lookup a token by symbol (case-insensitive)
    pub fn lookup(&self, symbol: &str) -> Option<&Token> {
        self.registry.get(&symbol.to_uppercase())
    }

    /// Lookup a token by symbol, failing with the list of supported symbols
    pub fn resolve(&self, symbol: &str) -> ServiceResult<Token> {
        self.lookup(symbol).cloned().ok_or_else(|| {
            tracing::warn!("Token symbol not found in registry: {}", symbol);
            ServiceError::TokenNotFound(format!(
                "{} (Supported tokens: {})",
                symbol,
                self.supported_tokens().join(", ")
            ))
        })
    }

    /// Get all supported token symbols, sorted
    pub fn supported_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.registry.keys().cloned().collect();
        tokens.sort();
        tokens
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TokenRegistry::new();

        let usdc = registry.lookup("usdc").unwrap();
        assert_eq!(symbol_of(usdc), "USDC");
        assert_eq!(usdc.decimals(), 6);
        assert_eq!(usdc.name().map(String::as_str), Some("USD//C"));
        assert_eq!(usdc.chain_id(), MAINNET_CHAIN_ID);
        assert_eq!(
            usdc.address(),
            address!("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
        );

        assert!(
            registry
                .lookup("WETH")
                .unwrap()
                .equals(registry.lookup("weth").unwrap())
        );
    }

    #[test]
    fn test_resolve_unknown_token_should_fail() {
        let registry = TokenRegistry::new();

        match registry.resolve("NOPE") {
            Err(ServiceError::TokenNotFound(msg)) => {
                assert!(msg.contains("NOPE"));
                assert!(msg.contains("USDC"));
            }
            other => panic!("Expected TokenNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_insert_custom_token() {
        let mut registry = TokenRegistry::new();
        let token = token!(
            31337,
            "1111111111111111111111111111111111111111",
            18,
            "test",
            "Test Token"
        );

        registry.insert(token.clone());
        assert!(registry.resolve("TEST").unwrap().equals(&token));
    }

    #[test]
    fn test_supported_tokens_sorted() {
        let registry = TokenRegistry::new();
        let tokens = registry.supported_tokens();

        let mut sorted = tokens.clone();
        sorted.sort();
        assert_eq!(tokens, sorted);
        assert_eq!(tokens.len(), 8);
        assert!(tokens.contains(&"DAI".to_string()));
    }
}
