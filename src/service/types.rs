use alloy::primitives::{Address, Bytes, TxHash, U160, U256};
use serde::Serialize;
use uniswap_sdk_core::prelude::*;

/// ERC20 token descriptor. Compare tokens with `Currency::equals`, which
/// looks at chain id and address only.
pub use uniswap_sdk_core::prelude::Token;

/// Display symbol of `token`, `"?"` when it has none.
pub fn symbol_of(token: &Token) -> &str {
    token.symbol().map(String::as_str).unwrap_or("?")
}

/// Pool descriptor: a read-only snapshot of a pool, re-queried on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolInfo {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub liquidity: u128,
    pub sqrt_price_x96: U160,
    pub tick: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Pool the quote was routed through
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    /// Input amount in `token_in`'s smallest unit
    pub amount_in_raw: String,
    /// Output amount in `token_out`'s smallest unit
    pub amount_out_raw: String,
    /// Output amount formatted with decimals and truncated for display
    pub formatted: String,
}

/// Inputs of a position mint. `amount` is offered (and approved) for each of
/// the two tokens, in their smallest unit.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub token_a: Token,
    pub token_b: Token,
    pub fee: u32,
    pub amount: U256,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub slippage_bips: u32,
    pub deadline_secs: u64,
    pub tick_spacing_multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub amount0_desired: String,
    pub amount1_desired: String,
    pub amount0_min: String,
    pub amount1_min: String,
}

/// Ordered actions of a governance proposal.
///
/// The four lists are parallel: entry `i` of each one describes action `i`,
/// so they always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProposalActions {
    targets: Vec<Address>,
    values: Vec<U256>,
    signatures: Vec<String>,
    calldatas: Vec<Bytes>,
}

impl ProposalActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one action. An empty signature means the calldata already
    /// carries the function selector.
    pub fn push(
        &mut self,
        target: Address,
        value: U256,
        signature: impl Into<String>,
        calldata: impl Into<Bytes>,
    ) -> &mut Self {
        self.targets.push(target);
        self.values.push(value);
        self.signatures.push(signature.into());
        self.calldatas.push(calldata.into());
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Address] {
        &self.targets
    }

    pub fn values(&self) -> &[U256] {
        &self.values
    }

    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    pub fn calldatas(&self) -> &[Bytes] {
        &self.calldatas
    }

    pub fn into_parts(self) -> (Vec<Address>, Vec<U256>, Vec<String>, Vec<Bytes>) {
        (self.targets, self.values, self.signatures, self.calldatas)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalSubmission {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub actions: usize,
}

/// One `Log(message, val)` event emitted by the flash-loan harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashLoanLog {
    pub message: String,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashLoanReport {
    pub harness: Address,
    pub tx_hash: TxHash,
    pub logs: Vec<FlashLoanLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_lists_parallel() {
        let mut actions = ProposalActions::new();
        actions
            .push(Address::repeat_byte(1), U256::ZERO, "", vec![0x01u8])
            .push(Address::repeat_byte(2), U256::ZERO, "", vec![0x02u8]);

        assert_eq!(actions.len(), 2);
        assert_eq!(actions.targets().len(), 2);
        assert_eq!(actions.values().len(), 2);
        assert_eq!(actions.signatures().len(), 2);
        assert_eq!(actions.calldatas().len(), 2);
    }
}
