use alloy::primitives::{Address, B256, b256};
use uniswap_v3_sdk::prelude::{FeeAmount, compute_pool_address};

use super::{MathError, MathResult};

/// Init code hash of the canonical Uniswap V3 pool contract.
pub const POOL_INIT_CODE_HASH: B256 =
    b256!("0xe34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54");

/// Maps a raw fee (hundredths of a bip) onto one of the factory's fee tiers.
pub fn fee_amount(fee: u32) -> MathResult<FeeAmount> {
    match fee {
        100 => Ok(FeeAmount::LOWEST),
        500 => Ok(FeeAmount::LOW),
        3000 => Ok(FeeAmount::MEDIUM),
        10000 => Ok(FeeAmount::HIGH),
        other => Err(MathError::InvalidFeeTier(other)),
    }
}

/// CREATE2 address of the `token_a`/`token_b` pool at `fee`. The order of
/// the two tokens does not matter.
pub fn pool_address(
    factory: Address,
    token_a: Address,
    token_b: Address,
    fee: FeeAmount,
    init_code_hash: B256,
) -> MathResult<Address> {
    if token_a == token_b {
        return Err(MathError::IdenticalTokens(token_a));
    }

    Ok(compute_pool_address(
        factory,
        token_a,
        token_b,
        fee,
        Some(init_code_hash),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const FACTORY: Address = address!("0x1F98431c8aD98523631AE4a59f267346ea31F984");
    const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const USDC: Address = address!("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    const DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");

    fn mainnet_pool(token_a: Address, token_b: Address, fee: u32) -> Address {
        pool_address(FACTORY, token_a, token_b, fee_amount(fee).unwrap(), POOL_INIT_CODE_HASH)
            .unwrap()
    }

    #[test]
    fn test_pool_address_weth_usdc() {
        assert_eq!(
            mainnet_pool(WETH, USDC, 3000),
            address!("0x8ad599c3a0ff1de082011efddc58f1908eb6e6d8")
        );
        assert_eq!(
            mainnet_pool(WETH, USDC, 500),
            address!("0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640")
        );
    }

    #[test]
    fn test_pool_address_usdc_dai_tiers_differ() {
        assert_eq!(
            mainnet_pool(USDC, DAI, 500),
            address!("0x6c6bc977e13df9b0de53b251522280bb72383700")
        );
        assert_eq!(
            mainnet_pool(USDC, DAI, 100),
            address!("0x5777d92f208679db4b9778590fa3cab3ac9e2168")
        );
    }

    #[test]
    fn test_pool_address_is_order_independent() {
        assert_eq!(mainnet_pool(USDC, DAI, 500), mainnet_pool(DAI, USDC, 500));
    }

    #[test]
    fn test_pool_address_identical_tokens_should_fail() {
        let result = pool_address(FACTORY, USDC, USDC, FeeAmount::LOW, POOL_INIT_CODE_HASH);
        assert_eq!(result, Err(MathError::IdenticalTokens(USDC)));
    }

    #[test]
    fn test_fee_amount_tiers() {
        assert_eq!(fee_amount(100), Ok(FeeAmount::LOWEST));
        assert_eq!(fee_amount(500), Ok(FeeAmount::LOW));
        assert_eq!(fee_amount(3000), Ok(FeeAmount::MEDIUM));
        assert_eq!(fee_amount(10000), Ok(FeeAmount::HIGH));
        assert_eq!(fee_amount(42), Err(MathError::InvalidFeeTier(42)));

        assert_eq!(FeeAmount::LOW.tick_spacing().as_i32(), 10);
        assert_eq!(FeeAmount::MEDIUM.tick_spacing().as_i32(), 60);
    }
}
