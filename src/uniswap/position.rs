use alloy::primitives::{U160, U256, aliases::I24};
use uniswap_sdk_core::prelude::Token;
use uniswap_v3_sdk::prelude::{MAX_TICK_I32, MIN_TICK_I32, Pool, Position, nearest_usable_tick};

use super::{MathError, MathResult, fee_amount};

/// Desired amounts above 2^96 can overflow the `u128` liquidity the SDK
/// computes for narrow ranges.
const MAX_DESIRED_AMOUNT: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// Liquidity and token amounts for a new position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintPlan {
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Tick range centred on the usable tick nearest to `tick`, extending
/// `spacing * multiplier` on each side. A multiplier of zero is treated as one.
pub fn tick_range_around(tick: i32, spacing: i32, multiplier: u32) -> MathResult<(i32, i32)> {
    if spacing <= 0 {
        return Err(MathError::InvalidTickSpacing(spacing));
    }
    if !(MIN_TICK_I32..=MAX_TICK_I32).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick.into()));
    }

    let center = i64::from(nearest_usable_tick(tick, spacing));
    let width = i64::from(spacing) * i64::from(multiplier.max(1));
    let lower = center - width;
    let upper = center + width;

    for bound in [lower, upper] {
        if bound < i64::from(MIN_TICK_I32) || bound > i64::from(MAX_TICK_I32) {
            return Err(MathError::TickOutOfBounds(bound));
        }
    }

    Ok((lower as i32, upper as i32))
}

/// Builds an SDK pool from on-chain state. The pool's tick spacing has to
/// match the one the SDK derives from the fee tier.
pub fn sdk_pool(
    token_a: Token,
    token_b: Token,
    fee: u32,
    sqrt_price_x96: U160,
    liquidity: u128,
    tick_spacing: i32,
) -> MathResult<Pool> {
    let tier = fee_amount(fee)?;
    let expected = tier.tick_spacing().as_i32();
    if tick_spacing != expected {
        return Err(MathError::TickSpacingMismatch {
            fee,
            expected,
            actual: tick_spacing,
        });
    }

    Ok(Pool::new(token_a, token_b, tier, sqrt_price_x96, liquidity)?)
}

/// Sizes the largest position in `[tick_lower, tick_upper]` that fits within
/// both desired amounts and returns the amounts the mint will actually pull.
pub fn plan_mint(
    pool: Pool,
    tick_lower: i32,
    tick_upper: i32,
    amount0: U256,
    amount1: U256,
) -> MathResult<MintPlan> {
    for amount in [amount0, amount1] {
        if amount > MAX_DESIRED_AMOUNT {
            return Err(MathError::AmountTooLarge(amount));
        }
    }

    let spacing = pool.fee.tick_spacing().as_i32();
    for tick in [tick_lower, tick_upper] {
        if tick % spacing != 0 || I24::try_from(tick).is_err() {
            return Err(MathError::TickOutOfBounds(tick.into()));
        }
    }
    if tick_lower >= tick_upper {
        return Err(MathError::TickOutOfBounds(tick_upper.into()));
    }

    let mut position = Position::from_amounts(pool, tick_lower, tick_upper, amount0, amount1, true)?;
    let amounts = position.mint_amounts()?;

    Ok(MintPlan {
        liquidity: position.liquidity,
        amount0: amounts.amount0,
        amount1: amounts.amount1,
    })
}

/// `amount * (10000 - bips) / 10000`, with `bips` capped at 10000.
pub fn minimum_amount(amount: U256, slippage_bips: u32) -> U256 {
    let bips = U256::from(slippage_bips.min(10_000));
    let denominator = U256::from(10_000u32);
    amount * (denominator - bips) / denominator
}

#[cfg(test)]
mod tests {
    use uniswap_sdk_core::token;
    use uniswap_v3_sdk::prelude::get_sqrt_ratio_at_tick;

    use super::*;

    fn usdc() -> Token {
        token!(1, "A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, "USDC", "USD//C")
    }

    fn dai() -> Token {
        token!(1, "6B175474E89094C44Da98b954EedeAC495271d0F", 18, "DAI", "Dai Stablecoin")
    }

    fn pool_at(tick: i32) -> Pool {
        let sqrt_price = get_sqrt_ratio_at_tick(I24::try_from(tick).unwrap()).unwrap();
        sdk_pool(dai(), usdc(), 500, sqrt_price, 1_000_000_000_000_000_000u128, 10)
            .unwrap()
    }

    #[test]
    fn test_tick_range_around() {
        assert_eq!(tick_range_around(-5, 10, 2), Ok((-20, 20)));
        assert_eq!(tick_range_around(123, 60, 1), Ok((60, 180)));
        assert_eq!(tick_range_around(0, 10, 0), Ok((-10, 10)));
    }

    #[test]
    fn test_tick_range_around_invalid_input_should_fail() {
        assert_eq!(tick_range_around(0, 0, 2), Err(MathError::InvalidTickSpacing(0)));
        assert_eq!(
            tick_range_around(MAX_TICK_I32 + 1, 10, 2),
            Err(MathError::TickOutOfBounds(i64::from(MAX_TICK_I32) + 1))
        );
        assert!(matches!(
            tick_range_around(MAX_TICK_I32 - 5, 10, 2),
            Err(MathError::TickOutOfBounds(_))
        ));
    }

    #[test]
    fn test_sdk_pool_tick_spacing_mismatch_should_fail() {
        let sqrt_price = get_sqrt_ratio_at_tick(I24::ZERO).unwrap();
        let result = sdk_pool(usdc(), dai(), 500, sqrt_price, 0, 60);
        assert_eq!(
            result.err(),
            Some(MathError::TickSpacingMismatch { fee: 500, expected: 10, actual: 60 })
        );
    }

    #[test]
    fn test_plan_mint_in_range() {
        let one = U256::from(1_000_000_000_000_000_000u128);
        let plan = plan_mint(pool_at(-5), -20, 20, one, one).unwrap();

        assert_eq!(plan.liquidity, 800_340_003_487_325_632_898u128);
        assert_eq!(plan.amount0, one);
        assert_eq!(plan.amount1, U256::from(599_850_001_254_812_057u128));
    }

    #[test]
    fn test_plan_mint_out_of_range_uses_single_token() {
        let one = U256::from(1_000_000_000_000_000_000u128);
        let plan = plan_mint(pool_at(-5), 10, 30, one, one).unwrap();

        assert!(plan.liquidity > 0);
        assert!(plan.amount0 > U256::ZERO);
        assert_eq!(plan.amount1, U256::ZERO);
    }

    #[test]
    fn test_plan_mint_rejects_bad_input() {
        let one = U256::from(1_000_000_000_000_000_000u128);
        let huge = U256::MAX;

        assert_eq!(
            plan_mint(pool_at(-5), -20, 20, huge, one),
            Err(MathError::AmountTooLarge(huge))
        );
        assert_eq!(
            plan_mint(pool_at(-5), -25, 20, one, one),
            Err(MathError::TickOutOfBounds(-25))
        );
        assert_eq!(
            plan_mint(pool_at(-5), 20, -20, one, one),
            Err(MathError::TickOutOfBounds(-20))
        );
    }

    #[test]
    fn test_minimum_amount() {
        assert_eq!(minimum_amount(U256::from(10_000u32), 50), U256::from(9_950u32));
        assert_eq!(minimum_amount(U256::from(2_000u32), 0), U256::from(2_000u32));
        assert_eq!(minimum_amount(U256::from(2_000u32), 20_000), U256::ZERO);
    }
}
