use alloy::sol;

// Smart contract ABI definitions for the Uniswap V3, ENS, governance and Aave interactions
sol! {
    /// ERC20 token standard interface.
    ///
    /// Read paths use `balanceOf`/`decimals`/`symbol`; write paths only ever
    /// ABI-encode `approve` and `transfer` and hand the calldata to a signer.
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);

        function decimals() external view returns (uint8);

        function symbol() external view returns (string memory);

        /// Sets `amount` as the allowance of `spender` over the caller's tokens.
        function approve(address spender, uint256 amount) external returns (bool);

        /// Moves `amount` tokens from the caller's account to `to`.
        function transfer(address to, uint256 amount) external returns (bool);
    }

    /// Uniswap V3 pool interface.
    ///
    /// Only the immutables and the current price/liquidity state are needed;
    /// tick and observation storage are never read.
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function token0() external view returns (address);

        function token1() external view returns (address);

        function fee() external view returns (uint24);

        function tickSpacing() external view returns (int24);

        function liquidity() external view returns (uint128);

        /// Packed current price/tick state of the pool.
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
    }

    /// Uniswap V3 Quoter (V1) interface.
    ///
    /// The quoter is not a view contract: it reverts internally to report the
    /// result, so it must be invoked through `eth_call`.
    #[sol(rpc)]
    interface IQuoter {
        function quoteExactInputSingle(
            address tokenIn,
            address tokenOut,
            uint24 fee,
            uint256 amountIn,
            uint160 sqrtPriceLimitX96
        ) external returns (uint256 amountOut);
    }

    /// Uniswap V3 NonfungiblePositionManager interface.
    #[sol(rpc)]
    interface INonfungiblePositionManager {
        struct MintParams {
            address token0;
            address token1;
            uint24 fee;
            int24 tickLower;
            int24 tickUpper;
            uint256 amount0Desired;
            uint256 amount1Desired;
            uint256 amount0Min;
            uint256 amount1Min;
            address recipient;
            uint256 deadline;
        }

        /// Creates a new position wrapped in a NFT.
        function mint(MintParams calldata params)
            external
            payable
            returns (uint256 tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);

        /// Number of position NFTs held by `owner`.
        function balanceOf(address owner) external view returns (uint256);

        /// Position NFT id held by `owner` at `index` of its list.
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);

        /// Position state associated with a given token id.
        function positions(uint256 tokenId)
            external
            view
            returns (
                uint96 nonce,
                address operator,
                address token0,
                address token1,
                uint24 fee,
                int24 tickLower,
                int24 tickUpper,
                uint128 liquidity,
                uint256 feeGrowthInside0LastX128,
                uint256 feeGrowthInside1LastX128,
                uint128 tokensOwed0,
                uint128 tokensOwed1
            );
    }

    /// Compound-style GovernorBravo delegator.
    #[sol(rpc)]
    interface IGovernorBravo {
        /// Submits a multi-action proposal. All four arrays must have equal length.
        function propose(
            address[] memory targets,
            uint256[] memory values,
            string[] memory signatures,
            bytes[] memory calldatas,
            string memory description
        ) external returns (uint256);
    }

    /// ENS registry.
    interface IENSRegistry {
        /// Sets the owner, resolver and TTL of the subnode `label` under `node`.
        function setSubnodeRecord(
            bytes32 node,
            bytes32 label,
            address owner,
            address resolver,
            uint64 ttl
        ) external;
    }

    /// ENS public resolver.
    interface IPublicResolver {
        /// Sets the text record `key` of `node` to `value`.
        function setText(bytes32 node, string calldata key, string calldata value) external;
    }

    /// Aave V2 flash-loan test harness.
    ///
    /// Borrows `amount` of `asset` from the lending pool resolved through the
    /// addresses provider passed to its constructor, emitting `Log` events along
    /// the way, and repays the loan plus premium out of its own balance.
    #[sol(rpc)]
    interface ITestAaveFlashLoan {
        event Log(string message, uint256 val);

        function testFlashLoan(address asset, uint256 amount) external;
    }
}
