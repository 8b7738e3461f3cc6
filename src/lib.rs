pub mod config;
pub mod repository;
pub mod service;
pub mod uniswap;

// Re-export commonly used types for the binary and tests
pub use service::{
    FlashLoanReport, FlashLoanService, GovernanceService, MintOutcome, MintRequest, PoolInfo,
    PoolService, PositionService, ProposalActions, ProposalSubmission, Quote, QuoterService,
    ServiceError, Token, TokenRegistry,
};
