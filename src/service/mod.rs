pub mod error;
pub mod flash_loan;
pub mod governance;
pub mod pool;
pub mod position;
pub mod quoter;
pub mod token_registry;
pub mod types;
pub mod utils;


pub use error::ServiceError;
pub use flash_loan::FlashLoanService;
pub use governance::GovernanceService;
pub use pool::PoolService;
pub use position::PositionService;
pub use quoter::QuoterService;
pub use token_registry::TokenRegistry;
pub use types::*;

pub(crate) type ServiceResult<T> = std::result::Result<T, ServiceError>;
