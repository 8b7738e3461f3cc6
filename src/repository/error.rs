use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract call error: {0}")]
    ContractError(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No signer configured for {0}")]
    MissingSigner(String),

    #[error("{0}")]
    Other(String),
}
