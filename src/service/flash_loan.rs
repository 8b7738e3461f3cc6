use std::str::FromStr;
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, hex};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use tracing::instrument;

use crate::config::FlashLoanConfig;
use crate::repository::contract::{IERC20, ITestAaveFlashLoan};
use crate::repository::{EthereumRepository, TransactionOutcome, TransactionRepository};
use crate::service::types::{FlashLoanLog, FlashLoanReport};
use crate::service::utils::{format_balance, parse_amount};
use crate::service::{ServiceError, ServiceResult};

const ETH_DECIMALS: u8 = 18;

/// Exercises an Aave flash loan on a development node (usually a mainnet fork).
///
/// A whale account funds the harness with enough tokens to pay the premium,
/// then asks it to borrow and repay within one transaction.
pub struct FlashLoanService {
    reader: Arc<dyn EthereumRepository>,
    writer: Arc<dyn TransactionRepository>,
    settings: FlashLoanConfig,
}

impl FlashLoanService {
    pub fn new(
        reader: Arc<dyn EthereumRepository>,
        writer: Arc<dyn TransactionRepository>,
        settings: FlashLoanConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            settings,
        }
    }

    #[instrument(skip(self), err)]
    pub async fn run(&self) -> ServiceResult<FlashLoanReport> {
        let whale = Address::from_str(self.settings.whale.trim()).map_err(|e| {
            ServiceError::InvalidAddress(format!("whale {:?}: {e}", self.settings.whale))
        })?;
        let token = self.settings.token;

        // nothing may be sent before the whale is known to hold enough tokens
        let balance = self.reader.get_erc20_balance(token, whale).await?;
        let fund_amount = parse_amount(&self.settings.fund_amount, balance.decimals)?;
        let borrow_amount = parse_amount(&self.settings.borrow_amount, balance.decimals)?;

        if balance.balance < fund_amount {
            return Err(ServiceError::InsufficientBalance {
                required: format!(
                    "{} {}",
                    format_balance(fund_amount, balance.decimals),
                    balance.symbol
                ),
                available: format!(
                    "{} {}",
                    format_balance(balance.balance, balance.decimals),
                    balance.symbol
                ),
            });
        }

        let funder = self
            .writer
            .get_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ServiceError::InternalError("Node exposes no unlocked accounts".to_string())
            })?;

        let harness = match self.settings.harness {
            Some(harness) => harness,
            None => self.deploy_harness(funder).await?,
        };
        tracing::info!("Using flash-loan harness at {}", harness);

        if self.settings.impersonate {
            self.writer.impersonate_account(whale).await?;
        }

        let topup = parse_amount(&self.settings.gas_topup_eth, ETH_DECIMALS)?;
        let tx = TransactionRequest::default()
            .with_from(funder)
            .with_to(whale)
            .with_value(topup);
        self.send_and_wait(tx).await?;
        let whale_eth = self.reader.get_eth_balance(whale).await?;
        tracing::info!(
            "Sent {} ETH from {} to {} (whale now holds {} ETH)",
            self.settings.gas_topup_eth,
            funder,
            whale,
            format_balance(whale_eth, ETH_DECIMALS)
        );

        let transfer = IERC20::transferCall {
            to: harness,
            amount: fund_amount,
        }
        .abi_encode();
        let tx = TransactionRequest::default()
            .with_from(whale)
            .with_to(token)
            .with_input(transfer);
        self.send_and_wait(tx).await?;
        tracing::info!(
            "Funded harness with {} {}",
            format_balance(fund_amount, balance.decimals),
            balance.symbol
        );

        let flash_loan = ITestAaveFlashLoan::testFlashLoanCall {
            asset: token,
            amount: borrow_amount,
        }
        .abi_encode();
        let tx = TransactionRequest::default()
            .with_from(whale)
            .with_to(harness)
            .with_input(flash_loan);
        let outcome = self.send_and_wait(tx).await?;

        let logs = decode_harness_logs(&outcome);
        for log in &logs {
            tracing::info!("{} {}", log.message, log.value);
        }

        Ok(FlashLoanReport {
            harness,
            tx_hash: outcome.tx_hash,
            logs,
        })
    }

    /// Deploys a fresh harness from the configured creation bytecode, with the
    /// Aave addresses provider as its constructor argument.
    async fn deploy_harness(&self, deployer: Address) -> ServiceResult<Address> {
        let path = self.settings.harness_bytecode.as_deref().ok_or_else(|| {
            ServiceError::InternalError(
                "Either flash_loan.harness or flash_loan.harness_bytecode must be set".to_string(),
            )
        })?;

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServiceError::InternalError(format!("Failed to read harness bytecode {path}: {e}"))
        })?;
        let mut code = hex::decode(content.trim()).map_err(|e| {
            ServiceError::InternalError(format!("Harness bytecode {path} is not valid hex: {e}"))
        })?;
        code.extend_from_slice(&self.settings.address_provider.abi_encode());

        let tx = TransactionRequest::default()
            .with_from(deployer)
            .with_deploy_code(Bytes::from(code));
        let outcome = self.send_and_wait(tx).await?;

        let address = outcome.contract_address.ok_or_else(|| {
            ServiceError::MissingReceiptData(format!(
                "contract address of deployment {}",
                outcome.tx_hash
            ))
        })?;
        tracing::info!("Deployed flash-loan harness at {}", address);

        Ok(address)
    }

    async fn send_and_wait(&self, tx: TransactionRequest) -> ServiceResult<TransactionOutcome> {
        let tx_hash = self.writer.send_transaction(tx).await?;
        let outcome = self.writer.wait_for_receipt(tx_hash, 1).await?;
        Ok(outcome)
    }
}

/// Decodes every harness `Log(message, val)` event of a receipt, skipping
/// events emitted by other contracts (token transfers, lending pool).
fn decode_harness_logs(outcome: &TransactionOutcome) -> Vec<FlashLoanLog> {
    outcome
        .logs
        .iter()
        .filter_map(|log| log.log_decode::<ITestAaveFlashLoan::Log>().ok())
        .map(|log| {
            let event = log.inner.data;
            FlashLoanLog {
                message: event.message,
                value: event.val,
            }
        })
        .collect()
}
