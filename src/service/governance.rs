use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::U256;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use tracing::instrument;

use crate::config::GovernanceConfig;
use crate::repository::TransactionRepository;
use crate::repository::contract::{IENSRegistry, IGovernorBravo, IPublicResolver};
use crate::service::types::{ProposalActions, ProposalSubmission};
use crate::service::utils::{labelhash, namehash};
use crate::service::{ServiceError, ServiceResult};

/// Submits a GovernorBravo proposal that creates an ENS subdomain owned by
/// the timelock and sets one text record on it.
pub struct GovernanceService {
    writer: Arc<dyn TransactionRepository>,
    settings: GovernanceConfig,
}

impl GovernanceService {
    pub fn new(writer: Arc<dyn TransactionRepository>, settings: GovernanceConfig) -> Self {
        Self { writer, settings }
    }

    /// Fully qualified name of the subdomain, e.g. `label.uniswap.eth`.
    pub fn subdomain(&self) -> String {
        format!(
            "{}.{}",
            self.settings.subdomain_label, self.settings.parent_domain
        )
    }

    /// Builds the two proposal actions. Pure; nothing is sent.
    pub fn build_actions(&self) -> ProposalActions {
        let settings = &self.settings;

        let set_subnode_record = IENSRegistry::setSubnodeRecordCall {
            node: namehash(&settings.parent_domain),
            label: labelhash(&settings.subdomain_label),
            owner: settings.timelock,
            resolver: settings.public_resolver,
            ttl: 0,
        }
        .abi_encode();

        let set_text = IPublicResolver::setTextCall {
            node: namehash(&self.subdomain()),
            key: settings.text_key.clone(),
            value: settings.text_value.clone(),
        }
        .abi_encode();

        // empty signatures: the selector is part of the calldata
        let mut actions = ProposalActions::new();
        actions
            .push(settings.ens_registry, U256::ZERO, "", set_subnode_record)
            .push(settings.public_resolver, U256::ZERO, "", set_text);
        actions
    }

    /// Sends `propose(...)` to the governor and waits for the configured
    /// number of confirmations.
    #[instrument(skip(self), err)]
    pub async fn submit(&self) -> ServiceResult<ProposalSubmission> {
        let signer = self.writer.signer_address().ok_or_else(|| {
            ServiceError::MissingSigner("submitting a proposal requires a wallet".to_string())
        })?;

        let actions = self.build_actions();
        let count = actions.len();
        let (targets, values, signatures, calldatas) = actions.into_parts();

        let calldata = IGovernorBravo::proposeCall {
            targets,
            values,
            signatures,
            calldatas,
            description: self.settings.description.clone(),
        }
        .abi_encode();

        let tx = TransactionRequest::default()
            .with_from(signer)
            .with_to(self.settings.governor)
            .with_input(calldata);

        let tx_hash = self.writer.send_transaction(tx).await?;
        tracing::info!("Proposal transaction sent: {}", tx_hash);

        let outcome = self
            .writer
            .wait_for_receipt(tx_hash, self.settings.confirmations)
            .await?;

        let block_number = outcome.block_number.ok_or_else(|| {
            ServiceError::MissingReceiptData(format!("block number of {tx_hash}"))
        })?;
        tracing::info!(
            "Proposal has been mined at block number: {}, transaction hash: {}",
            block_number,
            tx_hash
        );

        Ok(ProposalSubmission {
            tx_hash,
            block_number,
            actions: count,
        })
    }
}
