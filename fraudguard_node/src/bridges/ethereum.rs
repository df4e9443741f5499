//! Ethereum relay using ethers-rs
//!
//! Builds a `recordTransaction(receiver, amount, riskScore)` call against the
//! TransactionContract, signs it with the configured key, submits it over
//! JSON-RPC and waits for one confirmation.

use super::{ensure_record_function, ChainReceipt, RelayError, TransactionRecorder};
use crate::config::Settings;
use async_trait::async_trait;
use ethers::abi::Abi;
use ethers::prelude::*;
use log::info;
use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

type RelayClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signing relay for the TransactionContract
pub struct EthereumRelay {
    /// Contract bound to the signing client
    contract: Contract<RelayClient>,
    /// Function called for each scored transaction
    record_function: String,
    /// Chain ID used for EIP-155 signatures
    chain_id: u64,
    /// Upper bound on the receipt wait
    receipt_timeout: Duration,
    /// Send legacy transactions instead of EIP-1559
    legacy: bool,
}

impl EthereumRelay {
    /// Create a relay from settings and a parsed ABI.
    ///
    /// Queries `eth_chainId` only when no chain ID is configured.
    pub async fn connect(settings: &Settings, abi: Abi) -> Result<Self, RelayError> {
        ensure_record_function(&abi, &settings.record_function)?;

        let contract_address = settings.contract_address.parse::<Address>().map_err(|e| {
            RelayError::Config(format!(
                "invalid contract address {}: {}",
                settings.contract_address, e
            ))
        })?;

        let private_key = settings
            .private_key
            .as_deref()
            .ok_or_else(|| RelayError::Config("no private key configured".to_string()))?;
        let wallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| RelayError::Config(format!("invalid private key: {}", e)))?;

        let provider = Provider::<Http>::try_from(settings.web3_provider.as_str())
            .map_err(|e| RelayError::Config(format!("invalid provider URL: {}", e)))?;

        let chain_id = match settings.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| RelayError::Provider(format!("failed to get chain ID: {}", e)))?
                .as_u64(),
        };

        let wallet = wallet.with_chain_id(chain_id);
        info!("Relay signer address: {:?}", wallet.address());

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let contract = Contract::new(contract_address, abi, client);

        Ok(Self {
            contract,
            record_function: settings.record_function.clone(),
            chain_id,
            receipt_timeout: settings.receipt_timeout(),
            legacy: settings.legacy_tx,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn signer_address(&self) -> Address {
        self.contract.client().address()
    }
}

#[async_trait]
impl TransactionRecorder for EthereumRelay {
    async fn record(
        &self,
        receiver: Address,
        amount: U256,
        risk_score: u32,
    ) -> Result<ChainReceipt, RelayError> {
        let mut call = self
            .contract
            .method::<_, ()>(
                &self.record_function,
                (receiver, amount, U256::from(risk_score)),
            )
            .map_err(|e| RelayError::Encoding(e.to_string()))?;
        if self.legacy {
            call = call.legacy();
        }

        let pending = call
            .send()
            .await
            .map_err(|e| RelayError::Submission(e.to_string()))?;

        let tx_hash = pending.tx_hash();
        info!("Transaction sent: {:?}", tx_hash);

        let receipt = tokio::time::timeout(self.receipt_timeout, pending.confirmations(1))
            .await
            .map_err(|_| RelayError::ReceiptTimeout {
                tx_hash,
                timeout_secs: self.receipt_timeout.as_secs(),
            })?
            .map_err(|e| RelayError::Receipt(e.to_string()))?
            .ok_or(RelayError::Dropped(tx_hash))?;

        if receipt.status == Some(U64::from(0)) {
            return Err(RelayError::Reverted(tx_hash));
        }

        let block_number = receipt.block_number.map(|n| n.as_u64());
        info!(
            "Transaction {:?} mined in block {:?}",
            receipt.transaction_hash, block_number
        );

        Ok(ChainReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number,
        })
    }
}
