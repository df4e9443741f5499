//! On-chain recording of scored transactions

pub mod abi;
pub mod ethereum;

pub use abi::{ensure_record_function, load_abi, parse_abi};
pub use ethereum::EthereumRelay;

use crate::config::Settings;
use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building or submitting a contract call
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay configuration error: {0}")]
    Config(String),

    #[error("invalid ABI: {0}")]
    Abi(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("failed to encode contract call: {0}")]
    Encoding(String),

    #[error("failed to submit transaction: {0}")]
    Submission(String),

    #[error("failed to fetch receipt: {0}")]
    Receipt(String),

    #[error("no receipt for transaction {tx_hash:?} after {timeout_secs}s")]
    ReceiptTimeout { tx_hash: H256, timeout_secs: u64 },

    #[error("transaction {0:?} was dropped from the mempool")]
    Dropped(H256),

    #[error("transaction {0:?} reverted")]
    Reverted(H256),
}

/// Mined transaction details returned to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub transaction_hash: H256,
    pub block_number: Option<u64>,
}

/// Records a scored transaction on chain and waits for it to be mined
#[async_trait]
pub trait TransactionRecorder: Send + Sync {
    async fn record(
        &self,
        receiver: Address,
        amount: U256,
        risk_score: u32,
    ) -> Result<ChainReceipt, RelayError>;
}

/// Assemble the relay from settings.
///
/// Returns `Ok(None)` (score-only mode) when the ABI file is absent or no
/// private key is configured.
pub async fn build_relay(
    settings: &Settings,
) -> Result<Option<Arc<dyn TransactionRecorder>>, RelayError> {
    let abi = match load_abi(&settings.abi_path)? {
        Some(abi) => abi,
        None => return Ok(None),
    };

    if settings.private_key.is_none() {
        warn!("PRIVATE_KEY is not set. On-chain calls are disabled.");
        return Ok(None);
    }

    let relay = EthereumRelay::connect(settings, abi).await?;
    info!(
        "On-chain recording enabled: contract {:?} on chain {}",
        relay.contract_address(),
        relay.chain_id()
    );

    let recorder: Arc<dyn TransactionRecorder> = Arc::new(relay);
    Ok(Some(recorder))
}
