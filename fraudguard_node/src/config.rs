//! Service configuration
//!
//! Every setting can be given on the command line or through the environment.
//! A `.env` file in the working directory is loaded before parsing.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// FraudGuard service settings
#[derive(Parser, Debug, Clone)]
#[clap(name = "fraudguard")]
#[clap(about = "FraudGuard - transaction fraud scoring with optional on-chain recording")]
pub struct Settings {
    /// Host to bind the HTTP server to
    #[clap(long, env = "FRAUDGUARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[clap(long, env = "FRAUDGUARD_PORT", default_value = "5000")]
    pub port: u16,

    /// Path to the serialized fraud classifier
    #[clap(long, env = "MODEL_PATH", default_value = "fraud_model.bin")]
    pub model_path: PathBuf,

    /// JSON-RPC endpoint of the chain the TransactionContract lives on
    #[clap(
        long,
        env = "WEB3_PROVIDER",
        default_value = "https://sepolia.infura.io/v3/YOUR_ID"
    )]
    pub web3_provider: String,

    /// Deployed TransactionContract address
    #[clap(
        long,
        env = "TX_CONTRACT_ADDR",
        default_value = "0xYourTransactionContractAddress"
    )]
    pub contract_address: String,

    /// TransactionContract ABI file
    #[clap(long, env = "TX_CONTRACT_ABI", default_value = "TransactionContractABI.json")]
    pub abi_path: PathBuf,

    /// Hex private key used to sign contract calls
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Chain id for EIP-155 signing; queried from the node when unset
    #[clap(long, env = "CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Contract function taking (address receiver, uint256 amount, uint256 riskScore)
    #[clap(long, env = "RECORD_FUNCTION", default_value = "recordTransaction")]
    pub record_function: String,

    /// Seconds to wait for a transaction receipt
    #[clap(long, env = "RECEIPT_TIMEOUT_SECS", default_value = "120")]
    pub receipt_timeout_secs: u64,

    /// Send legacy (pre EIP-1559) transactions
    #[clap(long, env = "LEGACY_TX")]
    pub legacy_tx: bool,
}

impl Settings {
    /// Load `.env` (if present) and parse settings from args and environment
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let settings = Settings::try_parse_from([
            "fraudguard",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--model-path",
            "/models/forest.bin",
            "--chain-id",
            "11155111",
            "--receipt-timeout-secs",
            "30",
            "--legacy-tx",
        ])
        .unwrap();

        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.model_path, PathBuf::from("/models/forest.bin"));
        assert_eq!(settings.chain_id, Some(11155111));
        assert_eq!(settings.receipt_timeout(), Duration::from_secs(30));
        assert!(settings.legacy_tx);
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Settings::try_parse_from(["fraudguard", "--port", "not-a-port"]).is_err());
    }
}
