use anyhow::Result;
use fraudguard_node::{api::start_api_server, config::Settings};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting FraudGuard v{}", env!("CARGO_PKG_VERSION"));
    info!("Model path: {}", settings.model_path.display());
    info!("Web3 provider: {}", settings.web3_provider);

    start_api_server(settings).await
}
