use anyhow::{Context, Result};
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::ai_engine::FraudDetectionModel;
use crate::api::handlers::{compliance, status, transactions};
use crate::bridges::{build_relay, TransactionRecorder};
use crate::config::Settings;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<FraudDetectionModel>,
    /// `None` runs the service in score-only mode
    pub recorder: Option<Arc<dyn TransactionRecorder>>,
}

impl AppState {
    pub fn new(model: FraudDetectionModel, recorder: Option<Arc<dyn TransactionRecorder>>) -> Self {
        Self {
            model: Arc::new(model),
            recorder,
        }
    }
}

// API Router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(status::health_check))
        .route("/api/transaction", post(transactions::handle_transaction))
        .route("/api/flag-address", post(compliance::flag_address))
        .route("/api/kyc", post(compliance::update_kyc))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Load the model and relay, then serve until Ctrl-C
pub async fn start_api_server(settings: Settings) -> Result<()> {
    let model = FraudDetectionModel::load(&settings.model_path)
        .with_context(|| format!("failed to load model {}", settings.model_path.display()))?;

    let recorder = build_relay(&settings)
        .await
        .context("failed to initialize on-chain relay")?;
    if recorder.is_none() {
        info!("Running in score-only mode");
    }

    let app = create_router(AppState::new(model, recorder));

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("FraudGuard API listening on http://{}", address);
    info!("  POST /api/transaction    - Score (and record) a transaction");
    info!("  POST /api/flag-address   - Flag an address");
    info!("  POST /api/kyc            - Update KYC status");
    info!("  GET  /health             - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("FraudGuard API stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
