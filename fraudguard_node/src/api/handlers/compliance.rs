//! Compliance endpoints
//!
//! Watchlist flagging and KYC updates are accepted but not acted on; both
//! return a fixed success payload.

use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplianceResponse {
    pub status: String,
    pub message: String,
}

impl ComplianceResponse {
    fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }
}

/// POST /api/flag-address
pub async fn flag_address() -> Json<ComplianceResponse> {
    info!("Flag-address request accepted");
    Json(ComplianceResponse::success("Address flagged"))
}

/// POST /api/kyc
pub async fn update_kyc() -> Json<ComplianceResponse> {
    info!("KYC update request accepted");
    Json(ComplianceResponse::success("KYC updated"))
}
