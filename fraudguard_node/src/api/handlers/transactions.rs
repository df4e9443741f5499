//! Transaction scoring handler

use crate::api::errors::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::api::validation::{checksum_address, parse_amount, parse_features, validate_receiver};
use axum::{body::Bytes, extract::State, Json};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/transaction`; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct TransactionRequest {
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub receiver: Value,
    #[serde(default)]
    pub features: Value,
}

impl TransactionRequest {
    /// Parse a raw body; an empty body is an empty request
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(ApiError::bad_request("Request body must be a JSON object"));
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Response of `POST /api/transaction`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TransactionResponse {
    /// Recorded on chain
    OnChain {
        status: String,
        #[serde(rename = "transactionHash")]
        transaction_hash: String,
        #[serde(rename = "riskScore")]
        risk_score: u32,
        #[serde(rename = "blockNumber")]
        block_number: Option<u64>,
    },
    /// Scored only
    Scored { status: String, risk_score: u32 },
}

/// POST /api/transaction
pub async fn handle_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<TransactionResponse>> {
    let request = TransactionRequest::from_body(&body)?;

    let features = parse_features(&request.features)?;
    let risk_score = state.model.predict_score(&features)?;
    debug!("Scored {} features: risk_score={}", features.len(), risk_score);

    let recorder = match &state.recorder {
        Some(recorder) => recorder,
        None => {
            return Ok(Json(TransactionResponse::Scored {
                status: "success".to_string(),
                risk_score,
            }))
        }
    };

    let receiver = validate_receiver(&request.receiver)?;
    let amount = parse_amount(&request.amount)?;

    info!(
        "Recording transaction on chain: receiver={}, amount={}, risk_score={}",
        checksum_address(&receiver),
        amount,
        risk_score
    );
    let receipt = recorder.record(receiver, amount, risk_score).await?;

    Ok(Json(TransactionResponse::OnChain {
        status: "success".to_string(),
        transaction_hash: format!("{:?}", receipt.transaction_hash),
        risk_score,
        block_number: receipt.block_number,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_uses_defaults() {
        let request = TransactionRequest::from_body(b"").unwrap();
        assert_eq!(request.amount, Value::Null);
        assert_eq!(request.features, Value::Null);

        assert!(TransactionRequest::from_body(b"  \n").is_ok());
    }

    #[test]
    fn test_rejects_non_object_body() {
        assert_eq!(TransactionRequest::from_body(b"[1, 2, 3]").unwrap_err().code, 400);
        assert_eq!(TransactionRequest::from_body(b"{\"amount\":").unwrap_err().code, 400);
    }

    #[test]
    fn test_response_shapes() {
        let scored = serde_json::to_value(TransactionResponse::Scored {
            status: "success".to_string(),
            risk_score: 500,
        })
        .unwrap();
        assert_eq!(scored, json!({"status": "success", "risk_score": 500}));

        let on_chain = serde_json::to_value(TransactionResponse::OnChain {
            status: "success".to_string(),
            transaction_hash: "0xabc".to_string(),
            risk_score: 42,
            block_number: Some(7),
        })
        .unwrap();
        assert_eq!(
            on_chain,
            json!({
                "status": "success",
                "transactionHash": "0xabc",
                "riskScore": 42,
                "blockNumber": 7
            })
        );
    }
}
