//! API error handling for FraudGuard

use crate::ai_engine::ModelError;
use crate::bridges::RelayError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: u64,
}

impl ApiError {
    pub fn new(code: u16, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn with_details(code: u16, message: String, details: serde_json::Value) -> Self {
        Self {
            code,
            message,
            details: Some(details),
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(400, message.to_string())
    }

    pub fn validation_error(err: ValidationError) -> Self {
        Self::with_details(
            422,
            "Validation error".to_string(),
            serde_json::to_value(err).unwrap_or(serde_json::Value::Null),
        )
    }

    pub fn internal_server_error(reason: &str) -> Self {
        Self::with_details(
            500,
            "Internal server error".to_string(),
            serde_json::json!({
                "reason": reason
            }),
        )
    }

    pub fn chain_error(reason: &str) -> Self {
        Self::with_details(
            502,
            "On-chain call failed".to_string(),
            serde_json::json!({
                "reason": reason
            }),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Validation error details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: Option<serde_json::Value>,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>, value: Option<serde_json::Value>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            value,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::validation_error(err)
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::FeatureMismatch { expected, actual } => {
                Self::validation_error(ValidationError::new(
                    "features",
                    format!("expected {} features, got {}", expected, actual),
                    Some(serde_json::json!(actual)),
                ))
            }
            other => Self::internal_server_error(&other.to_string()),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self::chain_error(&err.to_string())
    }
}

/// Convert serde_json::Error to ApiError
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(&format!("JSON parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("x").into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::validation_error(ValidationError::new("receiver", "bad", None))
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::internal_server_error("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::chain_error("rpc down").into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::new(1000, "odd".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_feature_mismatch_is_validation_error() {
        let err: ApiError = ModelError::FeatureMismatch {
            expected: 4,
            actual: 2,
        }
        .into();
        assert_eq!(err.code, 422);
        assert_eq!(err.details.unwrap()["field"], "features");
    }

    #[test]
    fn test_other_model_errors_are_internal() {
        let err: ApiError = ModelError::Corrupt("model has no trees".to_string()).into();
        assert_eq!(err.code, 500);
        assert_eq!(err.message, "Internal server error");
        assert!(err.details.unwrap()["reason"]
            .as_str()
            .unwrap()
            .contains("no trees"));
    }

    #[test]
    fn test_validation_error_details() {
        let err: ApiError =
            ValidationError::new("amount", "Amount cannot be negative", Some(serde_json::json!(-1)))
                .into();
        assert_eq!(err.code, 422);
        let details = err.details.unwrap();
        assert_eq!(details["field"], "amount");
        assert_eq!(details["message"], "Amount cannot be negative");
        assert_eq!(details["value"], -1);
    }

    #[test]
    fn test_relay_error_maps_to_bad_gateway() {
        let err: ApiError = RelayError::Submission("nonce too low".to_string()).into();
        assert_eq!(err.code, 502);
        assert!(err.details.unwrap()["reason"]
            .as_str()
            .unwrap()
            .contains("nonce too low"));
    }
}
