use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use crate::blockchain::LedgerError;
use crate::payment::PaymentError;
use crate::service::StakeError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid address format")]
    InvalidAddress,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream timed out")]
    UpstreamTimeout,

    #[error("Payment provider error: {0}")]
    Payment(#[from] PaymentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidAddress => (StatusCode::BAD_REQUEST, "Invalid wallet address format".to_string()),
            ApiError::InvalidParameter(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            ApiError::UpstreamTimeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            ApiError::Payment(PaymentError::InvalidValue(_)) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Payment(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// Implement From<ValidationError> for ApiError
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidAddress(_) => ApiError::InvalidAddress,
            ValidationError::MissingParameter(param) =>
                ApiError::BadRequest(format!("Missing parameter: {}", param)),
            ValidationError::InvalidParameter(msg) =>
                ApiError::InvalidParameter(msg),
        }
    }
}

impl From<StakeError> for ApiError {
    fn from(err: StakeError) -> Self {
        match err {
            StakeError::InvalidParameter(msg) => ApiError::InvalidParameter(msg),
            StakeError::Upstream(e) => match e.as_ref() {
                LedgerError::Timeout(_) => ApiError::UpstreamTimeout,
                other => ApiError::Upstream(other.to_string()),
            },
        }
    }
}
