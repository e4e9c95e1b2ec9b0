use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::metering::MeteringError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Invalid request input
    ValidationError(String),
    /// Unknown pricing model id
    PricingModelNotFound(String),
    /// Metering backend failure
    Metering(MeteringError),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Invalid request: {}", msg),
            Self::PricingModelNotFound(id) => write!(f, "Pricing model not found: {}", id),
            Self::Metering(err) => write!(f, "Metering error: {}", err),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Metering(err) => Some(err),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::PricingModelNotFound(_) => StatusCode::NOT_FOUND,
            Self::Metering(err) => metering_status(err),
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Upstream error statuses pass through; transport failures become 502
fn metering_status(err: &MeteringError) -> StatusCode {
    match err {
        MeteringError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        MeteringError::Upstream { status, .. }
            if status.is_client_error() || status.is_server_error() =>
        {
            *status
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            Self::ConfigError(msg) => msg.clone(),
            Self::ValidationError(msg) => msg.clone(),
            Self::PricingModelNotFound(_) => "Pricing model not found".to_string(),
            Self::Metering(err) => err.to_string(),
            Self::InternalError(msg) => msg.clone(),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::ValidationError(_) => "validation_error",
        AppError::PricingModelNotFound(_) => "pricing_model_not_found",
        AppError::Metering(_) => "metering_error",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<MeteringError> for AppError {
    fn from(err: MeteringError) -> Self {
        Self::Metering(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}
