//! HTTP error mapping for the gateway's routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use oxigate_core::GatewayError;

use crate::wire::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The request body could not be read.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(e) => match e {
                GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
                GatewayError::InvalidModelMapping { .. } => StatusCode::BAD_REQUEST,
                GatewayError::Config { .. } | GatewayError::ToolLoopExhausted { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                GatewayError::Backend { .. }
                | GatewayError::Transport(_)
                | GatewayError::Decode(_)
                | GatewayError::EmptyResponse(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Stable `type` discriminant for the error body.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request_error",
            ApiError::Gateway(e) => match e {
                GatewayError::NotFound { .. } => "not_found_error",
                GatewayError::InvalidModelMapping { .. } => "invalid_request_error",
                GatewayError::Config { .. } | GatewayError::ToolLoopExhausted { .. } => {
                    "server_error"
                }
                GatewayError::Backend { .. }
                | GatewayError::Transport(_)
                | GatewayError::Decode(_)
                | GatewayError::EmptyResponse(_) => "upstream_error",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        }
        let body = ErrorResponse::new(self.to_string(), self.error_type());
        (status, axum::Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
