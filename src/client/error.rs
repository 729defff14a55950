use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// 클라이언트 에러
/// Clone is required: one refresh failure is fanned out to every parked request.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Refresh failed: {0}")]
    RefreshFailed(Box<ClientError>),

    #[error("Refresh aborted before completion")]
    Aborted,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    #[error("Status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(Arc::new(err))
        }
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 200;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ClientError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ClientError::Unauthorized;
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY_LENGTH).collect());

        ClientError::Status { status, message }
    }

    /// 실패 응답을 에러로 변환 (body 소비)
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    /// 401 계열인지 (refresh 실패 포함)
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ClientError::Unauthorized => true,
            ClientError::RefreshFailed(inner) => inner.is_unauthorized(),
            _ => false,
        }
    }
}
