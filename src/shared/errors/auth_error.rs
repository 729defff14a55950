use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Refresh credential 거부 사유 (내부 로깅용, 클라이언트에 노출하지 않음)
/// Why a refresh credential was rejected. Logged only, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRejection {
    /// 비교할 live 레코드가 없음
    NoneFound,
    /// 해시 불일치
    Mismatch,
    /// 동시 rotation에서 다른 요청이 먼저 소비함
    RotationLost,
    /// 레코드 소유자가 더 이상 존재하지 않음
    UnknownOwner,
}

impl fmt::Display for CredentialRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CredentialRejection::NoneFound => "none_found",
            CredentialRejection::Mismatch => "mismatch",
            CredentialRejection::RotationLost => "rotation_lost",
            CredentialRejection::UnknownOwner => "unknown_owner",
        };
        f.write_str(reason)
    }
}

/// 인증 관련 에러
/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// 이메일이 이미 존재함 (회원가입 충돌)
    /// Email already exists
    #[error("Email already exists: {email}")]
    ConflictingAccount { email: String },

    /// 잘못된 이메일 또는 비밀번호
    /// Invalid email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// 비밀번호 규칙 위반
    /// Password does not satisfy the strength rules
    #[error("{0}")]
    WeakPassword(String),

    /// 잘못된 이메일 형식
    #[error("Invalid email address")]
    InvalidEmail,

    /// Refresh credential이 없거나 형식이 잘못됨
    /// Refresh credential missing or malformed
    #[error("Refresh credential missing or malformed")]
    InvalidCredentialFormat,

    /// 일치하는 live refresh credential 없음
    /// No matching live refresh credential
    #[error("Refresh credential rejected: {reason}")]
    InvalidCredential { reason: CredentialRejection },

    /// Refresh credential 만료
    /// Refresh credential matched but has expired
    #[error("Refresh credential expired")]
    ExpiredCredential,

    /// 잘못된 또는 만료된 access token
    /// Invalid or expired access token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 토큰이 제공되지 않음
    /// Token not provided
    #[error("Token not provided")]
    MissingToken,

    /// 해싱 실패
    /// Failed to hash a password or refresh secret
    #[error("Failed to hash secret: {0}")]
    PasswordHashingFailed(String),

    /// 데이터베이스 에러
    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 내부 서버 에러
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::ConflictingAccount { .. } => StatusCode::CONFLICT,
            AuthError::WeakPassword(_) | AuthError::InvalidEmail => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::InvalidCredentialFormat
            | AuthError::InvalidCredential { .. }
            | AuthError::ExpiredCredential
            | AuthError::InvalidToken
            | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::PasswordHashingFailed(_)
            | AuthError::DatabaseError(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에 보여줄 메시지
    /// Credential and token failures collapse into one opaque message so the
    /// response never tells a caller which check failed.
    fn public_message(&self) -> String {
        match self {
            AuthError::ConflictingAccount { .. } => "Email already exists".to_string(),
            AuthError::WeakPassword(_) | AuthError::InvalidEmail => self.to_string(),
            AuthError::InvalidCredentials => "Invalid credentials".to_string(),
            AuthError::InvalidCredentialFormat
            | AuthError::InvalidCredential { .. }
            | AuthError::ExpiredCredential
            | AuthError::InvalidToken
            | AuthError::MissingToken => "Unauthorized".to_string(),
            AuthError::PasswordHashingFailed(_)
            | AuthError::DatabaseError(_)
            | AuthError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// AuthError를 HTTP 응답으로 변환
impl From<AuthError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: AuthError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }

        (status, Json(json!({ "message": err.public_message() })))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body: (StatusCode, Json<serde_json::Value>) = self.into();
        body.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_one_message() {
        let errors = [
            AuthError::InvalidCredentialFormat,
            AuthError::InvalidCredential { reason: CredentialRejection::Mismatch },
            AuthError::InvalidCredential { reason: CredentialRejection::NoneFound },
            AuthError::ExpiredCredential,
            AuthError::InvalidToken,
        ];

        for err in errors {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.public_message(), "Unauthorized");
        }
    }

    #[test]
    fn test_server_faults_hide_details() {
        let err = AuthError::DatabaseError("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_conflict_status() {
        let err = AuthError::ConflictingAccount { email: "a@x.com".to_string() };
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
