use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use crate::domains::auth::models::user::UserResponse;

// 회원가입 요청 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Email address
    /// 이메일 주소
    #[schema(example = "a@x.com")]
    pub email: String,

    /// Password (at least 6 characters, one digit, one uppercase letter)
    /// 비밀번호 (6자 이상, 숫자 1개, 대문자 1개 포함)
    #[schema(example = "Abcdef1")]
    pub password: String,
}

// 회원가입 응답 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Success message
    /// 성공 메시지
    pub message: String,

    /// User information (without password)
    /// 사용자 정보 (비밀번호 제외)
    pub user: UserResponse,
}

// 로그인 요청 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address
    /// 이메일 주소
    #[schema(example = "a@x.com")]
    pub email: String,

    /// Password
    /// 비밀번호
    #[schema(example = "Abcdef1")]
    pub password: String,
}

// 로그인 응답 모델
// Refresh secret은 body가 아니라 httpOnly 쿠키로만 전달됨
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Success message
    /// 성공 메시지
    pub message: String,

    /// JWT Access Token (짧은 수명)
    /// JWT Access Token (short lifetime)
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,

    /// User information (without password)
    /// 사용자 정보 (비밀번호 제외)
    pub user: UserResponse,
}

// 토큰 갱신 응답 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// 새 Access Token
    /// New Access Token
    pub access_token: String,
}

// 로그아웃 응답 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
}

// "who am I" 응답 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserResponse,

    /// Optional fresh access token; the server never sets it today but
    /// clients adopt it when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

// 에러 응답 모델
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Unauthorized")]
    pub message: String,
}
