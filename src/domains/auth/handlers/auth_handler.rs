use crate::domains::auth::models::{
    ErrorResponse, LoginRequest, LoginResponse, LogoutResponse, MeResponse, RefreshResponse,
    RegisterRequest, RegisterResponse,
};
use crate::shared::errors::AuthError;
use crate::shared::middleware::auth::AuthenticatedUser;
use crate::shared::middleware::cookies::{clear_refresh_cookie, get_refresh_secret, refresh_cookie};
use crate::shared::services::AppState;
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;

// 회원가입 핸들러
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = RegisterResponse),
        (status = 400, description = "Weak password or invalid email", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    // Service 호출 (비즈니스 로직)
    let user = app_state.auth_state.auth_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            message: "User created successfully".to_string(),
        }),
    ))
}

// 로그인 핸들러
// Refresh secret은 httpOnly 쿠키로만 전달
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets the refreshToken cookie", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let (user, tokens) = app_state.auth_state.auth_service.login(request).await?;

    let jar = jar.add(refresh_cookie(
        tokens.refresh_secret,
        app_state.auth_state.authority.refresh_ttl(),
        app_state.secure_cookies,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            access_token: tokens.access_token,
            user: user.into(),
        }),
    ))
}

/// 토큰 갱신 핸들러
/// Refresh handler: rotates the cookie secret and returns a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed; rotates the refreshToken cookie", body = RefreshResponse),
        (status = 401, description = "Refresh credential missing, invalid or expired", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>), AuthError> {
    let raw_secret = get_refresh_secret(&jar);

    let rotated = app_state
        .auth_state
        .auth_service
        .refresh(raw_secret.as_deref())
        .await?;

    let jar = jar.add(refresh_cookie(
        rotated.tokens.refresh_secret,
        app_state.auth_state.authority.refresh_ttl(),
        app_state.secure_cookies,
    ));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: rotated.tokens.access_token,
        }),
    ))
}

/// 로그아웃 핸들러
/// Logout always succeeds and always clears the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful; clears the refreshToken cookie", body = LogoutResponse)
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let raw_secret = get_refresh_secret(&jar);

    if let Err(e) = app_state
        .auth_state
        .auth_service
        .logout(raw_secret.as_deref())
        .await
    {
        tracing::warn!(error = %e, "logout revocation failed");
    }

    let jar = jar.add(clear_refresh_cookie(app_state.secure_cookies));
    (jar, Json(LogoutResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "User info retrieved successfully", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<MeResponse>, AuthError> {
    let user = app_state
        .auth_state
        .auth_service
        .me(authenticated_user.user_id)
        .await?;

    Ok(Json(MeResponse {
        user: user.into(),
        access_token: None,
    }))
}
