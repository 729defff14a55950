use std::sync::Arc;

use tracing::{debug, info};

use crate::domains::auth::models::{LoginRequest, RegisterRequest, RotatedSession, TokenPair, User};
use crate::domains::auth::services::{SecretHasher, TokenAuthority};
use crate::shared::database::UserDirectory;
use crate::shared::errors::AuthError;

/// 비밀번호 최소 길이
pub const MIN_PASSWORD_LEN: usize = 6;

// 인증 서비스
// 역할: NestJS의 Service 같은 것
// AuthService: login / refresh / logout / me flows on top of the token authority
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    authority: TokenAuthority,
    hasher: SecretHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserDirectory>, authority: TokenAuthority, hasher: SecretHasher) -> Self {
        Self {
            users,
            authority,
            hasher,
        }
    }

    pub fn authority(&self) -> &TokenAuthority {
        &self.authority
    }

    // 회원가입 (비즈니스 로직)
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let email = request.email.trim().to_string();
        validate_email(&email)?;
        validate_password(&request.password)?;

        // 1. 이메일 중복 확인
        let existing_user = self
            .users
            .get_user_by_email(&email)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to check email existence: {}", e)))?;

        if existing_user.is_some() {
            return Err(AuthError::ConflictingAccount { email });
        }

        // 2. 비밀번호 해싱
        let password_hash = self.hash_blocking(request.password).await?;

        // 3. 사용자 생성 (1번 확인 이후 다른 요청이 먼저 가입했을 수 있음)
        let user = self
            .users
            .create_user(&email, &password_hash)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to create user: {}", e)))?
            .ok_or(AuthError::ConflictingAccount { email })?;

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    // 로그인 (비즈니스 로직)
    // Returns: (User, access token + raw refresh secret)
    // 이전 refresh credential은 issue_pair 안에서 함께 무효화됨
    pub async fn login(&self, request: LoginRequest) -> Result<(User, TokenPair), AuthError> {
        // 1. 이메일로 사용자 조회
        let user = self
            .users
            .get_user_by_email(request.email.trim())
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::InvalidCredentials)?;

        // 2. 비밀번호 검증
        let hasher = self.hasher.clone();
        let password_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&request.password, &password_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))?;

        if !verified {
            debug!(user_id = user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        // 3. 새 토큰 쌍 발급
        let tokens = self.authority.issue_pair(&user).await?;

        info!(user_id = user.id, "user logged in");
        Ok((user, tokens))
    }

    /// Refresh: 쿠키의 raw secret 검증 후 rotation
    /// A missing cookie fails the same way as a mismatched one.
    pub async fn refresh(&self, raw_secret: Option<&str>) -> Result<RotatedSession, AuthError> {
        let raw_secret = raw_secret.ok_or(AuthError::InvalidCredentialFormat)?;
        self.authority.verify_and_rotate(raw_secret).await
    }

    /// 로그아웃 - 소유자의 모든 Refresh credential 무효화
    /// Unknown, malformed or absent secrets are a no-op.
    pub async fn logout(&self, raw_secret: Option<&str>) -> Result<(), AuthError> {
        let Some(raw_secret) = raw_secret else {
            return Ok(());
        };

        if let Some(owner_id) = self.authority.find_owner_by_raw_secret(raw_secret).await? {
            self.authority.revoke_all(owner_id).await?;
            info!(user_id = owner_id, "user logged out");
        }

        Ok(())
    }

    pub async fn me(&self, user_id: u64) -> Result<User, AuthError> {
        self.users
            .get_user_by_id(user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::InvalidToken) // 사용자가 없으면 InvalidToken 에러
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidEmail),
    }
}

/// 비밀번호 규칙: 6자 이상, 숫자 1개 이상, 대문자 1개 이상
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    Ok(())
}
