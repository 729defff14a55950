use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domains::auth::models::{Claims, RefreshCredentialRecord, RotatedSession, TokenPair, User};
use crate::domains::auth::services::{JwtService, SecretHasher};
use crate::shared::database::{CredentialStore, UserDirectory};
use crate::shared::errors::{AuthError, CredentialRejection};

/// raw secret을 저장된 해시들과 비교한 결과
enum SecretMatch {
    Live(RefreshCredentialRecord),
    Expired(RefreshCredentialRecord),
    Mismatch,
    NoCandidates,
}

/// 토큰 발급/검증/rotation/폐기 담당
/// Token Authority: issues access tokens and refresh secrets, verifies raw
/// secrets against stored hashes, rotates and revokes refresh credentials.
///
/// Issuing a record for an owner tombstones every earlier record of that
/// owner, so at most one refresh credential per user is live.
#[derive(Clone)]
pub struct TokenAuthority {
    store: Arc<dyn CredentialStore>,
    users: Arc<dyn UserDirectory>,
    jwt_service: JwtService,
    hasher: SecretHasher,
    refresh_ttl: Duration,
}

impl TokenAuthority {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        users: Arc<dyn UserDirectory>,
        jwt_service: JwtService,
        hasher: SecretHasher,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            store,
            users,
            jwt_service,
            hasher,
            refresh_ttl,
        }
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Access Token 발급 (부수 효과 없음)
    pub fn issue_access_token(&self, owner: &User) -> Result<String, AuthError> {
        self.jwt_service.generate_access_token(owner.id, &owner.email)
    }

    /// Access Token 검증
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt_service.verify_access_token(token)
    }

    /// Access token + 새 refresh secret 발급
    /// Issue an access token and a new raw refresh secret. Prior records of
    /// the owner are invalidated in the same store operation.
    pub async fn issue_pair(&self, owner: &User) -> Result<TokenPair, AuthError> {
        self.issue_replacing(owner, None)
            .await?
            .ok_or_else(|| AuthError::Internal("unconditional credential issue was refused".to_string()))
    }

    /// Refresh secret 검증 후 rotation
    ///
    /// 1. lookup key로 live 레코드를 찾아 해시 비교
    /// 2. 일치 없음 → `InvalidCredential`
    /// 3. 일치했지만 만료 → `ExpiredCredential`
    /// 4. 일치 → 기존 레코드 소비 + 새 레코드 발급 (한 트랜잭션)
    ///
    /// Two concurrent calls with the same secret race on consuming the
    /// matched record; the loser gets `InvalidCredential`.
    pub async fn verify_and_rotate(&self, raw_secret: &str) -> Result<RotatedSession, AuthError> {
        let result = self.rotate(raw_secret).await;
        if let Err(err) = &result {
            log_rejection(err);
        }
        result
    }

    async fn rotate(&self, raw_secret: &str) -> Result<RotatedSession, AuthError> {
        let record = match self.match_secret(raw_secret).await? {
            SecretMatch::Live(record) => record,
            SecretMatch::Expired(_) => return Err(AuthError::ExpiredCredential),
            SecretMatch::Mismatch => {
                return Err(AuthError::InvalidCredential { reason: CredentialRejection::Mismatch });
            }
            SecretMatch::NoCandidates => {
                return Err(AuthError::InvalidCredential { reason: CredentialRejection::NoneFound });
            }
        };

        let owner = self
            .users
            .get_user_by_id(record.owner_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::InvalidCredential { reason: CredentialRejection::UnknownOwner })?;

        match self.issue_replacing(&owner, Some(record.id)).await? {
            Some(tokens) => {
                info!(owner_id = owner.id, "refresh credential rotated");
                Ok(RotatedSession { owner, tokens })
            }
            None => Err(AuthError::InvalidCredential { reason: CredentialRejection::RotationLost }),
        }
    }

    /// 사용자의 모든 refresh credential 폐기 (로그아웃). 멱등
    pub async fn revoke_all(&self, owner_id: u64) -> Result<u64, AuthError> {
        let revoked = self
            .store
            .revoke_owner(owner_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to revoke refresh tokens: {}", e)))?;

        debug!(owner_id, revoked, "revoked refresh credentials");
        Ok(revoked)
    }

    /// raw secret으로 소유자 조회 (rotation 없음)
    /// Resolve the owner of a raw secret without rotating it. Expired but
    /// unrevoked records still resolve so logout can tombstone them.
    pub async fn find_owner_by_raw_secret(&self, raw_secret: &str) -> Result<Option<u64>, AuthError> {
        if SecretHasher::decode_credential(raw_secret).is_none() {
            return Ok(None);
        }

        match self.match_secret(raw_secret).await? {
            SecretMatch::Live(record) | SecretMatch::Expired(record) => Ok(Some(record.owner_id)),
            SecretMatch::Mismatch | SecretMatch::NoCandidates => Ok(None),
        }
    }

    /// 만료/폐기 레코드 삭제
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        self.store
            .purge(Utc::now())
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to purge refresh tokens: {}", e)))
    }

    /// 새 레코드 발급. `consumed`가 이미 소비된 경우 `None`
    async fn issue_replacing(&self, owner: &User, consumed: Option<Uuid>) -> Result<Option<TokenPair>, AuthError> {
        let access_token = self.issue_access_token(owner)?;

        let hasher = self.hasher.clone();
        let (refresh_secret, secret_hash) = tokio::task::spawn_blocking(move || {
            let secret = hasher.generate_secret();
            hasher.hash(&secret).map(|hash| (secret, hash))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))??;

        let record = RefreshCredentialRecord::new(owner.id, secret_hash, self.refresh_ttl);
        let record_id = record.id;

        let replaced = self
            .store
            .replace(record, consumed)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to store refresh token: {}", e)))?;

        if !replaced {
            return Ok(None);
        }

        debug!(owner_id = owner.id, %record_id, "issued refresh credential");
        Ok(Some(TokenPair {
            access_token,
            refresh_secret: SecretHasher::encode_credential(record_id, &refresh_secret),
        }))
    }

    /// lookup key로 레코드 하나 조회 + 해시 비교
    ///
    /// The secret is only stored hashed, so the cookie carries the record
    /// id next to it. Each attempt costs at most one argon2 verification,
    /// which runs on the blocking pool.
    async fn match_secret(&self, raw_secret: &str) -> Result<SecretMatch, AuthError> {
        let (lookup, secret) = SecretHasher::decode_credential(raw_secret).ok_or(AuthError::InvalidCredentialFormat)?;

        let candidate = self
            .store
            .find_live(lookup)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch refresh token: {}", e)))?;

        let Some(record) = candidate else {
            return Ok(SecretMatch::NoCandidates);
        };

        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || {
            if !hasher.verify(&secret, &record.secret_hash) {
                SecretMatch::Mismatch
            } else if record.is_expired(Utc::now()) {
                SecretMatch::Expired(record)
            } else {
                SecretMatch::Live(record)
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))
    }
}

fn log_rejection(err: &AuthError) {
    match err {
        AuthError::InvalidCredentialFormat => warn!(reason = "malformed", "refresh credential rejected"),
        AuthError::InvalidCredential { reason } => warn!(%reason, "refresh credential rejected"),
        AuthError::ExpiredCredential => warn!(reason = "expired", "refresh credential rejected"),
        _ => {}
    }
}
