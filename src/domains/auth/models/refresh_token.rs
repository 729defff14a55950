use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::auth::models::user::User;

/// Refresh credential 레코드 (DB 저장용)
/// One outstanding refresh secret, stored only as a salted one-way hash.
///
/// A record authenticates a request only while `revoked == false`,
/// `now < expires_at`, and the presented raw secret verifies against
/// `secret_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshCredentialRecord {
    pub id: Uuid,
    pub owner_id: u64,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshCredentialRecord {
    /// 새 레코드 생성 (수명은 발급 시점에 고정)
    /// Create a live record whose lifetime is fixed at issuance
    pub fn new(owner_id: u64, secret_hash: String, ttl: Duration) -> Self {
        let created_at = Utc::now();

        Self {
            id: Uuid::new_v4(),
            owner_id,
            secret_hash,
            created_at,
            expires_at: created_at + ttl,
            revoked: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }
}

/// Access token + raw refresh secret 쌍
/// The raw secret exists here and in the client's cookie only.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_secret: String,
}

/// Result of a successful rotation
#[derive(Debug, Clone)]
pub struct RotatedSession {
    pub owner: User,
    pub tokens: TokenPair,
}
