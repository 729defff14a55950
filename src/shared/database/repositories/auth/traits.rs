use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domains::auth::models::{RefreshCredentialRecord, User};

/// Refresh credential 저장소
/// Persistence contract used by the token authority.
///
/// No ordering is guaranteed across records; only `id` must be unique.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 레코드 저장
    async fn insert(&self, record: RefreshCredentialRecord) -> Result<()>;

    /// revoked가 아닌 레코드 목록 (만료 여부는 호출자가 판단)
    /// Non-revoked records, optionally scoped to one owner. Expired records
    /// are included; the caller filters on `expires_at`.
    async fn list_live(&self, owner_id: Option<u64>) -> Result<Vec<RefreshCredentialRecord>>;

    /// id로 revoked가 아닌 레코드 하나 조회 (만료 여부는 호출자가 판단)
    async fn find_live(&self, id: Uuid) -> Result<Option<RefreshCredentialRecord>>;

    /// 사용자의 모든 live 레코드 무효화. 무효화된 개수 반환
    async fn revoke_owner(&self, owner_id: u64) -> Result<u64>;

    /// 레코드 하나 무효화. 이미 무효화된 경우 false
    async fn revoke_record(&self, id: Uuid) -> Result<bool>;

    /// 새 레코드 발급 (원자적)
    ///
    /// Atomically tombstones `consumed` together with every other live record
    /// of `record.owner_id`, then inserts `record`. When `consumed` is given
    /// but is no longer live, nothing changes and `false` is returned. A
    /// failure leaves the previous records untouched.
    async fn replace(&self, record: RefreshCredentialRecord, consumed: Option<Uuid>) -> Result<bool>;

    /// 만료되었거나 무효화된 레코드 삭제
    async fn purge(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// 사용자 저장소 (외부 collaborator)
/// User directory collaborator: the core only needs id + email lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 이미 등록된 이메일이면 `None`
    /// Returns `None` when the email is already taken, including when a
    /// concurrent insert won the race after the caller's lookup.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_user_by_id(&self, id: u64) -> Result<Option<User>>;
}
