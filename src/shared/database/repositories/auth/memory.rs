// In-memory stores
// DATABASE_URL 없이 실행할 때와 테스트에서 사용
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::domains::auth::models::{RefreshCredentialRecord, User};
use crate::shared::database::repositories::auth::traits::{CredentialStore, UserDirectory};

/// 메모리 기반 refresh credential 저장소
/// Every operation runs under one mutex, which makes `replace` atomic.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: Mutex<HashMap<Uuid, RefreshCredentialRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 전체 레코드 수 (revoked 포함)
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, record: RefreshCredentialRecord) -> Result<()> {
        let mut records = self.records.lock();
        if records.contains_key(&record.id) {
            bail!("duplicate refresh credential id {}", record.id);
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn list_live(&self, owner_id: Option<u64>) -> Result<Vec<RefreshCredentialRecord>> {
        let records = self.records.lock();
        Ok(records
            .values()
            .filter(|r| !r.revoked)
            .filter(|r| owner_id.map_or(true, |owner| r.owner_id == owner))
            .cloned()
            .collect())
    }

    async fn find_live(&self, id: Uuid) -> Result<Option<RefreshCredentialRecord>> {
        Ok(self.records.lock().get(&id).filter(|r| !r.revoked).cloned())
    }

    async fn revoke_owner(&self, owner_id: u64) -> Result<u64> {
        let mut records = self.records.lock();
        let mut revoked = 0;
        for record in records.values_mut() {
            if record.owner_id == owner_id && !record.revoked {
                record.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_record(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.lock();
        match records.get_mut(&id) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace(&self, record: RefreshCredentialRecord, consumed: Option<Uuid>) -> Result<bool> {
        let mut records = self.records.lock();

        if let Some(consumed) = consumed {
            let still_live = records.get(&consumed).is_some_and(|r| !r.revoked);
            if !still_live {
                return Ok(false);
            }
        }
        if records.contains_key(&record.id) {
            bail!("duplicate refresh credential id {}", record.id);
        }

        for existing in records.values_mut() {
            if existing.owner_id == record.owner_id {
                existing.revoked = true;
            }
        }
        records.insert(record.id, record);
        Ok(true)
    }

    async fn purge(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, r| r.is_live(now));
        Ok((before - records.len()) as u64)
    }
}

/// 메모리 기반 사용자 저장소
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<Vec<User>>,
    next_id: AtomicU64,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<Option<User>> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == email) {
            return Ok(None);
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: u64) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }
}
