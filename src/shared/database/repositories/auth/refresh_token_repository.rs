use sqlx::{postgres::PgRow, PgPool, Row};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domains::auth::models::refresh_token::RefreshCredentialRecord;
use crate::shared::database::repositories::auth::traits::CredentialStore;

/// Refresh Token Repository
/// Refresh credential 데이터베이스 작업 처리 (PostgreSQL)
#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> RefreshCredentialRecord {
        RefreshCredentialRecord {
            id: row.get("id"),
            owner_id: row.get::<i64, _>("user_id") as u64,
            secret_hash: row.get("token_hash"),
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
            revoked: row.get("revoked"),
        }
    }
}

#[async_trait]
impl CredentialStore for RefreshTokenRepository {
    /// Refresh Token 생성 (저장)
    /// Create and store refresh token
    async fn insert(&self, record: RefreshCredentialRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id as i64)  // u64 -> i64 변환 (DB는 BIGINT = i64)
        .bind(&record.secret_hash)
        .bind(record.expires_at)
        .bind(record.revoked)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create refresh token")?;

        Ok(())
    }

    /// revoked = FALSE 인 Refresh Token 조회
    /// List non-revoked refresh tokens
    async fn list_live(&self, owner_id: Option<u64>) -> Result<Vec<RefreshCredentialRecord>> {
        let rows = match owner_id {
            Some(owner_id) => sqlx::query(
                r#"
                SELECT id, user_id, token_hash, expires_at, created_at, revoked
                FROM refresh_tokens
                WHERE user_id = $1 AND revoked = FALSE
                "#,
            )
            .bind(owner_id as i64)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query(
                r#"
                SELECT id, user_id, token_hash, expires_at, created_at, revoked
                FROM refresh_tokens
                WHERE revoked = FALSE
                "#,
            )
            .fetch_all(&self.pool)
            .await,
        }
        .context("Failed to list refresh tokens")?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    /// id로 live Refresh Token 조회 (쿠키의 lookup key)
    async fn find_live(&self, id: Uuid) -> Result<Option<RefreshCredentialRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, token_hash, expires_at, created_at, revoked
            FROM refresh_tokens
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch refresh token")?;

        Ok(row.as_ref().map(Self::map_row))
    }

    /// 사용자의 모든 Refresh Token 무효화 (로그아웃 시)
    /// Revoke all refresh tokens for a user
    async fn revoke_owner(&self, owner_id: u64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = NOW()
            WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(owner_id as i64)
        .execute(&self.pool)
        .await
        .context("Failed to revoke all refresh tokens for user")?;

        Ok(result.rows_affected())
    }

    /// Refresh Token 무효화 (revoked = true)
    /// Revoke refresh token
    async fn revoke_record(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = NOW()
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to revoke refresh token")?;

        Ok(result.rows_affected() == 1)
    }

    /// 새 Refresh Token 발급 + 기존 토큰 무효화 (한 트랜잭션)
    ///
    /// The conditional UPDATE on the consumed row takes its row lock, so a
    /// concurrent rotation of the same secret blocks until this transaction
    /// ends and then matches zero rows.
    async fn replace(&self, record: RefreshCredentialRecord, consumed: Option<Uuid>) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin refresh token transaction")?;

        if let Some(consumed) = consumed {
            let claimed = sqlx::query(
                r#"
                UPDATE refresh_tokens
                SET revoked = TRUE, updated_at = NOW()
                WHERE id = $1 AND revoked = FALSE
                "#,
            )
            .bind(consumed)
            .execute(&mut *tx)
            .await
            .context("Failed to claim refresh token")?;

            if claimed.rows_affected() == 0 {
                tx.rollback().await.context("Failed to roll back refresh token transaction")?;
                return Ok(false);
            }
        }

        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = NOW()
            WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(record.owner_id as i64)
        .execute(&mut *tx)
        .await
        .context("Failed to revoke previous refresh tokens")?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, $5, NOW())
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id as i64)
        .bind(&record.secret_hash)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create refresh token")?;

        tx.commit().await.context("Failed to commit refresh token transaction")?;
        Ok(true)
    }

    /// 만료/무효화된 토큰 삭제 (정리 작업)
    /// Delete expired or revoked tokens (cleanup)
    async fn purge(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at <= $1 OR revoked = TRUE
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to delete expired refresh tokens")?;

        Ok(result.rows_affected())
    }
}
