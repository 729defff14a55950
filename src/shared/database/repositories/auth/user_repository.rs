use sqlx::{postgres::PgRow, PgPool, Row};
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::domains::auth::models::user::User;
use crate::shared::database::repositories::auth::traits::UserDirectory;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> User {
        User {
            id: row.get::<i64, _>("id") as u64,
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    // 사용자 생성 (이메일 중복이면 None)
    // UNIQUE(email) 충돌은 DO NOTHING → 행 없음
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(row.as_ref().map(Self::map_row))
    }

    // 이메일로 사용자 조회 (로그인용)
    // Get user by email (for login)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        Ok(row.as_ref().map(Self::map_row))
    }

    // ID로 사용자 조회
    // Get user by ID
    async fn get_user_by_id(&self, id: u64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by id")?;

        Ok(row.as_ref().map(Self::map_row))
    }
}
