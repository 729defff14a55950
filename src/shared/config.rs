// =====================================================
// ServerConfig - 서버 설정 (환경 변수 기반)
// =====================================================
// 역할: 환경 변수에서 서버 설정을 읽고 기본값을 채움
//
// dev (기본값):
//   - 쿠키 Secure 속성 없음 (http 로컬 개발)
//   - DATABASE_URL 없으면 메모리 저장소 사용
//
// prod (RUST_ENV=prod):
//   - 쿠키 Secure 속성 사용
//   - JWT_SECRET 필수
// =====================================================

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use argon2::Params;
use chrono::Duration;

const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

/// Access token 기본 수명 (5분)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 300;
/// Refresh credential 기본 수명 (7일)
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 7;
/// 만료 레코드 정리 주기 (10분)
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 600;

/// 서버 설정
///
/// 환경 변수:
/// * `DATABASE_URL` - PostgreSQL 연결 문자열 (없으면 메모리 저장소)
/// * `BIND_ADDR` - 리스닝 주소 (기본값: `0.0.0.0:3002`)
/// * `JWT_SECRET` - access token 서명 키 (prod에서 필수)
/// * `RUST_ENV` - `dev` 또는 `prod` (기본값: `dev`)
/// * `FRONTEND_URL` - CORS 허용 origin (기본값: `http://localhost:5173`)
/// * `ACCESS_TOKEN_TTL_SECS`, `REFRESH_TOKEN_TTL_DAYS`, `PURGE_INTERVAL_SECS`
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Secure 쿠키 사용 여부
    pub production: bool,
    pub frontend_origin: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Access token exp 검증 허용 오차 (초)
    pub token_leeway_secs: u64,
    pub purge_interval: std::time::Duration,
    /// 비밀번호와 refresh secret 해싱에 쓰는 argon2 파라미터
    pub hash_params: Params,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3002)),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            production: false,
            frontend_origin: "http://localhost:5173".to_string(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::days(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
            token_leeway_secs: 0,
            purge_interval: std::time::Duration::from_secs(DEFAULT_PURGE_INTERVAL_SECS),
            hash_params: Params::default(),
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 설정 읽기
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 key 조회 함수로 설정 구성
    /// Build the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let production = match lookup("RUST_ENV").as_deref() {
            None | Some("dev") => false,
            Some("prod") => true,
            Some(other) => bail!("RUST_ENV must be \"dev\" or \"prod\", got {other:?}"),
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None if production => bail!("JWT_SECRET is required when RUST_ENV=prod"),
            None => {
                tracing::warn!("JWT_SECRET not set, using the development signing key");
                defaults.jwt_secret
            }
        };

        let bind_addr = parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?;
        let access_secs = parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_days = parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", DEFAULT_REFRESH_TOKEN_TTL_DAYS)?;
        let purge_secs = parse_or(&lookup, "PURGE_INTERVAL_SECS", DEFAULT_PURGE_INTERVAL_SECS)?;

        if access_secs <= 0 {
            bail!("ACCESS_TOKEN_TTL_SECS must be positive");
        }
        if refresh_days <= 0 {
            bail!("REFRESH_TOKEN_TTL_DAYS must be positive");
        }
        if purge_secs == 0 {
            bail!("PURGE_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            bind_addr,
            database_url: lookup("DATABASE_URL"),
            jwt_secret,
            production,
            frontend_origin: lookup("FRONTEND_URL").unwrap_or(defaults.frontend_origin),
            access_token_ttl: Duration::seconds(access_secs),
            refresh_token_ttl: Duration::days(refresh_days),
            token_leeway_secs: defaults.token_leeway_secs,
            purge_interval: std::time::Duration::from_secs(purge_secs),
            hash_params: defaults.hash_params,
        })
    }

    /// 저비용 argon2 파라미터 (테스트용)
    /// Cheap argon2 parameters for tests and local tooling.
    pub fn with_fast_hashing(mut self) -> Result<Self> {
        self.hash_params = Params::new(Params::MIN_M_COST, 1, 1, None)
            .map_err(|e| anyhow!("invalid argon2 params: {e}"))?;
        Ok(self)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
