use std::sync::Arc;

use crate::domains::auth::services::state::AuthState;
use crate::shared::config::ServerConfig;
use crate::shared::database::{
    CredentialStore, Database, MemoryCredentialStore, MemoryUserDirectory, RefreshTokenRepository,
    UserDirectory, UserRepository,
};

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
///
/// 역할: NestJS의 Module에서 모든 Service를 주입하는 것과 유사
#[derive(Clone)]
pub struct AppState {
    pub auth_state: AuthState,
    /// 쿠키 Secure 속성 (prod에서만)
    pub secure_cookies: bool,
}

impl AppState {
    /// PostgreSQL 저장소로 AppState 생성
    pub fn new(db: Database, config: &ServerConfig) -> Self {
        let store = Arc::new(RefreshTokenRepository::new(db.pool().clone()));
        let users = Arc::new(UserRepository::new(db.pool().clone()));
        Self::from_stores(store, users, config)
    }

    /// 메모리 저장소로 AppState 생성 (DATABASE_URL 없을 때, 테스트)
    pub fn in_memory(config: &ServerConfig) -> Self {
        Self::from_stores(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryUserDirectory::new()),
            config,
        )
    }

    pub fn from_stores(
        store: Arc<dyn CredentialStore>,
        users: Arc<dyn UserDirectory>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            auth_state: AuthState::new(store, users, config),
            secure_cookies: config.production,
        }
    }
}
