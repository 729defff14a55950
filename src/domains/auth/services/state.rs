// Auth domain state
// 인증 도메인 상태
use std::sync::Arc;

use crate::domains::auth::services::{
    AuthService, CredentialPurgeScheduler, JwtService, SecretHasher, TokenAuthority,
};
use crate::shared::config::ServerConfig;
use crate::shared::database::{CredentialStore, UserDirectory};

/// Auth domain state
/// 인증 도메인에서 필요한 서비스들을 포함하는 상태
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: AuthService,
    pub authority: TokenAuthority,
    pub purge_scheduler: CredentialPurgeScheduler,
}

impl AuthState {
    /// 저장소 구현과 설정으로 AuthState 생성
    pub fn new(
        store: Arc<dyn CredentialStore>,
        users: Arc<dyn UserDirectory>,
        config: &ServerConfig,
    ) -> Self {
        let hasher = SecretHasher::new(config.hash_params.clone());
        let jwt_service = JwtService::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.token_leeway_secs,
        );
        let authority = TokenAuthority::new(
            store,
            users.clone(),
            jwt_service,
            hasher.clone(),
            config.refresh_token_ttl,
        );

        Self {
            auth_service: AuthService::new(users, authority.clone(), hasher),
            purge_scheduler: CredentialPurgeScheduler::new(authority.clone(), config.purge_interval),
            authority,
        }
    }
}
