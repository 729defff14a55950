use reqwest::{Method, StatusCode};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::{LOGIN_PATH, LOGOUT_PATH, ME_PATH, REGISTER_PATH};
use super::interceptor::{decode_json, AuthClient};
use super::ClientError;
use crate::domains::auth::models::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse, UserResponse,
};

/// 클라이언트 세션 상태
/// `is_loading` stays true until bootstrap settles, so observers never
/// mistake an unfinished bootstrap for a signed-out session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSessionState {
    pub user: Option<UserResponse>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl ClientSessionState {
    pub fn loading() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn signed_in(user: UserResponse) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: false,
        }
    }
}

impl AuthClient {
    /// 현재 세션 상태
    pub fn session(&self) -> ClientSessionState {
        self.inner.session.borrow().clone()
    }

    /// 세션 상태 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<ClientSessionState> {
        self.inner.session.subscribe()
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<UserResponse, ClientError> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: RegisterResponse = self.post_json(REGISTER_PATH, &request).await?;
        Ok(response.user)
    }

    /// 로그인: access token 저장, refresh secret은 쿠키 jar에 저장됨
    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post_json(LOGIN_PATH, &request).await?;

        self.install_token(response.access_token);
        self.inner
            .session
            .send_replace(ClientSessionState::signed_in(response.user.clone()));

        info!(user_id = response.user.id, "signed in");
        Ok(response.user)
    }

    /// 로그아웃: 서버 호출 실패와 관계없이 로컬 상태는 항상 정리
    pub async fn logout(&self) {
        let result = match self.request(Method::POST, LOGOUT_PATH) {
            Ok(builder) => builder.send().await.map_err(ClientError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(error = %e, "logout request failed, clearing local session anyway");
        }

        self.inner.token.clear();
        self.inner.session.send_replace(ClientSessionState::signed_out());
    }

    /// who-am-I (refresh interceptor 경유)
    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        let response: MeResponse = self.get_json(ME_PATH).await?;
        Ok(self.adopt(response))
    }

    /// 세션 복원 (페이지 새로고침 후)
    ///
    /// 1. who-am-I 직접 호출 (interceptor refresh 없음)
    /// 2. 401 → (선택) 대기 → refresh → who-am-I 1회 재시도
    /// 3. 실패 → signed out
    pub async fn bootstrap(&self) -> ClientSessionState {
        self.inner.session.send_replace(ClientSessionState::loading());

        let generation = self.inner.coordinator.generation();
        let state = match self.fetch_me_direct().await {
            Ok(me) => ClientSessionState::signed_in(self.adopt(me)),
            Err(ClientError::Unauthorized) => self.bootstrap_with_refresh(generation).await,
            Err(e) => {
                warn!(error = %e, "session bootstrap failed");
                self.inner.token.clear();
                ClientSessionState::signed_out()
            }
        };

        self.inner.session.send_replace(state.clone());
        state
    }

    async fn bootstrap_with_refresh(&self, generation: u64) -> ClientSessionState {
        let delay = self.inner.config.bootstrap_refresh_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        // 인터셉터와 같은 coordinator 사용 → refresh 중복 없음
        // 대기 중 다른 요청이 이미 refresh했으면 그 토큰을 사용
        if let Err(e) = self.refresh_since(Some(generation)).await {
            debug!(error = %e, "no restorable session");
            return ClientSessionState::signed_out();
        }

        match self.fetch_me_direct().await {
            Ok(me) => ClientSessionState::signed_in(self.adopt(me)),
            Err(e) => {
                warn!(error = %e, "who-am-I failed after refresh");
                self.inner.token.clear();
                ClientSessionState::signed_out()
            }
        }
    }

    async fn fetch_me_direct(&self) -> Result<MeResponse, ClientError> {
        let mut builder = self.request(Method::GET, ME_PATH)?;
        if let Some(token) = self.inner.token.get() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        decode_json(response).await
    }

    fn adopt(&self, me: MeResponse) -> UserResponse {
        if let Some(token) = me.access_token {
            self.install_token(token);
        }
        me.user
    }
}
