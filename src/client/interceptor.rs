use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{header, Method, Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::config::{skips_refresh, ClientConfig, REFRESH_PATH};
use super::session::ClientSessionState;
use super::single_flight::{RefreshCoordinator, Renewal};
use super::token::TokenSlot;
use super::ClientError;
use crate::domains::auth::models::RefreshResponse;

pub(super) struct Inner {
    pub(super) http: reqwest::Client,
    pub(super) config: ClientConfig,
    pub(super) token: TokenSlot,
    pub(super) coordinator: RefreshCoordinator,
    pub(super) session: watch::Sender<ClientSessionState>,
}

/// 인증 HTTP 클라이언트 (axios interceptor 같은 역할)
/// Refresh-aware HTTP client.
///
/// Stamps the current access token on outgoing requests. A 401 on any
/// endpoint other than login, registration or refresh triggers one shared
/// refresh, after which the request is replayed once with the new token.
/// Clone is cheap and shares the token, cookie jar and coordinator.
#[derive(Clone)]
pub struct AuthClient {
    pub(super) inner: Arc<Inner>,
}

impl AuthClient {
    /// Create a client with its own cookie jar
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    /// Create a client over an existing cookie jar (the refresh secret lives there)
    pub fn with_jar(config: ClientConfig, jar: Arc<Jar>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_parts(http, config))
    }

    pub fn with_parts(http: reqwest::Client, config: ClientConfig) -> Self {
        let (session, _) = watch::channel(ClientSessionState::loading());

        Self {
            inner: Arc::new(Inner {
                http,
                config,
                token: TokenSlot::default(),
                coordinator: RefreshCoordinator::new(),
                session,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.token.get()
    }

    pub fn set_access_token(&self, token: String) {
        self.install_token(token);
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.coordinator.is_refreshing()
    }

    /// Request builder bound to this client's connection pool and cookie jar
    pub fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.inner.config.endpoint(path)?;
        Ok(self.inner.http.request(method, url))
    }

    /// 요청 실행 (401 → refresh → 1회 재시도)
    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        // generation을 먼저 읽음 (토큰 설치는 토큰 → generation 순서)
        let generation = self.inner.coordinator.generation();
        let sent_with = self.inner.token.get();
        let replay = request.try_clone();
        let exempt = skips_refresh(request.url());

        let response = self.send(request, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        if exempt {
            return Err(ClientError::Unauthorized);
        }

        let replay = replay.ok_or_else(|| {
            ClientError::InvalidRequest("request body cannot be replayed".to_string())
        })?;

        let token = self.refresh_since(Some(generation)).await?;

        let response = self.send(replay, Some(&token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.request(Method::GET, path)?.build()?;
        let response = self.execute(request).await?;
        decode_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body).build()?;
        let response = self.execute(request).await?;
        decode_json(response).await
    }

    /// Shared refresh: at most one refresh call is on the wire at a time.
    ///
    /// On success the new token is stored before any parked request resumes.
    /// On failure the token is cleared and the session is published as
    /// signed out before parked requests are rejected. An explicit call
    /// always reaches the server unless a refresh is already in flight.
    pub async fn refresh_access_token(&self) -> Result<String, ClientError> {
        self.refresh_since(None).await
    }

    /// Refresh on behalf of a request sent under `generation`.
    ///
    /// Settles without a server call when the token was already renewed
    /// since then, or when that generation's refresh already failed.
    pub(super) async fn refresh_since(&self, generation: Option<u64>) -> Result<String, ClientError> {
        let renewal = self
            .inner
            .coordinator
            .run(generation, || async {
                let outcome = tokio::time::timeout(self.inner.config.refresh_timeout, self.call_refresh()).await;

                match outcome {
                    Ok(Ok(token)) => {
                        self.inner.token.set(token.clone());
                        debug!("access token refreshed");
                        Ok(token)
                    }
                    Ok(Err(e)) => Err(self.fail_refresh(e)),
                    Err(_) => Err(self.fail_refresh(ClientError::Timeout)),
                }
            })
            .await?;

        match renewal {
            Renewal::Refreshed(token) => Ok(token),
            Renewal::Superseded => {
                debug!("token renewed while request was in flight, replaying");
                self.inner.token.get().ok_or(ClientError::Unauthorized)
            }
        }
    }

    /// refresh 밖에서 받은 토큰 설치 (로그인, who-am-I 응답)
    pub(super) fn install_token(&self, token: String) {
        self.inner.token.set(token);
        self.inner.coordinator.advance();
    }

    async fn call_refresh(&self) -> Result<String, ClientError> {
        // 쿠키만 사용 (Authorization 헤더 없음)
        let response = self.request(Method::POST, REFRESH_PATH)?.send().await?;
        let body: RefreshResponse = decode_json(response).await?;
        Ok(body.access_token)
    }

    fn fail_refresh(&self, err: ClientError) -> ClientError {
        warn!(error = %err, "token refresh failed, signing out");
        self.inner.token.clear();
        self.inner.session.send_replace(ClientSessionState::signed_out());
        ClientError::RefreshFailed(Box::new(err))
    }

    async fn send(&self, mut request: Request, token: Option<&str>) -> Result<Response, ClientError> {
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::InvalidRequest("access token is not a valid header value".to_string()))?;
            request.headers_mut().insert(header::AUTHORIZATION, value);
        }

        Ok(self.inner.http.execute(request).await?)
    }
}

pub(super) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::from_response(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
