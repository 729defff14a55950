// =====================================================
// 통합 테스트 공통 헬퍼
// =====================================================
// 목적: 메모리 저장소로 실제 서버를 임시 포트에 띄워서 테스트
//
// 사용법:
// ```rust
// mod common;
// use common::*;
//
// #[tokio::test]
// async fn test_something() {
//     let server = spawn_server().await;
//     register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;
//     // 테스트 코드...
// }
// ```
// =====================================================
#![allow(dead_code)]

use std::sync::Arc;

use reqwest::cookie::Jar;
use serde_json::json;
use session_server::client::{AuthClient, ClientConfig};
use session_server::routes::create_app;
use session_server::shared::config::ServerConfig;
use session_server::shared::services::AppState;
use tokio::net::TcpListener;

// 테스트용 상수
pub const TEST_EMAIL: &str = "a@x.com";
pub const TEST_PASSWORD: &str = "Abcdef1";

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 이 서버를 가리키는 AuthClient (jar 공유 가능)
    pub fn client_with_jar(&self, jar: Arc<Jar>) -> AuthClient {
        let config = ClientConfig::new(&self.base_url).expect("valid base url");
        AuthClient::with_jar(config, jar).expect("client builds")
    }
}

/// 기본 설정으로 서버 실행
pub async fn spawn_server() -> TestServer {
    spawn_server_with(|config| config).await
}

/// 설정을 조정해서 서버 실행 (저비용 해싱, Secure 쿠키 없음)
pub async fn spawn_server_with(configure: impl FnOnce(ServerConfig) -> ServerConfig) -> TestServer {
    let config = ServerConfig::default()
        .with_fast_hashing()
        .expect("fast hashing params");
    let config = configure(config);

    let state = AppState::in_memory(&config);
    let app = create_app(state.clone(), &config).expect("router builds");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// 쿠키 저장 클라이언트 (브라우저 역할)
pub fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client builds")
}

/// 회원가입 (201 확인)
pub async fn register_user(server: &TestServer, email: &str, password: &str) {
    let response = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("register request");

    assert_eq!(response.status().as_u16(), 201, "register failed");
}

/// Set-Cookie 헤더에서 refreshToken 값 추출
pub fn refresh_cookie_value(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("refreshToken="))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
}

/// Set-Cookie 헤더 원문 (refreshToken)
pub fn refresh_set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refreshToken="))
        .map(str::to_string)
}
