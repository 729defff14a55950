// =====================================================
// 세션 복원 (bootstrap) 테스트
// =====================================================
// 실제 서버 + 공유 cookie jar로 페이지 새로고침 상황 재현
// =====================================================

mod common;
use common::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use serde_json::{json, Value};
use session_server::client::{AuthClient, ClientConfig, ClientSessionState};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 테스트: 새로고침 후 쿠키만으로 세션 복원
#[tokio::test]
async fn test_bootstrap_restores_session_after_reload() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let jar = Arc::new(Jar::default());
    let before_reload = server.client_with_jar(jar.clone());
    let user = before_reload.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    assert!(before_reload.session().is_authenticated);

    // 새 클라이언트 = 메모리 상태(access token) 없음, 쿠키만 남음
    let after_reload = server.client_with_jar(jar);
    assert!(after_reload.session().is_loading);
    assert_eq!(after_reload.access_token(), None);

    let state = after_reload.bootstrap().await;
    assert_eq!(state, ClientSessionState::signed_in(user.clone()));
    assert_eq!(after_reload.session(), state);
    assert!(after_reload.access_token().is_some());

    // 복원된 토큰으로 me 호출
    assert_eq!(after_reload.me().await.unwrap(), user);
}

/// 테스트: 쿠키 없으면 signed out (loading 아님)
#[tokio::test]
async fn test_bootstrap_without_cookie_signs_out() {
    let server = spawn_server().await;
    let client = server.client_with_jar(Arc::new(Jar::default()));

    let state = client.bootstrap().await;
    assert_eq!(state, ClientSessionState::signed_out());
    assert!(!state.is_loading);
}

/// 테스트: 로그아웃 후에는 복원 불가
#[tokio::test]
async fn test_bootstrap_after_logout_signs_out() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let jar = Arc::new(Jar::default());
    let client = server.client_with_jar(jar.clone());
    client.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    client.logout().await;
    assert_eq!(client.session(), ClientSessionState::signed_out());
    assert_eq!(client.access_token(), None);

    let after_reload = server.client_with_jar(jar);
    assert_eq!(after_reload.bootstrap().await, ClientSessionState::signed_out());
}

/// 테스트: access token 만료 후 me() 호출이 자동으로 refresh
#[tokio::test]
async fn test_expired_token_is_refreshed_transparently() {
    let server = spawn_server_with(|mut config| {
        config.access_token_ttl = chrono::Duration::seconds(1);
        config
    })
    .await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let client = server.client_with_jar(Arc::new(Jar::default()));
    let user = client.login(TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    let first_token = client.access_token().unwrap();

    tokio::time::sleep(Duration::from_millis(2200)).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.me().await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), user);
    }
    assert_ne!(client.access_token().unwrap(), first_token);
    assert!(client.session().is_authenticated);
}

/// 테스트: bootstrap과 인터셉터 요청이 동시에 401 → refresh는 1번
#[tokio::test]
async fn test_bootstrap_and_interceptor_share_refresh() {
    let server = MockServer::start().await;

    let me_body = json!({ "user": { "id": 1, "email": TEST_EMAIL } });
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_body))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "fresh" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthClient::new(ClientConfig::new(&server.uri()).unwrap()).unwrap();
    client.set_access_token("stale".to_string());

    let (state, data) = tokio::join!(client.bootstrap(), client.get_json::<Value>("/api/data"));

    assert!(state.is_authenticated);
    assert_eq!(state.user.unwrap().email, TEST_EMAIL);
    assert_eq!(data.unwrap(), json!({ "ok": true }));
    server.verify().await;
}

/// 테스트: bootstrap refresh 전 대기 시간 적용
#[tokio::test]
async fn test_bootstrap_waits_before_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(&server.uri())
        .unwrap()
        .with_bootstrap_refresh_delay(Duration::from_millis(150));
    let client = AuthClient::new(config).unwrap();

    let started = std::time::Instant::now();
    let state = client.bootstrap().await;

    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(state, ClientSessionState::signed_out());
    server.verify().await;
}
