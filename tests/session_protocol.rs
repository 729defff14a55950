// =====================================================
// 세션 프로토콜 통합 테스트
// =====================================================
// login / refresh / logout / me 엔드포인트를 실제 HTTP로 검증
// =====================================================

mod common;
use common::*;

use std::time::Duration;

use serde_json::{json, Value};

async fn login(client: &reqwest::Client, server: &TestServer) -> reqwest::Response {
    client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("login request")
}

async fn refresh_with(server: &TestServer, secret: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/api/auth/refresh"))
        .header(reqwest::header::COOKIE, format!("refreshToken={secret}"))
        .send()
        .await
        .expect("refresh request")
}

async fn me_with(server: &TestServer, token: &str) -> reqwest::Response {
    reqwest::Client::new()
        .get(server.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("me request")
}

/// 테스트: 로그인 응답 형태와 쿠키 속성
#[tokio::test]
async fn test_login_sets_refresh_cookie_and_me_works() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let response = login(&reqwest::Client::new(), &server).await;
    assert_eq!(response.status().as_u16(), 200);

    let set_cookie = refresh_set_cookie(&response).expect("refresh cookie set");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=604800"));
    // dev 모드 → Secure 없음
    assert!(!set_cookie.contains("Secure"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], TEST_EMAIL);
    assert!(body.get("refreshToken").is_none(), "secret must not be in the body");
    let access_token = body["accessToken"].as_str().unwrap().to_string();

    let me = me_with(&server, &access_token).await;
    assert_eq!(me.status().as_u16(), 200);
    let me: Value = me.json().await.unwrap();
    assert_eq!(me["user"]["email"], TEST_EMAIL);
    assert_eq!(me["user"]["id"], body["user"]["id"]);

    let anonymous = reqwest::get(server.url("/api/auth/me")).await.unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);
    let anonymous: Value = anonymous.json().await.unwrap();
    assert_eq!(anonymous, json!({ "message": "Unauthorized" }));
}

/// 테스트: access token 만료 → refresh → 새 토큰으로 me 성공
#[tokio::test]
async fn test_expired_access_token_is_renewed_through_refresh() {
    let server = spawn_server_with(|mut config| {
        config.access_token_ttl = chrono::Duration::seconds(2);
        config
    })
    .await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let browser = cookie_client();
    let response = login(&browser, &server).await;
    let original_secret = refresh_cookie_value(&response).unwrap();
    let body: Value = response.json().await.unwrap();
    let access_token = body["accessToken"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(3200)).await;
    assert_eq!(me_with(&server, &access_token).await.status().as_u16(), 401);

    let refreshed = browser
        .post(server.url("/api/auth/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status().as_u16(), 200);
    let rotated_secret = refresh_cookie_value(&refreshed).expect("rotated cookie");
    assert_ne!(rotated_secret, original_secret);

    let body: Value = refreshed.json().await.unwrap();
    let new_token = body["accessToken"].as_str().unwrap();
    assert_eq!(me_with(&server, new_token).await.status().as_u16(), 200);
}

/// 테스트: rotation 이후 이전 secret 재사용 불가
#[tokio::test]
async fn test_rotated_secret_cannot_be_replayed() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let first = refresh_cookie_value(&login(&reqwest::Client::new(), &server).await).unwrap();

    let rotated = refresh_with(&server, &first).await;
    assert_eq!(rotated.status().as_u16(), 200);
    let second = refresh_cookie_value(&rotated).unwrap();

    let replay = refresh_with(&server, &first).await;
    assert_eq!(replay.status().as_u16(), 401);
    let replay: Value = replay.json().await.unwrap();
    assert_eq!(replay, json!({ "message": "Unauthorized" }));

    assert_eq!(refresh_with(&server, &second).await.status().as_u16(), 200);
}

/// 테스트: 새 로그인은 이전 refresh secret을 무효화
#[tokio::test]
async fn test_new_login_invalidates_previous_secret() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let first = refresh_cookie_value(&login(&reqwest::Client::new(), &server).await).unwrap();
    let second = refresh_cookie_value(&login(&reqwest::Client::new(), &server).await).unwrap();

    assert_eq!(refresh_with(&server, &first).await.status().as_u16(), 401);
    assert_eq!(refresh_with(&server, &second).await.status().as_u16(), 200);
}

/// 테스트: 같은 secret으로 동시 refresh → 정확히 하나만 성공
#[tokio::test]
async fn test_concurrent_refresh_has_exactly_one_winner() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;
    let secret = refresh_cookie_value(&login(&reqwest::Client::new(), &server).await).unwrap();

    let (a, b) = tokio::join!(refresh_with(&server, &secret), refresh_with(&server, &secret));
    let statuses = [a.status().as_u16(), b.status().as_u16()];

    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 1, "{statuses:?}");
    assert_eq!(statuses.iter().filter(|s| **s == 401).count(), 1, "{statuses:?}");
}

/// 테스트: 로그아웃은 항상 성공하고 쿠키를 지움
#[tokio::test]
async fn test_logout_is_idempotent_and_clears_cookie() {
    let server = spawn_server().await;
    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;
    let secret = refresh_cookie_value(&login(&reqwest::Client::new(), &server).await).unwrap();

    for _ in 0..2 {
        let response = reqwest::Client::new()
            .post(server.url("/api/auth/logout"))
            .header(reqwest::header::COOKIE, format!("refreshToken={secret}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let cleared = refresh_set_cookie(&response).expect("removal cookie");
        assert!(cleared.starts_with("refreshToken=;"));
        assert!(cleared.contains("Max-Age=0"));

        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "success": true }));
    }

    // 쿠키 없이도 성공
    let bare = reqwest::Client::new()
        .post(server.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(bare.status().as_u16(), 200);

    assert_eq!(refresh_with(&server, &secret).await.status().as_u16(), 401);
}

/// 테스트: 쿠키 없음 / 잘못된 쿠키 → 401
#[tokio::test]
async fn test_refresh_without_valid_cookie_is_unauthorized() {
    let server = spawn_server().await;

    let missing = reqwest::Client::new()
        .post(server.url("/api/auth/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);
    let missing: Value = missing.json().await.unwrap();
    assert_eq!(missing, json!({ "message": "Unauthorized" }));

    assert_eq!(refresh_with(&server, "garbage").await.status().as_u16(), 401);
    assert_eq!(
        refresh_with(&server, "AAAAAAAAAAAAAAAAAAAAAA").await.status().as_u16(),
        401
    );
}

/// 테스트: 회원가입 검증 / 로그인 실패 메시지
#[tokio::test]
async fn test_register_validation_and_login_failure() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let weak = client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": TEST_EMAIL, "password": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(weak.status().as_u16(), 400);

    register_user(&server, TEST_EMAIL, TEST_PASSWORD).await;

    let duplicate = client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    let wrong = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": TEST_EMAIL, "password": "Wrong123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 401);
    assert!(refresh_set_cookie(&wrong).is_none());
    let wrong: Value = wrong.json().await.unwrap();
    assert_eq!(wrong, json!({ "message": "Invalid credentials" }));
}

/// 테스트: 같은 이메일 동시 가입 → 201 하나, 409 하나
#[tokio::test]
async fn test_concurrent_register_with_same_email() {
    let server = spawn_server().await;
    let register = || {
        reqwest::Client::new()
            .post(server.url("/api/auth/register"))
            .json(&json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }))
            .send()
    };

    let (a, b) = tokio::join!(register(), register());
    let mut statuses = [a.unwrap().status().as_u16(), b.unwrap().status().as_u16()];
    statuses.sort_unstable();

    assert_eq!(statuses, [201, 409]);
}

#[tokio::test]
async fn test_health() {
    let server = spawn_server().await;
    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}
