// Routes module: 라우팅 설정
// 역할: 모든 도메인의 라우터를 조합
// Routes module: combines all domain routers

pub mod openapi;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug_span, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domains::auth::routes::create_auth_router;
use crate::shared::config::ServerConfig;
use crate::shared::services::AppState;
use openapi::ApiDoc;

/// Create main router (combines all domain routers)
/// 메인 라우터 생성 (모든 도메인 라우터 조합)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", create_auth_router())
        .route("/health", get(health))
}

/// 전체 애플리케이션 (라우터 + Swagger + CORS + trace)
pub fn create_app(app_state: AppState, config: &ServerConfig) -> Result<Router> {
    // CORS 설정: 쿠키 전송을 위해 credentials 허용, origin은 하나만
    let origin = config
        .frontend_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid FRONTEND_URL: {}", config.frontend_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(create_router())
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors),
        )
        .with_state(app_state))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// span (헤더는 쿠키와 토큰을 포함하므로 기록하지 않음)
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method().as_str();
    let path = request.uri().path();

    debug_span!("http-request", method, path)
}
