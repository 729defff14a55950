use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use session_server::routes::create_app;
use session_server::shared::config::ServerConfig;
use session_server::shared::database::Database;
use session_server::shared::services::AppState;
use session_server::shared::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 있으면 로드 (없어도 무시)
    let _ = dotenvy::dotenv();
    telemetry::init();

    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // 저장소 선택: DATABASE_URL 있으면 PostgreSQL, 없으면 메모리
    let app_state = match config.database_url.as_deref() {
        Some(db_url) => {
            let db = Database::new(db_url).await?;
            db.initialize().await?;
            info!("Database: PostgreSQL");
            AppState::new(db, &config)
        }
        None => {
            warn!("DATABASE_URL not set, sessions are kept in memory and lost on restart");
            AppState::in_memory(&config)
        }
    };

    // 만료 credential 정리 스케줄러 시작
    let purge_task = app_state.auth_state.purge_scheduler.start();

    let app = create_app(app_state, &config)?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, production = config.production, "Server running");
    info!("Swagger UI available at http://{}/api", config.bind_addr);

    // 서버 실행 (Ctrl+C로 종료)
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Gracefully shutdown");
        })
        .await
        .context("Server error")?;

    purge_task.abort();
    Ok(())
}
