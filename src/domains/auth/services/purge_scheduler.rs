use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::domains::auth::services::TokenAuthority;

/// 만료 credential 정리 스케줄러
/// Credential Purge Scheduler
///
/// 역할:
/// - 주기적으로 만료되었거나 무효화된 refresh credential 레코드 삭제
/// - 활성화/비활성화 제어 가능
///
/// Tombstoned records are kept until this task deletes them, so rotation
/// never has to delete rows inside the request path.
#[derive(Clone)]
pub struct CredentialPurgeScheduler {
    authority: TokenAuthority,
    period: Duration,
    enabled: Arc<AtomicBool>,
}

impl CredentialPurgeScheduler {
    pub fn new(authority: TokenAuthority, period: Duration) -> Self {
        Self {
            authority,
            period,
            enabled: Arc::new(AtomicBool::new(true)), // 기본값: 활성화
        }
    }

    /// 스케줄러 시작
    /// Start the background task; the first purge runs one period after start.
    pub fn start(&self) -> JoinHandle<()> {
        let scheduler = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval(scheduler.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // 첫 tick은 즉시 완료됨
            ticker.tick().await;

            loop {
                ticker.tick().await;
                scheduler.run_once().await;
            }
        })
    }

    /// 한 번 정리 실행. 비활성 상태면 0
    pub async fn run_once(&self) -> u64 {
        if !self.is_enabled() {
            return 0;
        }

        match self.authority.purge_expired().await {
            Ok(0) => 0,
            Ok(purged) => {
                tracing::info!(purged, "purged refresh credentials");
                purged
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to purge refresh credentials");
                0
            }
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
