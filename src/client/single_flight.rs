use std::collections::VecDeque;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::ClientError;

type RefreshResult = Result<String, ClientError>;

#[derive(Default)]
struct State {
    in_flight: bool,
    // 토큰이 바뀔 때마다 증가 (refresh 성공, 로그인)
    generation: u64,
    // 현재 generation의 refresh 실패 결과
    failure: Option<ClientError>,
    waiters: VecDeque<oneshot::Sender<RefreshResult>>,
}

/// `run`의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renewal {
    /// refresh가 (이번 호출 또는 공유된 호출에서) 발급한 새 토큰
    Refreshed(String),
    /// 요청을 보낸 뒤 토큰이 이미 교체됨. 현재 토큰으로 재시도
    Superseded,
}

/// Refresh single-flight 조정자
///
/// The first caller becomes the leader and runs the refresh; callers that
/// arrive while it is in flight park on a oneshot channel and receive the
/// leader's result in arrival order. The state lock is never held across
/// an await point.
///
/// Every token the client installs opens a new generation. A caller names
/// the generation its request was sent under, so a late 401 is answered
/// without touching the server: with `Superseded` once a newer token
/// exists, or with the recorded failure once that generation's refresh
/// has failed.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<State>,
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<RefreshResult>),
    Settled(Result<Renewal, ClientError>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    /// 대기 중인 요청 수
    pub fn parked(&self) -> usize {
        self.state.lock().waiters.len()
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// 새 토큰이 refresh 밖에서 설치됨 (로그인 등)
    pub fn advance(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.failure = None;
    }

    /// `refresh` is invoked only when no refresh is in flight and the
    /// caller's generation has neither been superseded nor failed. Pass
    /// `None` to force an attempt regardless. The result is handed to
    /// every caller parked during the call. Any side effects that parked
    /// callers depend on (storing the token) must happen inside `refresh`,
    /// before it returns.
    pub async fn run<F, Fut>(&self, sent_under: Option<u64>, refresh: F) -> Result<Renewal, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshResult>,
    {
        // leader 결정, generation 비교, in_flight 설정은 같은 임계 구역에서
        let role = {
            let mut state = self.state.lock();
            let current = state.generation;
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Role::Follower(rx)
            } else if sent_under.is_some_and(|generation| generation != current) {
                Role::Settled(Ok(Renewal::Superseded))
            } else if let (Some(_), Some(failure)) = (sent_under, &state.failure) {
                // 같은 generation의 refresh가 이미 실패 → 서버 재호출 없음
                Role::Settled(Err(failure.clone()))
            } else {
                state.in_flight = true;
                Role::Leader
            }
        };

        match role {
            Role::Settled(outcome) => outcome,
            Role::Follower(rx) => rx.await.unwrap_or(Err(ClientError::Aborted)).map(Renewal::Refreshed),
            Role::Leader => {
                let mut guard = LeaderGuard {
                    coordinator: self,
                    settled: false,
                };
                let result = refresh().await;
                guard.settle(result.clone());
                result.map(Renewal::Refreshed)
            }
        }
    }

    fn release(&self, result: RefreshResult, record: bool) {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            if record {
                match &result {
                    Ok(_) => {
                        state.generation += 1;
                        state.failure = None;
                    }
                    Err(e) => state.failure = Some(e.clone()),
                }
            }
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            // 수신 측이 이미 drop된 경우 무시
            let _ = waiter.send(result.clone());
        }
    }
}

/// Leader가 완료 전에 drop되면 대기자를 Aborted로 해제
/// (서버 응답이 없었으므로 실패로 기록하지 않음)
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    fn settle(&mut self, result: RefreshResult) {
        self.settled = true;
        self.coordinator.release(result, true);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("refresh leader dropped before completion");
            self.coordinator.release(Err(ClientError::Aborted), false);
        }
    }
}
