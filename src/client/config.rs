use std::time::Duration;

use url::Url;

use super::ClientError;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const ME_PATH: &str = "/api/auth/me";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Refresh 호출 제한 시간. 초과하면 refresh 실패로 처리
const REFRESH_TIMEOUT_SECS: u64 = 10;

/// 클라이언트 설정
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub refresh_timeout: Duration,
    /// bootstrap에서 첫 who-am-I 실패 후 refresh 전 대기 시간
    pub bootstrap_refresh_delay: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid base url {base_url:?}: {e}")))?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            refresh_timeout: Duration::from_secs(REFRESH_TIMEOUT_SECS),
            bootstrap_refresh_delay: Duration::ZERO,
        })
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn with_bootstrap_refresh_delay(mut self, delay: Duration) -> Self {
        self.bootstrap_refresh_delay = delay;
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid path {path:?}: {e}")))
    }
}

/// 401이 나도 refresh하지 않는 엔드포인트 (로그인, 회원가입, refresh 자체)
pub fn skips_refresh(url: &Url) -> bool {
    let path = url.path();
    [LOGIN_PATH, REGISTER_PATH, REFRESH_PATH]
        .iter()
        .any(|p| path.ends_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_refresh_exemptions() {
        let config = ClientConfig::new("http://127.0.0.1:3002").unwrap();

        let me = config.endpoint(ME_PATH).unwrap();
        assert_eq!(me.as_str(), "http://127.0.0.1:3002/api/auth/me");
        assert!(!skips_refresh(&me));

        for path in [LOGIN_PATH, REGISTER_PATH, REFRESH_PATH] {
            assert!(skips_refresh(&config.endpoint(path).unwrap()));
        }
        assert!(ClientConfig::new("not a url").is_err());
    }
}
