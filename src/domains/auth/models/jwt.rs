use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// JWT Claims (토큰에 포함될 데이터)
/// JWT Claims (data to be included in the access token)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID (subject)
    /// User ID as the JWT subject
    pub sub: String,

    /// 이메일
    /// Email
    pub email: String,

    /// 만료 시간 (Unix timestamp)
    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// 발급 시간 (Unix timestamp)
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// 새 Claims 생성 (만료 시간 자동 계산)
    /// Create new Claims, expiring `ttl` after now
    pub fn new(user_id: u64, email: String, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id.to_string(),
            email,
            exp: now + ttl.num_seconds(),
            iat: now,
        }
    }

    /// subject를 사용자 ID로 변환
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}
