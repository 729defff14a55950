use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use uuid::Uuid;

use crate::shared::errors::AuthError;

/// Refresh secret 길이 (128비트)
pub const REFRESH_SECRET_BYTES: usize = 16;

/// argon2 기반 단방향 해싱
/// Salted one-way hashing for passwords and refresh secrets.
///
/// Verification goes through argon2's constant-time comparison, so a raw
/// secret is never compared to anything with plain string equality.
#[derive(Clone)]
pub struct SecretHasher {
    params: Params,
}

impl SecretHasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// 새 refresh secret 생성 (URL-safe base64, 패딩 없음)
    /// Generate a fresh 128-bit random refresh secret
    pub fn generate_secret(&self) -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// refresh secret 형식 검사
    /// True when `raw` decodes to exactly one 128-bit secret
    pub fn is_well_formed(raw: &str) -> bool {
        URL_SAFE_NO_PAD
            .decode(raw)
            .map(|bytes| bytes.len() == REFRESH_SECRET_BYTES)
            .unwrap_or(false)
    }

    /// 쿠키 값 조립: `<lookup key>.<secret>`
    /// The lookup key is the record id; it selects the one stored hash the
    /// secret is verified against and carries no authority on its own.
    pub fn encode_credential(lookup: Uuid, secret: &str) -> String {
        format!("{}.{}", lookup.simple(), secret)
    }

    /// 쿠키 값 분해. 형식이 맞지 않으면 `None`
    pub fn decode_credential(raw: &str) -> Option<(Uuid, &str)> {
        let (lookup, secret) = raw.split_once('.')?;
        let lookup = Uuid::parse_str(lookup).ok()?;
        Self::is_well_formed(secret).then_some((lookup, secret))
    }

    /// PHC 문자열로 해싱
    pub fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashingFailed(e.to_string()))
    }

    /// 해시 검증. 파싱할 수 없는 해시는 불일치로 취급
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("stored hash is not a valid PHC string");
            return false;
        };

        self.argon2().verify_password(secret.as_bytes(), &parsed).is_ok()
    }
}
