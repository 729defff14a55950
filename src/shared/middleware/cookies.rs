use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Refresh secret 쿠키 이름
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Create the refresh secret cookie. Scripts never see it (HttpOnly).
pub fn refresh_cookie(secret: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, secret))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Create removal cookie for the refresh secret.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Get the raw refresh secret from cookies.
pub fn get_refresh_secret(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
