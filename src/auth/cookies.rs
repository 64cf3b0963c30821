use axum::http::{header, HeaderMap};
use time::Duration;

/// Name of the cookie carrying the signed token.
pub const AUTH_COOKIE_NAME: &str = "jwt";

/// Build the Set-Cookie value for a freshly issued token. HTTP-only and
/// SameSite=Strict so the frontend cannot read it via script.
pub fn build_auth_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        AUTH_COOKIE_NAME,
        token,
        max_age.whole_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the token cookie.
pub fn clear_auth_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        AUTH_COOKIE_NAME
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull the token out of the request's Cookie header(s), if present.
pub fn extract_auth_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == AUTH_COOKIE_NAME).then(|| value.to_string())
        })
        .next()
}
