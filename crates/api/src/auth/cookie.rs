//! Session cookie formatting and parsing.

use agora_core::types::Timestamp;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "session_id";

/// `Set-Cookie` value that hands `token` to the client until `expires_at`.
pub fn session_cookie(token: &str, expires_at: Timestamp, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Expires={}",
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the client drop its session cookie.
pub fn clearing_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0; \
         Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of the first non-empty cookie called `name` across all `Cookie`
/// headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Whether `set_cookie` (a `Set-Cookie` header value) targets the session
/// cookie.
pub fn is_session_cookie(set_cookie: &str) -> bool {
    set_cookie
        .split_once('=')
        .is_some_and(|(name, _)| name.trim() == SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let expires = chrono::Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let cookie = session_cookie("YWJj|00ff", expires, false);
        assert_eq!(
            cookie,
            "session_id=YWJj|00ff; Path=/; HttpOnly; SameSite=Strict; \
             Expires=Wed, 02 Jan 2030 03:04:05 GMT"
        );
        assert!(session_cookie("t", expires, true).ends_with("; Secure"));
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let cookie = clearing_cookie(false);
        assert!(cookie.starts_with("session_id=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
        assert!(is_session_cookie(&cookie));
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session_id=YWJj|ab==; lang=en"),
        );
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("YWJj|ab=="));
        assert_eq!(read_cookie(&headers, "lang"), Some("en"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn reads_across_multiple_headers_and_skips_empty_values() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("session_id="));
        headers.append(COOKIE, HeaderValue::from_static("session_id=abc"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("abc"));
        assert_eq!(read_cookie(&HeaderMap::new(), SESSION_COOKIE), None);
    }
}
