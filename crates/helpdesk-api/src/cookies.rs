//! Cookie construction and parsing for the staff area.
//!
//! Cookies are built by hand as `Set-Cookie` header values: session cookie
//! (opaque token), remembered username, and the derived auto-login token.

use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};

/// Remembered-username cookie.
pub const USERNAME_COOKIE: &str = "hd_username";
/// Derived auto-login token cookie.
pub const REMEMBER_COOKIE: &str = "hd_remember";

/// Build an `HttpOnly` cookie value with the standard staff-area
/// attributes. `Secure` only when the deployment is served over HTTPS.
pub fn build_cookie(name: &str, value: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the immediate-expiry form of a cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Append a `Set-Cookie` header, skipping values that do not encode.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.append(SET_COOKIE, value);
    }
}

/// Pull one cookie's value out of the request `Cookie` header.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == name {
            return Some(val.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn builds_expected_attributes() {
        let cookie = build_cookie("hd_session", "abc", 3600, false);
        assert_eq!(
            cookie,
            "hd_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        let secure = build_cookie("hd_session", "abc", 3600, true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn clear_expires_immediately() {
        assert!(clear_cookie("hd_remember", false).contains("Max-Age=0"));
    }

    #[test]
    fn extracts_from_multi_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; hd_session=tok; hd_username=alice"),
        );
        assert_eq!(
            extract_cookie(&headers, "hd_session"),
            Some("tok".to_string())
        );
        assert_eq!(
            extract_cookie(&headers, "hd_username"),
            Some("alice".to_string())
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }
}
