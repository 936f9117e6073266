//! Cookie parsing and `Set-Cookie` formatting for the cookie-backed state
//! store.

use cookie::{Cookie, CookieJar};

use crate::store::Expiry;

// return empty cookie jar for unparsable cookies
pub fn parse_cookies_to_jar(s: &str) -> CookieJar {
    let cookie_str = s.trim().to_owned();
    let mut jar = CookieJar::new();
    let cookies = Cookie::split_parse(cookie_str).filter_map(Result::ok);

    for cookie in cookies {
        jar.add_original(cookie);
    }

    jar
}

/// Format a first-party `Set-Cookie` header value with an expiry derived
/// from the store TTL. Session-lifetime entries carry no `Max-Age` so the
/// user agent drops them when the session ends.
pub fn format_set_cookie(
    name: &str,
    value: &str,
    expiry: Expiry,
    path: &str,
    domain: &str,
) -> String {
    let base = format!(
        "{}={}; Domain={}; Path={}; Secure; SameSite=Lax",
        name, value, domain, path,
    );
    match expiry {
        Expiry::Session => base,
        Expiry::AfterMs(ttl_ms) => format!("{}; Max-Age={}", base, ttl_ms / 1000),
    }
}

/// Format a `Set-Cookie` header value that removes an entry immediately.
pub fn format_removal_cookie(name: &str, path: &str, domain: &str) -> String {
    format!(
        "{}=; Domain={}; Path={}; Secure; SameSite=Lax; Max-Age=0",
        name, domain, path,
    )
}
