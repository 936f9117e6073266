//! Persistent key/value state store with per-key TTL.
//!
//! The adapter's identity and operational flags (user id, session id,
//! pageview markers, session block, edge URL prefix) live in an
//! origin-scoped store behind the [`StateStore`] trait so the subsystem is
//! testable without a real persistence backend. Store operations never
//! fail: an unavailable backend reads as absent and drops writes, which
//! upstream callers treat as first-time-user state.

use std::collections::BTreeMap;

use chrono::Utc;
use cookie::{Cookie, CookieJar};

use crate::cookies::{format_removal_cookie, format_set_cookie, parse_cookies_to_jar};

/// Expiry policy for a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Entry lives until the user-agent session ends.
    Session,
    /// Entry expires this many milliseconds after the write.
    AfterMs(u64),
}

/// Path/domain scope for a write. Writes scoped to a foreign domain are
/// rejected by the underlying platform; stores mirror that by silently
/// dropping them.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub path: &'a str,
    pub domain: Option<&'a str>,
}

impl Scope<'_> {
    /// Root-path scope on the store's own origin.
    pub fn root() -> Self {
        Scope {
            path: "/",
            domain: None,
        }
    }
}

/// Injected key/value store interface backing the adapter session state.
pub trait StateStore {
    /// Read a value. Expired entries read as absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value with the given expiry and scope. Never fails; a
    /// rejected write (foreign domain, disabled storage) is a no-op.
    fn set(&mut self, key: &str, value: &str, expiry: Expiry, scope: Scope<'_>);

    /// Invalidate an entry immediately.
    fn delete(&mut self, key: &str);

    /// Invalidate every entry this subsystem owns.
    fn clear_all(&mut self);
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at_ms: Option<i64>,
}

/// In-memory [`StateStore`] with real TTL expiry and a controllable clock,
/// used for tests and for environments without cookie access.
#[derive(Debug)]
pub struct MemoryStateStore {
    origin: String,
    entries: BTreeMap<String, MemoryEntry>,
    clock_offset_ms: i64,
    deny_writes: bool,
}

impl MemoryStateStore {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            entries: BTreeMap::new(),
            clock_offset_ms: 0,
            deny_writes: false,
        }
    }

    /// Advance the store clock, expiring entries whose TTL has elapsed.
    pub fn advance_clock(&mut self, ms: i64) {
        self.clock_offset_ms += ms;
    }

    /// Simulate a platform that rejects all writes (storage disabled).
    pub fn set_deny_writes(&mut self, deny: bool) {
        self.deny_writes = deny;
    }

    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis() + self.clock_offset_ms
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if let Some(expires_at_ms) = entry.expires_at_ms {
            if self.now_ms() >= expires_at_ms {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    fn set(&mut self, key: &str, value: &str, expiry: Expiry, scope: Scope<'_>) {
        if self.deny_writes {
            log::debug!("state store write denied for key: {}", key);
            return;
        }
        if let Some(domain) = scope.domain {
            if domain != self.origin {
                log::debug!(
                    "dropping cross-origin state write: key={} domain={} origin={}",
                    key,
                    domain,
                    self.origin
                );
                return;
            }
        }
        let expires_at_ms = match expiry {
            Expiry::Session => None,
            Expiry::AfterMs(ttl_ms) => Some(self.now_ms() + ttl_ms as i64),
        };
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear_all(&mut self) {
        self.entries.clear();
    }
}

/// [`StateStore`] backed by a first-party cookie jar.
///
/// Reads go through a jar parsed from a request `Cookie` header; writes
/// are recorded both in the jar (so later reads in the same round observe
/// them) and as pending `Set-Cookie` header values for the caller to emit.
#[derive(Debug)]
pub struct CookieStateStore {
    jar: CookieJar,
    cookie_domain: String,
    pending: Vec<String>,
}

impl CookieStateStore {
    pub fn new(cookie_domain: impl Into<String>) -> Self {
        Self {
            jar: CookieJar::new(),
            cookie_domain: cookie_domain.into(),
            pending: Vec::new(),
        }
    }

    /// Build a store from a request `Cookie` header value. Unparsable
    /// cookies are dropped.
    pub fn from_cookie_header(header: &str, cookie_domain: impl Into<String>) -> Self {
        Self {
            jar: parse_cookies_to_jar(header),
            cookie_domain: cookie_domain.into(),
            pending: Vec::new(),
        }
    }

    /// `Set-Cookie` header values accumulated by writes, in write order.
    pub fn pending_set_cookies(&self) -> &[String] {
        &self.pending
    }
}

impl StateStore for CookieStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.jar.get(key).map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, key: &str, value: &str, expiry: Expiry, scope: Scope<'_>) {
        let domain = scope.domain.unwrap_or(&self.cookie_domain);
        if domain != self.cookie_domain {
            log::debug!(
                "dropping cross-origin cookie write: key={} domain={}",
                key,
                domain
            );
            return;
        }
        self.pending
            .push(format_set_cookie(key, value, expiry, scope.path, domain));
        self.jar
            .add(Cookie::new(key.to_string(), value.to_string()));
    }

    fn delete(&mut self, key: &str) {
        self.pending
            .push(format_removal_cookie(key, "/", &self.cookie_domain));
        self.jar.remove(Cookie::new(key.to_string(), ""));
    }

    fn clear_all(&mut self) {
        let names: Vec<String> = self.jar.iter().map(|c| c.name().to_string()).collect();
        for name in names {
            self.delete(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStateStore {
        MemoryStateStore::new("example.com")
    }

    fn own_scope() -> Scope<'static> {
        Scope {
            path: "/",
            domain: Some("example.com"),
        }
    }

    #[test]
    fn test_get_absent_key() {
        assert_eq!(store().get("missing"), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut store = store();
        store.set("k", "v", Expiry::AfterMs(1000), own_scope());
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let mut store = store();
        store.set("k", "v", Expiry::AfterMs(1000), own_scope());
        store.advance_clock(999);
        assert_eq!(store.get("k"), Some("v".to_string()));
        store.advance_clock(1);
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_session_entry_survives_clock() {
        let mut store = store();
        store.set("k", "v", Expiry::Session, own_scope());
        store.advance_clock(i64::from(u32::MAX));
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_cross_origin_write_silently_fails() {
        let mut store = store();
        store.set(
            "k",
            "v",
            Expiry::Session,
            Scope {
                path: "/",
                domain: Some("other.com"),
            },
        );
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_denied_write_is_noop() {
        let mut store = store();
        store.set_deny_writes(true);
        store.set("k", "v", Expiry::Session, own_scope());
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        store.set("k", "v", Expiry::Session, own_scope());
        store.delete("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_clear_all() {
        let mut store = store();
        store.set("a", "1", Expiry::Session, own_scope());
        store.set("b", "2", Expiry::AfterMs(10_000), own_scope());
        store.clear_all();
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_ttl_refresh_extends_expiry() {
        let mut store = store();
        store.set("k", "v", Expiry::AfterMs(1000), own_scope());
        store.advance_clock(800);
        store.set("k", "v", Expiry::AfterMs(1000), own_scope());
        store.advance_clock(800);
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_cookie_store_reads_request_header() {
        let store = CookieStateStore::from_cookie_header("__btu=abc; __bts=def", "example.com");
        assert_eq!(store.get("__btu"), Some("abc".to_string()));
        assert_eq!(store.get("__bts"), Some("def".to_string()));
        assert_eq!(store.get("__btn"), None);
    }

    #[test]
    fn test_cookie_store_set_records_header_and_reads_back() {
        let mut store = CookieStateStore::new("example.com");
        store.set("__btu", "abc", Expiry::AfterMs(2_592_000_000), Scope::root());

        assert_eq!(store.get("__btu"), Some("abc".to_string()));
        let pending = store.pending_set_cookies();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].starts_with("__btu=abc;"));
        assert!(pending[0].contains("Max-Age=2592000"));
    }

    #[test]
    fn test_cookie_store_session_expiry_has_no_max_age() {
        let mut store = CookieStateStore::new("example.com");
        store.set("__bts", "def", Expiry::Session, Scope::root());
        assert!(!store.pending_set_cookies()[0].contains("Max-Age"));
    }

    #[test]
    fn test_cookie_store_rejects_cross_domain_write() {
        let mut store = CookieStateStore::new("example.com");
        store.set(
            "__btu",
            "abc",
            Expiry::Session,
            Scope {
                path: "/",
                domain: Some("attacker.test"),
            },
        );
        assert_eq!(store.get("__btu"), None);
        assert!(store.pending_set_cookies().is_empty());
    }

    #[test]
    fn test_cookie_store_clear_all_emits_removals() {
        let mut store = CookieStateStore::from_cookie_header("__btu=abc; __bts=def", "example.com");
        store.clear_all();
        assert_eq!(store.get("__btu"), None);
        assert_eq!(store.get("__bts"), None);
        assert_eq!(store.pending_set_cookies().len(), 2);
        assert!(store
            .pending_set_cookies()
            .iter()
            .all(|h| h.contains("Max-Age=0")));
    }
}
