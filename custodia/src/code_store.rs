//! One-time exchange-code store with TTL expiry.
//!
//! Short-lived codes (e.g. the one-time code a browser exchanges for
//! tokens after an OAuth redirect) live behind an injected store rather
//! than process-global state, so expiry is testable and a code can be
//! claimed exactly once.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for expiry decisions, injectable for tests.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Keyed store of single-use payloads with a time-to-live.
pub trait ExchangeCodeStore: Send + Sync {
    /// Stores `payload` under `code` for at most `ttl`.
    fn put(&self, code: &str, payload: String, ttl: Duration);

    /// Claims the payload for `code`.
    ///
    /// A code can be taken at most once; unknown, already-claimed and
    /// expired codes all yield `None`.
    fn take_once(&self, code: &str) -> Option<String>;
}

/// In-memory `ExchangeCodeStore`.
///
/// Expired entries are purged lazily on every access; there is no
/// background sweep and no global state.
pub struct InMemoryCodeStore<C: Clock = SystemClock> {
    clock: C,
    entries: Mutex<HashMap<String, StoredCode>>,
}

struct StoredCode {
    payload: String,
    expires_at: DateTime<Utc>,
}

impl InMemoryCodeStore<SystemClock> {
    /// Creates a store over the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryCodeStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryCodeStore<C> {
    /// Creates a store over the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self { clock, entries: Mutex::new(HashMap::new()) }
    }

    fn purge_expired(entries: &mut HashMap<String, StoredCode>, now: DateTime<Utc>) {
        entries.retain(|_, stored| stored.expires_at > now);
    }
}

impl<C: Clock> ExchangeCodeStore for InMemoryCodeStore<C> {
    fn put(&self, code: &str, payload: String, ttl: Duration) {
        let now = self.clock.now();
        if let Ok(mut entries) = self.entries.lock() {
            Self::purge_expired(&mut entries, now);
            entries.insert(code.to_string(), StoredCode { payload, expires_at: now + ttl });
        }
    }

    fn take_once(&self, code: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().ok()?;
        Self::purge_expired(&mut entries, now);
        entries.remove(code).map(|stored| stored.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock advanced manually by tests.
    struct TestClock {
        offset_secs: AtomicI64,
        epoch: DateTime<Utc>,
    }

    impl TestClock {
        fn new() -> Self {
            Self { offset_secs: AtomicI64::new(0), epoch: Utc::now() }
        }

        fn advance_secs(&self, secs: i64) {
            self.offset_secs.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for &TestClock {
        fn now(&self) -> DateTime<Utc> {
            self.epoch + Duration::seconds(self.offset_secs.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn test_take_once_claims_exactly_once() {
        let store = InMemoryCodeStore::new();
        store.put("code-1", "payload".to_string(), Duration::minutes(5));

        assert_eq!(store.take_once("code-1").as_deref(), Some("payload"));
        assert_eq!(store.take_once("code-1"), None);
    }

    #[test]
    fn test_unknown_code_yields_none() {
        let store = InMemoryCodeStore::new();
        assert_eq!(store.take_once("never-stored"), None);
    }

    #[test]
    fn test_expired_code_yields_none() {
        let clock = TestClock::new();
        let store = InMemoryCodeStore::with_clock(&clock);
        store.put("code-1", "payload".to_string(), Duration::seconds(30));

        clock.advance_secs(31);
        assert_eq!(store.take_once("code-1"), None);
    }

    #[test]
    fn test_code_valid_until_ttl() {
        let clock = TestClock::new();
        let store = InMemoryCodeStore::with_clock(&clock);
        store.put("code-1", "payload".to_string(), Duration::seconds(30));

        clock.advance_secs(29);
        assert_eq!(store.take_once("code-1").as_deref(), Some("payload"));
    }

    #[test]
    fn test_put_overwrites_existing_code() {
        let store = InMemoryCodeStore::new();
        store.put("code-1", "first".to_string(), Duration::minutes(5));
        store.put("code-1", "second".to_string(), Duration::minutes(5));

        assert_eq!(store.take_once("code-1").as_deref(), Some("second"));
        assert_eq!(store.take_once("code-1"), None);
    }

    #[test]
    fn test_expired_entries_purged_on_put() {
        let clock = TestClock::new();
        let store = InMemoryCodeStore::with_clock(&clock);
        store.put("stale", "old".to_string(), Duration::seconds(10));

        clock.advance_secs(60);
        store.put("fresh", "new".to_string(), Duration::seconds(10));

        let entries = store.entries.lock().unwrap();
        assert!(!entries.contains_key("stale"));
        assert!(entries.contains_key("fresh"));
    }
}
