//! In-memory short-link store with passive 24h expiry.
//!
//! Entries are keyed by short code. An entry is live while
//! `now - created_at < ttl`; after that it is treated as absent and is
//! removed the next time `get` or `cleanup` touches it.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

use crate::constants::{SHORT_CODE_ALPHABET, SHORT_CODE_LEN, SHORT_LINK_TTL_SECS};

/// A stored mapping from short code to target URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLinkEntry {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
}

impl ShortLinkEntry {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

/// Interface handlers use to create and resolve short links.
///
/// Absence is a return value, never an error. Swapping the in-memory
/// implementation for an external TTL cache only needs a new impl.
pub trait ShortLinkStore: Send + Sync {
    /// Store `target_url` under `code`, overwriting any existing entry. Returns the code.
    fn create(&self, target_url: &str, code: &str) -> String;

    /// Resolve a live code. Expired entries are deleted and reported as absent.
    fn get(&self, code: &str) -> Option<String>;

    /// Delete every expired entry. Returns how many were removed.
    fn cleanup(&self) -> usize;

    /// Number of entries currently held, expired or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide store backed by a mutex-guarded map
pub struct MemoryShortLinkStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, ShortLinkEntry>>,
}

impl Default for MemoryShortLinkStore {
    fn default() -> Self {
        Self::new(Duration::seconds(SHORT_LINK_TTL_SECS))
    }
}

impl MemoryShortLinkStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, ShortLinkEntry>> {
        // A panic mid-insert cannot leave a half-written entry, so the map is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_at(&self, target_url: &str, code: &str, now: DateTime<Utc>) -> String {
        let entry = ShortLinkEntry {
            code: code.to_string(),
            target_url: target_url.to_string(),
            created_at: now,
        };
        self.entries().insert(code.to_string(), entry);
        code.to_string()
    }

    pub fn get_at(&self, code: &str, now: DateTime<Utc>) -> Option<String> {
        let mut entries = self.entries();
        let expired = entries.get(code)?.is_expired(now, self.ttl);

        if expired {
            entries.remove(code);
            tracing::debug!(code, "short link expired on lookup");
            return None;
        }

        entries.get(code).map(|entry| entry.target_url.clone())
    }

    pub fn cleanup_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - entries.len()
    }
}

impl ShortLinkStore for MemoryShortLinkStore {
    fn create(&self, target_url: &str, code: &str) -> String {
        self.create_at(target_url, code, Utc::now())
    }

    fn get(&self, code: &str) -> Option<String> {
        self.get_at(code, Utc::now())
    }

    fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now())
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Generate a random short code from the unambiguous alphabet
pub fn generate_short_code() -> String {
    let mut rng = rand::rng();
    (0..SHORT_CODE_LEN)
        .map(|_| SHORT_CODE_ALPHABET[rng.random_range(0..SHORT_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Parse an absolute http(s) URL that names a host.
///
/// The returned URL serializes to ASCII only: non-ASCII hosts become punycode and
/// control or non-ASCII path bytes are percent-encoded, so it is always a valid
/// `Location` header value.
pub fn validate_target_url(candidate: &str) -> Option<Url> {
    let parsed = Url::parse(candidate.trim()).ok()?;
    (matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some()).then_some(parsed)
}

/// Sweep expired links on a fixed interval. Runs until the task is dropped.
pub async fn run_cleanup_loop(store: std::sync::Arc<dyn ShortLinkStore>, every: std::time::Duration) {
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately; skip it so the sweep runs after one full interval.
    interval.tick().await;

    loop {
        interval.tick().await;
        let removed = store.cleanup();
        if removed > 0 {
            tracing::info!(removed, remaining = store.len(), "swept expired short links");
        } else {
            tracing::debug!(remaining = store.len(), "short link sweep found nothing to remove");
        }
    }
}
