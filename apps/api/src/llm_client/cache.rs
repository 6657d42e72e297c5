//! In-memory cache of raw model replies, owned by `LlmClient`.
//!
//! Entries live for the configured TTL (or forever when the TTL is zero) and
//! are evicted lazily on lookup. Concurrent inserts for one key are
//! last-writer-wins.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
struct CacheEntry {
    reply: String,
    stored_at: Instant,
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl ResponseCache {
    /// `ttl = None` keeps entries until `clear` or process exit.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_ttl_secs(ttl_secs: u64) -> Self {
        Self::new((ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => return None,
                Some(entry) if !self.is_expired(entry) => return Some(entry.reply.clone()),
                Some(_) => {}
            }
        }

        // Expired: drop it so the next successful call can repopulate.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.get(key).is_some_and(|entry| self.is_expired(entry)) {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: String, reply: String) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                reply,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }
}

/// Derives a cache key from a use-case namespace and its input texts.
///
/// Parts are length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
pub fn cache_key(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{namespace}_{:x}", hasher.finalize())
}
