use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(900);

/// Longest accepted lifetime (one week); longer TTLs are clamped
pub const MAX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A cached payload with its expiry instant
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Key/value store where every entry expires a fixed TTL after insertion
///
/// Not synchronised: the owner serialises access. Time comes from
/// `tokio::time::Instant`, so a paused test runtime controls expiry.
#[derive(Debug)]
pub struct ExpiringCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: ttl.min(MAX_TTL),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live payload. Missing and expired entries are both misses.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| &entry.payload)
    }

    /// Insert or overwrite, expiring TTL from now
    pub fn set(&mut self, key: K, payload: V) {
        self.set_at(key, payload, Instant::now());
    }

    pub fn set_at(&mut self, key: K, payload: V, now: Instant) {
        let entry = CacheEntry {
            payload,
            expires_at: now + self.ttl,
        };
        self.entries.insert(key, entry);
    }

    /// Drop every entry whose expiry is at or before now
    ///
    /// Returns how many entries were removed.
    pub fn sweep(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    /// Stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
