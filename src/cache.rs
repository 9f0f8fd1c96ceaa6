// In-memory response cache with per-entry time-to-live.
// Sits between the API client and the provider so repeated identical queries
// do not spend the monthly request allowance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::config::minutes;

// Counters updated on every lookup
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub expired_count: AtomicUsize,
    pub total_lookups: AtomicUsize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub expired_count: usize,
    pub total_lookups: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: minutes(60),
        }
    }
}

pub trait ResponseCache: Send + Sync + 'static {
    fn new(config: CacheConfig) -> Self
    where
        Self: Sized;

    // Store a serialized payload. `None` uses the configured default TTL.
    fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>);

    // Returns the payload if it is still fresh; stale entries are evicted here
    fn get(&self, key: &str) -> Option<Bytes>;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> CacheStatsReport;
}

// Cache keys. Each derives from the logical query, so identical queries share
// an entry and differing ones never collide.
pub mod keys {
    use chrono::NaiveDate;

    pub const SERVER_STATUS: &str = "server-status";
    pub const ONE_WAY: &str = "oneway";

    pub fn airports(query: &str) -> String {
        format!("airports:{}", query.trim().to_lowercase())
    }

    pub fn nearby(lat: Option<f64>, lng: Option<f64>) -> String {
        let coord = |value: Option<f64>| value.map_or("default".to_string(), |v| v.to_string());
        format!("nearby:{},{}", coord(lat), coord(lng))
    }

    pub fn flights(
        origin: &str,
        destination: &str,
        date: NaiveDate,
        return_date: Option<NaiveDate>,
    ) -> String {
        format!(
            "flights:{}-{}-{}-{}",
            origin,
            destination,
            date.format("%Y-%m-%d"),
            return_date.map_or(ONE_WAY.to_string(), |d| d.format("%Y-%m-%d").to_string())
        )
    }
}

pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    config: RwLock<CacheConfig>,
    stats: CacheStats,
}

struct CacheEntry {
    data: Bytes,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

impl TtlCache {
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.config.write().default_ttl = ttl;
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        <Self as ResponseCache>::new(CacheConfig::default())
    }
}

impl ResponseCache for TtlCache {
    fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config: RwLock::new(config),
            stats: CacheStats::default(),
        }
    }

    fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or_else(|| self.config.read().default_ttl);
        let entry = CacheEntry {
            data: value,
            created_at: Instant::now(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry);
    }

    fn get(&self, key: &str) -> Option<Bytes> {
        self.stats.total_lookups.fetch_add(1, Ordering::SeqCst);

        // Evaluate under the shard guard, then drop it before removing
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired()).then(|| entry.data.clone()));

        match lookup {
            Some(Some(data)) => {
                self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                Some(data)
            }
            Some(None) => {
                self.entries
                    .remove_if(key, |_, entry| entry.is_expired());
                self.stats.expired_count.fetch_add(1, Ordering::SeqCst);
                self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
                None
            }
            None => {
                self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
                None
            }
        }
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.entries.len(),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            expired_count: self.stats.expired_count.load(Ordering::SeqCst),
            total_lookups: self.stats.total_lookups.load(Ordering::SeqCst),
        }
    }
}
