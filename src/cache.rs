// src/cache.rs
// =============================================================================
// Time-bounded memoization of analysis results, keyed by requested URL.
//
// - Readers share a read lock; `put` takes the write lock
// - An entry older than the TTL reads as a miss but stays in the map until a
//   later `put` for the same URL replaces it
// - There is no eviction sweep, so the key set only grows
//
// Time comes from a `Clock` so tests can move it forward by hand.
// =============================================================================

use crate::model::AnalysisResult;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Monotonic time source.
///
/// Production code uses `SystemClock`; tests use a clock they can advance.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock, backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// One stored result and the moment it was stored
#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    inserted_at: Instant,
}

/// Shared, thread-safe cache of analysis results.
///
/// Wrap it in an `Arc` to share it between analyzers or tasks.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns a copy of the cached result if it is younger than the TTL.
    pub fn get(&self, url: &str) -> Option<AnalysisResult> {
        // A poisoned lock only means a writer panicked; the map is still usable
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(url)?;

        // saturating_duration_since never panics if the clock went "backwards"
        // An entry exactly ttl old is still fresh
        let age = self.clock.now().saturating_duration_since(entry.inserted_at);
        if age > self.ttl {
            debug!(url, ?age, "cache entry expired");
            return None;
        }
        // Callers get their own copy; the stored one is never handed out
        Some(entry.result.clone())
    }

    /// Inserts or wholesale replaces the entry for `url`.
    pub fn put(&self, url: &str, result: AnalysisResult) {
        let entry = CacheEntry {
            result,
            inserted_at: self.clock.now(),
        };
        // insert() replaces the old entry, timestamp included
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(url.to_string(), entry);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. RwLock vs Mutex
//    - A Mutex lets one user in at a time
//    - An RwLock lets many readers in at once, or a single writer
//    - Lookups are far more common than stores here, so RwLock fits
//
// 2. Why Instant and not SystemTime?
//    - Instant is monotonic: it never jumps when the wall clock is changed
//    - That is exactly what an age check needs
//
// 3. Why Arc<dyn Clock>?
//    - dyn Clock is a trait object: any type implementing Clock fits
//    - Arc lets tests keep a handle to the same clock and move it forward
// -----------------------------------------------------------------------------
