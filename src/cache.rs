//! Process-wide caches for journey data.
//!
//! Two tiers with different lifetimes: milestone lists live until they are
//! explicitly cleared, transformed pages expire after a TTL that is checked
//! lazily on read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::formats::{JourneyContent, Milestone};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += to_time_delta(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
struct CachedContent {
    content: JourneyContent,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub journeys: usize,
    pub content_entries: usize,
    pub expired_entries: usize,
}

pub struct JourneyCache {
    clock: Arc<dyn Clock>,
    content_ttl: TimeDelta,
    milestones: RwLock<HashMap<String, Vec<Milestone>>>,
    content: RwLock<HashMap<String, CachedContent>>,
}

impl JourneyCache {
    pub fn new(clock: Arc<dyn Clock>, content_ttl: Duration) -> Self {
        Self {
            clock,
            content_ttl: to_time_delta(content_ttl),
            milestones: RwLock::new(HashMap::new()),
            content: RwLock::new(HashMap::new()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Cached page for the URL exactly as it was requested, if still fresh.
    pub fn get_content(&self, url: &str) -> Option<JourneyContent> {
        let content = read(&self.content);
        let entry = content.get(url)?;
        if self.is_expired(entry.fetched_at) {
            tracing::debug!(url, fetched_at = %entry.fetched_at, "content cache entry expired");
            return None;
        }
        Some(entry.content.clone())
    }

    pub fn put_content(&self, url: &str, content: JourneyContent) {
        let entry = CachedContent {
            fetched_at: self.clock.now(),
            content,
        };
        write(&self.content).insert(url.to_owned(), entry);
    }

    pub fn milestones(&self, base_url: &str) -> Option<Vec<Milestone>> {
        read(&self.milestones).get(base_url).cloned()
    }

    pub fn put_milestones(&self, base_url: &str, milestones: Vec<Milestone>) {
        write(&self.milestones).insert(base_url.to_owned(), milestones);
    }

    /// Drops cached pages under `base_url`. Milestone lists are kept so the
    /// journey can still be paginated when it is reopened.
    pub fn clear_journey(&self, base_url: &str) {
        let mut content = write(&self.content);
        let before = content.len();
        content.retain(|key, _| !is_under_base(key, base_url));
        tracing::debug!(
            base_url,
            removed = before - content.len(),
            "cleared journey content"
        );
    }

    pub fn clear_all(&self) {
        write(&self.content).clear();
        write(&self.milestones).clear();
        tracing::debug!("cleared all journey caches");
    }

    pub fn stats(&self) -> CacheStats {
        let content = read(&self.content);
        CacheStats {
            journeys: read(&self.milestones).len(),
            content_entries: content.len(),
            expired_entries: content
                .values()
                .filter(|e| self.is_expired(e.fetched_at))
                .count(),
        }
    }

    fn is_expired(&self, fetched_at: DateTime<Utc>) -> bool {
        self.clock.now() - fetched_at >= self.content_ttl
    }
}

fn is_under_base(key: &str, base_url: &str) -> bool {
    let base = base_url.trim_end_matches('/');
    let Some(rest) = key.strip_prefix(base) else {
        return false;
    };
    rest.is_empty() || rest.starts_with(['/', '#', '?'])
}

fn to_time_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}

// Entries are replaced whole, so a poisoned lock still holds consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
