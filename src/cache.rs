use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::Snapshot;

/// Classification of snapshot age, measured from the last *successful* fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessLevel {
    Fresh,
    Stale,
    /// No successful fetch has ever happened for this group. Distinct from
    /// "closed": a group with no data is unknown, not closed.
    NoData,
}

/// Last-known-good state for one group. The snapshot is only ever replaced by
/// a successful fetch; failures touch the attempt timestamp and counter only.
#[derive(Debug, Default)]
struct CacheEntry {
    snapshot: Option<Arc<Snapshot>>,
    last_attempt: Option<DateTime<Utc>>,
    failures: u32,
}

/// Owns one `CacheEntry` per configured group behind its own lock, so refresh
/// tasks for different groups never contend and readers never observe a
/// mid-write entry.
#[derive(Debug)]
pub struct FreshnessCache {
    stale_after: Duration,
    entries: HashMap<String, RwLock<CacheEntry>>,
}

impl FreshnessCache {
    pub fn new(groups: impl IntoIterator<Item = String>, stale_after: Duration) -> Self {
        let entries = groups
            .into_iter()
            .map(|slug| (slug, RwLock::new(CacheEntry::default())))
            .collect();
        Self {
            stale_after,
            entries,
        }
    }

    /// Install a freshly fetched snapshot and reset the failure counter.
    pub fn record_success(&self, snapshot: Snapshot) {
        let Some(lock) = self.entries.get(&snapshot.group) else {
            debug!(group = %snapshot.group, "ignoring snapshot for unconfigured group");
            return;
        };
        let attempt = snapshot.fetched_at;
        let mut entry = lock.write().unwrap_or_else(|e| e.into_inner());
        entry.snapshot = Some(Arc::new(snapshot));
        entry.last_attempt = Some(attempt);
        entry.failures = 0;
    }

    /// Record a failed attempt, leaving the last-known-good snapshot intact.
    /// Returns the new consecutive-failure count.
    pub fn record_failure(&self, group: &str, at: DateTime<Utc>) -> u32 {
        let Some(lock) = self.entries.get(group) else {
            debug!(group, "ignoring failure for unconfigured group");
            return 0;
        };
        let mut entry = lock.write().unwrap_or_else(|e| e.into_inner());
        entry.last_attempt = Some(at);
        entry.failures += 1;
        entry.failures
    }

    pub fn get(&self, group: &str) -> (Option<Arc<Snapshot>>, StalenessLevel) {
        self.get_at(group, Utc::now())
    }

    pub fn get_at(
        &self,
        group: &str,
        now: DateTime<Utc>,
    ) -> (Option<Arc<Snapshot>>, StalenessLevel) {
        let Some(lock) = self.entries.get(group) else {
            return (None, StalenessLevel::NoData);
        };
        let entry = lock.read().unwrap_or_else(|e| e.into_inner());
        match &entry.snapshot {
            None => (None, StalenessLevel::NoData),
            Some(snapshot) => {
                let level = self.classify(snapshot.fetched_at, now);
                (Some(Arc::clone(snapshot)), level)
            }
        }
    }

    pub fn get_snapshot(&self, group: &str) -> Option<Arc<Snapshot>> {
        self.get(group).0
    }

    pub fn get_staleness(&self, group: &str) -> StalenessLevel {
        self.get(group).1
    }

    /// Consecutive failures since the last success.
    pub fn failures(&self, group: &str) -> u32 {
        self.entries
            .get(group)
            .map(|lock| lock.read().unwrap_or_else(|e| e.into_inner()).failures)
            .unwrap_or(0)
    }

    /// Age of the last successful snapshot in whole minutes, for the stale
    /// badge. `None` when no data has ever been fetched.
    pub fn age_minutes_at(&self, group: &str, now: DateTime<Utc>) -> Option<i64> {
        let lock = self.entries.get(group)?;
        let entry = lock.read().unwrap_or_else(|e| e.into_inner());
        let snapshot = entry.snapshot.as_ref()?;
        Some(
            now.signed_duration_since(snapshot.fetched_at)
                .num_minutes()
                .max(0),
        )
    }

    pub fn age_minutes(&self, group: &str) -> Option<i64> {
        self.age_minutes_at(group, Utc::now())
    }

    fn classify(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> StalenessLevel {
        let age = now.signed_duration_since(fetched_at);
        match age.to_std() {
            Ok(age) if age >= self.stale_after => StalenessLevel::Stale,
            // clock skew backwards counts as fresh
            _ => StalenessLevel::Fresh,
        }
    }
}
