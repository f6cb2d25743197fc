//! Time-to-live cache entries.
//!
//! A [`CacheEntry`] holds a fetched value together with the moment it was
//! fetched. The value and its timestamp are stored as one pair, so an entry is
//! either empty or fully stamped.

use std::time::Duration;

/// Freshness window used by the dashboard.
pub const DASHBOARD_TTL: Duration = Duration::from_secs(5 * 60);

/// A fetched value plus the Unix millisecond timestamp it was fetched at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    slot: Option<(T, i64)>,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> CacheEntry<T> {
    /// An entry with no value.
    pub const fn empty() -> Self {
        Self { slot: None }
    }

    /// Stamp `value` as fetched at `now_millis`.
    pub const fn store(value: T, now_millis: i64) -> Self {
        Self {
            slot: Some((value, now_millis)),
        }
    }

    /// Replace the contents with a freshly fetched value.
    pub fn restamp(&mut self, value: T, now_millis: i64) {
        self.slot = Some((value, now_millis));
    }

    pub fn value(&self) -> Option<&T> {
        self.slot.as_ref().map(|(value, _)| value)
    }

    pub fn fetched_at_millis(&self) -> Option<i64> {
        self.slot.as_ref().map(|(_, fetched_at)| *fetched_at)
    }

    pub const fn is_populated(&self) -> bool {
        self.slot.is_some()
    }

    /// Age of the entry at `now_millis`, if populated.
    pub fn age_millis(&self, now_millis: i64) -> Option<i64> {
        self.fetched_at_millis()
            .map(|fetched_at| now_millis.saturating_sub(fetched_at))
    }

    /// Whether the entry holds a value no older than `ttl_millis`.
    ///
    /// A timestamp in the future (clock moved backwards) counts as fresh.
    pub fn is_fresh(&self, ttl_millis: i64, now_millis: i64) -> bool {
        is_fresh(self, ttl_millis, now_millis)
    }
}

/// Whether `entry` holds a value and `now - fetched_at <= ttl`.
pub fn is_fresh<T>(entry: &CacheEntry<T>, ttl_millis: i64, now_millis: i64) -> bool {
    entry
        .age_millis(now_millis)
        .is_some_and(|age| age <= ttl_millis)
}

/// Convert a TTL duration to whole milliseconds, saturating.
pub fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entry_is_never_fresh() {
        let entry = CacheEntry::<u32>::empty();
        assert!(!entry.is_fresh(i64::MAX, 0));
        assert_eq!(entry.value(), None);
        assert_eq!(entry.fetched_at_millis(), None);
    }

    #[test]
    fn freshness_boundary_is_inclusive() {
        let ttl = 300_000;
        for fetched_at in [0_i64, 1_000, 1_700_000_000_000] {
            let entry = CacheEntry::store("stats", fetched_at);
            for elapsed in [0_i64, 1, ttl - 1, ttl, ttl + 1, ttl * 2] {
                assert_eq!(
                    is_fresh(&entry, ttl, fetched_at + elapsed),
                    elapsed <= ttl,
                    "fetched_at={fetched_at} elapsed={elapsed}"
                );
            }
        }
    }

    #[test]
    fn restamp_replaces_value_and_timestamp() {
        let mut entry = CacheEntry::store(1, 10);
        entry.restamp(2, 50);
        assert_eq!(entry.value(), Some(&2));
        assert_eq!(entry.fetched_at_millis(), Some(50));
        assert_eq!(entry.age_millis(80), Some(30));
    }

    #[test]
    fn dashboard_ttl_is_five_minutes() {
        assert_eq!(ttl_millis(DASHBOARD_TTL), 300_000);
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        let entry = CacheEntry::store((), 10_000);
        assert!(entry.is_fresh(1_000, 5_000));
    }
}
