//! Staleness guard for superseded fetches.
//!
//! Fetches are keyed by their resolved parameter set. Changing filters or
//! pagination starts a newer fetch for the same key, which supersedes any
//! in-flight one; when the older response finally lands, `admit` rejects
//! it so it can never overwrite state derived from the newer request.
//! This is a staleness guard, not cancellation; the old request is left
//! to finish and its result is dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A handle identifying one started fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: String,
    generation: u64,
}

impl FetchTicket {
    /// The parameter-set key this ticket belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Tracks the newest fetch generation per parameter-set key.
#[derive(Debug, Default)]
pub struct StalenessGuard {
    latest: Mutex<HashMap<String, u64>>,
    counter: AtomicU64,
}

impl StalenessGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new fetch for `key`, superseding any earlier ticket
    /// with the same key.
    pub fn begin(&self, key: impl Into<String>) -> FetchTicket {
        let key = key.into();
        let generation = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.latest).insert(key.clone(), generation);
        FetchTicket { key, generation }
    }

    /// True if the ticket still represents the newest fetch for its key;
    /// a stale result must be dropped by the caller.
    pub fn admit(&self, ticket: &FetchTicket) -> bool {
        lock(&self.latest).get(&ticket.key) == Some(&ticket.generation)
    }
}

/// Builds the parameter-set key for an endpoint fetch.
pub fn fingerprint(endpoint: &str, params: &BTreeMap<String, String>) -> String {
    let mut key = String::from(endpoint);
    for (i, (name, value)) in params.iter().enumerate() {
        key.push(if i == 0 { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

fn lock(mutex: &Mutex<HashMap<String, u64>>) -> std::sync::MutexGuard<'_, HashMap<String, u64>> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_fetch_supersedes_older() {
        let guard = StalenessGuard::new();
        let first = guard.begin("/rules?limit=25");
        let second = guard.begin("/rules?limit=25");

        // The older response arrives late and must be dropped.
        assert!(!guard.admit(&first));
        assert!(guard.admit(&second));
    }

    #[test]
    fn test_different_keys_are_independent() {
        let guard = StalenessGuard::new();
        let rules = guard.begin("/rules?limit=25");
        let cves = guard.begin("/cves?limit=25");

        assert!(guard.admit(&rules));
        assert!(guard.admit(&cves));
    }

    #[test]
    fn test_admit_is_repeatable() {
        let guard = StalenessGuard::new();
        let ticket = guard.begin("/rules");
        assert!(guard.admit(&ticket));
        assert!(guard.admit(&ticket));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let mut params = BTreeMap::new();
        params.insert("severities".to_string(), "high,critical".to_string());
        params.insert("limit".to_string(), "25".to_string());

        // BTreeMap ordering makes the fingerprint independent of insertion
        // order.
        assert_eq!(
            fingerprint("/rules", &params),
            "/rules?limit=25&severities=high,critical"
        );
        assert_eq!(fingerprint("/rules", &BTreeMap::new()), "/rules");
    }
}
