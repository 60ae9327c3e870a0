//! The per-browser, per-category one-shot voting gate.
//!
//! The gate is advisory only: it lives in browser-local storage, so a user
//! can always vote again from another browser or after clearing storage.
//! It is never transmitted to the ledger store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage_token;

/// Prefix for all eligibility keys, namespacing them to this application.
pub const VOTE_KEY_PREFIX: &str = "campus_vote_";

/// Durable key-value storage scoped to one browser, cookie-like: a value
/// with an expiry, not shared across browsers or devices.
///
/// Injected into the guard so tests can swap in [MemoryEligibilityStore].
pub trait EligibilityStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str, retention_days: u32);
}

/// Decides whether a submission is allowed for a category, one shot per
/// browser.
pub struct VoteEligibilityGuard {
    store: Box<dyn EligibilityStore>,
    retention_days: u32,
}

impl VoteEligibilityGuard {
    pub fn new(store: Box<dyn EligibilityStore>, retention_days: u32) -> VoteEligibilityGuard {
        VoteEligibilityGuard {
            store,
            retention_days,
        }
    }

    fn key(category_key: &str) -> String {
        format!("{}{}", VOTE_KEY_PREFIX, storage_token(category_key))
    }

    pub fn has_voted(&self, category_key: &str) -> bool {
        self.store.get(&Self::key(category_key)).as_deref() == Some("true")
    }

    pub fn mark_voted(&self, category_key: &str) {
        self.store
            .set(&Self::key(category_key), "true", self.retention_days);
    }
}

/// In-memory eligibility storage. Retention is accepted and ignored; the
/// map lives as long as the process.
#[derive(Default)]
pub struct MemoryEligibilityStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryEligibilityStore {
    pub fn new() -> MemoryEligibilityStore {
        MemoryEligibilityStore::default()
    }
}

impl EligibilityStore for MemoryEligibilityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str, _retention_days: u32) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> VoteEligibilityGuard {
        VoteEligibilityGuard::new(Box::new(MemoryEligibilityStore::new()), 365)
    }

    #[test]
    fn unmarked_category_allows_voting() {
        let g = guard();
        assert!(!g.has_voted("cs_department_girls"));
    }

    #[test]
    fn marking_is_permanent_and_category_scoped() {
        let g = guard();
        g.mark_voted("mis_girls");
        assert!(g.has_voted("mis_girls"));
        assert!(!g.has_voted("cs_department_girls"));
    }

    #[test]
    fn keys_are_storage_safe() {
        assert_eq!(
            VoteEligibilityGuard::key("CS Department Girls"),
            "campus_vote_cs_department_girls"
        );
        assert_eq!(
            VoteEligibilityGuard::key("Intro. to C++"),
            "campus_vote_intro_to_c_"
        );
    }

    #[test]
    fn equivalent_category_spellings_share_a_key() {
        let g = guard();
        g.mark_voted("University Wide");
        assert!(g.has_voted("university_wide"));
    }
}
