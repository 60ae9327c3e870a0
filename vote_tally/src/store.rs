//! The ledger store boundary: per-category, per-nominee counters with
//! atomic increment-or-create semantics, plus live snapshot subscriptions.

use log::debug;

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::config::NomineeRecord;

/// Errors reported by a ledger adapter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LedgerError {
    /// The operation could not complete (network, transaction conflict
    /// exhaustion, timeout). The caller sees this as a transient failure.
    Unavailable,
}

impl Error for LedgerError {}

impl Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ledger store unavailable")
    }
}

/// The full set of records for one category at a point in time.
///
/// Adapters may pre-sort snapshots by vote count descending as a display
/// hint. Consumers must not rely on it: the ranking projector applies its
/// own total order.
pub type CategorySnapshot = Vec<NomineeRecord>;

/// Shared atomic counter storage, keyed by (category key, identity key).
///
/// Adapters sit on top of a store that serializes concurrent increments to
/// the same key across all connected clients, using a native atomic
/// increment or a retry-on-conflict transaction. The core never runs its
/// own optimistic-locking loop. Adapters must also bound every operation
/// with a timeout and report the expiry as [LedgerError::Unavailable]
/// rather than hang the caller.
pub trait LedgerStore: Send + Sync {
    /// If no record exists for the key pair, creates one with a count of 1
    /// and the given display name. Otherwise increments the count by
    /// exactly 1 and leaves the display name untouched.
    ///
    /// Two simultaneous calls for the same key must both be reflected, and
    /// exactly one of them determines the display name.
    fn atomic_upsert_increment(
        &self,
        category_key: &str,
        identity_key: &str,
        display_name_if_new: &str,
    ) -> Result<NomineeRecord, LedgerError>;

    /// All records of the category, in arbitrary order.
    fn list_by_category(&self, category_key: &str) -> Result<Vec<NomineeRecord>, LedgerError>;

    /// Live updates for the category: the current snapshot immediately,
    /// then one snapshot per change. Dropping the handle cancels the
    /// subscription.
    fn subscribe(&self, category_key: &str) -> LedgerSubscription;
}

/// A cancellable handle on a category's snapshot feed.
pub struct LedgerSubscription {
    rx: Receiver<CategorySnapshot>,
}

impl LedgerSubscription {
    /// Blocks until the next snapshot. Returns None once the store is gone.
    pub fn recv(&self) -> Option<CategorySnapshot> {
        self.rx.recv().ok()
    }

    /// Returns the next snapshot if one is already pending.
    pub fn try_recv(&self) -> Option<CategorySnapshot> {
        self.rx.try_recv().ok()
    }
}

/// In-process ledger adapter.
///
/// A single mutex serializes all upserts, so concurrent increments from any
/// number of threads are all reflected. Suitable for tests and for the
/// scenario driver; a hosted document store stands in for it in production.
#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<MemoryLedgerInner>,
}

#[derive(Default)]
struct MemoryLedgerInner {
    // category key -> identity key -> record
    records: HashMap<String, HashMap<String, NomineeRecord>>,
    watchers: HashMap<String, Vec<Sender<CategorySnapshot>>>,
}

impl MemoryLedger {
    pub fn new() -> MemoryLedger {
        MemoryLedger::default()
    }
}

fn category_snapshot(bucket: &HashMap<String, NomineeRecord>) -> CategorySnapshot {
    let mut snapshot: Vec<NomineeRecord> = bucket.values().cloned().collect();
    // Pre-sort hint only. Ties are left in map order on purpose.
    snapshot.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    snapshot
}

impl LedgerStore for MemoryLedger {
    fn atomic_upsert_increment(
        &self,
        category_key: &str,
        identity_key: &str,
        display_name_if_new: &str,
    ) -> Result<NomineeRecord, LedgerError> {
        let mut guard = match self.inner.lock() {
            Ok(g) => g,
            Err(_) => return Err(LedgerError::Unavailable),
        };
        let inner = &mut *guard;
        let bucket = inner.records.entry(category_key.to_string()).or_default();
        let record = bucket
            .entry(identity_key.to_string())
            .and_modify(|r| r.vote_count += 1)
            .or_insert_with(|| NomineeRecord {
                identity_key: identity_key.to_string(),
                display_name: display_name_if_new.to_string(),
                vote_count: 1,
            });
        let updated = record.clone();
        debug!(
            "atomic_upsert_increment: {}/{} -> {:?}",
            category_key, identity_key, updated.vote_count
        );

        let snapshot = category_snapshot(bucket);
        if let Some(senders) = inner.watchers.get_mut(category_key) {
            // A send failure means the handle was dropped; prune it.
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
        Ok(updated)
    }

    fn list_by_category(&self, category_key: &str) -> Result<Vec<NomineeRecord>, LedgerError> {
        let guard = match self.inner.lock() {
            Ok(g) => g,
            Err(_) => return Err(LedgerError::Unavailable),
        };
        Ok(guard
            .records
            .get(category_key)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }

    fn subscribe(&self, category_key: &str) -> LedgerSubscription {
        let (tx, rx) = channel();
        if let Ok(mut guard) = self.inner.lock() {
            let inner = &mut *guard;
            let initial = inner
                .records
                .get(category_key)
                .map(category_snapshot)
                .unwrap_or_default();
            // The receiver is still in scope, this cannot fail.
            let _ = tx.send(initial);
            inner
                .watchers
                .entry(category_key.to_string())
                .or_default()
                .push(tx);
        }
        LedgerSubscription { rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn create_then_increment() {
        let ledger = MemoryLedger::new();
        let first = ledger
            .atomic_upsert_increment("uni", "amy", "Amy")
            .unwrap();
        assert_eq!(first.vote_count, 1);
        assert_eq!(first.display_name, "Amy");

        let second = ledger
            .atomic_upsert_increment("uni", "amy", "AMY")
            .unwrap();
        assert_eq!(second.vote_count, 2);
        // First submission fixed the display name.
        assert_eq!(second.display_name, "Amy");
    }

    #[test]
    fn categories_are_independent() {
        let ledger = MemoryLedger::new();
        ledger.atomic_upsert_increment("a", "amy", "Amy").unwrap();
        ledger.atomic_upsert_increment("b", "amy", "amy").unwrap();
        let a = ledger.list_by_category("a").unwrap();
        let b = ledger.list_by_category("b").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].vote_count, 1);
        assert_eq!(b[0].display_name, "amy");
    }

    #[test]
    fn concurrent_increments_are_all_reflected() {
        let ledger = Arc::new(MemoryLedger::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let l = ledger.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    l.atomic_upsert_increment("uni", "amy", "Amy").unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let records = ledger.list_by_category("uni").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vote_count, 800);
    }

    #[test]
    fn subscription_sees_initial_and_updated_snapshots() {
        let ledger = MemoryLedger::new();
        ledger.atomic_upsert_increment("uni", "amy", "Amy").unwrap();

        let sub = ledger.subscribe("uni");
        let initial = sub.recv().unwrap();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].vote_count, 1);

        ledger.atomic_upsert_increment("uni", "beth", "Beth").unwrap();
        let next = sub.recv().unwrap();
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let ledger = MemoryLedger::new();
        let sub = ledger.subscribe("uni");
        drop(sub);
        // Must not fail or block on the closed channel.
        ledger.atomic_upsert_increment("uni", "amy", "Amy").unwrap();
        assert!(ledger.inner.lock().unwrap().watchers["uni"].is_empty());
    }

    #[test]
    fn snapshot_is_presorted_by_votes_descending() {
        let ledger = MemoryLedger::new();
        ledger.atomic_upsert_increment("uni", "amy", "Amy").unwrap();
        ledger.atomic_upsert_increment("uni", "beth", "Beth").unwrap();
        ledger.atomic_upsert_increment("uni", "beth", "beth").unwrap();

        let sub = ledger.subscribe("uni");
        let snapshot = sub.recv().unwrap();
        assert_eq!(snapshot[0].identity_key, "beth");
        assert_eq!(snapshot[0].vote_count, 2);
    }
}
