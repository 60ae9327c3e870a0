mod config;
use log::{debug, info};

use std::collections::HashMap;
use std::sync::Arc;

pub use crate::config::*;

pub mod builder;
pub mod guard;
pub mod manual;
pub mod quick_start;
pub mod store;

use crate::guard::VoteEligibilityGuard;
use crate::store::{LedgerStore, LedgerSubscription};

// **** Identity normalization ****

/// Canonicalizes a free-text nominee name into its identity key: trimmed,
/// lower-cased, internal whitespace runs collapsed to a single space.
///
/// Idempotent: normalizing an already-normalized name is a no-op.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Derives a stable category key from a human-entered or list-selected
/// string: trimmed, lower-cased, whitespace runs joined with underscores.
pub fn category_key(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("_")
}

/// Reduces a key to a storage-safe token: lower-cased, runs of
/// non-alphanumeric characters collapsed to a single underscore.
pub fn storage_token(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_separator = false;
    for c in key.to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }
    out
}

// **** Ranking projection ****

/// Orders a category's records into a deterministic total order: vote count
/// descending, ties broken by identity key ascending.
///
/// Pure and stateless; recomputed in full on every read or snapshot, never
/// updated incrementally. The result does not depend on the input order,
/// which matters because the backing store may deliver records in arbitrary
/// order.
pub fn project_ranking(records: &[NomineeRecord]) -> Vec<NomineeRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.identity_key.cmp(&b.identity_key))
    });
    ranked
}

/// Projects records into display rows with 1-based position ranks.
/// Tied vote counts still receive distinct sequential ranks.
pub fn ranking_rows(records: &[NomineeRecord]) -> Vec<DisplayRow> {
    project_ranking(records)
        .into_iter()
        .enumerate()
        .map(|(idx, r)| DisplayRow {
            rank: idx as u32 + 1,
            display_name: r.display_name,
            vote_count: r.vote_count,
        })
        .collect()
}

// **** The tally board ****

/// A live ranking feed for one category.
///
/// Each received snapshot is projected fresh; dropping the feed cancels the
/// underlying subscription.
pub struct RankingFeed {
    subscription: LedgerSubscription,
}

impl RankingFeed {
    /// Blocks until the next ranking. Returns None once the store is gone.
    pub fn recv(&self) -> Option<Vec<DisplayRow>> {
        self.subscription.recv().map(|snap| ranking_rows(&snap))
    }

    /// Returns the next ranking if a snapshot is already pending.
    pub fn try_recv(&self) -> Option<Vec<DisplayRow>> {
        self.subscription.try_recv().map(|snap| ranking_rows(&snap))
    }
}

/// Orchestrates vote submissions for one browser session.
///
/// The ledger is shared by all boards voting in the same categories; the
/// eligibility guard is private to this board and never shared. Assemble
/// boards with [builder::Builder].
///
/// ```
/// use vote_tally::builder::Builder;
/// use vote_tally::TallySettings;
///
/// let board = Builder::new(&TallySettings::DEFAULT_SETTINGS)
///     .categories(&["University Wide".to_string()])
///     .build();
///
/// let record = board.submit("University Wide", "Amy")?;
/// assert_eq!(record.vote_count, 1);
/// # Ok::<(), vote_tally::VoteError>(())
/// ```
pub struct TallyBoard {
    settings: TallySettings,
    // category key -> registered category
    categories: HashMap<String, CategoryConfig>,
    ledger: Arc<dyn LedgerStore>,
    guard: VoteEligibilityGuard,
}

impl TallyBoard {
    pub(crate) fn from_parts(
        settings: TallySettings,
        categories: HashMap<String, CategoryConfig>,
        ledger: Arc<dyn LedgerStore>,
        guard: VoteEligibilityGuard,
    ) -> TallyBoard {
        TallyBoard {
            settings,
            categories,
            ledger,
            guard,
        }
    }

    fn resolve_category(&self, category: &str) -> Result<(String, &CategoryConfig), VoteError> {
        let key = category_key(category);
        if key.is_empty() {
            return Err(VoteError::CategoryNotResolved);
        }
        match self.categories.get(&key) {
            Some(config) => Ok((key, config)),
            None => {
                debug!("resolve_category: unknown category {:?}", category);
                Err(VoteError::CategoryNotResolved)
            }
        }
    }

    fn validate_name(&self, trimmed: &str, config: &CategoryConfig) -> Result<(), VoteError> {
        let bounds = if config.free_entry {
            self.settings.free_entry_bounds
        } else {
            self.settings.list_entry_bounds
        };
        let chars = trimmed.chars().count() as u32;
        if chars < bounds.min_chars || chars > bounds.max_chars {
            debug!(
                "validate_name: {:?} has {} chars, outside {}..={}",
                trimmed, chars, bounds.min_chars, bounds.max_chars
            );
            return Err(VoteError::InvalidNomineeName);
        }
        Ok(())
    }

    /// Submits one vote. On success exactly one ledger increment and one
    /// guard mark happened; on any failure nothing was mutated.
    ///
    /// The eligibility check runs before any store traffic, so a repeat
    /// submission from this board never reaches the ledger. The guard is
    /// marked only after the ledger write succeeded: a failed vote leaves
    /// the browser free to retry.
    pub fn submit(&self, category: &str, raw_name: &str) -> Result<NomineeRecord, VoteError> {
        let (key, config) = self.resolve_category(category)?;
        let trimmed = raw_name.trim();
        self.validate_name(trimmed, config)?;
        if self.guard.has_voted(&key) {
            debug!("submit: repeat submission for {:?} rejected", key);
            return Err(VoteError::AlreadyVoted);
        }

        let identity_key = normalize_name(trimmed);
        let record = self
            .ledger
            .atomic_upsert_increment(&key, &identity_key, trimmed)
            .map_err(|e| {
                debug!("submit: ledger write failed for {:?}: {}", key, e);
                VoteError::StoreUnavailable
            })?;
        self.guard.mark_voted(&key);
        info!(
            "submit: {:?} in {:?} now at {} votes",
            record.display_name, key, record.vote_count
        );
        Ok(record)
    }

    /// The current ranking of the category, as display rows.
    pub fn ranking(&self, category: &str) -> Result<Vec<DisplayRow>, VoteError> {
        let (key, _) = self.resolve_category(category)?;
        let records = self
            .ledger
            .list_by_category(&key)
            .map_err(|_| VoteError::StoreUnavailable)?;
        Ok(ranking_rows(&records))
    }

    /// Live rankings for the category, starting from the current state.
    pub fn subscribe_ranking(&self, category: &str) -> Result<RankingFeed, VoteError> {
        let (key, _) = self.resolve_category(category)?;
        Ok(RankingFeed {
            subscription: self.ledger.subscribe(&key),
        })
    }

    /// Whether this board's browser already voted in the category.
    pub fn has_voted(&self, category: &str) -> Result<bool, VoteError> {
        let (key, _) = self.resolve_category(category)?;
        Ok(self.guard.has_voted(&key))
    }
}
