// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A registered voting pool, e.g. one course or a university-wide pool.
///
/// Free-entry categories accept any typed name within the strict length
/// bound. List-selected categories carry names picked from a fixed list and
/// use the looser bound.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoryConfig {
    pub name: String,
    pub free_entry: bool,
}

// ******** Output data structures *********

/// The tallied state of one nominee within a category.
///
/// There is at most one record per identity key within a category. The vote
/// count only moves up, by exactly 1 per accepted vote. The display name is
/// the trimmed text of whichever submission created the record and never
/// changes afterwards, regardless of the casing used by later votes.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct NomineeRecord {
    pub identity_key: String,
    pub display_name: String,
    pub vote_count: u64,
}

/// One row of a projected ranking, ready for display.
///
/// Ranks are 1-based sequence positions. Nominees tied on votes still get
/// distinct sequential ranks.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DisplayRow {
    pub rank: u32,
    pub display_name: String,
    pub vote_count: u64,
}

/// Errors surfaced by a vote submission.
///
/// None of these are fatal: every failure is per-operation and recoverable
/// by retrying the user action.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VoteError {
    /// The nominee name is empty after trimming or outside the length bound.
    InvalidNomineeName,
    /// This browser already voted in the category. Checked before any store
    /// traffic.
    AlreadyVoted,
    /// The ledger write or read failed (network, conflict exhaustion,
    /// timeout). Nothing was mutated; the caller may retry.
    StoreUnavailable,
    /// The category is blank or not registered on this board.
    CategoryNotResolved,
}

impl Error for VoteError {}

impl Display for VoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::InvalidNomineeName => write!(f, "invalid nominee name"),
            VoteError::AlreadyVoted => write!(f, "already voted in this category"),
            VoteError::StoreUnavailable => write!(f, "vote store unavailable"),
            VoteError::CategoryNotResolved => write!(f, "category not resolved"),
        }
    }
}

// ********* Configuration **********

/// An inclusive character-count bound on submitted nominee names.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct NameBounds {
    pub min_chars: u32,
    pub max_chars: u32,
}

/// Tuning knobs for a tally board.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TallySettings {
    /// Bound applied to free-entry categories.
    pub free_entry_bounds: NameBounds,
    /// Looser bound applied to list-selected categories.
    pub list_entry_bounds: NameBounds,
    /// Retention requested from the eligibility storage, in days.
    pub retention_days: u32,
}

impl TallySettings {
    pub const DEFAULT_SETTINGS: TallySettings = TallySettings {
        free_entry_bounds: NameBounds {
            min_chars: 2,
            max_chars: 50,
        },
        list_entry_bounds: NameBounds {
            min_chars: 1,
            max_chars: 100,
        },
        retention_days: 365,
    };
}
