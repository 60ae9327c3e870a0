pub use crate::config::*;

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::category_key;
use crate::guard::{EligibilityStore, MemoryEligibilityStore, VoteEligibilityGuard};
use crate::store::{LedgerStore, MemoryLedger};
use crate::TallyBoard;

/// A builder for assembling a tally board.
///
/// A board represents one browser session: it carries its own eligibility
/// storage but may share a ledger with any number of other boards. Without
/// an explicit ledger or eligibility store, in-memory ones are used.
///
/// ```
/// use std::sync::Arc;
/// use vote_tally::builder::Builder;
/// use vote_tally::store::MemoryLedger;
/// use vote_tally::TallySettings;
///
/// let ledger = Arc::new(MemoryLedger::new());
/// let board = Builder::new(&TallySettings::DEFAULT_SETTINGS)
///     .categories(&["University Wide".to_string()])
///     .ledger(ledger)
///     .build();
///
/// board.submit("University Wide", "Amy")?;
/// assert_eq!(board.has_voted("University Wide"), Ok(true));
/// # Ok::<(), vote_tally::VoteError>(())
/// ```
pub struct Builder {
    settings: TallySettings,
    categories: Vec<CategoryConfig>,
    ledger: Option<Arc<dyn LedgerStore>>,
    eligibility: Option<Box<dyn EligibilityStore>>,
}

impl Builder {
    pub fn new(settings: &TallySettings) -> Builder {
        Builder {
            settings: *settings,
            categories: Vec::new(),
            ledger: None,
            eligibility: None,
        }
    }

    /// Registers free-entry categories by name.
    pub fn categories(mut self, names: &[String]) -> Builder {
        for name in names {
            self.categories.push(CategoryConfig {
                name: name.clone(),
                free_entry: true,
            });
        }
        self
    }

    /// Registers one category with full control over its configuration.
    pub fn category(mut self, config: &CategoryConfig) -> Builder {
        self.categories.push(config.clone());
        self
    }

    /// The ledger shared with the other boards of this poll.
    pub fn ledger(mut self, ledger: Arc<dyn LedgerStore>) -> Builder {
        self.ledger = Some(ledger);
        self
    }

    /// The browser-local eligibility storage backing the one-shot gate.
    pub fn eligibility(mut self, store: Box<dyn EligibilityStore>) -> Builder {
        self.eligibility = Some(store);
        self
    }

    pub fn build(self) -> TallyBoard {
        let mut by_key: HashMap<String, CategoryConfig> = HashMap::new();
        for config in self.categories {
            let key = category_key(&config.name);
            // First registration wins, like display names in the ledger.
            if by_key.contains_key(&key) {
                debug!("build: duplicate category {:?} ignored", config.name);
                continue;
            }
            by_key.insert(key, config);
        }
        let ledger = self
            .ledger
            .unwrap_or_else(|| Arc::new(MemoryLedger::new()));
        let eligibility = self
            .eligibility
            .unwrap_or_else(|| Box::new(MemoryEligibilityStore::new()));
        let guard = VoteEligibilityGuard::new(eligibility, self.settings.retention_days);
        TallyBoard::from_parts(self.settings, by_key, ledger, guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_category_registrations_keep_the_first() {
        let board = Builder::new(&TallySettings::DEFAULT_SETTINGS)
            .categories(&["CS Girls".to_string()])
            .category(&CategoryConfig {
                name: "cs   girls".to_string(),
                free_entry: false,
            })
            .build();
        // Free-entry bounds from the first registration still apply.
        assert_eq!(
            board.submit("CS Girls", "J"),
            Err(VoteError::InvalidNomineeName)
        );
    }
}
