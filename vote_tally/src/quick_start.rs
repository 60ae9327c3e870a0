/*!

# Quick start

This example runs a small poll end to end, entirely in memory. Three
browsers vote in a university-wide category and the live ranking is read
back after each vote.

Every browser session is represented by a [crate::TallyBoard]. Boards share
one ledger (here the in-process [crate::store::MemoryLedger]; in a deployed
poll, an adapter over a hosted document store) and each board carries its own
private eligibility storage, playing the role of the browser's cookies.

```
use std::sync::Arc;
use vote_tally::builder::Builder;
use vote_tally::store::MemoryLedger;
use vote_tally::{TallySettings, VoteError};

let ledger = Arc::new(MemoryLedger::new());
let browser = |_| {
    Builder::new(&TallySettings::DEFAULT_SETTINGS)
        .categories(&["University Wide".to_string()])
        .ledger(ledger.clone())
        .build()
};
let (b1, b2, b3) = (browser(1), browser(2), browser(3));

b1.submit("University Wide", "Amy")?;
b2.submit("University Wide", "Beth")?;
// Case and whitespace do not split the tally: "amy" lands on Amy's record.
b3.submit("University Wide", "amy")?;

let rows = b1.ranking("University Wide")?;
assert_eq!(rows[0].display_name, "Amy");
assert_eq!(rows[0].vote_count, 2);
assert_eq!(rows[1].display_name, "Beth");

// A browser only gets one vote per category.
assert_eq!(
    b1.submit("University Wide", "Cara"),
    Err(VoteError::AlreadyVoted)
);
# Ok::<(), VoteError>(())
```

**Live updates** Instead of polling `ranking`, a display can subscribe:

```
# use std::sync::Arc;
# use vote_tally::builder::Builder;
# use vote_tally::store::MemoryLedger;
# use vote_tally::TallySettings;
# let ledger = Arc::new(MemoryLedger::new());
# let board = Builder::new(&TallySettings::DEFAULT_SETTINGS)
#     .categories(&["University Wide".to_string()])
#     .ledger(ledger.clone())
#     .build();
let feed = board.subscribe_ranking("University Wide")?;
// The current state arrives first, then one ranking per change.
let current = feed.recv().unwrap();
assert!(current.is_empty());
# Ok::<(), vote_tally::VoteError>(())
```

The rankings produced by the feed and by `ranking` are the same pure
projection: vote count descending, ties broken by identity key ascending,
so every client displays the same order no matter how the store delivered
the records.

To drive whole polls from a file, see the `campus_tally` command line
interface and the scenario format in the [manual](../manual/index.html).

*/
