/*!

This is the long-form manual for `vote_tally` and `campus_tally`.

## Scenario format

The `campus_tally` binary replays a poll described in a JSON scenario file:

```text
{
  "outputSettings": { "pollName": "CampusVote demo" },
  "categories": [
    { "name": "University Wide" },
    { "name": "MIS", "freeEntry": false }
  ],
  "submissions": [
    { "browser": "b1", "category": "University Wide", "name": "Amy" },
    { "browser": "b2", "category": "University Wide", "name": "amy" }
  ]
}
```

- `outputSettings.pollName` (string): echoed into the summary.
- `categories` (array): the registered voting pools. `freeEntry` defaults
  to `true`; set it to `false` for list-selected categories, which use the
  looser name length bound.
- `submissions` (array, ordered): replayed one by one. Each distinct
  `browser` id gets its own eligibility storage; all browsers share one
  ledger, so votes from different browsers accumulate on the same records.

## Summary format

The produced summary contains the poll configuration echo, the final
ranking of every declared category, and one outcome entry per submission:

```text
{
  "config": { "poll": "CampusVote demo" },
  "results": {
    "university_wide": {
      "displayName": "University Wide",
      "rankings": [ { "rank": 1, "name": "Amy", "votes": 2 } ]
    }
  },
  "outcomes": [
    { "browser": "b1", "category": "University Wide", "name": "Amy",
      "outcome": "accepted" }
  ]
}
```

Outcome labels: `accepted`, `invalidNomineeName`, `alreadyVoted`,
`storeUnavailable`, `categoryNotResolved`. Every submission produces
exactly one outcome; nothing is silently swallowed.

With `--reference <file>`, `campus_tally` compares the summary against the
given file and reports a line diff on mismatch. With `--out <file>` the
summary is written to the file instead of the standard output.

## What the guard does and does not prevent

The eligibility gate is browser-local. It stops repeat submissions from the
same browser in the same category, with a 365-day retention, and nothing
more: another browser, another device, or cleared storage yields a fresh
vote. This is an accepted limitation of the system, not something the
ledger tries to enforce.

*/
