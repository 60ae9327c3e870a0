use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use vote_tally::builder::Builder;
use vote_tally::guard::MemoryEligibilityStore;
use vote_tally::store::{LedgerStore, MemoryLedger};
use vote_tally::{category_key, CategoryConfig, TallyBoard, TallySettings, VoteError};

#[derive(Debug, Snafu)]
pub enum ScenarioError {
    #[snafu(display("Error opening scenario file {path}"))]
    OpeningScenario {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing scenario file"))]
    ParsingScenario { source: serde_json::Error },
    #[snafu(display("Error opening reference summary {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing reference summary"))]
    ParsingReference { source: serde_json::Error },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "pollName")]
    pub poll_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCategory {
    pub name: String,
    /// Defaults to true. List-selected categories use the looser name bound.
    #[serde(rename = "freeEntry")]
    pub free_entry: Option<bool>,
}

/// One vote submission as replayed by the driver. Distinct browser ids get
/// distinct eligibility storage; all browsers share the ledger.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSubmission {
    pub browser: String,
    pub category: String,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub categories: Vec<ScenarioCategory>,
    pub submissions: Vec<ScenarioSubmission>,
}

fn outcome_label(res: &Result<vote_tally::NomineeRecord, VoteError>) -> &'static str {
    match res {
        Ok(_) => "accepted",
        Err(VoteError::InvalidNomineeName) => "invalidNomineeName",
        Err(VoteError::AlreadyVoted) => "alreadyVoted",
        Err(VoteError::StoreUnavailable) => "storeUnavailable",
        Err(VoteError::CategoryNotResolved) => "categoryNotResolved",
    }
}

fn build_board(categories: &[CategoryConfig], ledger: &Arc<dyn LedgerStore>) -> TallyBoard {
    let mut builder = Builder::new(&TallySettings::DEFAULT_SETTINGS)
        .ledger(ledger.clone())
        .eligibility(Box::new(MemoryEligibilityStore::new()));
    for config in categories {
        builder = builder.category(config);
    }
    builder.build()
}

fn build_summary_js(
    config: &ScenarioConfig,
    categories: &[CategoryConfig],
    reader: &TallyBoard,
    outcomes: Vec<JSValue>,
) -> ScenarioResult<JSValue> {
    let mut results: JSMap<String, JSValue> = JSMap::new();
    for category in categories {
        let rows = match reader.ranking(&category.name) {
            Ok(rows) => rows,
            Err(e) => {
                whatever!("Failed to read the ranking of {:?}: {}", category.name, e)
            }
        };
        let rankings: Vec<JSValue> = rows
            .iter()
            .map(|r| json!({"rank": r.rank, "name": r.display_name, "votes": r.vote_count}))
            .collect();
        results.insert(
            category_key(&category.name),
            json!({ "displayName": category.name, "rankings": rankings }),
        );
    }
    Ok(json!({
        "config": { "poll": config.output_settings.poll_name },
        "results": results,
        "outcomes": outcomes,
    }))
}

pub fn run_scenario(
    config_path: &str,
    reference_path: Option<&str>,
    out_path: Option<&str>,
) -> ScenarioResult<()> {
    let config_str = fs::read_to_string(config_path).context(OpeningScenarioSnafu {
        path: config_path.to_string(),
    })?;
    let config: ScenarioConfig =
        serde_json::from_str(&config_str).context(ParsingScenarioSnafu {})?;
    info!("scenario: {:?}", config);

    if config.categories.is_empty() {
        whatever!("no categories declared in the scenario");
    }

    let categories: Vec<CategoryConfig> = config
        .categories
        .iter()
        .map(|c| CategoryConfig {
            name: c.name.clone(),
            free_entry: c.free_entry.unwrap_or(true),
        })
        .collect();

    let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedger::new());

    // One board per browser id; they all observe the same ledger.
    let mut boards: BTreeMap<String, TallyBoard> = BTreeMap::new();
    let mut outcomes: Vec<JSValue> = Vec::new();
    for sub in config.submissions.iter() {
        let board = boards
            .entry(sub.browser.clone())
            .or_insert_with(|| build_board(&categories, &ledger));
        let res = board.submit(&sub.category, &sub.name);
        debug!("submission {:?} -> {:?}", sub, res);
        outcomes.push(json!({
            "browser": sub.browser,
            "category": sub.category,
            "name": sub.name,
            "outcome": outcome_label(&res),
        }));
    }

    let reader = build_board(&categories, &ledger);
    let summary = build_summary_js(&config, &categories, &reader, outcomes)?;
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary).context(SerializingSummarySnafu {})?;

    match out_path {
        Some(path) if path != "stdout" => {
            fs::write(path, &pretty_js_summary).context(WritingSummarySnafu {
                path: path.to_string(),
            })?;
        }
        _ => {
            println!("summary:{}", pretty_js_summary);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(reference_p) = reference_path {
        let reference_str = fs::read_to_string(reference_p).context(OpeningReferenceSnafu {
            path: reference_p.to_string(),
        })?;
        let reference_js: JSValue =
            serde_json::from_str(&reference_str).context(ParsingReferenceSnafu {})?;
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference_js).context(SerializingSummarySnafu {})?;
        if pretty_js_reference != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between tabulated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_scenario;

    fn test_wrapper(test_name: &str) {
        let dir = format!("{}/scenarios/{}", env!("CARGO_MANIFEST_DIR"), test_name);
        let res = run_scenario(
            &format!("{}/{}_scenario.json", dir, test_name),
            Some(&format!("{}/{}_expected_summary.json", dir, test_name)),
            None,
        );
        if let Err(e) = res {
            panic!("scenario {} failed: {}", test_name, e);
        }
    }

    #[test]
    fn university_wide() {
        test_wrapper("university_wide");
    }

    #[test]
    fn repeat_votes() {
        test_wrapper("repeat_votes");
    }

    #[test]
    fn tie_break() {
        test_wrapper("tie_break");
    }

    #[test]
    fn missing_scenario_file_is_reported() {
        let res = run_scenario("/nonexistent/scenario.json", None, None);
        assert!(res.is_err());
    }
}
