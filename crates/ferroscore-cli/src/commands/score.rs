use std::fs;

use ferroscore_core::{format_iso_date, CompositeAggregator, Config, MissingPillarPolicy, PillarScore};
use ferroscore_snapshot::SnapshotStore;
use serde_json::{json, Value};
use tracing::info;

use crate::cli::ScoreArgs;
use crate::error::CliError;

use super::resolve_date;

pub fn run(args: &ScoreArgs, config: &Config) -> Result<Value, CliError> {
    let raw = fs::read_to_string(&args.input)?;
    let scores: Vec<PillarScore> =
        serde_json::from_str(&raw).map_err(|source| CliError::Input {
            path: args.input.display().to_string(),
            source,
        })?;

    let mut aggregator = CompositeAggregator::from_config(config);
    if args.renormalize {
        aggregator = aggregator.with_missing_pillars(MissingPillarPolicy::Renormalize);
    }
    let run = aggregator.aggregate(&scores)?;
    let date = resolve_date(args.date.as_deref())?;

    let saved_to = if args.save {
        let path = SnapshotStore::from_config(config).save(&run, date)?;
        info!(path = %path.display(), "run persisted");
        Some(path.display().to_string())
    } else {
        None
    };

    Ok(json!({
        "snapshot_date": format_iso_date(date),
        "saved_to": saved_to,
        "run": serde_json::to_value(&run)?,
    }))
}
