use ferroscore_core::{format_iso_date, parse_iso_date, Config};
use ferroscore_snapshot::SnapshotStore;
use serde_json::{json, Value};

use crate::cli::{SnapshotsArgs, SnapshotsCommand};
use crate::error::CliError;

pub fn run(args: &SnapshotsArgs, config: &Config) -> Result<Value, CliError> {
    let store = SnapshotStore::from_config(config);

    match &args.command {
        SnapshotsCommand::List => {
            let dates: Vec<String> = store
                .list_snapshots()?
                .into_iter()
                .map(format_iso_date)
                .collect();
            Ok(json!({
                "snapshot_dir": store.dir().display().to_string(),
                "count": dates.len(),
                "snapshots": dates,
            }))
        }
        SnapshotsCommand::Show(date_args) => {
            let date = parse_iso_date(&date_args.date)?;
            let record = store.load(date)?.ok_or_else(|| {
                CliError::NotFound(format!("no snapshot for {}", format_iso_date(date)))
            })?;
            Ok(serde_json::to_value(record)?)
        }
        SnapshotsCommand::Delete(date_args) => {
            let date = parse_iso_date(&date_args.date)?;
            let deleted = store.delete(date)?;
            Ok(json!({
                "snapshot_date": format_iso_date(date),
                "deleted": deleted,
            }))
        }
        SnapshotsCommand::Latest => {
            let record = store
                .latest()?
                .ok_or_else(|| CliError::NotFound(String::from("no snapshots saved yet")))?;
            Ok(serde_json::to_value(record)?)
        }
    }
}
