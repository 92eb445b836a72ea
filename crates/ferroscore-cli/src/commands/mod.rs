mod score;
mod snapshots;
mod ticker;

use ferroscore_core::{parse_iso_date, Config};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub fn run(cli: &Cli) -> Result<Value, CliError> {
    match &cli.command {
        Command::Score(args) => score::run(args, &load_config(cli)?),
        Command::Snapshots(args) => snapshots::run(args, &load_config(cli)?),
        Command::Ticker(args) => ticker::run(args),
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.snapshot_dir {
        config.snapshot_dir = dir.clone();
    }
    Ok(config)
}

fn resolve_date(raw: Option<&str>) -> Result<Date, CliError> {
    match raw {
        Some(raw) => Ok(parse_iso_date(raw)?),
        None => Ok(OffsetDateTime::now_utc().date()),
    }
}
