//! CLI argument definitions for ferroscore.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `score` | Aggregate pillar scores from a JSON file, optionally saving a snapshot |
//! | `snapshots` | List, show, delete or fetch the latest snapshot |
//! | `ticker` | Check ticker symbols |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | resolved | Path to `ferroscore.toml` |
//! | `--snapshot-dir` | from config | Snapshot directory override |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-level` | `warn` | Log filter, `RUST_LOG` wins when set |
//! | `--log-format` | `pretty` | Log line encoding on stderr |
//!
//! # Examples
//!
//! ```bash
//! ferroscore score --input scores.json --save --date 2025-01-31
//! ferroscore snapshots list --pretty
//! ferroscore ticker AAPL BRK.B
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Multi-pillar equity scoring with point-in-time snapshots.
#[derive(Debug, Parser)]
#[command(
    name = "ferroscore",
    author,
    version,
    about = "Multi-pillar equity scoring with point-in-time snapshots"
)]
pub struct Cli {
    /// Configuration file; defaults to $FERROSCORE_HOME/ferroscore.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding snapshot files.
    #[arg(long, global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log level filter (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log line encoding.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate pillar scores into composites and recommendations.
    ///
    /// The input file holds a JSON array of
    /// `{"ticker", "pillar", "score", "factors"?}` objects.
    ///
    /// # Examples
    ///
    ///   ferroscore score --input scores.json
    ///   ferroscore score --input scores.json --save --date 2025-01-31
    Score(ScoreArgs),

    /// Snapshot management commands.
    Snapshots(SnapshotsArgs),

    /// Report whether each symbol is a well-formed ticker.
    ///
    /// # Examples
    ///
    ///   ferroscore ticker AAPL BRK.B TOOLONGSYMBOL
    Ticker(TickerArgs),
}

/// Arguments for the `score` command.
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// JSON file with the run's pillar scores.
    #[arg(long)]
    pub input: PathBuf,

    /// Snapshot date (YYYY-MM-DD); defaults to today in UTC.
    #[arg(long)]
    pub date: Option<String>,

    /// Persist the run as a snapshot.
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Spread missing pillars' weight over the present ones.
    #[arg(long, default_value_t = false)]
    pub renormalize: bool,
}

/// Arguments for the `snapshots` command group.
#[derive(Debug, Args)]
pub struct SnapshotsArgs {
    #[command(subcommand)]
    pub command: SnapshotsCommand,
}

/// Snapshot subcommands.
#[derive(Debug, Subcommand)]
pub enum SnapshotsCommand {
    /// List snapshot dates, oldest first.
    List,

    /// Print the snapshot saved for a date.
    Show(SnapshotDateArgs),

    /// Delete the snapshot saved for a date.
    Delete(SnapshotDateArgs),

    /// Print the most recent snapshot.
    Latest,
}

/// Date argument shared by `snapshots show` and `snapshots delete`.
#[derive(Debug, Args)]
pub struct SnapshotDateArgs {
    /// Snapshot date (YYYY-MM-DD).
    pub date: String,
}

/// Arguments for the `ticker` command.
#[derive(Debug, Args)]
pub struct TickerArgs {
    /// One or more symbols to check.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_score_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ferroscore",
            "score",
            "--input",
            "scores.json",
            "--save",
            "--date",
            "2025-01-31",
            "--pretty",
            "--snapshot-dir",
            "/tmp/snaps",
        ])
        .expect("parse");

        assert!(cli.pretty);
        assert_eq!(cli.snapshot_dir, Some(PathBuf::from("/tmp/snaps")));
        match cli.command {
            Command::Score(args) => {
                assert!(args.save);
                assert!(!args.renormalize);
                assert_eq!(args.date.as_deref(), Some("2025-01-31"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn ticker_requires_a_symbol() {
        assert!(Cli::try_parse_from(["ferroscore", "ticker"]).is_err());
    }

    #[test]
    fn parses_snapshot_subcommands() {
        let cli = Cli::try_parse_from(["ferroscore", "snapshots", "delete", "2025-01-01"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Snapshots(SnapshotsArgs {
                command: SnapshotsCommand::Delete(_)
            })
        ));
        assert_eq!(cli.log_format, LogFormatArg::Pretty);
        assert_eq!(cli.log_level, "warn");
    }
}
