//! Point-in-time snapshot store for scoring runs.
//!
//! One JSON file per calendar date, `snapshot_<YYYY-MM-DD>.json`, inside a
//! single directory. Writes go to a temp file in the same directory and are
//! renamed into place, so readers never see a partial record.

pub mod error;
pub mod models;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ferroscore_core::{format_iso_date, format_rfc3339, parse_iso_date, Config};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

pub use error::SnapshotError;
pub use models::{SnapshotEntry, SnapshotRecord, SnapshotSource};

const FILE_PREFIX: &str = "snapshot_";
const FILE_EXTENSION: &str = "json";
const TEMP_PREFIX: &str = ".snapshot_";

/// Date-keyed store of [`SnapshotRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.snapshot_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the snapshot for `date`, whether or not it exists.
    pub fn path_for(&self, date: Date) -> PathBuf {
        self.dir.join(format!(
            "{FILE_PREFIX}{}.{FILE_EXTENSION}",
            format_iso_date(date)
        ))
    }

    /// Builds the record that `save` would write, without touching disk.
    pub fn build_record(source: &impl SnapshotSource, date: Date) -> SnapshotRecord {
        let scores: Vec<SnapshotEntry> = source
            .composite_scores()
            .iter()
            .map(|composite| {
                let detail = source
                    .pillar_detail(&composite.ticker)
                    .cloned()
                    .unwrap_or_default();
                SnapshotEntry::new(composite, detail)
            })
            .collect();

        SnapshotRecord {
            snapshot_date: format_iso_date(date),
            universe_size: scores.len(),
            created_at: format_rfc3339(OffsetDateTime::now_utc()),
            weights: source.weights().clone(),
            scores,
        }
    }

    /// Persists `source` under `date`, replacing any snapshot already there.
    pub fn save(&self, source: &impl SnapshotSource, date: Date) -> Result<PathBuf, SnapshotError> {
        let record = Self::build_record(source, date);
        self.write_record(&record, date)
    }

    fn write_record(&self, record: &SnapshotRecord, date: Date) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.dir).map_err(|source| SnapshotError::io(&self.dir, source))?;

        let target = self.path_for(date);
        let body = serde_json::to_vec_pretty(record)?;

        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|source| SnapshotError::io(&self.dir, source))?;
        staged
            .write_all(&body)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|source| SnapshotError::io(staged.path(), source))?;
        staged
            .persist(&target)
            .map_err(|err| SnapshotError::io(&target, err.error))?;

        info!(
            snapshot_date = %record.snapshot_date,
            universe_size = record.universe_size,
            path = %target.display(),
            "snapshot saved"
        );
        Ok(target)
    }

    /// Loads the snapshot for `date`; `Ok(None)` when none was saved.
    pub fn load(&self, date: Date) -> Result<Option<SnapshotRecord>, SnapshotError> {
        let path = self.path_for(date);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(snapshot_date = %format_iso_date(date), "snapshot not found");
                return Ok(None);
            }
            Err(source) => return Err(SnapshotError::io(path, source)),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| SnapshotError::Corrupt { path, source })
    }

    /// Dates with a saved snapshot, oldest first.
    pub fn list_snapshots(&self) -> Result<Vec<Date>, SnapshotError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(SnapshotError::io(&self.dir, source)),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SnapshotError::io(&self.dir, source))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(date) = date_from_file_name(name) {
                dates.push(date);
            }
        }

        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    /// Removes the snapshot for `date`, reporting whether one existed.
    pub fn delete(&self, date: Date) -> Result<bool, SnapshotError> {
        let path = self.path_for(date);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(snapshot_date = %format_iso_date(date), "snapshot deleted");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SnapshotError::io(path, source)),
        }
    }

    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Result<Option<SnapshotRecord>, SnapshotError> {
        match self.list_snapshots()?.last() {
            Some(date) => self.load(*date),
            None => Ok(None),
        }
    }

    /// Snapshots dated within `[start, end]`, oldest first.
    ///
    /// A snapshot deleted between listing and loading is skipped.
    pub fn range(&self, start: Date, end: Date) -> Result<Vec<SnapshotRecord>, SnapshotError> {
        if start > end {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for date in self
            .list_snapshots()?
            .into_iter()
            .filter(|date| (start..=end).contains(date))
        {
            match self.load(date)? {
                Some(record) => records.push(record),
                None => warn!(snapshot_date = %format_iso_date(date), "snapshot vanished during range read"),
            }
        }
        Ok(records)
    }
}

fn date_from_file_name(name: &str) -> Option<Date> {
    let stem = name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_EXTENSION)?
        .strip_suffix('.')?;
    parse_iso_date(stem).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ferroscore_core::{
        CompositeAggregator, CompositeScore, Pillar, PillarBreakdown, PillarDetail, PillarScore,
        Recommendation, ScoringRun, Ticker, WeightSet,
    };
    use tempfile::TempDir;
    use time::macros::date;

    use super::*;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).expect("valid ticker")
    }

    fn sample_run() -> ScoringRun {
        let mut scores = Vec::new();
        for (symbol, fundamental, technical, sentiment) in [
            ("AAPL", 80.0, 70.0, 60.0),
            ("MSFT", 65.0, 55.0, 75.0),
            ("XOM", 30.0, 40.0, 20.0),
        ] {
            let t = ticker(symbol);
            scores.push(
                PillarScore::new(t.clone(), Pillar::Fundamental, fundamental)
                    .with_factors(BTreeMap::from([(String::from("roe"), fundamental)])),
            );
            scores.push(PillarScore::new(t.clone(), Pillar::Technical, technical));
            scores.push(PillarScore::new(t, Pillar::Sentiment, sentiment));
        }
        CompositeAggregator::default()
            .aggregate(&scores)
            .expect("aggregation should succeed")
    }

    /// Hand-built source, independent of the aggregator.
    struct FixedSource {
        scores: Vec<CompositeScore>,
        detail: BTreeMap<Ticker, PillarDetail>,
        weights: WeightSet,
    }

    impl SnapshotSource for FixedSource {
        fn composite_scores(&self) -> &[CompositeScore] {
            &self.scores
        }

        fn pillar_detail(&self, ticker: &Ticker) -> Option<&PillarDetail> {
            self.detail.get(ticker)
        }

        fn weights(&self) -> &WeightSet {
            &self.weights
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path().join("nested").join("snapshots"));
        let run = sample_run();

        let path = store.save(&run, date!(2025 - 01 - 15)).expect("save");
        assert!(path.ends_with("snapshot_2025-01-15.json"));

        let record = store
            .load(date!(2025 - 01 - 15))
            .expect("load")
            .expect("snapshot exists");
        assert_eq!(record.snapshot_date, "2025-01-15");
        assert_eq!(record.universe_size, run.composites.len());
        assert_eq!(record.weights, run.weights);
        for (entry, composite) in record.scores.iter().zip(&run.composites) {
            assert_eq!(&entry.to_composite(), composite);
        }
        let aapl = record.entry("AAPL").expect("AAPL present");
        assert_eq!(
            aapl.pillar_detail[&Pillar::Fundamental].factors.get("roe"),
            Some(&80.0)
        );
    }

    #[test]
    fn recommendation_is_stored_as_label() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        let run = sample_run();
        store.save(&run, date!(2025 - 02 - 01)).expect("save");

        let raw = fs::read_to_string(store.path_for(date!(2025 - 02 - 01))).expect("read");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
        let labels: Vec<&str> = json["scores"]
            .as_array()
            .expect("scores array")
            .iter()
            .filter_map(|entry| entry["recommendation"].as_str())
            .collect();
        assert_eq!(labels.len(), 3);
        assert!(labels
            .iter()
            .all(|label| label.parse::<Recommendation>().is_ok()));
    }

    #[test]
    fn saving_same_date_overwrites() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        let day = date!(2025 - 03 - 01);

        store.save(&sample_run(), day).expect("first save");
        let single = FixedSource {
            scores: vec![CompositeScore {
                ticker: ticker("IBM"),
                fundamental_score: Some(50.0),
                technical_score: None,
                sentiment_score: None,
                composite_score: 20.0,
                composite_percentile: 100.0,
                recommendation: Recommendation::StrongBuy,
            }],
            detail: BTreeMap::new(),
            weights: WeightSet::default(),
        };
        store.save(&single, day).expect("second save");

        let record = store.load(day).expect("load").expect("exists");
        assert_eq!(record.universe_size, 1);
        assert_eq!(record.scores[0].ticker.as_str(), "IBM");
        assert!(record.scores[0].pillar_detail.is_empty());
        assert_eq!(store.list_snapshots().expect("list"), vec![day]);
    }

    #[test]
    fn fixture_detail_is_carried_through() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        let ibm = ticker("IBM");
        let detail = PillarDetail::from([(
            Pillar::Technical,
            PillarBreakdown {
                score: 42.0,
                factors: BTreeMap::from([(String::from("rsi"), 42.0)]),
            },
        )]);
        let source = FixedSource {
            scores: vec![CompositeScore {
                ticker: ibm.clone(),
                fundamental_score: None,
                technical_score: Some(42.0),
                sentiment_score: None,
                composite_score: 14.7,
                composite_percentile: 100.0,
                recommendation: Recommendation::StrongBuy,
            }],
            detail: BTreeMap::from([(ibm, detail.clone())]),
            weights: WeightSet::default(),
        };

        store.save(&source, date!(2024 - 12 - 31)).expect("save");
        let record = store
            .load(date!(2024 - 12 - 31))
            .expect("load")
            .expect("exists");
        assert_eq!(record.scores[0].pillar_detail, detail);
    }

    #[test]
    fn load_missing_is_none() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path().join("absent"));
        assert_eq!(store.load(date!(2025 - 01 - 01)).expect("load"), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        fs::write(store.path_for(date!(2025 - 01 - 01)), "{not json").expect("write");

        let err = store.load(date!(2025 - 01 - 01)).expect_err("corrupt");
        assert!(matches!(err, SnapshotError::Corrupt { .. }));
    }

    #[test]
    fn list_is_empty_for_missing_directory() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path().join("never-created"));
        assert!(store.list_snapshots().expect("list").is_empty());
        assert_eq!(store.latest().expect("latest"), None);
    }

    #[test]
    fn list_is_sorted_and_ignores_foreign_files() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        let run = sample_run();
        for day in [
            date!(2025 - 03 - 01),
            date!(2025 - 01 - 01),
            date!(2025 - 02 - 01),
        ] {
            store.save(&run, day).expect("save");
        }
        fs::write(temp.path().join("notes.txt"), "x").expect("write");
        fs::write(temp.path().join("snapshot_garbage.json"), "{}").expect("write");
        fs::write(temp.path().join(".snapshot_abc.tmp"), "{").expect("write");

        assert_eq!(
            store.list_snapshots().expect("list"),
            vec![
                date!(2025 - 01 - 01),
                date!(2025 - 02 - 01),
                date!(2025 - 03 - 01)
            ]
        );
    }

    #[test]
    fn delete_reports_whether_snapshot_existed() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        let day = date!(2025 - 01 - 10);
        store.save(&sample_run(), day).expect("save");

        assert!(store.delete(day).expect("delete"));
        assert_eq!(store.load(day).expect("load"), None);
        assert!(!store.delete(day).expect("second delete"));
        assert!(!store.delete(date!(1999 - 01 - 01)).expect("never saved"));
    }

    #[test]
    fn latest_and_range_follow_chronology() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        let run = sample_run();
        for day in [
            date!(2025 - 01 - 01),
            date!(2025 - 02 - 01),
            date!(2025 - 03 - 01),
        ] {
            store.save(&run, day).expect("save");
        }

        let latest = store.latest().expect("latest").expect("exists");
        assert_eq!(latest.snapshot_date, "2025-03-01");

        let window: Vec<String> = store
            .range(date!(2025 - 01 - 15), date!(2025 - 03 - 01))
            .expect("range")
            .into_iter()
            .map(|record| record.snapshot_date)
            .collect();
        assert_eq!(window, vec!["2025-02-01", "2025-03-01"]);
        assert!(store
            .range(date!(2025 - 03 - 01), date!(2025 - 01 - 01))
            .expect("range")
            .is_empty());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let temp = TempDir::new().expect("tempdir");
        let store = SnapshotStore::new(temp.path());
        store.save(&sample_run(), date!(2025 - 01 - 01)).expect("save");

        let names: Vec<String> = fs::read_dir(temp.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![String::from("snapshot_2025-01-01.json")]);
    }

    #[test]
    fn file_names_parse_only_exact_pattern() {
        assert_eq!(
            date_from_file_name("snapshot_2025-01-01.json"),
            Some(date!(2025 - 01 - 01))
        );
        assert_eq!(date_from_file_name("snapshot_2025-01-01json"), None);
        assert_eq!(date_from_file_name("snapshot_2025-13-01.json"), None);
        assert_eq!(date_from_file_name("backup_2025-01-01.json"), None);
    }
}
