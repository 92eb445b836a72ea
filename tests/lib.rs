// Shared fixtures for behavior tests
pub use ferroscore_core::{
    CompositeAggregator, CompositeScore, MetricSet, MissingPillarPolicy, Pillar, PillarScore,
    Recommendation, ScoringRun, Ticker, WeightSet,
};
pub use ferroscore_snapshot::{SnapshotRecord, SnapshotStore};

pub fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).expect("fixture ticker is valid")
}

/// Three full pillar scores for one ticker.
pub fn full_scores(symbol: &str, fundamental: f64, technical: f64, sentiment: f64) -> Vec<PillarScore> {
    let t = ticker(symbol);
    vec![
        PillarScore::new(t.clone(), Pillar::Fundamental, fundamental),
        PillarScore::new(t.clone(), Pillar::Technical, technical),
        PillarScore::new(t, Pillar::Sentiment, sentiment),
    ]
}

/// A five-ticker universe with distinct composites.
pub fn sample_universe() -> Vec<PillarScore> {
    [
        ("AAPL", 90.0, 80.0, 70.0),
        ("MSFT", 75.0, 70.0, 65.0),
        ("NVDA", 60.0, 95.0, 85.0),
        ("XOM", 40.0, 35.0, 30.0),
        ("F", 20.0, 25.0, 10.0),
    ]
    .into_iter()
    .flat_map(|(symbol, f, t, s)| full_scores(symbol, f, t, s))
    .collect()
}

pub fn sample_run() -> ScoringRun {
    CompositeAggregator::default()
        .aggregate(&sample_universe())
        .expect("sample universe aggregates")
}
