use ferroscore_core::Ticker;
use serde_json::{json, Value};

use crate::cli::TickerArgs;
use crate::error::CliError;

pub fn run(args: &TickerArgs) -> Result<Value, CliError> {
    let results: Vec<Value> = args
        .symbols
        .iter()
        .map(|symbol| match Ticker::parse(symbol) {
            Ok(ticker) => json!({
                "input": symbol,
                "valid": true,
                "ticker": ticker.as_str(),
            }),
            Err(error) => json!({
                "input": symbol,
                "valid": false,
                "reason": error.to_string(),
            }),
        })
        .collect();

    let invalid = results
        .iter()
        .filter(|result| result["valid"] == false)
        .count();

    Ok(json!({
        "checked": results.len(),
        "invalid": invalid,
        "results": results,
    }))
}
