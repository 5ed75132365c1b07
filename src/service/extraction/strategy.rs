//! Drop-order strategy parsing
//!
//! The model is asked for a JSON array of `[troopType, nbSides, waveNumber, maxWaveNumber,
//! slotsPerEdge]` rows. Rows are passed through as JSON values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

static ARRAY_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyParseError {
    #[error("Failed to parse AI response as JSON")]
    InvalidJson,
    #[error("No valid JSON found in AI response")]
    NoJson,
}

fn as_rows(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(rows) => Some(rows),
        _ => None,
    }
}

/// Parse the whole text as an array, else the outermost `[...]` span
pub fn parse_strategy(text: &str) -> Result<Vec<Value>, StrategyParseError> {
    if let Some(rows) = serde_json::from_str(text.trim()).ok().and_then(as_rows) {
        return Ok(rows);
    }

    let span = ARRAY_SPAN
        .find(text)
        .ok_or(StrategyParseError::NoJson)?;

    serde_json::from_str(span.as_str())
        .ok()
        .and_then(as_rows)
        .ok_or(StrategyParseError::InvalidJson)
}

/// Fixed strategy returned by the test endpoint
pub fn mock_strategy() -> Vec<Value> {
    vec![
        json!(["$eGiant", 2, 1, 1, 4]),
        json!(["$eWall", 2, 1, 1, 1]),
        json!(["$eBarb", 2, 1, 1, 0]),
        json!(["$eArch", 2, 1, 1, 0]),
        json!(["CC", 1, 1, 1, 1]),
        json!(["HEROES", 1, 2, 1, 1]),
    ]
}
