use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use super::{Dataset, Session};
use crate::LaptraceError;

#[derive(Deserialize)]
struct RawDocument {
    sessions: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawSession {
    track: String,
    date: String,
    #[serde(default)]
    session_name: Option<String>,
    results: BTreeMap<String, Option<f64>>,
}

/// Load the results dataset from a `data.json` document.
///
/// The load is strict: a record missing `track` or `results`, or carrying a
/// date that is not an ISO calendar date, fails the entire load. The caller
/// is expected to surface a load-failed state rather than render a partial
/// dataset.
pub fn load_dataset(path: &Path) -> Result<Dataset, LaptraceError> {
    let content = fs::read_to_string(path).map_err(|e| LaptraceError::DatasetIo { source: e })?;
    let dataset = parse_dataset(&content)?;
    info!(
        "Loaded {:?}, found {} sessions across {} tracks and {} riders",
        path,
        dataset.sessions.len(),
        dataset.tracks.len(),
        dataset.riders.len()
    );
    Ok(dataset)
}

/// Parse a dataset document from its JSON text.
pub fn parse_dataset(content: &str) -> Result<Dataset, LaptraceError> {
    let document: RawDocument =
        serde_json::from_str(content).map_err(|e| LaptraceError::DatasetParse { source: e })?;

    let mut sessions = Vec::with_capacity(document.sessions.len());
    for (index, value) in document.sessions.into_iter().enumerate() {
        // Records are deserialized one by one so the error can name the
        // offending index.
        let raw: RawSession =
            serde_json::from_value(value).map_err(|e| LaptraceError::MalformedRecord {
                index,
                reason: e.to_string(),
            })?;

        let date = raw
            .date
            .parse()
            .map_err(|_| LaptraceError::InvalidDate {
                index,
                value: raw.date.clone(),
            })?;

        sessions.push(Session {
            track: raw.track,
            date,
            session_name: raw.session_name.filter(|n| !n.is_empty()),
            results: raw.results,
            ordinal: index,
        });
    }

    Ok(Dataset::from_sessions(sessions))
}
