// In-memory index over the results dataset

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

mod loader;

pub use loader::{load_dataset, parse_dataset};

/// One timed event at one track on one date. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub track: String,
    pub date: NaiveDate,
    /// Display name for the session. `None` when the record omitted it or
    /// carried an empty string; labels then fall back to `Session <n>`
    /// within the date group.
    pub session_name: Option<String>,
    /// Rider name to best lap time in seconds. `None` marks a rider listed
    /// in the record without a time, rendered as a gap.
    pub results: BTreeMap<String, Option<f64>>,
    /// Original position in the source document, used as a stable tie-break
    /// for sessions sharing a date.
    pub ordinal: usize,
}

/// The loaded dataset plus its derived track and rider indexes.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub sessions: Vec<Session>,
    /// Distinct track names, sorted lexicographically.
    pub tracks: Vec<String>,
    /// Distinct rider names across all session results, sorted lexicographically.
    pub riders: Vec<String>,
}

impl Dataset {
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        let mut tracks = BTreeSet::new();
        let mut riders = BTreeSet::new();
        for session in &sessions {
            tracks.insert(session.track.clone());
            for rider in session.results.keys() {
                riders.insert(rider.clone());
            }
        }

        Self {
            sessions,
            tracks: tracks.into_iter().collect(),
            riders: riders.into_iter().collect(),
        }
    }

    /// Sessions for one track, sorted by `(date, ordinal)`. The ordinal
    /// keeps the sort total when two sessions share a date.
    pub fn sessions_for_track(&self, track: &str) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self
            .sessions
            .iter()
            .filter(|s| s.track == track)
            .collect();
        sessions.sort_by(|a, b| a.date.cmp(&b.date).then(a.ordinal.cmp(&b.ordinal)));
        sessions
    }
}
