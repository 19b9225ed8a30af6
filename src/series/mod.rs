// Time-series synthesis: flat session records to plottable per-rider series

use std::collections::BTreeSet;

use chrono::NaiveTime;
use itertools::Itertools;

use crate::dataset::Dataset;
use crate::settings::SpacingMode;

pub mod style;

pub use style::{SeriesStyle, resolve_style, rider_hue};

pub const MS_PER_DAY: f64 = 24. * 60. * 60. * 1000.;

/// Where a session sits on the x-axis: its ordinal label under equal
/// spacing, or a millisecond UTC timestamp under real spacing.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPosition {
    Label(String),
    Timestamp(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub position: SessionPosition,
    /// `None` is a gap: the rider has no result for that session. The
    /// renderer connects the line across gaps rather than breaking it.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiderSeries {
    pub rider: String,
    /// One point per session of the track, so every rider series shares the
    /// same x-axis.
    pub points: Vec<TimeSeriesPoint>,
    pub best_time: Option<f64>,
    pub is_highlighted: bool,
}

/// The synthesized series set for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSeries {
    pub track: String,
    pub spacing: SpacingMode,
    /// Display position of every session on the track, in `(date, ordinal)`
    /// order.
    pub positions: Vec<SessionPosition>,
    /// One series per rider with at least one numeric result on the track,
    /// sorted by rider name.
    pub riders: Vec<RiderSeries>,
}

/// Build the ordered position axis and one series per rider for a track.
///
/// Sessions are sorted by `(date, ordinal)` and grouped by date; within a
/// date group of size `n`, session `k` gets the label fallback
/// `Session <k+1>` and, under real spacing, the timestamp
/// `midnight_utc + k * (24h / n)` so same-day sessions do not collide on a
/// time axis. Riders with no numeric result on the track are excluded.
pub fn synthesize_track(
    dataset: &Dataset,
    track: &str,
    spacing: SpacingMode,
    selected_riders: &BTreeSet<String>,
) -> TrackSeries {
    let sessions = dataset.sessions_for_track(track);

    let mut positions = Vec::with_capacity(sessions.len());
    for (_, group) in &sessions.iter().chunk_by(|s| s.date) {
        let day_sessions: Vec<_> = group.collect();
        let n = day_sessions.len();
        for (k, session) in day_sessions.iter().enumerate() {
            match spacing {
                SpacingMode::Equal => {
                    let name = session
                        .session_name
                        .clone()
                        .unwrap_or_else(|| format!("Session {}", k + 1));
                    positions.push(SessionPosition::Label(format!("{} {}", session.date, name)));
                }
                SpacingMode::Real => {
                    let midnight_ms = session
                        .date
                        .and_time(NaiveTime::MIN)
                        .and_utc()
                        .timestamp_millis() as f64;
                    positions.push(SessionPosition::Timestamp(
                        midnight_ms + k as f64 * (MS_PER_DAY / n as f64),
                    ));
                }
            }
        }
    }

    let track_riders: BTreeSet<&String> = sessions
        .iter()
        .flat_map(|s| s.results.keys())
        .collect();

    let riders = track_riders
        .into_iter()
        .filter_map(|rider| {
            let points: Vec<TimeSeriesPoint> = sessions
                .iter()
                .zip(positions.iter())
                .map(|(session, position)| TimeSeriesPoint {
                    position: position.clone(),
                    value: session.results.get(rider).copied().flatten(),
                })
                .collect();

            let best_time = points
                .iter()
                .filter_map(|p| p.value)
                .fold(None, |best: Option<f64>, v| {
                    Some(best.map_or(v, |b| b.min(v)))
                });

            // A rider with only absent values is not rendered at all
            best_time.map(|_| RiderSeries {
                rider: rider.clone(),
                points,
                best_time,
                is_highlighted: selected_riders.contains(rider),
            })
        })
        .collect();

    TrackSeries {
        track: track.to_string(),
        spacing,
        positions,
        riders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Session;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn session(
        track: &str,
        date: &str,
        name: Option<&str>,
        ordinal: usize,
        results: &[(&str, Option<f64>)],
    ) -> Session {
        Session {
            track: track.to_string(),
            date: date.parse().unwrap(),
            session_name: name.map(str::to_string),
            results: results
                .iter()
                .map(|(r, t)| (r.to_string(), *t))
                .collect(),
            ordinal,
        }
    }

    fn selected(riders: &[&str]) -> BTreeSet<String> {
        riders.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_two_session_example() {
        let dataset = Dataset::from_sessions(vec![
            session("Alpha", "2024-01-01", None, 0, &[("A", Some(61.234))]),
            session(
                "Alpha",
                "2024-01-02",
                None,
                1,
                &[("A", Some(60.900)), ("B", Some(62.000))],
            ),
        ]);

        let series = synthesize_track(
            &dataset,
            "Alpha",
            SpacingMode::Equal,
            &selected(&["A", "B"]),
        );

        assert_eq!(
            series.positions,
            vec![
                SessionPosition::Label("2024-01-01 Session 1".to_string()),
                SessionPosition::Label("2024-01-02 Session 1".to_string()),
            ]
        );

        assert_eq!(series.riders.len(), 2);
        let a = &series.riders[0];
        assert_eq!(a.rider, "A");
        assert_eq!(
            a.points.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![Some(61.234), Some(60.900)]
        );
        assert_eq!(a.best_time, Some(60.900));
        assert!(a.is_highlighted);

        let b = &series.riders[1];
        assert_eq!(b.rider, "B");
        assert_eq!(
            b.points.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![None, Some(62.000)]
        );
        assert_eq!(b.best_time, Some(62.000));
    }

    #[test]
    fn test_explicit_session_names_used_in_labels() {
        let dataset = Dataset::from_sessions(vec![
            session("Alpha", "2024-01-01", Some("Qualifying"), 0, &[("A", Some(61.0))]),
            session("Alpha", "2024-01-01", None, 1, &[("A", Some(60.0))]),
        ]);

        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Equal, &selected(&["A"]));
        assert_eq!(
            series.positions,
            vec![
                SessionPosition::Label("2024-01-01 Qualifying".to_string()),
                SessionPosition::Label("2024-01-01 Session 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_session_day_sits_at_midnight() {
        let dataset = Dataset::from_sessions(vec![session(
            "Alpha",
            "2024-01-01",
            None,
            0,
            &[("A", Some(61.0))],
        )]);

        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Real, &selected(&["A"]));
        let midnight_ms = 1_704_067_200_000.; // 2024-01-01T00:00:00Z
        assert_eq!(series.positions, vec![SessionPosition::Timestamp(midnight_ms)]);
    }

    #[test]
    fn test_same_day_sessions_spread_across_the_day() {
        let dataset = Dataset::from_sessions(vec![
            session("Alpha", "2024-01-01", None, 0, &[("A", Some(61.0))]),
            session("Alpha", "2024-01-01", None, 1, &[("A", Some(60.5))]),
            session("Alpha", "2024-01-01", None, 2, &[("A", Some(60.0))]),
        ]);

        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Real, &selected(&["A"]));
        let timestamps: Vec<f64> = series
            .positions
            .iter()
            .map(|p| match p {
                SessionPosition::Timestamp(t) => *t,
                SessionPosition::Label(l) => panic!("Expected timestamp, got label {}", l),
            })
            .collect();

        let midnight_ms = 1_704_067_200_000.;
        assert_eq!(timestamps[0], midnight_ms);
        assert_eq!(timestamps[1], midnight_ms + MS_PER_DAY / 3.);
        assert_eq!(timestamps[2], midnight_ms + 2. * MS_PER_DAY / 3.);
    }

    #[test]
    fn test_rider_with_only_absent_values_excluded() {
        let dataset = Dataset::from_sessions(vec![session(
            "Alpha",
            "2024-01-01",
            None,
            0,
            &[("A", Some(61.0)), ("Ghost", None)],
        )]);

        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Equal, &selected(&["Ghost"]));
        assert_eq!(series.riders.len(), 1);
        assert_eq!(series.riders[0].rider, "A");
    }

    #[test]
    fn test_unselected_rider_still_synthesized_but_not_highlighted() {
        let dataset = Dataset::from_sessions(vec![session(
            "Alpha",
            "2024-01-01",
            None,
            0,
            &[("A", Some(61.0)), ("B", Some(62.0))],
        )]);

        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Equal, &selected(&["A"]));
        assert_eq!(series.riders.len(), 2);
        assert!(series.riders[0].is_highlighted);
        assert!(!series.riders[1].is_highlighted);
    }

    #[test]
    fn test_track_with_no_sessions_is_empty() {
        let dataset = Dataset::from_sessions(vec![]);
        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Equal, &selected(&[]));
        assert!(series.positions.is_empty());
        assert!(series.riders.is_empty());
    }

    #[test]
    fn test_axis_identical_across_riders() {
        let dataset = Dataset::from_sessions(vec![
            session("Alpha", "2024-01-01", None, 0, &[("A", Some(61.0))]),
            session("Alpha", "2024-01-02", None, 1, &[("B", Some(62.0))]),
        ]);

        let series = synthesize_track(
            &dataset,
            "Alpha",
            SpacingMode::Equal,
            &selected(&["A", "B"]),
        );
        for rider in &series.riders {
            let rider_positions: Vec<_> =
                rider.points.iter().map(|p| p.position.clone()).collect();
            assert_eq!(rider_positions, series.positions);
        }
    }

    #[test]
    fn test_other_tracks_do_not_leak_into_series() {
        let dataset = Dataset::from_sessions(vec![
            session("Alpha", "2024-01-01", None, 0, &[("A", Some(61.0))]),
            session("Bravo", "2024-01-01", None, 1, &[("A", Some(50.0))]),
        ]);

        let series = synthesize_track(&dataset, "Alpha", SpacingMode::Equal, &selected(&["A"]));
        assert_eq!(series.positions.len(), 1);
        assert_eq!(series.riders[0].best_time, Some(61.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_same_day_timestamps_increase_and_span_the_day(n in 1usize..12) {
            let sessions = (0..n)
                .map(|i| session("Alpha", "2024-06-15", None, i, &[("A", Some(60.0))]))
                .collect();
            let dataset = Dataset::from_sessions(sessions);
            let series =
                synthesize_track(&dataset, "Alpha", SpacingMode::Real, &selected(&["A"]));

            let midnight_ms = chrono::NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_time(NaiveTime::MIN)
                .and_utc()
                .timestamp_millis() as f64;

            let mut prev = f64::NEG_INFINITY;
            for position in &series.positions {
                let SessionPosition::Timestamp(t) = position else {
                    panic!("Expected timestamp position");
                };
                prop_assert!(*t > prev);
                prop_assert!(*t >= midnight_ms);
                prop_assert!(*t < midnight_ms + MS_PER_DAY);
                prev = *t;
            }
        }

        #[test]
        fn prop_best_time_is_minimum_of_numeric_values(times in proptest::collection::vec(proptest::option::of(30.0f64..120.0), 1..10)) {
            let sessions = times
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    session(
                        "Alpha",
                        &format!("2024-01-{:02}", i + 1),
                        None,
                        i,
                        &[("A", *t)],
                    )
                })
                .collect();
            let dataset = Dataset::from_sessions(sessions);
            let series =
                synthesize_track(&dataset, "Alpha", SpacingMode::Equal, &selected(&["A"]));

            let expected = times.iter().flatten().cloned().fold(f64::INFINITY, f64::min);
            if expected.is_finite() {
                prop_assert_eq!(series.riders[0].best_time, Some(expected));
            } else {
                // No numeric values at all: the rider is excluded
                prop_assert!(series.riders.is_empty());
            }
        }
    }
}
