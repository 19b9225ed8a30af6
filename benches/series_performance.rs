use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::NaiveDate;
use laptrace::dataset::{Dataset, Session};
use laptrace::series::synthesize_track;
use laptrace::settings::SpacingMode;

fn create_sample_dataset(session_count: usize, rider_count: usize) -> Dataset {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let sessions = (0..session_count)
        .map(|i| {
            let results: BTreeMap<String, Option<f64>> = (0..rider_count)
                .map(|r| {
                    // Every third result is a gap
                    let time = if (i + r) % 3 == 0 {
                        None
                    } else {
                        Some(60.0 + (i as f64 * 0.1) + (r as f64 * 0.01))
                    };
                    (format!("Rider {}", r), time)
                })
                .collect();
            Session {
                track: "Alpha".to_string(),
                // Two sessions per day to exercise the date grouping
                date: start + chrono::Days::new((i / 2) as u64),
                session_name: None,
                results,
                ordinal: i,
            }
        })
        .collect();
    Dataset::from_sessions(sessions)
}

fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_synthesis");

    for (sessions, riders) in [(50, 10), (200, 25), (1000, 50)] {
        let dataset = create_sample_dataset(sessions, riders);
        let selected: BTreeSet<String> = dataset.riders.iter().cloned().collect();

        group.bench_function(format!("equal_{}x{}", sessions, riders), |b| {
            b.iter(|| {
                black_box(synthesize_track(
                    black_box(&dataset),
                    "Alpha",
                    SpacingMode::Equal,
                    &selected,
                ))
            });
        });

        group.bench_function(format!("real_{}x{}", sessions, riders), |b| {
            b.iter(|| {
                black_box(synthesize_track(
                    black_box(&dataset),
                    "Alpha",
                    SpacingMode::Real,
                    &selected,
                ))
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(50);
    targets = bench_synthesize
}

criterion_main!(benches);
