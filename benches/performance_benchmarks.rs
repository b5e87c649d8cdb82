use chrono::{DateTime, Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal_macros::dec;
use fitlab::{activity, heatmap, muscles, nutrition, onboarding, recovery, store, tracker, models};

/// Performance benchmarks for the recovery and nutrition core
///
/// The heatmap is projected on every dashboard view and the tracker runs a
/// read-modify-write of the recovery document on every logged workout.

fn bench_heatmap_projection(c: &mut Criterion) {
    let now: DateTime<Utc> = "2024-03-11T12:00:00Z".parse().unwrap();
    let mut group = c.benchmark_group("Heatmap Projection");

    for &trained in &[0usize, 5, 17] {
        let mut recovery = recovery::MuscleRecovery::new();
        for (i, muscle) in muscles::MuscleId::ALL.iter().take(trained).enumerate() {
            recovery.insert(*muscle, now - Duration::hours(i as i64 * 7));
        }

        group.bench_with_input(
            BenchmarkId::new("all_recovery_colors", trained),
            &recovery,
            |b, recovery| {
                b.iter(|| {
                    black_box(heatmap::all_recovery_colors(recovery, &muscles::MuscleId::ALL, now));
                });
            },
        );
    }

    group.finish();
}

fn bench_exercise_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Exercise Lookup");

    for name in ["Bench Press", "chin-ups", "Unknown Exercise"] {
        group.bench_with_input(BenchmarkId::new("muscles_for_exercise", name), name, |b, name| {
            b.iter(|| black_box(muscles::muscles_for_exercise(name)));
        });
    }

    group.finish();
}

fn bench_onboarding(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let form = onboarding::OnboardingForm {
        sex: models::Sex::Female,
        dob: "1990-05-20".to_string(),
        height_cm: dec!(165),
        weight_kg: dec!(62.5),
        activity_level: models::ActivityLevel::VeryActive,
        goal: models::Goal::Cut,
    };

    c.bench_function("build_profile", |b| {
        b.iter(|| black_box(onboarding::build_profile(&form, today)));
    });
}

fn bench_macro_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Macro Estimate");

    for &entries in &[3usize, 30, 300] {
        let weights: Vec<_> = (0..entries).map(|i| dec!(150) + rust_decimal::Decimal::from(i)).collect();

        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(
            BenchmarkId::new("sum_estimated_macros", entries),
            &weights,
            |b, weights| {
                b.iter(|| black_box(nutrition::sum_estimated_macros(weights)));
            },
        );
    }

    group.finish();
}

fn bench_tracker_operations(c: &mut Criterion) {
    use tempfile::TempDir;

    let mut group = c.benchmark_group("Tracker Operations");
    let now: DateTime<Utc> = "2024-03-11T12:00:00Z".parse().unwrap();
    let date = now.date_naive();

    let workout = activity::NewActivityLog::new(
        date,
        activity::ActivityEntry::Strength(activity::StrengthPayload {
            exercise_id: "deadlift".to_string(),
            exercise_name: "Deadlift".to_string(),
            sets: vec![activity::StrengthSet { weight: dec!(140), reps: 5 }],
        }),
    );

    group.bench_function("create_log_memory", |b| {
        let tracker = tracker::Tracker::new(store::MemoryStore::new());
        b.iter(|| black_box(tracker.create_log("bench", workout.clone(), now)));
    });

    group.bench_function("create_log_sqlite", |b| {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker::Tracker::new(store::SqliteStore::open(temp_dir.path().join("bench.db")).unwrap());
        b.iter(|| black_box(tracker.create_log("bench", workout.clone(), now)));
    });

    for &count in &[10usize, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("logs_for_date_sqlite", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let temp_dir = TempDir::new().unwrap();
                    let tracker =
                        tracker::Tracker::new(store::SqliteStore::open(temp_dir.path().join("bench.db")).unwrap());
                    for i in 0..count {
                        let _ = tracker.create_log("bench", workout.clone(), now + Duration::seconds(i as i64));
                    }
                    (tracker, temp_dir)
                },
                |(tracker, _temp_dir)| {
                    let _ = black_box(tracker.logs_for_date("bench", date));
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_heatmap_projection,
    bench_exercise_lookup,
    bench_onboarding,
    bench_macro_estimate,
    bench_tracker_operations
);

criterion_main!(benches);
