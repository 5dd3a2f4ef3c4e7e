//! Benchmarks for the chronological store and journal files
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use healthlog::storage::{decode_journal, encode_journal};
use healthlog::{ChronologicalStore, CompressionType, Day, Journal, Record, TimeSlot};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn create_test_days(count: usize) -> Vec<Day> {
    (0..count)
        .map(|i| {
            let record = Record::builder()
                .glucose(80 + (i % 90) as i64)
                .meal("oatmeal", (i % 60) as i64)
                .mood("fine")
                .build()
                .unwrap();

            let mut day = Day::new(start_date() + Duration::days(i as i64));
            // Every fifth day stays empty so pruning has work to do
            if i % 5 != 0 {
                day.set_record(TimeSlot::Morning, Some(record.clone()));
                day.set_record(TimeSlot::Evening, Some(record));
            }
            day
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100, 1000, 5000] {
        let days = create_test_days(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("ascending", size), &days, |b, days| {
            b.iter(|| days.iter().cloned().collect::<ChronologicalStore>())
        });

        group.bench_with_input(BenchmarkId::new("descending", size), &days, |b, days| {
            b.iter(|| days.iter().rev().cloned().collect::<ChronologicalStore>())
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let store: ChronologicalStore = create_test_days(5000).into_iter().collect();
    let target = start_date() + Duration::days(2500);

    c.bench_function("find_middle_5000", |b| {
        b.iter(|| store.find(black_box(target)).is_some())
    });
}

fn bench_prune(c: &mut Criterion) {
    let store: ChronologicalStore = create_test_days(5000).into_iter().collect();

    c.bench_function("prune_empty_5000", |b| {
        b.iter_batched(
            || store.clone(),
            |mut s| s.prune_empty(),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_statistics(c: &mut Criterion) {
    let mut journal = Journal::new("bench");
    for day in create_test_days(5000) {
        journal.store_mut().insert(day);
    }

    let mut group = c.benchmark_group("statistics");
    for days_back in [6, 30, 365] {
        group.bench_with_input(
            BenchmarkId::new("summary", days_back),
            &days_back,
            |b, &days_back| b.iter(|| journal.statistics().summary(black_box(days_back))),
        );
    }
    group.finish();
}

fn bench_file_format(c: &mut Criterion) {
    let mut journal = Journal::new("bench");
    for day in create_test_days(1000) {
        journal.store_mut().insert(day);
    }

    let mut group = c.benchmark_group("file_format");
    for compression in [CompressionType::None, CompressionType::Lz4] {
        let name = format!("{:?}", compression).to_lowercase();

        group.bench_function(format!("encode_{}", name), |b| {
            b.iter(|| encode_journal(black_box(&journal), compression).unwrap())
        });

        let bytes = encode_journal(&journal, compression).unwrap();
        group.bench_function(format!("decode_{}", name), |b| {
            b.iter(|| decode_journal(black_box(&bytes)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_lookup,
    bench_prune,
    bench_statistics,
    bench_file_format
);
criterion_main!(benches);
