use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meter_ledger::core::engine::{aggregate, compute_derived};
use meter_ledger::domain::{Entry, PeriodKey, PeriodTable};
use meter_ledger::storage::{CsvStore, PeriodStore};
use tempfile::tempdir;

fn build_sample_table(rows: usize) -> PeriodTable {
    let entries = (0..rows)
        .map(|idx| {
            let previous = (idx % 1_000) as f64;
            Entry::new(format!("Entity {idx}"))
                .with_readings(previous, previous + 25.0 + (idx % 40) as f64)
                .with_rate(1.5 + (idx % 7) as f64 * 0.25)
                .with_payment((idx % 90) as f64)
        })
        .collect();
    PeriodTable::with_entries("Benchmark", entries)
}

fn bench_engine(c: &mut Criterion) {
    let table = build_sample_table(black_box(10_000));

    c.bench_function("compute_derived_10k", |b| {
        b.iter(|| compute_derived(black_box(&table.entries)))
    });

    let derived = compute_derived(&table.entries);
    c.bench_function("aggregate_10k", |b| b.iter(|| aggregate(black_box(&derived))));
}

fn bench_store_io(c: &mut Criterion) {
    let table = build_sample_table(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let store = CsvStore::open(dir.path()).expect("csv store");
    let key = PeriodKey::parse("Benchmark").expect("key");

    c.bench_function("period_save_10k", |b| {
        b.iter(|| store.save(&key, &table).expect("save period"))
    });

    store.save(&key, &table).expect("seed period");
    c.bench_function("period_load_10k", |b| {
        b.iter(|| store.load(&key).expect("load period"))
    });
}

criterion_group!(benches, bench_engine, bench_store_io);
criterion_main!(benches);
