use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nexus_finance::analytics::{CorrelationService, Dashboard, MonthlyComparison, SankeyService};
use nexus_finance::core::services::{BudgetService, RecurringService};
use nexus_finance::domain::{
    FinanceData, Investment, InvestmentKind, RecurrenceKind, RecurringTransaction, Transaction,
    TransactionKind,
};
use nexus_finance::storage::{JsonStorage, StorageBackend};
use tempfile::tempdir;

const EXPENSE_CATEGORIES: [&str; 4] = ["Food", "Transport", "Rent", "Entertainment"];

fn build_sample_data(txn_count: usize) -> FinanceData {
    let mut data = FinanceData::seeded();
    let start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    for idx in 0..txn_count {
        let date = start_date + Duration::days((idx % 365) as i64);
        let txn = if idx % 5 == 0 {
            Transaction::income("Invoice", 900.0 + (idx % 50) as f64, "Salary", date)
        } else {
            let category = EXPENSE_CATEGORIES[idx % EXPENSE_CATEGORIES.len()];
            Transaction::expense("Purchase", 20.0 + (idx % 100) as f64, category, date)
        };
        data.transactions.push(txn);
    }
    for (idx, kind) in [InvestmentKind::Stock, InvestmentKind::Crypto, InvestmentKind::Bond]
        .into_iter()
        .enumerate()
    {
        data.investments.push(Investment::new(
            format!("Asset {idx}"),
            kind,
            1000.0,
            1100.0,
            start_date,
        ));
    }
    BudgetService::add(&mut data, "Food", 500.0, "RUB", start_date).expect("budget");
    data
}

fn bench_storage_io(c: &mut Criterion) {
    let data = build_sample_data(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonStorage::new(Some(dir.path().to_path_buf()), Some(2)).expect("json storage");

    c.bench_function("data_save_10k", |b| {
        b.iter(|| {
            storage.save(&data).expect("save data");
        })
    });

    storage.save(&data).expect("seed");

    c.bench_function("data_load_10k", |b| {
        b.iter(|| {
            let loaded = storage.load().expect("load data");
            black_box(loaded);
        })
    });
}

fn bench_analytics(c: &mut Criterion) {
    let data = build_sample_data(black_box(10_000));
    let reference = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    c.bench_function("dashboard_30d", |b| {
        b.iter(|| black_box(Dashboard::build(&data, reference)))
    });

    c.bench_function("monthly_comparison", |b| {
        b.iter(|| black_box(MonthlyComparison::build(&data.transactions, reference)))
    });

    c.bench_function("sankey_full_history", |b| {
        b.iter(|| black_box(SankeyService::generate(&data.transactions, 600.0)))
    });

    c.bench_function("budget_progress", |b| {
        b.iter(|| black_box(BudgetService::progress(&data)))
    });

    c.bench_function("correlation_report", |b| {
        b.iter(|| black_box(CorrelationService::report(&data, 90)))
    });
}

fn bench_recurring(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    c.bench_function("recurring_daily_five_years", |b| {
        b.iter_batched(
            || {
                let mut data = FinanceData::seeded();
                let series = RecurringTransaction::new(
                    "Coffee",
                    3.5,
                    TransactionKind::Expense,
                    "Food",
                    RecurrenceKind::Daily,
                    start,
                );
                RecurringService::add(&mut data, series).expect("series");
                data
            },
            |mut data| black_box(RecurringService::apply_due(&mut data, today)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_storage_io, bench_analytics, bench_recurring);
criterion_main!(benches);
