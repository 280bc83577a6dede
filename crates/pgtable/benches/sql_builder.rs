use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgtable::builder::{
    InsertBuilder, QueryOptions, SelectBuilder, SqlBuilder, UpdateBuilder, compile,
    compile_assignments,
};
use pgtable::{Criteria, Record, TableIdentity, Value};

/// `n` criteria alternating scalar comparisons and IN lists of three values.
fn criteria(n: usize) -> Criteria {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                (format!("col{i} >="), Value::Int(i as i64))
            } else {
                (format!("col{i}"), Value::from(vec![1_i64, 2, 3]))
            }
        })
        .collect()
}

fn row(n: usize) -> Record {
    (0..n).map(|i| (format!("col{i}"), Value::Int(i as i64))).collect()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/compile");

    for n in [1, 5, 10, 50, 100] {
        let criteria = criteria(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &criteria, |b, criteria| {
            b.iter(|| black_box(compile(criteria, 0)));
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/select");
    let table = TableIdentity::public("products").unwrap();
    let options = QueryOptions::new().limit(10).order_by("col0 desc").unwrap();

    for n in [1, 5, 10, 50, 100] {
        let criteria = criteria(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &criteria, |b, criteria| {
            b.iter(|| {
                let condition = compile(criteria, 0).unwrap();
                let builder = SelectBuilder::new(&table, condition, &options).unwrap();
                black_box(builder.to_sql())
            });
        });
    }

    group.finish();
}

fn bench_insert_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/insert_many");
    let table = TableIdentity::public("products").unwrap();

    for n in [1, 10, 100, 1000] {
        let rows: Vec<Record> = (0..n).map(|_| row(8)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| black_box(InsertBuilder::new(&table, rows).unwrap().to_sql()));
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/update");
    let table = TableIdentity::public("products").unwrap();

    for n in [1, 5, 10, 50] {
        let fields = row(n);
        let criteria = criteria(n);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(fields, criteria),
            |b, (fields, criteria)| {
                b.iter(|| {
                    let assignments = compile_assignments(fields, 0).unwrap();
                    let condition = compile(criteria, assignments.next_seed).unwrap();
                    let builder = UpdateBuilder::new(&table, assignments, condition).unwrap();
                    black_box(builder.to_sql())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile,
    bench_select,
    bench_insert_many,
    bench_update
);
criterion_main!(benches);
