//! Aggregation, join, correlation and ranking benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tidyshape::{
    aggregate, correlation_matrix, left_join, AggSpec, Column, CorrelationMethod, JoinOptions,
    JoinSpec, RankIndex, Reduction, SortOrder, Table,
};

/// Long measurement table: `genes` genes with `points` measurements each.
fn long_table(genes: usize, points: usize) -> Table {
    let rows = genes * points;
    Table::new(vec![
        Column::text("gene", (0..rows).map(|r| Some(format!("Y{:05}", r / points)))),
        Column::integer("time", (0..rows).map(|r| Some((r % points) as i64 * 10))),
        Column::real(
            "level",
            (0..rows).map(|r| (r % 11 != 0).then(|| ((r * 37) % 101) as f64 / 50.0 - 1.0)),
        ),
    ])
    .unwrap()
}

fn bench_grouped_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let spec = AggSpec::new(["gene"])
        .output("mean", "level", Reduction::Mean)
        .output("sd", "level", Reduction::StdDev)
        .output("median", "level", Reduction::Median)
        .output("peak", "level", Reduction::ArgMax);

    for genes in [100, 1_000, 5_000].iter() {
        let table = long_table(*genes, 18);
        group.throughput(Throughput::Elements(table.row_count() as u64));
        group.bench_with_input(BenchmarkId::new("genes", genes), &table, |b, table| {
            b.iter(|| black_box(aggregate(table, &spec).unwrap()))
        });
    }

    group.finish();
}

fn bench_left_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("left_join");

    for genes in [100, 1_000, 5_000].iter() {
        let left = long_table(*genes, 18);
        // Metadata for every other gene.
        let right = Table::new(vec![
            Column::text("gene", (0..*genes).step_by(2).map(|g| Some(format!("Y{:05}", g)))),
            Column::integer("chromosome", (0..*genes).step_by(2).map(|g| Some((g % 16) as i64 + 1))),
        ])
        .unwrap();
        group.throughput(Throughput::Elements(left.row_count() as u64));
        group.bench_with_input(BenchmarkId::new("genes", genes), &(left, right), |b, (l, r)| {
            b.iter(|| black_box(left_join(l, r, &JoinSpec::on("gene"), &JoinOptions::default()).unwrap()))
        });
    }

    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");
    let rows = 2_000;

    for cols in [5, 20, 50].iter() {
        let columns: Vec<Column> = (0..*cols)
            .map(|col| {
                Column::real(
                    format!("c{}", col),
                    (0..rows).map(move |r| ((r + col) % 13 != 0).then(|| ((r * (col + 3)) % 97) as f64)),
                )
            })
            .collect();
        let names: Vec<String> = columns.iter().map(|column| column.name().to_string()).collect();
        let table = Table::new(columns).unwrap();

        for method in [CorrelationMethod::Pearson, CorrelationMethod::Spearman] {
            let id = BenchmarkId::new(format!("{:?}", method).to_lowercase(), cols);
            group.bench_with_input(id, &table, |b, table| {
                b.iter(|| black_box(correlation_matrix(table, &names, method).unwrap()))
            });
        }
    }

    group.finish();
}

fn bench_rank_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_apply");

    for genes in [100, 1_000, 5_000].iter() {
        let entities = Table::new(vec![
            Column::text("gene", (0..*genes).map(|g| Some(format!("Y{:05}", g)))),
            Column::real("peak", (0..*genes).map(|g| Some(((g * 7919) % 1000) as f64))),
        ])
        .unwrap();
        let long = long_table(*genes, 18);
        let index = RankIndex::build(&entities, "gene", "peak", SortOrder::Descending).unwrap();
        group.throughput(Throughput::Elements(long.row_count() as u64));
        group.bench_with_input(BenchmarkId::new("genes", genes), &long, |b, long| {
            b.iter(|| black_box(index.apply(long, "gene").unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_grouped_reductions,
    bench_left_join,
    bench_correlation,
    bench_rank_apply,
);
criterion_main!(benches);
