//! Benchmarks for condition building, joining and negation.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use trackql_query::{Args, Compare, Input, Select, and_, args, attr, or_};

// ============================================================================
// Comparison Benchmarks
// ============================================================================

fn bench_comparisons(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparisons");

    group.bench_function("equals_int", |b| {
        let version = attr("version");
        b.iter(|| black_box(version.equals(black_box(5))))
    });

    group.bench_function("equals_text_nested_path", |b| {
        let name = attr("parent.parent.name");
        b.iter(|| black_box(name.equals(black_box("Shot 010"))))
    });

    group.bench_function("contains_escaped", |b| {
        let name = attr("name");
        b.iter(|| black_box(name.contains(black_box("50% done"))))
    });

    group.bench_function("in_values", |b| {
        let id = attr("id");
        b.iter(|| black_box(id.in_(black_box(0..16))))
    });

    group.finish();
}

// ============================================================================
// Combinator Benchmarks
// ============================================================================

fn bench_combinators(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinators");

    group.bench_function("and_keywords", |b| {
        b.iter(|| black_box(and_!(name = "comp", version = 3, status = "approved")))
    });

    group.bench_function("or_mixed", |b| {
        b.iter(|| black_box(or_!(attr("version").gt(3), version = 1)))
    });

    for size in [4usize, 32, 256] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("or_generated", size), &size, |b, &size| {
            b.iter(|| {
                let terms = (0..size).map(|i| attr("id").equals(i));
                black_box(or_(Args::new().arg(Input::sequence(terms))))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Negation Benchmarks
// ============================================================================

fn bench_negation(c: &mut Criterion) {
    let mut group = c.benchmark_group("negation");

    let simple = attr("a").equals(1);
    let group_term = or_!(a = 1, b = 2).unwrap();
    let joined = and_!(or_!(a = 1, b = 2).unwrap(), or_!(c = 3, d = 4).unwrap()).unwrap();

    group.bench_function("simple", |b| b.iter(|| black_box(simple.negate())));
    group.bench_function("single_group", |b| b.iter(|| black_box(group_term.negate())));
    group.bench_function("joined_groups", |b| b.iter(|| black_box(joined.negate())));
    group.bench_function("double", |b| b.iter(|| black_box(joined.negate().negate())));

    group.finish();
}

// ============================================================================
// Statement Benchmarks
// ============================================================================

fn bench_statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("statements");

    let stmt = Select::new("Task")
        .populate(["name", "parent"])
        .where_(args![attr("parent.name").starts_with("Shot"), status = "wip"])
        .unwrap()
        .order_by(attr("id").desc())
        .limit(10);

    group.bench_function("render_select", |b| b.iter(|| black_box(stmt.to_string())));
    group.bench_function("render_raw_query", |b| b.iter(|| black_box(stmt.raw_query())));

    group.finish();
}

criterion_group!(
    benches,
    bench_comparisons,
    bench_combinators,
    bench_negation,
    bench_statements,
);

criterion_main!(benches);
