//! Benchmarks for filter construction, compilation, parsing and ordering.

use std::hint::black_box;

use bson::{Bson, Document, doc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quarry::ordering::less_than;
use quarry::{CanonicalBytes, Filter, field};

/// Create an AND filter with `count` equality conditions.
fn create_and_filter(count: usize) -> Filter {
    Filter::all_of((0..count).map(|i| field(format!("field_{}", i)).eq(i as i64)))
}

/// Create a deeply nested filter.
fn create_nested_filter(depth: usize) -> Filter {
    if depth == 0 {
        field("leaf").eq(true)
    } else {
        (create_nested_filter(depth - 1) | field("check").eq(depth as i64))
            & !field("deleted").eq(true)
    }
}

/// Benchmark filter creation through the combinators.
fn bench_filter_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_creation");

    group.bench_function("equals", |b| b.iter(|| black_box(field("id").eq(42))));

    group.bench_function("and_two_filters", |b| {
        b.iter(|| black_box(field("id").eq(1) & field("active").eq(true)))
    });

    group.bench_function("and_10_conditions", |b| {
        b.iter(|| black_box(create_and_filter(10)))
    });

    group.bench_function("nested_depth_5", |b| {
        b.iter(|| black_box(create_nested_filter(5)))
    });

    group.finish();
}

/// Benchmark compiling filters to documents.
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for size in [1usize, 10, 100].iter() {
        let filter = create_and_filter(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("and_conditions", size), &filter, |b, f| {
            b.iter(|| black_box(f.to_document()))
        });
    }

    let in_filter = field("id").is_in((0..100i64).map(Bson::Int64));
    group.bench_function("in_100_values", |b| {
        b.iter(|| black_box(in_filter.to_document()))
    });

    let nested = create_nested_filter(10);
    group.bench_function("nested_depth_10", |b| {
        b.iter(|| black_box(nested.to_document()))
    });

    group.finish();
}

/// Benchmark parsing filter documents.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [1usize, 10, 100].iter() {
        let doc = create_and_filter(*size).to_document();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("and_conditions", size), &doc, |b, d| {
            b.iter(|| black_box(Filter::from_document(d)))
        });
    }

    let unknown: Document = doc! { "tags": { "$size": 3 } };
    group.bench_function("raw_fallback", |b| {
        b.iter(|| black_box(Filter::from_document(&unknown)))
    });

    group.finish();
}

/// Benchmark the canonical byte comparator.
fn bench_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");

    let lhs = CanonicalBytes::encode(&Bson::String("a".repeat(256))).unwrap_or_default();
    let rhs = CanonicalBytes::encode(&Bson::String("a".repeat(257))).unwrap_or_default();

    group.bench_function("less_than_long_prefix", |b| {
        b.iter(|| black_box(less_than(lhs.as_bytes(), rhs.as_bytes())))
    });

    group.bench_function("encode_document", |b| {
        let value = Bson::Document(doc! { "a": 1, "b": [1, 2, 3], "c": { "d": "e" } });
        b.iter(|| black_box(CanonicalBytes::encode(&value)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_filter_creation,
    bench_compile,
    bench_parse,
    bench_ordering,
);

criterion_main!(benches);
