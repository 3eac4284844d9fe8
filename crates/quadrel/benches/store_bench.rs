//! Benchmarks for quadrel
//!
//! Run with: cargo bench -p quadrel

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quadrel::{QuadPattern, QuadStore, Statement, Term};

fn term(text: &str) -> Term {
    Term::new(text).unwrap()
}

fn stmt(i: usize) -> Statement {
    Statement::resource(
        term("bench:graph"),
        term(&format!("user:{}", i % 10)),
        term(&format!("prop:{}", i % 5)),
        term(&format!("node:{}", i)),
    )
}

fn bench_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("upsert");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("memory", size), size, |b, &size| {
            b.iter(|| {
                let store = QuadStore::memory().unwrap();
                for i in 0..size {
                    store.upsert(black_box(&stmt(i))).unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_merge_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_many");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("memory", size), size, |b, &size| {
            b.iter(|| {
                let store = QuadStore::memory().unwrap();
                let stmts: Vec<Statement> = (0..size).map(stmt).collect();
                store.merge_many(black_box(stmts)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let store = QuadStore::memory().unwrap();
    store.merge_many((0..1000).map(stmt)).unwrap();

    let mut group = c.benchmark_group("select");

    group.bench_function("by_subject", |b| {
        let pattern = QuadPattern::subject(term("user:5"));
        b.iter(|| store.select_by_pattern(black_box(&pattern)).unwrap());
    });

    group.bench_function("by_subject_predicate", |b| {
        let pattern = QuadPattern::subject(term("user:5")).with_predicate(term("prop:2"));
        b.iter(|| store.select_by_pattern(black_box(&pattern)).unwrap());
    });

    group.bench_function("by_object", |b| {
        let pattern = QuadPattern::object(term("node:500"));
        b.iter(|| store.select_by_pattern(black_box(&pattern)).unwrap());
    });

    group.finish();
}

fn bench_statement_key(c: &mut Criterion) {
    let s = stmt(42);

    c.bench_function("statement_key_derivation", |b| {
        b.iter(|| black_box(&s).key());
    });
}

criterion_group!(benches, bench_upsert, bench_merge_many, bench_select, bench_statement_key);
criterion_main!(benches);
