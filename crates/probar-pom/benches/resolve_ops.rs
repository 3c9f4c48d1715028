//! Resolution Benchmarks
//!
//! Benchmarks for element resolution, cache hits and collection queries
//! over the in-memory session.
//!
//! Run with: `cargo bench --bench resolve_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probar_pom::prelude::*;

/// A page with `depth` nested sections, each holding `width` list items
fn nested_page(depth: usize, width: usize) -> Rc<MockSession> {
    let session = Rc::new(MockSession::new());
    let mut parent: Option<NodeRef> = None;
    for _ in 0..depth {
        let section = MockNode::new().matching(Locator::css("section"));
        let node = match &parent {
            Some(p) => session.add_child(p, section),
            None => session.add_node(section),
        };
        for i in 0..width {
            session.add_child(
                &node,
                MockNode::new().matching(Locator::css("li")).text(format!("item {i}")),
            );
        }
        parent = Some(node);
    }
    session
}

fn bench_cached_resolve(c: &mut Criterion) {
    let session = nested_page(1, 1);
    let section = Element::new(Parent::root(session.clone()), Locator::css("section"));
    section.resolve().unwrap();

    c.bench_function("cached_resolve", |b| {
        b.iter(|| {
            session.clear_history();
            black_box(section.resolve().unwrap())
        });
    });
}

fn bench_nested_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_resolve");

    for depth in [1_usize, 4, 16] {
        let session = nested_page(depth, 2);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut element = Element::new(Parent::root(session.clone()), Locator::css("section"));
                for _ in 1..depth {
                    element = Element::new(&element, Locator::css("section"));
                }
                session.clear_history();
                black_box(element.resolve().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_collection_texts(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_texts");

    for width in [10_usize, 100, 1_000] {
        let session = nested_page(1, width);
        let items: Collection = Collection::new(Parent::root(session.clone()), Locator::css("li"));
        group.bench_with_input(BenchmarkId::from_parameter(width), &items, |b, items| {
            b.iter(|| {
                session.clear_history();
                black_box(items.texts().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_resolve,
    bench_nested_resolve,
    bench_collection_texts
);
criterion_main!(benches);
