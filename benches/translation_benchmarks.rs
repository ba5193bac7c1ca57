// SPDX-License-Identifier: PMPL-1.0-or-later
//! Performance benchmarks for specification translation and execution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use specbridge_core::{
    AllOf, AnyOf, BoxedSpecification, FieldCompare, FieldCompareHandler, HandlerRegistry, Not,
    RegistryConfig, SpecificationExt,
};
use specbridge_store::{EntityStore, Executor, ExecutorConfig, InMemoryBackend};

fn registry() -> HandlerRegistry {
    let mut builder = HandlerRegistry::builder(RegistryConfig::default());
    builder
        .with_logical_handlers()
        .unwrap()
        .register(FieldCompareHandler)
        .unwrap();
    builder.build()
}

fn leaves(count: usize) -> Vec<BoxedSpecification> {
    (0..count)
        .map(|i| FieldCompare::equals("Product", "article", format!("A{}", i))
                .unwrap()
                .boxed())
        .collect()
}

// ============================================================================
// Translation Benchmarks
// ============================================================================

fn bench_flat_composites(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("translation");

    for size in [1, 10, 100] {
        let spec = AnyOf::new(leaves(size)).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("any_of", size), &spec, |b, spec| {
            b.iter(|| {
                let mut ctx = registry.create_context();
                ctx.select(["p"]).from("Product", "p");
                ctx.match_spec(black_box(spec)).unwrap();
                black_box(ctx.into_query())
            });
        });
    }

    group.finish();
}

fn bench_nested_negation(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("translation");

    for depth in [4, 16, 64] {
        let mut spec: BoxedSpecification =
            FieldCompare::equals("Product", "article", "A1").unwrap().boxed();
        for level in 0..depth {
            spec = if level % 2 == 0 {
                Not::boxed(spec).boxed()
            } else {
                AllOf::of(spec, leaves(1)).boxed()
            };
        }
        group.bench_with_input(BenchmarkId::new("nested", depth), &spec, |b, spec| {
            b.iter(|| {
                let mut ctx = registry.create_context();
                black_box(ctx.translate(&**spec).unwrap())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Execution Benchmarks
// ============================================================================

fn bench_execute_filter(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let registry = registry();
    let store = EntityStore::new(InMemoryBackend::new());

    rt.block_on(async {
        for i in 0..1000 {
            store
                .insert_row(
                    "Product",
                    serde_json::json!({ "article": format!("A{}", i), "price": i }),
                )
                .await
                .unwrap();
        }
    });
    let executor = Executor::new(store, ExecutorConfig::default());

    let mut ctx = registry.create_context();
    ctx.select(["p"]).from("Product", "p");
    ctx.match_spec(&AnyOf::new(leaves(10)).unwrap()).unwrap();
    let query = ctx.into_query();

    let mut group = c.benchmark_group("execution");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("any_of_10_over_1000_rows", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(executor.execute(&query).await.unwrap()) });
    });
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(translation_benches, bench_flat_composites, bench_nested_negation);

criterion_group!(execution_benches, bench_execute_filter);

criterion_main!(translation_benches, execution_benches);
