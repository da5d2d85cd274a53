use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use packed_ecs::{impl_component, ComponentRegistry, World};

#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
struct Health(u32);

impl_component!(Position, Velocity, Health);

fn registry() -> Arc<ComponentRegistry> {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register::<Position>("Position");
    registry.register::<Velocity>("Velocity");
    registry.register::<Health>("Health");
    registry
}

fn populated_world() -> World {
    let mut world = World::with_registry(registry());
    for i in 0..10_000 {
        let entity = world.create();
        world.assign(entity, Position(1.0, 2.0, 3.0));
        if i % 2 == 0 {
            world.assign(entity, Velocity(1.0, 0.0, 0.0));
        }
        if i % 100 == 0 {
            world.assign(entity, Health(100));
        }
    }
    world
}

fn assign_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign");

    group.bench_function("create_with_2_components", |b| {
        b.iter_batched(
            || World::with_registry(registry()),
            |mut world| {
                for _ in 0..10_000 {
                    world
                        .spawn()
                        .assign(Position(1.0, 2.0, 3.0))
                        .assign(Velocity(1.0, 0.0, 0.0));
                }
                world
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let world = populated_world();
    let mut group = c.benchmark_group("query");

    group.bench_function("position_velocity", |b| {
        b.iter(|| black_box(world.query::<(Position, Velocity)>()))
    });

    // Health is the pivot here, so only 100 candidates are checked
    group.bench_function("position_velocity_health", |b| {
        b.iter(|| black_box(world.query::<(Position, Velocity, Health)>()))
    });

    group.bench_function("by_name", |b| {
        b.iter(|| black_box(world.query_names(&["Velocity", "Health"])))
    });

    group.finish();
}

fn clone_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone");

    group.bench_function("clone_entity_1k", |b| {
        b.iter_batched(
            || {
                let mut world = World::with_registry(registry());
                let source = world.create();
                world.assign(source, Position(1.0, 2.0, 3.0));
                world.assign(source, Health(10));
                (world, source)
            },
            |(mut world, source)| {
                for _ in 0..1_000 {
                    world.clone_entity(source, "");
                }
                world
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, assign_benchmark, query_benchmark, clone_benchmark);
criterion_main!(benches);
