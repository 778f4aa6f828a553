//! Basic benchmarks for the `stable_vec` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use stable_vec::StableVec;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = [usize; 16];
const TEST_VALUE: TestItem = [1024; 16];

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("stable_vec_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(StableVec::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_first");
    group.bench_function("push_first", |b| {
        b.iter_custom(|iters| {
            let mut sequences = iter::repeat_with(StableVec::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for sequence in &mut sequences {
                sequence.push(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_1k");
    group.bench_function("push_1k", |b| {
        b.iter_custom(|iters| {
            let mut sequences = iter::repeat_with(StableVec::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for sequence in &mut sequences {
                for _ in 0..1000 {
                    sequence.push(black_box(TEST_VALUE));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("pop_push_recycled");
    group.bench_function("pop_push_recycled", |b| {
        b.iter_custom(|iters| {
            let mut sequences = iter::repeat_with(StableVec::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            // Pre-warm each sequence so the measured cycle recycles slots.
            for sequence in &mut sequences {
                for _ in 0..100 {
                    sequence.push(TEST_VALUE);
                }
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for sequence in &mut sequences {
                let value = sequence.pop().unwrap();
                sequence.push(black_box(value));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("iterate_1k");
    group.bench_function("iterate_1k", |b| {
        b.iter_custom(|iters| {
            let mut sequence = StableVec::<TestItem>::new();
            for _ in 0..1000 {
                sequence.push(TEST_VALUE);
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                for value in &sequence {
                    _ = black_box(value);
                }
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
