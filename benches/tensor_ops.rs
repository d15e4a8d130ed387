// Tensor access benchmarks: offset computation, reshape and copies
// at incremental sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tensorgrid::{Shape, Tensor};

// Offset computation, unchecked vs bounds-checked
fn offset_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset");
    let shape = Shape::row_major(vec![8, 16, 32, 4]);
    let idx = [5, 11, 30, 2];

    group.bench_function("unchecked", |bench| {
        bench.iter(|| shape.offset(black_box(&idx)))
    });
    group.bench_function("checked", |bench| {
        bench.iter(|| shape.try_offset(black_box(&idx)).unwrap())
    });
    group.finish();
}

// Full traversal through n-d indexes at different sizes
fn get_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_nd");

    for size in [16, 64, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |bench, &size| {
            let t = Tensor::<f64>::new(vec![size, size]);
            bench.iter(|| {
                let mut sum = 0.0;
                for r in 0..size {
                    for c in 0..size {
                        sum += *t.get(&[r, c]);
                    }
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

// Shrink then regrow within capacity vs past capacity
fn reshape_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_row_count");

    for rows in [128, 1024, 8192].iter() {
        group.bench_with_input(BenchmarkId::new("within_capacity", rows), rows, |bench, &rows| {
            let mut t = Tensor::<f32>::new(vec![rows, 16]);
            bench.iter(|| {
                t.set_row_count(black_box(rows / 2));
                t.set_row_count(black_box(rows));
            });
        });
        group.bench_with_input(BenchmarkId::new("reallocating", rows), rows, |bench, &rows| {
            bench.iter_batched(
                || Tensor::<f32>::new(vec![rows, 16]),
                |mut t| {
                    t.set_row_count(black_box(rows * 2));
                    t
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// Same-kind copy (typed fast path) vs cross-kind copy
fn copy_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_from");

    for size in [512, 4096].iter() {
        let src = Tensor::<f64>::new(vec![*size]);
        group.bench_with_input(BenchmarkId::new("same_kind", size), size, |bench, &size| {
            let mut dst = Tensor::<f64>::new(vec![size]);
            bench.iter(|| dst.copy_from(black_box(&src)));
        });
        group.bench_with_input(BenchmarkId::new("to_f32", size), size, |bench, &size| {
            let mut dst = Tensor::<f32>::new(vec![size]);
            bench.iter(|| dst.copy_from(black_box(&src)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    offset_benchmark,
    get_benchmark,
    reshape_benchmark,
    copy_benchmark
);
criterion_main!(benches);
