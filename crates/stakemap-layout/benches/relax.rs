//! Relaxation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stakemap_core::{LayoutBounds, WeightedEntity};
use stakemap_layout::{auto_bounds, compute_layout, LayoutParams};

fn entities(n: usize) -> Vec<WeightedEntity> {
    (0..n)
        .map(|i| WeightedEntity::new(format!("0x{i:040x}"), ((i * 7919) % 100_000) as f64))
        .collect()
}

fn compute(c: &mut Criterion) {
    let params = LayoutParams::default();
    let mut group = c.benchmark_group("compute_layout");
    group.sample_size(10);

    for n in [32, 128, 512] {
        let input = entities(n);
        let bounds = auto_bounds(&input, LayoutBounds::default(), &params);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| compute_layout(black_box(input), bounds, &params))
        });
    }
    group.finish();
}

criterion_group!(benches, compute);
criterion_main!(benches);
