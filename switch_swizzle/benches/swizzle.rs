use criterion::{criterion_group, criterion_main, Criterion};
use switch_swizzle::swizzle::swizzle_block_linear;
use switch_swizzle::{block_height, swizzled_surface_size};

use criterion::BenchmarkId;
use criterion::Throughput;

fn swizzle_block_linear_benchmark(c: &mut Criterion) {
    let bytes_per_block = 8;
    // Allocate the size needed by the largest run.
    // This avoids including the allocation time in the benchmark.
    let source = vec![0u8; swizzled_surface_size(512, 512, block_height(512), bytes_per_block)];

    let mut group = c.benchmark_group("swizzle_block_linear");
    for size in [8, 32, 64, 128, 256, 320, 448, 512] {
        group.throughput(Throughput::Bytes((size * size * bytes_per_block) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                swizzle_block_linear(size, size, &source, block_height(size), bytes_per_block)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, swizzle_block_linear_benchmark);
criterion_main!(benches);
