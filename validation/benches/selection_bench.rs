use agij_types::{Address, Hash256};
use agij_validation::ValidatorSelector;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn pool(size: u64) -> Vec<(Address, u128)> {
    (1..=size)
        .map(|i| (Address::from_low_u64(i), u128::from(i) * 1_000))
        .collect()
}

fn bench_weighted_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_sample");
    let seed = Hash256::new([7u8; 32]);
    for size in [10u64, 100, 1_000] {
        let candidates = pool(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| ValidatorSelector.sample(black_box(&seed), black_box(candidates), 9))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_weighted_sample);
criterion_main!(benches);
