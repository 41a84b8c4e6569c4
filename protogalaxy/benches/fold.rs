use ark_bn254::Fr;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, SamplingMode};
use protogalaxy::{
    mock_circuits::MockCircuits, Blake2bTranscript, ProtogalaxyProver, ProvingKey, TraceSettings,
};
use rand::{rngs::StdRng, SeedableRng};

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("protogalaxy fold");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);

    for log2_size in [10usize, 12, 14] {
        let mut rng = StdRng::seed_from_u64(0);
        let keys: Vec<ProvingKey<Fr>> = (0..2)
            .map(|_| {
                let trace = MockCircuits::construct_arithmetic_trace(&mut rng, 1 << log2_size);
                ProvingKey::new(&trace, &TraceSettings::default()).unwrap()
            })
            .collect();

        group.throughput(criterion::Throughput::Elements(1 << log2_size));
        group.bench_with_input(
            BenchmarkId::from_parameter(log2_size),
            &keys,
            |b, keys| {
                b.iter_batched(
                    || [keys[0].clone(), keys[1].clone()],
                    |keys| {
                        let mut transcript = Blake2bTranscript::<Fr>::new();
                        ProtogalaxyProver::new(keys, &mut transcript).prove().unwrap()
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fold);
criterion_main!(benches);
