//! Benchmarks for convolutional encoding and Viterbi decoding.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fec::ecc::convolutional::{polynomial, ConvolutionalCode, SoftMeasurement};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const MESSAGE_LEN: usize = 4096;

fn codes() -> Vec<(&'static str, ConvolutionalCode)> {
    vec![
        ("r12_7", ConvolutionalCode::new(2, 7, &polynomial::R12_7).unwrap()),
        ("r12_9", ConvolutionalCode::new(2, 9, &polynomial::R12_9).unwrap()),
        ("r13_9", ConvolutionalCode::new(3, 9, &polynomial::R13_9).unwrap()),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let data: Vec<u8> = (0..MESSAGE_LEN).map(|_| rng.gen()).collect();
    let mut group = c.benchmark_group("convolutional_encode");
    group.throughput(Throughput::Bytes(MESSAGE_LEN as u64));

    for (name, code) in codes() {
        group.bench_with_input(BenchmarkId::new("encode", name), &data, |b, data| {
            b.iter(|| code.encode(black_box(data)));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let data: Vec<u8> = (0..MESSAGE_LEN).map(|_| rng.gen()).collect();
    let mut group = c.benchmark_group("viterbi_decode");
    group.throughput(Throughput::Bytes(MESSAGE_LEN as u64));

    for (name, code) in codes() {
        let num_bits = code.encode_len(MESSAGE_LEN);
        let encoded = code.encode(&data);
        let soft: Vec<u8> = (0..num_bits)
            .map(|i| {
                let bit = (encoded[i / 8] >> (7 - i % 8)) & 1;
                if bit == 1 {
                    rng.gen_range(140..=255)
                } else {
                    rng.gen_range(0..=115)
                }
            })
            .collect();

        let mut decoder = code.decoder();
        group.bench_with_input(BenchmarkId::new("hard", name), &encoded, |b, encoded| {
            b.iter(|| decoder.decode(black_box(encoded), num_bits).unwrap());
        });

        for (label, measurement) in [
            ("soft_linear", SoftMeasurement::Linear),
            ("soft_quadratic", SoftMeasurement::Quadratic),
        ] {
            let mut decoder = code.decoder().with_soft_measurement(measurement);
            group.bench_with_input(BenchmarkId::new(label, name), &soft, |b, soft| {
                b.iter(|| decoder.decode_soft(black_box(soft), num_bits).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
