//! Benchmarks for Reed-Solomon encoding and decoding.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fec::ecc::reed_solomon::{primitive_polynomial, ReedSolomon};
use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const MIN_DISTANCES: [usize; 3] = [4, 16, 32];

fn message(rng: &mut ChaCha8Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut group = c.benchmark_group("reed_solomon_encode");

    for md in MIN_DISTANCES {
        let rs = ReedSolomon::new(primitive_polynomial::CCSDS, 1, 1, md).unwrap();
        let data = message(&mut rng, rs.message_length());
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", md), &data, |b, data| {
            b.iter(|| rs.encode(black_box(data)).unwrap());
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(0xdec0de);
    let mut group = c.benchmark_group("reed_solomon_decode");

    for md in MIN_DISTANCES {
        let rs = ReedSolomon::new(primitive_polynomial::CCSDS, 1, 1, md).unwrap();
        let mut decoder = rs.decoder();
        let data = message(&mut rng, rs.message_length());
        let clean = rs.encode(&data).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("clean", md), &clean, |b, block| {
            b.iter(|| decoder.decode(black_box(block)).unwrap());
        });

        let mut corrupted = clean.clone();
        for position in index::sample(&mut rng, corrupted.len(), md / 2) {
            corrupted[position] ^= rng.gen_range(1..=255u8);
        }
        group.bench_with_input(BenchmarkId::new("errors", md), &corrupted, |b, block| {
            b.iter(|| decoder.decode(black_box(block)).unwrap());
        });

        let erasures = index::sample(&mut rng, clean.len(), md).into_vec();
        let mut erased = clean.clone();
        for &position in &erasures {
            erased[position] = 0;
        }
        group.bench_with_input(BenchmarkId::new("erasures", md), &erased, |b, block| {
            b.iter(|| {
                decoder
                    .decode_with_erasures(black_box(block), &erasures)
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
