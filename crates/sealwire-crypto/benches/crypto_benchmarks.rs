//! Benchmarks for sealwire-crypto

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sealwire_crypto::{
    codec::{compress, decompress},
    keys::{KeyPair, SymmetricKey, DEFAULT_RSA_BITS},
    signature::{sign, verify},
    symmetric::{decrypt, encrypt},
    EnvelopeCodec,
};

fn bench_symmetric(c: &mut Criterion) {
    let mut group = c.benchmark_group("symmetric");
    let key = SymmetricKey::generate();

    for size in [1024, 64 * 1024, 1024 * 1024].iter() {
        let data = vec![0u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(
            BenchmarkId::new("aes-256-cbc-encrypt", size),
            &data,
            |b, data| b.iter(|| encrypt(&key, data).unwrap()),
        );

        let blob = encrypt(&key, &data).unwrap();
        group.bench_with_input(
            BenchmarkId::new("aes-256-cbc-decrypt", size),
            &blob,
            |b, blob| b.iter(|| decrypt(&key, blob).unwrap()),
        );
    }

    group.finish();
}

fn bench_rsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("rsa");
    let keypair = KeyPair::generate(DEFAULT_RSA_BITS).unwrap();
    let data = vec![7u8; 4096];

    group.bench_function("sign", |b| {
        b.iter(|| sign(&data, keypair.private_key()).unwrap())
    });

    let signature = sign(&data, keypair.private_key()).unwrap();
    group.bench_function("verify", |b| {
        b.iter(|| verify(&data, &signature, keypair.public_key()))
    });

    group.finish();
}

fn bench_gzip(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip");

    for size in [64 * 1024, 1024 * 1024].iter() {
        let data: Vec<u8> = (0..*size).map(|i| (i % 251) as u8).collect();
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(
            BenchmarkId::new("compress", size),
            &data,
            |b, data| b.iter(|| compress(data, 9).unwrap()),
        );

        let compressed = compress(&data, 9).unwrap();
        group.bench_with_input(
            BenchmarkId::new("decompress", size),
            &compressed,
            |b, compressed| b.iter(|| decompress(compressed, usize::MAX - 1).unwrap()),
        );
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    let keypair = KeyPair::generate(DEFAULT_RSA_BITS).unwrap();
    let codec = EnvelopeCodec::new(SymmetricKey::generate(), &keypair);

    for size in [32, 1024, 64 * 1024].iter() {
        let value = vec![42u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(
            BenchmarkId::new("serialize", size),
            &value,
            |b, value| b.iter(|| codec.serialize(value).unwrap()),
        );

        let envelope = codec.serialize(&value).unwrap();
        group.bench_with_input(
            BenchmarkId::new("deserialize", size),
            &envelope,
            |b, envelope| b.iter(|| codec.deserialize::<Vec<u8>>(envelope).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_symmetric, bench_rsa, bench_gzip, bench_envelope);
criterion_main!(benches);
