use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seal_cipher::{
    AesEncryptor, DesEncryptor, EncryptorPool, Mode, Sm4Encryptor, SymmetricEncryptor,
    TripleDesEncryptor,
};
use seal_cipher::prelude::SymmetricCryptographicSystem;
use std::hint::black_box;

const SIZES: [usize; 3] = [64, 1024, 16 * 1024];

fn bench_modes<S: SymmetricCryptographicSystem>(c: &mut Criterion, base: SymmetricEncryptor<S>) {
    let mut group = c.benchmark_group(format!("{} encrypt", S::ALGORITHM));
    for mode in [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr, Mode::Gcm] {
        if mode == Mode::Gcm && S::BLOCK_SIZE != 16 {
            continue;
        }
        for size in SIZES {
            let data = vec![0x5au8; size];
            let mut encryptor = base.clone().with_mode(mode).no_encoding();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::new(mode.to_string(), size), &data, |b, data| {
                b.iter(|| encryptor.encrypt(black_box(data)).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_aes(c: &mut Criterion) {
    bench_modes(c, AesEncryptor::must_new([1u8; 32]));
}

fn bench_sm4(c: &mut Criterion) {
    bench_modes(c, Sm4Encryptor::must_new([1u8; 16]));
}

fn bench_des(c: &mut Criterion) {
    bench_modes(c, DesEncryptor::must_new([1u8; 8]));
    bench_modes(c, TripleDesEncryptor::must_new([1u8; 24]));
}

fn bench_decrypt_encoded(c: &mut Criterion) {
    let mut encryptor = AesEncryptor::must_new([2u8; 16]).base64();
    let ciphertext = encryptor.encrypt(&vec![0u8; 4096]).unwrap();
    c.bench_function("AES CBC decrypt 4KB base64", |b| {
        b.iter(|| encryptor.decrypt(black_box(&ciphertext)).unwrap());
    });
}

fn bench_pool(c: &mut Criterion) {
    let pool = EncryptorPool::<seal_cipher::AesSystem>::default();
    c.bench_function("AES pool get/put", |b| {
        b.iter(|| {
            let encryptor = pool.get(black_box([3u8; 16])).unwrap();
            pool.put(encryptor);
        });
    });
}

criterion_group!(
    benches,
    bench_aes,
    bench_sm4,
    bench_des,
    bench_decrypt_encoded,
    bench_pool
);
criterion_main!(benches);
