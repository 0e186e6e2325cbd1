use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn blake2b_256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("blake2b_256_256B", |b| {
        b.iter(|| tcr_crypto::blake2b_256(black_box(&data)))
    });
}

fn listing_hash_bench(c: &mut Criterion) {
    c.bench_function("listing_hash_domain", |b| {
        b.iter(|| tcr_crypto::listing_hash(black_box("nochallenge.net")))
    });
}

fn vote_secret_bench(c: &mut Criterion) {
    c.bench_function("vote_secret_hash", |b| {
        b.iter(|| tcr_crypto::vote_secret_hash(black_box(1), black_box(0xDEAD_BEEF)))
    });
}

criterion_group!(benches, blake2b_256_bench, listing_hash_bench, vote_secret_bench);
criterion_main!(benches);
