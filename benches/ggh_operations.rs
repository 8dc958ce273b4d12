use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ggh::{
    generate_keypair, BasisOptions, DecodingStrategy, Decryptor, Encryptor, Perturbation,
};
use num_bigint::BigInt;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn bench_ggh(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let dim = 16;
    let (public, private) = generate_keypair(dim, &BasisOptions::default(), &mut rng).unwrap();

    c.bench_function("generate_keypair_dim16", |b| {
        b.iter(|| {
            let pair = generate_keypair(black_box(dim), &BasisOptions::default(), &mut rng);
            black_box(pair).unwrap();
        });
    });

    let encryptor = Encryptor::new(public, Perturbation::Ternary);
    c.bench_function("encrypt_unit_dim16", |b| {
        b.iter(|| {
            let cipher = encryptor.encrypt(black_box(&BigInt::from(171)), &mut rng);
            black_box(cipher).unwrap();
        });
    });

    let exact = Encryptor::new(private.public_key().unwrap(), Perturbation::Disabled);
    let cipher = exact.encrypt(&BigInt::from(171), &mut rng).unwrap();

    let nearest = Decryptor::new(private.clone(), DecodingStrategy::NearestPlane);
    c.bench_function("decrypt_nearest_plane_dim16", |b| {
        b.iter(|| {
            let m = nearest.decrypt(black_box(&cipher));
            black_box(m).unwrap();
        });
    });

    let rounding = Decryptor::new(private, DecodingStrategy::Rounding);
    c.bench_function("decrypt_rounding_dim16", |b| {
        b.iter(|| {
            let m = rounding.decrypt(black_box(&cipher));
            black_box(m).unwrap();
        });
    });
}

criterion_group!(benches, bench_ggh);
criterion_main!(benches);
