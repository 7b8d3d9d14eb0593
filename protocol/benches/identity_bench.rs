// Identity and addressing benchmarks.
//
// Covers did:key derivation from a seed, did:pkh controller parsing, document
// address derivation, and the full seed-identity handshake through the
// resolver registry.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use keylink_protocol::config::SolanaNetwork;
use keylink_protocol::crypto::keys::Ed25519Keypair;
use keylink_protocol::document::GenesisRequest;
use keylink_protocol::identity::{
    ChainScopedController, FixedSeed, KeyDid, SeedIdentityAuthenticator,
};

fn controller(seed: u8) -> ChainScopedController {
    let pk = Ed25519Keypair::from_seed(&[seed; 32]).public_key();
    ChainScopedController::solana(SolanaNetwork::Mainnet, &pk)
}

fn bench_key_did_from_seed(c: &mut Criterion) {
    let seed = FixedSeed::deployment();

    c.bench_function("identity/key_did_from_seed", |b| {
        b.iter(|| {
            let kp = Ed25519Keypair::from_seed(seed.as_bytes());
            KeyDid::from_public_key(&kp.public_key()).to_did_string()
        });
    });
}

fn bench_controller_parse(c: &mut Criterion) {
    let did = controller(1).to_string();

    c.bench_function("identity/controller_parse", |b| {
        b.iter(|| ChainScopedController::parse(&did).unwrap());
    });
}

fn bench_document_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("document/derive_id");

    for count in [1u8, 4, 16] {
        let request =
            GenesisRequest::deterministic((0..count).map(controller).collect(), "abc");

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &request, |b, request| {
            b.iter(|| request.document_id());
        });
    }

    group.finish();
}

fn bench_seed_authentication(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let authenticator = SeedIdentityAuthenticator::default();
    let seed = FixedSeed::deployment();

    c.bench_function("identity/seed_authenticate", |b| {
        b.iter(|| runtime.block_on(authenticator.authenticate(&seed)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_key_did_from_seed,
    bench_controller_parse,
    bench_document_id,
    bench_seed_authentication,
);
criterion_main!(benches);
