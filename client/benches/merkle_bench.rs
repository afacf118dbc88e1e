// Whitelist Merkle tree benchmarks.
//
// Covers tree construction at several list sizes, proof generation and
// verification against the embedded whitelist, and one eligibility pass.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fifthdim_client::config::MintConfig;
use fifthdim_client::mint::{evaluate, EligibilityInput, MintPhaseState};
use fifthdim_client::types::Address;
use fifthdim_client::whitelist::{MembershipSet, MerkleTree};

fn synthetic_set(size: usize) -> MembershipSet {
    let members = (1..=size as u64)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[12..].copy_from_slice(&i.to_be_bytes());
            Address::new(bytes)
        })
        .collect();
    MembershipSet::new(members).expect("non-empty, unique")
}

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle/build");
    for size in [64usize, 321, 1111, 8888] {
        let set = synthetic_set(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &set, |b, set| {
            b.iter(|| MerkleTree::build(set));
        });
    }
    group.finish();
}

fn bench_proof(c: &mut Criterion) {
    let set = MembershipSet::embedded().expect("embedded whitelist");
    let tree = MerkleTree::build(&set);
    let last = set.members()[set.len() - 1];

    c.bench_function("merkle/proof_embedded", |b| {
        b.iter(|| tree.proof(&last));
    });

    let proof = tree.proof(&last);
    c.bench_function("merkle/verify_embedded", |b| {
        b.iter(|| tree.verify(&last, &proof));
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let config = MintConfig::default();
    let state = MintPhaseState {
        public_active: true,
        max_supply: 8888,
        whitelist_phase_cap: 1111,
        public_phase_cap: 7777,
        total_supply: 4000,
        public_phase_minted: 3000,
        ..Default::default()
    };

    c.bench_function("eligibility/evaluate", |b| {
        b.iter(|| {
            evaluate(
                &config,
                &EligibilityInput {
                    connected: true,
                    state: &state,
                    membership_verified: false,
                    quantity: 3,
                },
            )
        });
    });
}

criterion_group!(benches, bench_tree_build, bench_proof, bench_evaluate);
criterion_main!(benches);
