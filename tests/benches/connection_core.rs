//! # AppKit Connection Core Benchmarks
//!
//! | Subsystem | Hot path |
//! |-----------|----------|
//! | appkit-types | CAIP-10 address parsing |
//! | ak-01 Connector Registry | multi-chain connector merge |
//! | ak-02 Namespace Builder | proposal namespaces for every network |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ak_01_connector_registry::merge_multi_chain_connectors;
use ak_02_namespace_builder::create_namespaces;
use appkit_types::{networks, parse_caip_address, ChainNamespace, Connector, ConnectorType};

// ============================================================================
// CAIP-10 parsing
// ============================================================================

fn bench_caip_address_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("caip-address-parsing");

    let inputs = [
        ("eip155", "eip155:1:0xAbC0000000000000000000000000000000000001"),
        ("solana", "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp:So11111111111111111111111111111111111111112"),
        ("bip122", "bip122:000000000019d6689c085ae165831e93:bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"),
    ];
    for (label, input) in inputs {
        group.bench_with_input(BenchmarkId::new("parse", label), input, |b, input| {
            b.iter(|| black_box(parse_caip_address(black_box(input)).is_ok()))
        });
    }

    group.bench_function("parse_invalid", |b| {
        b.iter(|| black_box(parse_caip_address(black_box("eip155:1")).is_err()))
    });

    group.finish();
}

// ============================================================================
// ak-01: Connector merge
// ============================================================================

fn bench_connector_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("ak-01-connector-merge");
    let namespaces = [
        ChainNamespace::Eip155,
        ChainNamespace::Solana,
        ChainNamespace::Bip122,
    ];

    for wallets in [10usize, 100, 500] {
        // Every wallet announced once per namespace.
        let connectors: Vec<Connector> = (0..wallets)
            .flat_map(|i| {
                namespaces.iter().map(move |namespace| {
                    Connector::new(
                        format!("wallet-{i}"),
                        format!("Wallet {i}"),
                        ConnectorType::Injected,
                        namespace.clone(),
                    )
                })
            })
            .collect();

        group.throughput(Throughput::Elements(connectors.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("merge_multi_chain", wallets),
            &connectors,
            |b, connectors| b.iter(|| black_box(merge_multi_chain_connectors(connectors).len())),
        );
    }

    group.finish();
}

// ============================================================================
// ak-02: Proposal namespaces
// ============================================================================

fn bench_namespace_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("ak-02-namespace-builder");
    let all = networks::all();

    group.throughput(Throughput::Elements(all.len() as u64));
    group.bench_function("create_namespaces_all", |b| {
        b.iter(|| black_box(create_namespaces(black_box(&all), None).len()))
    });

    let evm: Vec<_> = all
        .iter()
        .filter(|n| n.chain_namespace == ChainNamespace::Eip155)
        .cloned()
        .collect();
    group.bench_function("create_namespaces_evm", |b| {
        b.iter(|| black_box(create_namespaces(black_box(&evm), None).len()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_caip_address_parsing,
    bench_connector_merge,
    bench_namespace_builder,
);

criterion_main!(benches);
