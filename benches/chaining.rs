use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use factchain::{
    EngineConfig, Fact, FactSet, ForwardChainer, InferenceEngine, Query, Rule, RuleBase,
    RuntimeConfig, SessionRuntime,
};
use factchain::loader::{parse_facts, parse_rules};

const CHAIN_LEN: usize = 512;

/// `F0 -> F1 -> ... -> F{n}`, declared in reverse so each pass derives one fact.
fn reverse_chain(n: usize) -> RuleBase {
    (0..n)
        .rev()
        .map(|i| {
            Rule::new(
                vec![Fact::unnamed(format!("F{i}"))],
                vec![Fact::unnamed(format!("F{}", i + 1))],
            )
        })
        .collect()
}

/// Engine whose rule base fans out: each layer fact needs two facts of the layer below.
fn layered_engine() -> InferenceEngine {
    let mut facts = String::new();
    let mut rules = String::new();
    for layer in 0..16 {
        for i in 0..16 {
            facts.push_str(&format!("L{layer}_{i};layer {layer} fact {i}\n"));
            if layer > 0 {
                let below = layer - 1;
                let other = (i + 1) % 16;
                rules.push_str(&format!("L{below}_{i},L{below}_{other}:L{layer}_{i}\n"));
            }
        }
    }
    let universe = parse_facts(&facts, "bench-facts").value;
    let rules = parse_rules(&rules, "bench-rules", &universe).value;
    InferenceEngine::new(universe, rules, EngineConfig::default()).unwrap()
}

fn layer_zero() -> Vec<String> {
    (0..16).map(|i| format!("L0_{i}")).collect()
}

fn bench_saturate_chain(c: &mut Criterion) {
    let rules = reverse_chain(CHAIN_LEN);
    let config = EngineConfig::default();
    let start: FactSet = std::iter::once(Fact::unnamed("F0")).collect();

    let mut group = c.benchmark_group("forward");
    group.sample_size(20);
    group.throughput(Throughput::Elements(CHAIN_LEN as u64));
    group.bench_function("saturate_reverse_chain", |b| {
        b.iter(|| ForwardChainer::new(&rules, &config).saturate(black_box(&start)));
    });
    group.finish();
}

fn bench_layered(c: &mut Criterion) {
    let engine = layered_engine();
    let start = layer_zero();

    c.bench_function("forward/saturate_layered", |b| {
        b.iter(|| engine.saturate(black_box(&start)).unwrap());
    });
    c.bench_function("forward/derive_target_layered", |b| {
        b.iter(|| engine.derive_target("L15_0", black_box(&start)).unwrap());
    });
    c.bench_function("backward/prove_layered", |b| {
        b.iter(|| engine.prove("L15_0", black_box(&start)).unwrap());
    });
}

fn bench_runtime_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime");
    group.throughput(Throughput::Elements(1));

    group.bench_function("prove_session", |b| {
        b.iter_custom(|iters| {
            let runtime = SessionRuntime::new(layered_engine(), &RuntimeConfig::default()).unwrap();
            let query = Query::prove("L15_0", layer_zero());

            let start = Instant::now();
            for _ in 0..iters {
                let _ = runtime.execute(query.clone()).unwrap();
            }
            start.elapsed()
        });
    });
    group.finish();
}

criterion_group!(
    chaining,
    bench_saturate_chain,
    bench_layered,
    bench_runtime_sessions
);
criterion_main!(chaining);
