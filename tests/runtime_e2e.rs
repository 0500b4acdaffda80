use factchain::loader::{parse_facts, parse_rules};
use factchain::{EngineConfig, InferenceEngine, Query, RuntimeConfig, SessionRuntime};

fn engine() -> InferenceEngine {
    let universe = parse_facts("A;A\nB;B\nC;C\nD;D\nE;E\n", "facts").value;
    let rules = parse_rules("A,B:C\nC:D\nD,E:A\n", "rules", &universe).value;
    InferenceEngine::new(universe, rules, EngineConfig::default()).unwrap()
}

fn queries() -> Vec<Query> {
    vec![
        Query::saturate(["A", "B"]),
        Query::derive_target("D", ["A", "B"]),
        Query::prove("D", ["A", "B"]),
        Query::prove("A", ["E"]),
        Query::saturate(["D", "E"]),
        Query::derive_target("C", ["E"]),
    ]
}

#[test]
fn concurrent_sessions_match_sequential_results() {
    let sequential: Vec<_> = queries()
        .into_iter()
        .map(|q| engine().execute(q).unwrap())
        .collect();

    let runtime = SessionRuntime::new(
        engine(),
        &RuntimeConfig {
            workers: 4,
            queue_capacity: 64,
        },
    )
    .unwrap();
    let concurrent = runtime.execute_all(queries());

    assert_eq!(sequential.len(), concurrent.len());
    for (seq, conc) in sequential.iter().zip(concurrent) {
        let conc = conc.unwrap();
        assert_eq!(seq.succeeded(), conc.succeeded());
        assert_eq!(seq.trace(), conc.trace());
    }
}

#[test]
fn many_sessions_share_one_rule_base() {
    let runtime = SessionRuntime::new(engine(), &RuntimeConfig::default()).unwrap();
    let batch: Vec<Query> = (0..200).map(|_| Query::prove("D", ["A", "B"])).collect();
    for response in runtime.execute_all(batch) {
        assert!(response.unwrap().succeeded());
    }
    assert_eq!(runtime.engine().rules().len(), 3);
}

#[test]
fn errors_are_per_session() {
    let runtime = SessionRuntime::new(engine(), &RuntimeConfig::default()).unwrap();
    let results = runtime.execute_all(vec![
        Query::saturate(["A"]),
        Query::saturate(["missing"]),
        Query::saturate(["B"]),
    ]);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_validation());
    assert!(results[2].is_ok());
}
