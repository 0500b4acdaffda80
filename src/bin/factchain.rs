//! factchain command-line front end.
//!
//! Loads a fact file and a rule file, runs one query and prints the trace
//! and outcome (or the JSON response).

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use factchain::ir::{from_json, to_json_pretty};
use factchain::{
    EngineConfig, EngineResponse, Fact, FactchainError, InferenceEngine, LoadError, ProvenScope,
    Query, StartingTargetPolicy,
};

/// What to run once the knowledge base is loaded.
enum Command {
    Saturate(Vec<String>),
    Derive { target: String, facts: Vec<String> },
    Prove { target: String, known: Vec<String> },
    Query(PathBuf),
    Facts,
    Rules,
}

/// CLI configuration.
struct Config {
    facts: PathBuf,
    rules: PathBuf,
    config_file: Option<PathBuf>,
    proven_scope: Option<ProvenScope>,
    starting_target: Option<StartingTargetPolicy>,
    max_passes: Option<usize>,
    json: bool,
    command: Command,
}

fn usage() {
    println!("factchain - forward/backward chaining over flat fact and rule files");
    println!();
    println!("USAGE:");
    println!("    factchain [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    saturate <ID>...            Derive everything reachable from the facts");
    println!("    derive <TARGET> <ID>...     Forward chain until TARGET is derived");
    println!("    prove <TARGET> <ID>...      Prove TARGET backwards from the facts");
    println!("    query <FILE>                Run a JSON query");
    println!("    facts                       List loaded facts");
    println!("    rules                       List loaded rules");
    println!();
    println!("OPTIONS:");
    println!("    -f, --facts <FILE>          Fact file, `id;name` per line [default: facts.txt]");
    println!("    -r, --rules <FILE>          Rule file, `ids:ids` per line [default: rules.txt]");
    println!("    -c, --config <FILE>         JSON engine configuration");
    println!("        --proven-scope <S>      shared | per-attempt");
    println!("        --starting-target <P>   short-circuit | require-derivation");
    println!("        --max-passes <N>        Stop forward chaining after N passes");
    println!("        --json                  Print the JSON response");
    println!("    -h, --help                  Print help information");
    println!();
    println!("Logging is controlled by FACTCHAIN_LOG (default: warn).");
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(2);
}

fn value(args: &[String], i: usize, flag: &str) -> String {
    args.get(i + 1)
        .cloned()
        .unwrap_or_else(|| fail(&format!("{flag} requires a value")))
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut facts = PathBuf::from("facts.txt");
    let mut rules = PathBuf::from("rules.txt");
    let mut config_file = None;
    let mut proven_scope = None;
    let mut starting_target = None;
    let mut max_passes = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--facts" | "-f" => {
                facts = PathBuf::from(value(&args, i, "--facts"));
                i += 2;
            }
            "--rules" | "-r" => {
                rules = PathBuf::from(value(&args, i, "--rules"));
                i += 2;
            }
            "--config" | "-c" => {
                config_file = Some(PathBuf::from(value(&args, i, "--config")));
                i += 2;
            }
            "--proven-scope" => {
                proven_scope = Some(match value(&args, i, "--proven-scope").as_str() {
                    "shared" => ProvenScope::Shared,
                    "per-attempt" => ProvenScope::PerAttempt,
                    other => fail(&format!("invalid proven scope: {other}")),
                });
                i += 2;
            }
            "--starting-target" => {
                starting_target = Some(match value(&args, i, "--starting-target").as_str() {
                    "short-circuit" => StartingTargetPolicy::ShortCircuit,
                    "require-derivation" => StartingTargetPolicy::RequireDerivation,
                    other => fail(&format!("invalid starting target policy: {other}")),
                });
                i += 2;
            }
            "--max-passes" => {
                let raw = value(&args, i, "--max-passes");
                let n: usize = raw
                    .parse()
                    .unwrap_or_else(|_| fail(&format!("invalid pass count: {raw}")));
                max_passes = Some(n);
                i += 2;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => fail(&format!("unknown argument: {arg}")),
            _ => break,
        }
    }

    let command = parse_command(&args[i.min(args.len())..]);
    Config {
        facts,
        rules,
        config_file,
        proven_scope,
        starting_target,
        max_passes,
        json,
        command,
    }
}

fn parse_command(rest: &[String]) -> Command {
    let Some((name, operands)) = rest.split_first() else {
        fail("missing command (try --help)");
    };
    let target_and_facts = || -> (String, Vec<String>) {
        let Some((target, facts)) = operands.split_first() else {
            fail(&format!("{name} requires a target"));
        };
        (target.clone(), facts.to_vec())
    };
    match name.as_str() {
        "saturate" => Command::Saturate(operands.to_vec()),
        "derive" => {
            let (target, facts) = target_and_facts();
            Command::Derive { target, facts }
        }
        "prove" => {
            let (target, known) = target_and_facts();
            Command::Prove { target, known }
        }
        "query" => match operands {
            [path] => Command::Query(PathBuf::from(path)),
            _ => fail("query requires exactly one file"),
        },
        "facts" => Command::Facts,
        "rules" => Command::Rules,
        other => fail(&format!("unknown command: {other}")),
    }
}

fn engine_config(cli: &Config) -> Result<EngineConfig, FactchainError> {
    let mut config = match &cli.config_file {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(scope) = cli.proven_scope {
        config.proven_scope = scope;
    }
    if let Some(policy) = cli.starting_target {
        config.starting_target = policy;
    }
    if cli.max_passes.is_some() {
        config.max_passes = cli.max_passes;
    }
    config.validate()?;
    Ok(config)
}

fn join_ids(facts: &[Fact]) -> String {
    facts.iter().map(Fact::id).collect::<Vec<_>>().join(", ")
}

fn print_response(response: &EngineResponse) {
    for line in response.trace().lines() {
        println!("{line}");
    }
    match response {
        EngineResponse::Saturate { facts, derived, saturated, .. } => {
            println!();
            println!("derived: {}", join_ids(derived));
            println!("facts:   {}", join_ids(facts));
            if !*saturated {
                println!("stopped at the pass limit before the fixpoint");
            }
        }
        EngineResponse::Prove { proven: true, rule_chain, .. } => {
            println!();
            println!("justification:");
            for rule in rule_chain {
                println!("    {rule}");
            }
        }
        EngineResponse::DeriveTarget { saturated: false, .. } => {
            println!("stopped at the pass limit before the fixpoint");
        }
        EngineResponse::DeriveTarget { .. } | EngineResponse::Prove { .. } => {}
    }
}

fn run(cli: &Config) -> Result<(), FactchainError> {
    let config = engine_config(cli)?;
    let loaded = InferenceEngine::from_files(&cli.facts, &cli.rules, config)?;
    for diagnostic in &loaded.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    let engine = loaded.value;

    let query = match &cli.command {
        Command::Facts => {
            for fact in engine.universe().iter() {
                println!("{};{}", fact.id(), fact.name());
            }
            return Ok(());
        }
        Command::Rules => {
            for rule in engine.rules() {
                println!("{rule}");
            }
            return Ok(());
        }
        Command::Saturate(facts) => Query::saturate(facts.clone()),
        Command::Derive { target, facts } => Query::derive_target(target.clone(), facts.clone()),
        Command::Prove { target, known } => Query::prove(target.clone(), known.clone()),
        Command::Query(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            from_json(&text)?
        }
    };

    tracing::debug!(query = %to_json_pretty(&query)?, "running query");
    let response = engine.execute(query)?;
    if cli.json {
        let text = serde_json::to_string_pretty(&response)
            .map_err(|e| FactchainError::internal(format!("serialize response: {e}")))?;
        println!("{text}");
    } else {
        print_response(&response);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("FACTCHAIN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
