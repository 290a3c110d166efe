//! `vigil run`: select scenarios from the registry and run them.
//!
//! Scenarios run in parallel on a rayon pool, each in its own kernel, and
//! are reported in registry order. The exit code is 0 when every selected
//! scenario passed and 1 otherwise.

use rayon::prelude::*;
use vigil_bench::{registry, run as run_scenario, BenchError, Scenario, ScenarioOutcome};
use vigil_config::BenchConfig;

use crate::{GlobalArgs, ReportFormat, RunArgs};

/// Runs the `vigil run` command.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.bench_config()?;
    let scenarios = select(
        &registry(),
        args.name.as_deref(),
        args.filter.as_deref(),
        args.suite.as_deref(),
    )?;

    if scenarios.is_empty() {
        if !global.quiet {
            eprintln!("warning: no scenarios match the given filter");
        }
        return Ok(0);
    }

    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Running {} scenario(s) for {}",
            scenarios.len(),
            config.bench.name
        );
    }

    let outcomes = run_all(&scenarios, &config, args.jobs)?;
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let failed = outcomes.len() - passed;

    match args.format {
        ReportFormat::Json => {
            let report = serde_json::json!({
                "bench": config.bench.name,
                "passed": passed,
                "failed": failed,
                "scenarios": outcomes,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Text => {
            if !global.quiet {
                for outcome in &outcomes {
                    print_outcome(outcome, config.report.max_mismatches);
                }
                eprintln!();
                eprintln!(
                    "   Result: {passed} passed, {failed} failed out of {} scenario(s)",
                    outcomes.len()
                );
            }
        }
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

/// Picks scenarios by exact id, or by suite and id substring.
fn select(
    all: &[Scenario],
    name: Option<&str>,
    filter: Option<&str>,
    suite: Option<&str>,
) -> Result<Vec<Scenario>, BenchError> {
    if let Some(name) = name {
        return all
            .iter()
            .find(|s| s.id() == name)
            .map(|s| vec![*s])
            .ok_or_else(|| BenchError::UnknownScenario(name.to_string()));
    }
    Ok(all
        .iter()
        .filter(|s| suite.map_or(true, |suite| s.suite == suite))
        .filter(|s| filter.map_or(true, |f| s.id().contains(f)))
        .copied()
        .collect())
}

/// Runs every scenario on a pool of `jobs` threads, keeping input order.
fn run_all(
    scenarios: &[Scenario],
    config: &BenchConfig,
    jobs: Option<usize>,
) -> Result<Vec<ScenarioOutcome>, rayon::ThreadPoolBuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .build()?;
    Ok(pool.install(|| {
        scenarios
            .par_iter()
            .map(|s| run_scenario(s, config))
            .collect()
    }))
}

fn print_outcome(outcome: &ScenarioOutcome, max_mismatches: usize) {
    let id = format!("{}::{}", outcome.suite, outcome.name);
    if outcome.passed {
        eprintln!(
            "   PASS  {id} ({} cycles, {})",
            outcome.cycles, outcome.final_time
        );
        return;
    }
    eprintln!("   FAIL  {id} at {}", outcome.final_time);
    for reason in &outcome.reasons {
        eprintln!("         {reason}");
    }
    if let Some(report) = &outcome.comparison {
        for line in report.summary(max_mismatches).lines() {
            eprintln!("         {line}");
        }
    }
}
