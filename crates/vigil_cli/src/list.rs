//! `vigil list`: print the scenario registry.

use vigil_bench::{registry, Scenario};

use crate::GlobalArgs;

/// Runs the `vigil list` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let scenarios = registry();
    for line in render(&scenarios) {
        println!("{line}");
    }
    if !global.quiet {
        eprintln!();
        eprintln!("   {} scenario(s)", scenarios.len());
    }
    Ok(0)
}

/// One line per scenario, ids padded to a common width.
fn render(scenarios: &[Scenario]) -> Vec<String> {
    let width = scenarios.iter().map(|s| s.id().len()).max().unwrap_or(0);
    scenarios
        .iter()
        .map(|s| format!("{:<width$}  {}", s.id(), s.description))
        .collect()
}
