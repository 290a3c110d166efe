//! Scenario suites, one per device.
//!
//! Every suite exposes a `SCENARIOS` table; [`registry`] concatenates them
//! in a fixed order that the CLI reports in.

pub mod axis_dataover;
pub mod axis_master;
pub mod dataover;
pub mod flipflop;
pub mod negative_threshold;
pub mod two_dataover;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_common::{Level, Sample, FS_PER_NS};
use vigil_config::BenchConfig;
use vigil_dut::{BankPorts, ThresholdBank};

use crate::error::BenchError;
use crate::model::ThresholdSet;
use crate::scenario::{run, Scenario, ScenarioContext, ScenarioOutcome};

/// Seed for the randomized vector scenarios.
pub const VECTOR_SEED: u64 = 0x5EED;

/// Every registered scenario in suite order.
pub fn registry() -> Vec<Scenario> {
    [
        flipflop::SCENARIOS,
        dataover::SCENARIOS,
        two_dataover::SCENARIOS,
        negative_threshold::SCENARIOS,
        axis_master::SCENARIOS,
        axis_dataover::SCENARIOS,
    ]
    .concat()
}

/// Looks a scenario up by `suite::name`.
pub fn find(id: &str) -> Option<Scenario> {
    registry().into_iter().find(|s| s.id() == id)
}

/// Runs the scenario with id `suite::name`.
pub fn run_scenario(id: &str, config: &BenchConfig) -> Result<ScenarioOutcome, BenchError> {
    let scenario = find(id).ok_or_else(|| BenchError::UnknownScenario(id.to_string()))?;
    Ok(run(&scenario, config))
}

/// Lets combinational outputs propagate, as a fixed 10 ns wait.
pub(crate) fn propagate(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    ctx.kernel.run_for(10 * FS_PER_NS)?;
    Ok(())
}

/// Drives `input` into a threshold bank and checks every output.
pub(crate) fn apply_bank(
    ctx: &mut ScenarioContext,
    bank: &BankPorts,
    input: Sample,
    expected: &[bool],
    context: &str,
) -> Result<(), BenchError> {
    ctx.kernel.set_sample(bank.data_in, input)?;
    propagate(ctx)?;
    for (output, &flag) in bank.outputs.iter().zip(expected) {
        ctx.expect_level(
            output.signal,
            Level::from(flag),
            &format!("{context} data_in={input} ({})", input.to_hex()),
        );
    }
    Ok(())
}

/// A vector for a two-output bank: input and the expected output pair.
pub(crate) type PairVector = (Sample, [bool; 2]);

pub(crate) const fn pair(value: i32, first: u8, second: u8) -> PairVector {
    (Sample::from_signed(value), [first != 0, second != 0])
}

pub(crate) const fn pair_raw(raw: u32, first: u8, second: u8) -> PairVector {
    (Sample::from_raw(raw), [first != 0, second != 0])
}

/// Builds a bank for `thresholds` and checks each vector against it.
pub(crate) fn bank_table(
    ctx: &mut ScenarioContext,
    thresholds: [i32; 2],
    vectors: &[PairVector],
    context: &str,
) -> Result<(), BenchError> {
    let bank = ThresholdBank::instantiate(&mut ctx.kernel, &thresholds.map(Sample::from_signed))?;
    for (i, (input, expected)) in vectors.iter().enumerate() {
        apply_bank(ctx, &bank, *input, expected, &format!("{context} {i}"))?;
    }
    Ok(())
}

/// Checks a bank against the reference model on `count` seeded random inputs.
pub(crate) fn bank_random(
    ctx: &mut ScenarioContext,
    thresholds: [i32; 2],
    count: usize,
) -> Result<(), BenchError> {
    let samples = thresholds.map(Sample::from_signed);
    let bank = ThresholdBank::instantiate(&mut ctx.kernel, &samples)?;
    let model = ThresholdSet::new(samples);
    let mut rng = StdRng::seed_from_u64(VECTOR_SEED);
    for i in 0..count {
        let input = Sample::from_signed(rng.gen());
        let expected = model.evaluate(input);
        apply_bank(ctx, &bank, input, &expected, &format!("random {i}"))?;
    }
    Ok(())
}
