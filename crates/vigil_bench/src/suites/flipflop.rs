//! D flip-flop scenarios.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_common::{Level, FS_PER_NS};
use vigil_dut::{DFlipFlop, DffPorts};

use super::VECTOR_SEED;
use crate::error::BenchError;
use crate::scenario::{Scenario, ScenarioContext};

/// Flip-flop scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "reset",
        suite: "flipflop",
        description: "reset holds q low regardless of d",
        run: reset,
    },
    Scenario {
        name: "basic",
        suite: "flipflop",
        description: "q follows d one edge later",
        run: basic,
    },
    Scenario {
        name: "random",
        suite: "flipflop",
        description: "20 seeded random data bits",
        run: random,
    },
    Scenario {
        name: "reset_during_operation",
        suite: "flipflop",
        description: "asynchronous reset mid-stream, then recovery",
        run: reset_during_operation,
    },
    Scenario {
        name: "setup_timing",
        suite: "flipflop",
        description: "d changed 8 ns before the edge is captured",
        run: setup_timing,
    },
    Scenario {
        name: "comprehensive",
        suite: "flipflop",
        description: "fixed bit sequence with a reset in the middle",
        run: comprehensive,
    },
];

fn setup(ctx: &mut ScenarioContext) -> Result<DffPorts, BenchError> {
    let clk = ctx.clock("clk")?;
    Ok(DFlipFlop::instantiate(&mut ctx.kernel, clk)?)
}

/// Holds reset for two cycles and releases it for one.
fn reset_sequence(ctx: &mut ScenarioContext, p: &DffPorts) -> Result<(), BenchError> {
    ctx.kernel.set_bool(p.rst, true)?;
    ctx.cycles(2)?;
    ctx.kernel.set_bool(p.rst, false)?;
    ctx.cycles(1)
}

/// Applies `bit`, waits for the capturing edge plus 1 ns, and checks q.
fn capture(ctx: &mut ScenarioContext, p: &DffPorts, bit: bool, context: &str) -> Result<(), BenchError> {
    ctx.kernel.set_bool(p.d, bit)?;
    ctx.kernel.run_until_rising(p.clk)?;
    ctx.kernel.run_for(FS_PER_NS)?;
    ctx.expect_level(p.q, Level::from(bit), context);
    Ok(())
}

fn reset(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let p = setup(ctx)?;
    ctx.kernel.set_bool(p.rst, true)?;
    ctx.kernel.set_bool(p.d, true)?;
    ctx.kernel.run_for(20 * FS_PER_NS)?;
    ctx.expect_level(p.q, Level::Zero, "during reset");
    Ok(())
}

fn basic(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let p = setup(ctx)?;
    reset_sequence(ctx, &p)?;
    for (i, bit) in [true, false, true, true, false].into_iter().enumerate() {
        capture(ctx, &p, bit, &format!("vector {i}"))?;
    }
    Ok(())
}

fn random(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let p = setup(ctx)?;
    reset_sequence(ctx, &p)?;
    let mut rng = StdRng::seed_from_u64(VECTOR_SEED);
    for i in 0..20 {
        let bit = rng.gen_bool(0.5);
        capture(ctx, &p, bit, &format!("random vector {i}"))?;
    }
    Ok(())
}

fn reset_during_operation(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let p = setup(ctx)?;
    reset_sequence(ctx, &p)?;
    capture(ctx, &p, true, "before reset")?;

    ctx.kernel.set_bool(p.rst, true)?;
    ctx.kernel.run_for(5 * FS_PER_NS)?;
    ctx.expect_level(p.q, Level::Zero, "reset asserted between edges");

    ctx.kernel.set_bool(p.rst, false)?;
    ctx.kernel.run_until_rising(p.clk)?;
    ctx.kernel.run_for(FS_PER_NS)?;
    ctx.expect_level(p.q, Level::One, "after reset release");
    Ok(())
}

fn setup_timing(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let p = setup(ctx)?;
    reset_sequence(ctx, &p)?;
    for (i, bit) in [true, false, true, false].into_iter().enumerate() {
        ctx.kernel.set_bool(p.d, bit)?;
        ctx.kernel.run_for(8 * FS_PER_NS)?;
        ctx.kernel.run_until_rising(p.clk)?;
        ctx.kernel.run_for(FS_PER_NS)?;
        ctx.expect_level(p.q, Level::from(bit), &format!("timing vector {i}"));
    }
    Ok(())
}

fn comprehensive(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let p = setup(ctx)?;
    reset_sequence(ctx, &p)?;
    let sequence = [false, true, true, false, true, false, false, true];
    for (i, bit) in sequence.into_iter().enumerate() {
        capture(ctx, &p, bit, &format!("sequence step {i}"))?;
    }
    ctx.kernel.set_bool(p.rst, true)?;
    ctx.kernel.run_for(FS_PER_NS)?;
    ctx.expect_level(p.q, Level::Zero, "reset after sequence");
    ctx.kernel.set_bool(p.rst, false)?;
    for (i, bit) in sequence.into_iter().rev().enumerate() {
        capture(ctx, &p, bit, &format!("reversed step {i}"))?;
    }
    Ok(())
}
