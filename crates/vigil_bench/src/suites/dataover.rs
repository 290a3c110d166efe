//! Single comparator with a threshold port.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_common::{Comparison, Level, Sample};
use vigil_dut::{Comparator, ComparatorPorts};

use super::{propagate, VECTOR_SEED};
use crate::error::BenchError;
use crate::model::over_with;
use crate::scenario::{Scenario, ScenarioContext};

/// Comparator scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "basic",
        suite: "dataover",
        description: "below, equal and above a threshold of 200",
        run: basic,
    },
    Scenario {
        name: "edge_cases",
        suite: "dataover",
        description: "all-ones patterns, zero and the 10^6 boundary",
        run: edge_cases,
    },
    Scenario {
        name: "boundary",
        suite: "dataover",
        description: "t-1, t and t+1 for decade thresholds",
        run: boundary,
    },
    Scenario {
        name: "random",
        suite: "dataover",
        description: "50 seeded random 32-bit pairs against the reference model",
        run: random,
    },
    Scenario {
        name: "comprehensive",
        suite: "dataover",
        description: "fixed vector table including values near 2^31 and 2^32",
        run: comprehensive,
    },
    Scenario {
        name: "sign_crossing",
        suite: "dataover",
        description: "signed ordering across the sign bit",
        run: sign_crossing,
    },
    Scenario {
        name: "unsigned_mode",
        suite: "dataover",
        description: "explicit unsigned ordering across the sign bit",
        run: unsigned_mode,
    },
];

fn setup(ctx: &mut ScenarioContext, comparison: Comparison) -> Result<ComparatorPorts, BenchError> {
    Ok(Comparator::instantiate(&mut ctx.kernel, comparison)?)
}

fn apply(
    ctx: &mut ScenarioContext,
    p: &ComparatorPorts,
    data: Sample,
    threshold: Sample,
    expected: bool,
) -> Result<(), BenchError> {
    ctx.kernel.set_sample(p.data_in, data)?;
    ctx.kernel.set_sample(p.threshold, threshold)?;
    propagate(ctx)?;
    ctx.expect_level(
        p.data_over,
        Level::from(expected),
        &format!("{} vs {}", data.to_hex(), threshold.to_hex()),
    );
    Ok(())
}

fn table(
    ctx: &mut ScenarioContext,
    comparison: Comparison,
    vectors: &[(u32, u32, u8)],
) -> Result<(), BenchError> {
    let p = setup(ctx, comparison)?;
    for &(data, threshold, expected) in vectors {
        apply(
            ctx,
            &p,
            Sample::from_raw(data),
            Sample::from_raw(threshold),
            expected != 0,
        )?;
    }
    Ok(())
}

fn basic(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let comparison = ctx.config().threshold.comparison;
    table(ctx, comparison, &[(100, 200, 0), (200, 200, 0), (300, 200, 1)])
}

fn edge_cases(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let comparison = ctx.config().threshold.comparison;
    table(
        ctx,
        comparison,
        &[
            (0xFFFF_FFFF, 0xFFFF_FFFE, 1),
            (0, 0, 0),
            (1, 0, 1),
            (1_000_000, 999_999, 1),
        ],
    )
}

fn boundary(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let comparison = ctx.config().threshold.comparison;
    let p = setup(ctx, comparison)?;
    for threshold in [100, 1_000, 10_000, 100_000, 1_000_000] {
        let t = Sample::from_signed(threshold);
        for (data, expected) in [(threshold - 1, false), (threshold, false), (threshold + 1, true)] {
            apply(ctx, &p, Sample::from_signed(data), t, expected)?;
        }
    }
    Ok(())
}

fn random(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let comparison = ctx.config().threshold.comparison;
    let p = setup(ctx, comparison)?;
    let mut rng = StdRng::seed_from_u64(VECTOR_SEED);
    for _ in 0..50 {
        let data = Sample::from_raw(rng.gen());
        let threshold = Sample::from_raw(rng.gen());
        let expected = over_with(data, threshold, comparison);
        apply(ctx, &p, data, threshold, expected)?;
    }
    Ok(())
}

fn comprehensive(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let comparison = ctx.config().threshold.comparison;
    table(
        ctx,
        comparison,
        &[
            (0, 0, 0),
            (1, 0, 1),
            (0, 1, 0),
            (100, 100, 0),
            (101, 100, 1),
            (99, 100, 0),
            (0xFFFF_FFFF, 0xFFFF_FFFE, 1),
            (0xFFFF_FFFE, 0xFFFF_FFFF, 0),
            (1_000_000, 999_999, 1),
            (999_999, 1_000_000, 0),
            (2_147_483_647, 2_147_483_646, 1),
            (2_147_483_646, 2_147_483_647, 0),
        ],
    )
}

fn sign_crossing(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    table(
        ctx,
        Comparison::Signed,
        &[
            (0x8000_0000, 1, 0),
            (0xFFFF_FFFF, 0, 0),
            (0, 0xFFFF_FFFF, 1),
            (0x7FFF_FFFF, 0x8000_0000, 1),
        ],
    )
}

fn unsigned_mode(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    table(
        ctx,
        Comparison::Unsigned,
        &[
            (0x8000_0000, 1, 1),
            (0xFFFF_FFFF, 0, 1),
            (0, 0xFFFF_FFFF, 0),
            (0x7FFF_FFFF, 0x8000_0000, 0),
        ],
    )
}
