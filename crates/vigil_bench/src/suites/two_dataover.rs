//! Threshold bank at 100 and 200.

use super::{bank_random, bank_table, pair, pair_raw, PairVector};
use crate::error::BenchError;
use crate::scenario::{Scenario, ScenarioContext};

const THRESHOLDS: [i32; 2] = [100, 200];

/// Two-threshold scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "basic",
        suite: "two_dataover",
        description: "below, between, on and above both thresholds",
        run: basic,
    },
    Scenario {
        name: "boundary",
        suite: "two_dataover",
        description: "t-1, t and t+1 around 100 and 200",
        run: boundary,
    },
    Scenario {
        name: "edge_cases",
        suite: "two_dataover",
        description: "zero, the signed maximum and large positives",
        run: edge_cases,
    },
    Scenario {
        name: "random",
        suite: "two_dataover",
        description: "30 seeded random signed inputs against the reference model",
        run: random,
    },
    Scenario {
        name: "signed_values",
        suite: "two_dataover",
        description: "negative inputs and both signed extremes",
        run: signed_values,
    },
    Scenario {
        name: "negative_comprehensive",
        suite: "two_dataover",
        description: "negative inputs in decimal and as raw hex patterns",
        run: negative_comprehensive,
    },
    Scenario {
        name: "comprehensive",
        suite: "two_dataover",
        description: "fixed table from the signed minimum to the signed maximum",
        run: comprehensive,
    },
];

const BASIC: &[PairVector] = &[
    pair(50, 0, 0),
    pair(100, 0, 0),
    pair(150, 1, 0),
    pair(200, 1, 0),
    pair(300, 1, 1),
];

const BOUNDARY: &[PairVector] = &[
    pair(99, 0, 0),
    pair(100, 0, 0),
    pair(101, 1, 0),
    pair(199, 1, 0),
    pair(200, 1, 0),
    pair(201, 1, 1),
];

const EDGE_CASES: &[PairVector] = &[
    pair(0, 0, 0),
    pair_raw(0x7FFF_FFFF, 1, 1),
    pair(1_000, 1, 1),
    pair(10_000, 1, 1),
    pair(100_000, 1, 1),
    pair(1_000_000, 1, 1),
];

const SIGNED_VALUES: &[PairVector] = &[
    pair(-50, 0, 0),
    pair(-1_000, 0, 0),
    pair_raw(0x8000_0000, 0, 0),
    pair_raw(0x7FFF_FFFF, 1, 1),
    pair(0, 0, 0),
];

const NEGATIVE_COMPREHENSIVE: &[PairVector] = &[
    pair(-1, 0, 0),
    pair(-5, 0, 0),
    pair(-10, 0, 0),
    pair(-50, 0, 0),
    pair(-99, 0, 0),
    pair(-100, 0, 0),
    pair(-150, 0, 0),
    pair(-200, 0, 0),
    pair(-250, 0, 0),
    pair(-500, 0, 0),
    pair(-1_000, 0, 0),
    pair(-10_000, 0, 0),
    pair(-100_000, 0, 0),
    pair(-1_000_000, 0, 0),
    pair(-10_000_000, 0, 0),
    pair(-100_000_000, 0, 0),
    pair(-1_000_000_000, 0, 0),
    pair(-2_000_000_000, 0, 0),
    pair(-2_147_483_647, 0, 0),
    pair(i32::MIN, 0, 0),
    pair_raw(0x8000_0000, 0, 0),
    pair_raw(0x8000_0001, 0, 0),
    pair_raw(0xFFFF_FFFF, 0, 0),
    pair_raw(0xFFFF_FFFE, 0, 0),
    pair_raw(0xFFFF_FF9C, 0, 0),
    pair_raw(0xFFFF_FF38, 0, 0),
];

const COMPREHENSIVE: &[PairVector] = &[
    pair(i32::MIN, 0, 0),
    pair(-1_000, 0, 0),
    pair(-50, 0, 0),
    pair(-1, 0, 0),
    pair(0, 0, 0),
    pair(1, 0, 0),
    pair(50, 0, 0),
    pair(99, 0, 0),
    pair(100, 0, 0),
    pair(101, 1, 0),
    pair(150, 1, 0),
    pair(199, 1, 0),
    pair(200, 1, 0),
    pair(201, 1, 1),
    pair(300, 1, 1),
    pair(1_000, 1, 1),
    pair(i32::MAX, 1, 1),
];

fn basic(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, BASIC, "basic")
}

fn boundary(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, BOUNDARY, "boundary")
}

fn edge_cases(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, EDGE_CASES, "edge case")
}

fn random(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_random(ctx, THRESHOLDS, 30)
}

fn signed_values(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, SIGNED_VALUES, "signed")
}

fn negative_comprehensive(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, NEGATIVE_COMPREHENSIVE, "negative")
}

fn comprehensive(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, COMPREHENSIVE, "vector")
}
