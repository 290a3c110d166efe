//! Threshold bank at -100 and -50.

use super::{bank_random, bank_table, pair, pair_raw, PairVector};
use crate::error::BenchError;
use crate::scenario::{Scenario, ScenarioContext};

const THRESHOLDS: [i32; 2] = [-100, -50];

/// Negative-threshold scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "basic",
        suite: "negative_threshold",
        description: "below both, between, and above both negative thresholds",
        run: basic,
    },
    Scenario {
        name: "boundary",
        suite: "negative_threshold",
        description: "t-1, t and t+1 around -100 and -50",
        run: boundary,
    },
    Scenario {
        name: "comprehensive",
        suite: "negative_threshold",
        description: "signed extremes, the region between thresholds and raw hex patterns",
        run: comprehensive,
    },
    Scenario {
        name: "random",
        suite: "negative_threshold",
        description: "50 seeded random signed inputs against the reference model",
        run: random,
    },
];

const BASIC: &[PairVector] = &[
    pair(-200, 0, 0),
    pair(-75, 1, 0),
    pair(-25, 1, 1),
    pair(50, 1, 1),
];

const BOUNDARY: &[PairVector] = &[
    pair(-101, 0, 0),
    pair(-100, 0, 0),
    pair(-99, 1, 0),
    pair(-51, 1, 0),
    pair(-50, 1, 0),
    pair(-49, 1, 1),
];

const COMPREHENSIVE: &[PairVector] = &[
    pair(i32::MIN, 0, 0),
    pair(-2_147_483_647, 0, 0),
    pair(-1_000_000_000, 0, 0),
    pair(-1_000_000, 0, 0),
    pair(-1_000, 0, 0),
    pair(-500, 0, 0),
    pair(-200, 0, 0),
    pair(-150, 0, 0),
    pair(-101, 0, 0),
    pair(-100, 0, 0),
    pair(-99, 1, 0),
    pair(-90, 1, 0),
    pair(-80, 1, 0),
    pair(-70, 1, 0),
    pair(-60, 1, 0),
    pair(-51, 1, 0),
    pair(-50, 1, 0),
    pair(-49, 1, 1),
    pair(-40, 1, 1),
    pair(-30, 1, 1),
    pair(-20, 1, 1),
    pair(-10, 1, 1),
    pair(-5, 1, 1),
    pair(-1, 1, 1),
    pair(0, 1, 1),
    pair(1, 1, 1),
    pair(10, 1, 1),
    pair(100, 1, 1),
    pair(1_000, 1, 1),
    pair(i32::MAX, 1, 1),
    pair_raw(0x8000_0000, 0, 0),
    pair_raw(0x8000_0001, 0, 0),
    pair_raw(0xFFFF_FF9C, 0, 0),
    pair_raw(0xFFFF_FFCE, 1, 0),
    pair_raw(0xFFFF_FFFF, 1, 1),
];

fn basic(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, BASIC, "basic")
}

fn boundary(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, BOUNDARY, "boundary")
}

fn comprehensive(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_table(ctx, THRESHOLDS, COMPREHENSIVE, "vector")
}

fn random(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    bank_random(ctx, THRESHOLDS, 50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ThresholdSet;
    use crate::scenario::run;
    use vigil_common::Sample;
    use vigil_config::BenchConfig;

    #[test]
    fn tables_agree_with_model() {
        let model = ThresholdSet::new(THRESHOLDS.map(Sample::from_signed));
        for table in [BASIC, BOUNDARY, COMPREHENSIVE] {
            for (input, expected) in table {
                assert_eq!(model.evaluate(*input), expected.to_vec(), "{input:?}");
            }
        }
    }

    #[test]
    fn outputs_are_named_by_label() {
        let mut ctx = crate::scenario::ScenarioContext::new(BenchConfig::default());
        basic(&mut ctx).unwrap();
        assert!(ctx.kernel.find_signal("data_over_neg100").is_some());
        assert!(ctx.kernel.find_signal("data_over_neg50").is_some());
        assert!(ctx.reasons().is_empty());
    }

    #[test]
    fn all_negative_threshold_scenarios_pass() {
        let config = BenchConfig::default();
        for scenario in SCENARIOS {
            let outcome = run(scenario, &config);
            assert!(outcome.passed, "{}: {:?}", scenario.id(), outcome.reasons);
        }
    }
}
