//! Playback master with a comparator on its data bus.
//!
//! Every observed transfer carries the `data_over` level sampled at the same
//! edge, which must match the signed model against `threshold.value`.

use vigil_common::{Level, Sample};
use vigil_dut::{AxisDataover, AxisDataoverPorts, ImageSource};

use super::axis_master::{collect, finish_stream, reset_master, wait_done};
use crate::error::BenchError;
use crate::loader::{load_reference, ReferenceFile};
use crate::model::over;
use crate::observer::{AxisObserver, Transfer};
use crate::scenario::{reason_for, Scenario, ScenarioContext};
use crate::scoreboard::FailureReason;

/// Combined master and comparator scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "basic",
        suite: "axis_dataover",
        description: "test data file streamed with per-beat flag checks",
        run: basic,
    },
    Scenario {
        name: "boundary",
        suite: "axis_dataover",
        description: "words at and around the configured threshold",
        run: boundary,
    },
    Scenario {
        name: "large_numbers",
        suite: "axis_dataover",
        description: "large positive words up to 2*10^9",
        run: large_numbers,
    },
    Scenario {
        name: "negative_numbers",
        suite: "axis_dataover",
        description: "negative words never flag against a positive threshold",
        run: negative_numbers,
    },
    Scenario {
        name: "control",
        suite: "axis_dataover",
        description: "pause holds tvalid low for five cycles mid-stream",
        run: control,
    },
    Scenario {
        name: "csv_direct_comparison",
        suite: "axis_dataover",
        description: "stream data compared word for word with the test data file",
        run: csv_direct_comparison,
    },
];

const LARGE: [i32; 6] = [
    2_000_000,
    10_000_000,
    50_000_000,
    100_000_000,
    1_000_000_000,
    2_000_000_000,
];

const NEGATIVE: [i32; 4] = [-1_000_000, -100, -100_000, -2_000_000_000];

const CONTROL: [i32; 3] = [500_000, 1_500_000, 2_000_000];

fn threshold(ctx: &ScenarioContext) -> Sample {
    ctx.config().threshold.value
}

fn bring_up(
    ctx: &mut ScenarioContext,
    source: impl ImageSource,
    with_flag: bool,
) -> Result<AxisDataoverPorts, BenchError> {
    let aclk = ctx.clock("aclk")?;
    let t = threshold(ctx);
    let (p, _) = AxisDataover::instantiate(&mut ctx.kernel, aclk, source, t)?;
    reset_master(ctx, &p.axis)?;
    let observer = AxisObserver::new(&p.axis);
    ctx.start_observer(if with_flag {
        observer.with_flag(p.data_over)
    } else {
        observer
    });
    Ok(p)
}

fn check_flags(ctx: &mut ScenarioContext, transfers: &[Transfer]) {
    let t = threshold(ctx);
    for (index, transfer) in transfers.iter().enumerate() {
        let expected = over(transfer.data, t);
        match transfer.flag {
            Some(level) if level == Level::from(expected) => {}
            other => ctx.fail(FailureReason::FlagMismatch {
                index,
                data: transfer.data,
                expected,
                actual: other.map_or_else(|| "none".to_string(), |l| l.to_string()),
            }),
        }
    }
}

/// Streams `words` once and checks both data and flags.
fn stream_words(ctx: &mut ScenarioContext, words: Vec<Sample>) -> Result<(), BenchError> {
    let p = bring_up(ctx, words.clone(), true)?;
    ctx.pulse(p.axis.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p.axis, ceiling);
    let transfers = finish_stream(ctx, &words, waited)?;
    check_flags(ctx, &transfers);
    Ok(())
}

fn samples(values: &[i32]) -> Vec<Sample> {
    values.iter().map(|&v| Sample::from_signed(v)).collect()
}

fn basic(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let path = ctx.config().data.test_data.clone();
    let expected = load_reference(&path)?.samples;
    let p = bring_up(ctx, ReferenceFile(path), true)?;
    ctx.pulse(p.axis.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p.axis, ceiling);
    let transfers = finish_stream(ctx, &expected, waited)?;
    let flagged = transfers
        .iter()
        .filter(|t| t.flag == Some(Level::One))
        .count();
    log::info!("{flagged} of {} words above {}", transfers.len(), threshold(ctx));
    check_flags(ctx, &transfers);
    Ok(())
}

fn boundary(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let t = threshold(ctx).signed();
    let words = [
        t.wrapping_sub(1),
        t,
        t.wrapping_add(1),
        t.wrapping_sub(2),
        t.wrapping_add(2),
    ];
    stream_words(ctx, samples(&words))
}

fn large_numbers(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    stream_words(ctx, samples(&LARGE))
}

fn negative_numbers(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    stream_words(ctx, samples(&NEGATIVE))
}

fn control(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let words = samples(&CONTROL);
    let p = bring_up(ctx, words.clone(), true)?;
    let a = p.axis;
    ctx.pulse(a.i_start)?;
    if ctx.kernel.level(a.m_axis_tvalid) != Level::One {
        let start_ceiling = ctx.config().watchdog.start_cycles;
        let tvalid = a.m_axis_tvalid;
        ctx.wait_until(start_ceiling, "m_axis_tvalid", move |k| {
            k.level(tvalid) == Level::One
        })?;
    }

    ctx.kernel.set_bool(a.i_pause, true)?;
    ctx.kernel.settle()?;
    let paused_at = ctx.received_count();
    for cycle in 0..5 {
        ctx.expect_level(a.m_axis_tvalid, Level::Zero, &format!("pause cycle {cycle}"));
        ctx.cycles(1)?;
    }
    let during = ctx.received_count();
    ctx.check(
        during == paused_at,
        format!("{} transfer(s) while paused", during - paused_at),
    );
    ctx.kernel.set_bool(a.i_pause, false)?;

    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &a, ceiling);
    let transfers = finish_stream(ctx, &words, waited)?;
    check_flags(ctx, &transfers);
    Ok(())
}

fn csv_direct_comparison(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let path = ctx.config().data.test_data.clone();
    let data = load_reference(&path)?;
    for skipped in &data.skipped {
        log::warn!(
            "{}:{}: skipped '{}': {}",
            path.display(),
            skipped.line,
            skipped.text,
            skipped.reason
        );
    }
    if !ctx.check(!data.is_empty(), format!("{} holds no valid samples", path.display())) {
        return Ok(());
    }
    let p = bring_up(ctx, ReferenceFile(path), false)?;
    ctx.pulse(p.axis.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    match wait_done(ctx, &p.axis, ceiling) {
        Ok(_) => ctx.cycles(super::axis_master::DRAIN_CYCLES)?,
        Err(err) => ctx.fail(reason_for(err)),
    }
    let received: Vec<Sample> = collect(ctx).iter().map(|t| t.data).collect();
    if ctx.compare(&data.samples, &received) {
        log::info!("all {} words match", received.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{write_reference, Radix};
    use crate::scenario::run;
    use vigil_config::BenchConfig;

    fn config_with(values: &[i32]) -> (tempfile::TempDir, BenchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_data.csv");
        write_reference(&path, &samples(values), Radix::Decimal).unwrap();
        let mut config = BenchConfig::default();
        config.data.test_data = path;
        (dir, config)
    }

    #[test]
    fn all_axis_dataover_scenarios_pass() {
        let (_dir, config) = config_with(&[999_999, 1_000_000, 1_000_001, -5, i32::MAX]);
        for scenario in SCENARIOS {
            let outcome = run(scenario, &config);
            assert!(outcome.passed, "{}: {:?}", scenario.id(), outcome.reasons);
        }
    }

    #[test]
    fn boundary_follows_configured_threshold() {
        let (_dir, mut config) = config_with(&[1]);
        config.threshold.value = Sample::from_signed(i32::MAX);
        let outcome = run(&SCENARIOS[1], &config);
        assert!(outcome.passed, "{:?}", outcome.reasons);
    }

    #[test]
    fn empty_test_data_fails_direct_comparison() {
        let (_dir, config) = config_with(&[]);
        let outcome = run(&SCENARIOS[5], &config);
        assert!(!outcome.passed);
        assert!(matches!(outcome.reasons[0], FailureReason::Check(ref m) if m.contains("no valid samples")));
    }

    #[test]
    fn flag_mismatch_is_reported() {
        let mut ctx = ScenarioContext::new(BenchConfig::default());
        let transfers = [
            Transfer {
                data: Sample::from_signed(2_000_000),
                last: false,
                flag: Some(Level::Zero),
            },
            Transfer {
                data: Sample::from_signed(5),
                last: true,
                flag: None,
            },
        ];
        check_flags(&mut ctx, &transfers);
        assert_eq!(ctx.reasons().len(), 2);
        assert!(matches!(
            &ctx.reasons()[1],
            FailureReason::FlagMismatch { index: 1, expected: false, actual, .. } if actual == "none"
        ));
    }
}
