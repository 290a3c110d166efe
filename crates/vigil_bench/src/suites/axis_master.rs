//! File playback master scenarios.
//!
//! Each scenario loads the reference file named by `data.reference`, plays
//! it through the master and checks the observed stream against it.

use vigil_common::{Level, Sample};
use vigil_dut::{AxisMasterFile, AxisPorts};

use crate::backpressure::BackpressureMode;
use crate::error::BenchError;
use crate::loader::{load_reference, ReferenceFile};
use crate::observer::{AxisObserver, Transfer};
use crate::scenario::{reason_for, Scenario, ScenarioContext};

/// Playback master scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "oneshot",
        suite: "axis_master",
        description: "one pass of the reference file with framing and count checks",
        run: oneshot,
    },
    Scenario {
        name: "loop",
        suite: "axis_master",
        description: "loop mode repeats the file until loop is cleared",
        run: loop_mode,
    },
    Scenario {
        name: "pause_resume",
        suite: "axis_master",
        description: "no transfers while paused, nothing lost after resume",
        run: pause_resume,
    },
    Scenario {
        name: "restart",
        suite: "axis_master",
        description: "restart mid-pass, then a clean pass from word 0",
        run: restart,
    },
    Scenario {
        name: "gap_cycles",
        suite: "axis_master",
        description: "five idle cycles between words",
        run: gap_cycles,
    },
    Scenario {
        name: "backpressure",
        suite: "axis_master",
        description: "seeded random tready stalls",
        run: backpressure,
    },
    Scenario {
        name: "sent_count",
        suite: "axis_master",
        description: "o_sent_count at the done pulse equals the transfers observed",
        run: sent_count,
    },
    Scenario {
        name: "file_comparison",
        suite: "axis_master",
        description: "full comparison under a fixed stall pattern",
        run: file_comparison,
    },
];

/// Idle cycles observed after the done pulse before the observer is stopped.
pub(crate) const DRAIN_CYCLES: u64 = 10;

/// Holds reset for the configured cycles with every control input low.
pub(crate) fn reset_master(ctx: &mut ScenarioContext, p: &AxisPorts) -> Result<(), BenchError> {
    ctx.kernel.set_bool(p.aresetn, false)?;
    for sig in [p.i_start, p.i_loop, p.i_restart, p.i_pause, p.i_reload] {
        ctx.kernel.set_bool(sig, false)?;
    }
    ctx.kernel.set_u64(p.i_gap_cycles, 0)?;
    ctx.kernel.set_bool(p.m_axis_tready, true)?;
    let cycles = ctx.config().reset.cycles;
    ctx.cycles(cycles)?;
    ctx.kernel.set_bool(p.aresetn, true)?;
    ctx.cycles(cycles)
}

/// Loads the reference file, brings the master out of reset and reloads it.
fn bring_up(ctx: &mut ScenarioContext) -> Result<(AxisPorts, Vec<Sample>), BenchError> {
    let path = ctx.config().data.reference.clone();
    let data = load_reference(&path)?;
    if !data.skipped.is_empty() {
        log::warn!(
            "{}: {} malformed line(s) skipped",
            path.display(),
            data.skipped.len()
        );
    }
    let aclk = ctx.clock("aclk")?;
    let (p, _) = AxisMasterFile::instantiate(&mut ctx.kernel, aclk, ReferenceFile(path))?;
    reset_master(ctx, &p)?;
    ctx.start_observer(AxisObserver::new(&p));
    ctx.pulse(p.i_reload)?;
    ctx.cycles(5)?;
    Ok((p, data.samples))
}

/// Runs until the done pulse, for at most `ceiling` cycles.
pub(crate) fn wait_done(
    ctx: &mut ScenarioContext,
    p: &AxisPorts,
    ceiling: u64,
) -> Result<u64, BenchError> {
    let done = p.o_done_pulse;
    ctx.wait_until(ceiling, "o_done_pulse", move |k| k.level(done) == Level::One)
}

/// Stops the observer and compares what it saw with `expected`.
///
/// A timed-out wait is recorded as a failure and the comparison still runs,
/// so a short stream also reports a data count mismatch.
pub(crate) fn finish_stream(
    ctx: &mut ScenarioContext,
    expected: &[Sample],
    waited: Result<u64, BenchError>,
) -> Result<Vec<Transfer>, BenchError> {
    match waited {
        Ok(cycles) => {
            log::info!("done pulse after {cycles} cycles");
            ctx.cycles(DRAIN_CYCLES)?;
        }
        Err(err) => ctx.fail(reason_for(err)),
    }
    let transfers = collect(ctx);
    let data: Vec<Sample> = transfers.iter().map(|t| t.data).collect();
    ctx.compare(expected, &data);
    Ok(transfers)
}

/// Stops the observer and returns its transfers.
pub(crate) fn collect(ctx: &mut ScenarioContext) -> Vec<Transfer> {
    match ctx.stop_observer() {
        Some(observer) => {
            ctx.check(
                observer.undefined_beats() == 0,
                format!("{} accepted beat(s) carried undefined data", observer.undefined_beats()),
            );
            observer.into_received()
        }
        None => {
            ctx.check(false, "observer was not running");
            Vec::new()
        }
    }
}

/// Checks that `tlast` marks exactly every `len`-th transfer.
fn check_framing(ctx: &mut ScenarioContext, transfers: &[Transfer], len: usize) {
    if len == 0 {
        return;
    }
    let misframed = transfers
        .iter()
        .enumerate()
        .filter(|(i, t)| t.last != ((i + 1) % len == 0))
        .count();
    ctx.check(
        misframed == 0,
        format!("{misframed} transfer(s) with tlast on the wrong beat"),
    );
}

fn require_data(ctx: &mut ScenarioContext, expected: &[Sample]) -> bool {
    ctx.check(!expected.is_empty(), "reference file holds no samples")
}

fn oneshot(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    ctx.pulse(p.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    let transfers = finish_stream(ctx, &expected, waited)?;
    check_framing(ctx, &transfers, expected.len());
    Ok(())
}

fn loop_mode(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    if !require_data(ctx, &expected) {
        return Ok(());
    }
    let n = expected.len();
    ctx.kernel.set_bool(p.i_loop, true)?;
    ctx.pulse(p.i_start)?;
    let busy = p.o_busy;
    let start_ceiling = ctx.config().watchdog.start_cycles;
    ctx.wait_until(start_ceiling, "o_busy", move |k| k.level(busy) == Level::One)?;
    ctx.cycles(2 * n as u64)?;
    ctx.kernel.set_bool(p.i_loop, false)?;

    let ceiling = ctx.config().watchdog.done_cycles;
    if let Err(err) = wait_done(ctx, &p, ceiling) {
        ctx.fail(reason_for(err));
    } else {
        ctx.cycles(DRAIN_CYCLES)?;
    }
    let transfers = collect(ctx);
    ctx.check(
        transfers.len() > n,
        format!("loop mode sent {} words for a {n}-word file", transfers.len()),
    );
    ctx.check(
        transfers.len() % n == 0,
        format!("loop stopped mid-pass after {} words", transfers.len()),
    );
    let repeated: Vec<Sample> = expected.iter().copied().cycle().take(transfers.len()).collect();
    let data: Vec<Sample> = transfers.iter().map(|t| t.data).collect();
    ctx.compare(&repeated, &data);
    check_framing(ctx, &transfers, n);
    Ok(())
}

fn pause_resume(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    if !require_data(ctx, &expected) {
        return Ok(());
    }
    ctx.pulse(p.i_start)?;
    ctx.cycles((expected.len() as u64 / 2).min(20))?;

    ctx.kernel.set_bool(p.i_pause, true)?;
    ctx.kernel.settle()?;
    let paused_at = ctx.received_count();
    ctx.cycles(20)?;
    let during = ctx.received_count();
    ctx.check(
        during == paused_at,
        format!("{} transfer(s) while paused", during - paused_at),
    );
    ctx.expect_level(p.m_axis_tvalid, Level::Zero, "while paused");

    ctx.kernel.set_bool(p.i_pause, false)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    let transfers = finish_stream(ctx, &expected, waited)?;
    ctx.check(
        transfers.len() > paused_at,
        "no transfers after resume",
    );
    Ok(())
}

fn restart(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    if !require_data(ctx, &expected) {
        return Ok(());
    }
    ctx.pulse(p.i_start)?;
    ctx.cycles((expected.len() as u64 / 2).min(20))?;
    ctx.pulse(p.i_restart)?;
    let partial: Vec<Sample> = collect(ctx).iter().map(|t| t.data).collect();
    ctx.check(
        expected.starts_with(&partial),
        "words before the restart are not a prefix of the file",
    );
    log::info!("restarted after {} words", partial.len());

    ctx.start_observer(AxisObserver::new(&p));
    ctx.cycles(5)?;
    ctx.pulse(p.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    finish_stream(ctx, &expected, waited)?;
    Ok(())
}

fn gap_cycles(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    const GAP: u64 = 5;
    let (p, expected) = bring_up(ctx)?;
    ctx.kernel.set_u64(p.i_gap_cycles, GAP)?;
    ctx.pulse(p.i_start)?;
    let n = expected.len() as u64;
    let ceiling = (GAP + 1) * n + ctx.config().watchdog.start_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    if let Ok(taken) = &waited {
        let minimum = (GAP + 1) * n.saturating_sub(1);
        ctx.check(
            *taken >= minimum,
            format!("pass took {taken} cycles, gaps need at least {minimum}"),
        );
    }
    finish_stream(ctx, &expected, waited)?;
    Ok(())
}

fn backpressure(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    let mode = BackpressureMode::from(&ctx.config().backpressure);
    ctx.start_backpressure(p.m_axis_tready, mode)?;
    ctx.pulse(p.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    ctx.stop_backpressure()?;
    let transfers = finish_stream(ctx, &expected, waited)?;
    check_framing(ctx, &transfers, expected.len());
    ctx.expect_level(p.m_axis_tready, Level::One, "after backpressure");
    Ok(())
}

fn sent_count(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    let initial = ctx.kernel.read_u64(p.o_sent_count);
    ctx.check(
        initial == Some(0),
        format!("o_sent_count after reload is {initial:?}"),
    );
    ctx.pulse(p.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    let final_count = ctx.kernel.read_u64(p.o_sent_count);
    let completed = waited.is_ok();
    let transfers = finish_stream(ctx, &expected, waited)?;
    if completed {
        ctx.check(
            final_count == Some(transfers.len() as u64),
            format!(
                "o_sent_count {final_count:?} at done, {} transfers observed",
                transfers.len()
            ),
        );
    }
    Ok(())
}

fn file_comparison(ctx: &mut ScenarioContext) -> Result<(), BenchError> {
    let (p, expected) = bring_up(ctx)?;
    let stalls: Vec<bool> = (0..expected.len().min(64) * 2).map(|i| i % 3 != 1).collect();
    ctx.start_backpressure(p.m_axis_tready, BackpressureMode::Pattern(stalls))?;
    ctx.pulse(p.i_start)?;
    let ceiling = ctx.config().watchdog.done_cycles;
    let waited = wait_done(ctx, &p, ceiling);
    let transfers = finish_stream(ctx, &expected, waited)?;
    check_framing(ctx, &transfers, expected.len());
    Ok(())
}
