//! Scenario context and runner.
//!
//! A [`ScenarioContext`] owns everything one scenario touches: the kernel,
//! the configuration, the handles of the observer and backpressure tasks,
//! and the failure reasons collected so far. Scenario bodies drive the
//! kernel imperatively and record soft failures through the context; a
//! returned error ends the scenario early and becomes one more reason.

use serde::Serialize;
use vigil_common::{Level, Sample};
use vigil_config::{BenchConfig, ConfigError};
use vigil_sim::{spawn_clock, SignalId, SimError, SimKernel, SimTime, TaskHandle};

use crate::backpressure::{BackpressureInjector, BackpressureMode};
use crate::error::BenchError;
use crate::observer::AxisObserver;
use crate::scoreboard::{compare, ComparisonReport, FailureReason};

/// A scenario body.
pub type ScenarioFn = fn(&mut ScenarioContext) -> Result<(), BenchError>;

/// A registered scenario.
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Name within its suite.
    pub name: &'static str,
    /// Owning suite.
    pub suite: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// The body.
    pub run: ScenarioFn,
}

impl Scenario {
    /// `suite::name`.
    pub fn id(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .finish()
    }
}

/// The verdict of one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Owning suite.
    pub suite: String,
    /// True when no failure reason was recorded.
    pub passed: bool,
    /// Every failure recorded, in order.
    pub reasons: Vec<FailureReason>,
    /// The stream comparison, for scenarios that make one.
    pub comparison: Option<ComparisonReport>,
    /// Rising clock edges elapsed, zero for unclocked scenarios.
    pub cycles: u64,
    /// Simulated time when the scenario ended.
    pub final_time: SimTime,
}

struct Backpressure {
    handle: TaskHandle<BackpressureInjector>,
    ready: SignalId,
}

/// State owned by a running scenario.
pub struct ScenarioContext {
    /// The scenario's private kernel.
    pub kernel: SimKernel,
    config: BenchConfig,
    clock: Option<(SignalId, u64)>,
    observer: Option<TaskHandle<AxisObserver>>,
    backpressure: Option<Backpressure>,
    reasons: Vec<FailureReason>,
    comparison: Option<ComparisonReport>,
}

impl ScenarioContext {
    /// A fresh context with an empty kernel.
    pub fn new(config: BenchConfig) -> Self {
        Self {
            kernel: SimKernel::new(),
            config,
            clock: None,
            observer: None,
            backpressure: None,
            reasons: Vec::new(),
            comparison: None,
        }
    }

    /// The bench configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// The configured clock period in femtoseconds.
    pub fn period_fs(&self) -> Result<u64, BenchError> {
        self.config
            .clock
            .period_fs()
            .map_err(|e| ConfigError::ValidationError(format!("clock.period: {e}")).into())
    }

    /// Declares the scenario clock `name` at the configured period.
    pub fn clock(&mut self, name: &str) -> Result<SignalId, BenchError> {
        let period = self.period_fs()?;
        let clk = spawn_clock(&mut self.kernel, name, period)?;
        self.clock = Some((clk, period));
        Ok(clk)
    }

    fn clk(&self) -> Result<SignalId, BenchError> {
        self.clock.map(|(clk, _)| clk).ok_or_else(|| {
            SimError::UnknownSignal {
                name: "<scenario clock>".to_string(),
            }
            .into()
        })
    }

    /// Runs `n` rising edges of the scenario clock.
    pub fn cycles(&mut self, n: u64) -> Result<(), BenchError> {
        let clk = self.clk()?;
        self.kernel.run_cycles(clk, n)?;
        Ok(())
    }

    /// Drives `signal` high for one clock cycle.
    pub fn pulse(&mut self, signal: SignalId) -> Result<(), BenchError> {
        let clk = self.clk()?;
        self.kernel.set_bool(signal, true)?;
        self.kernel.run_until_rising(clk)?;
        self.kernel.set_bool(signal, false)?;
        Ok(())
    }

    /// Runs until `done` holds after a rising edge, for at most `max_cycles`.
    pub fn wait_until<F>(
        &mut self,
        max_cycles: u64,
        waiting_for: &str,
        done: F,
    ) -> Result<u64, BenchError>
    where
        F: FnMut(&SimKernel) -> bool,
    {
        let clk = self.clk()?;
        Ok(self.kernel.run_until(clk, max_cycles, waiting_for, done)?)
    }

    /// Records a failed check if `condition` is false.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            let message = message.into();
            log::warn!("check failed: {message}");
            self.reasons.push(FailureReason::Check(message));
        }
        condition
    }

    /// Checks that `signal` reads as `expected`.
    pub fn expect_level(&mut self, signal: SignalId, expected: Level, context: &str) -> bool {
        let actual = self.kernel.level(signal);
        let name = self.kernel.signal_name(signal).to_string();
        self.check(
            actual == expected,
            format!("{context}: {name} expected {expected}, got {actual}"),
        )
    }

    /// Records a failure reason.
    pub fn fail(&mut self, reason: FailureReason) {
        log::warn!("{reason}");
        self.reasons.push(reason);
    }

    /// The reasons recorded so far.
    pub fn reasons(&self) -> &[FailureReason] {
        &self.reasons
    }

    /// Spawns `observer` as the scenario's stream observer.
    ///
    /// An observer that is already running is stopped first.
    pub fn start_observer(&mut self, observer: AxisObserver) {
        self.stop_observer();
        self.observer = Some(self.kernel.spawn(observer));
    }

    /// Transfers recorded so far by the running observer.
    pub fn received_count(&self) -> usize {
        self.observer
            .and_then(|h| self.kernel.task(&h))
            .map_or(0, |o| o.received().len())
    }

    /// Cancels the observer and takes it back. `None` if none is running.
    pub fn stop_observer(&mut self) -> Option<AxisObserver> {
        let handle = self.observer.take()?;
        self.kernel.cancel(handle)
    }

    /// Spawns a backpressure injector driving `ready`.
    pub fn start_backpressure(&mut self, ready: SignalId, mode: BackpressureMode) -> Result<(), BenchError> {
        let clk = self.clk()?;
        self.stop_backpressure()?;
        let handle = self
            .kernel
            .spawn(BackpressureInjector::new(clk, ready, mode));
        self.backpressure = Some(Backpressure { handle, ready });
        Ok(())
    }

    /// Cancels the injector and drives ready high.
    ///
    /// Returns the injector, or `None` if none was running.
    pub fn stop_backpressure(&mut self) -> Result<Option<BackpressureInjector>, BenchError> {
        let Some(bp) = self.backpressure.take() else {
            return Ok(None);
        };
        let injector = self.kernel.cancel(bp.handle);
        self.kernel.set_bool(bp.ready, true)?;
        if let Some(i) = &injector {
            log::debug!(
                "backpressure stopped after {} stalls ({} cycles)",
                i.stalls(),
                i.stalled_cycles()
            );
        }
        Ok(injector)
    }

    /// Compares received data with the expected sequence and records the result.
    pub fn compare(&mut self, expected: &[Sample], received: &[Sample]) -> bool {
        let report = compare(expected, received);
        let passed = report.passed();
        if !passed {
            log::info!(
                "comparison failed:\n{}",
                report.summary(self.config.report.max_mismatches)
            );
        }
        self.reasons.extend(report.failures());
        self.comparison = Some(report);
        passed
    }

    /// Stops any helper task, restores ready and settles the kernel.
    pub fn finish(&mut self) -> Result<(), BenchError> {
        self.stop_observer();
        self.stop_backpressure()?;
        self.kernel.settle()?;
        Ok(())
    }

    fn into_outcome(self, scenario: &Scenario) -> ScenarioOutcome {
        let final_time = self.kernel.current_time();
        let cycles = self
            .clock
            .map_or(0, |(_, period)| (final_time.fs + period / 2) / period.max(1));
        ScenarioOutcome {
            name: scenario.name.to_string(),
            suite: scenario.suite.to_string(),
            passed: self.reasons.is_empty(),
            reasons: self.reasons,
            comparison: self.comparison,
            cycles,
            final_time,
        }
    }
}

/// Maps an error that ended a scenario to a failure reason.
pub fn reason_for(err: BenchError) -> FailureReason {
    match err {
        BenchError::Sim(SimError::Timeout {
            waiting_for,
            cycles,
        }) => FailureReason::Timeout {
            waiting_for,
            cycles,
        },
        BenchError::Sim(other) => FailureReason::Simulation(other.to_string()),
        BenchError::Load(e) => FailureReason::Setup(e.to_string()),
        BenchError::Config(e) => FailureReason::Setup(e.to_string()),
        BenchError::UnknownScenario(name) => FailureReason::Setup(format!("unknown scenario '{name}'")),
    }
}

/// Runs one scenario in a fresh context.
pub fn run(scenario: &Scenario, config: &BenchConfig) -> ScenarioOutcome {
    log::info!("running {}", scenario.id());
    let mut ctx = ScenarioContext::new(config.clone());
    if let Err(err) = (scenario.run)(&mut ctx) {
        ctx.fail(reason_for(err));
    }
    if let Err(err) = ctx.finish() {
        ctx.fail(reason_for(err));
    }
    let outcome = ctx.into_outcome(scenario);
    log::info!(
        "{} {} at {}",
        scenario.id(),
        if outcome.passed { "passed" } else { "failed" },
        outcome.final_time
    );
    outcome
}
