//! Consumer-side backpressure on `tready`.
//!
//! The injector is a kernel task that decides on every rising clock edge
//! what `tready` will be for the next cycle. Random mode is seeded so that a
//! scenario replays the same stall pattern every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vigil_config::BackpressureConfig;
use vigil_sim::{Process, ProcessContext, SignalId, SimError, Wait};

/// How the injector drives ready.
#[derive(Clone, Debug, PartialEq)]
pub enum BackpressureMode {
    /// While ready is asserted, start a stall with `probability` each cycle;
    /// a stall lasts `min_run..=max_run` cycles.
    Random {
        /// Chance per cycle of starting a stall.
        probability: f64,
        /// Shortest stall.
        min_run: u32,
        /// Longest stall.
        max_run: u32,
        /// Generator seed.
        seed: u64,
    },
    /// Ready for each successive cycle; asserted again once exhausted.
    Pattern(Vec<bool>),
}

impl From<&BackpressureConfig> for BackpressureMode {
    fn from(config: &BackpressureConfig) -> Self {
        BackpressureMode::Random {
            probability: config.probability,
            min_run: config.min_run,
            max_run: config.max_run,
            seed: config.seed,
        }
    }
}

enum Driver {
    Random {
        rng: StdRng,
        probability: f64,
        min_run: u32,
        max_run: u32,
        stall_left: u32,
    },
    Pattern {
        pattern: Vec<bool>,
        next: usize,
    },
}

/// Drives a ready signal according to a [`BackpressureMode`].
pub struct BackpressureInjector {
    clk: SignalId,
    ready: SignalId,
    driver: Driver,
    stalled_cycles: u64,
    stalls: u64,
}

impl BackpressureInjector {
    /// An injector driving `ready`, clocked by `clk`.
    pub fn new(clk: SignalId, ready: SignalId, mode: BackpressureMode) -> Self {
        let driver = match mode {
            BackpressureMode::Random {
                probability,
                min_run,
                max_run,
                seed,
            } => Driver::Random {
                rng: StdRng::seed_from_u64(seed),
                probability: if probability.is_nan() {
                    0.0
                } else {
                    probability.clamp(0.0, 1.0)
                },
                min_run: min_run.max(1),
                max_run: max_run.max(min_run.max(1)),
                stall_left: 0,
            },
            BackpressureMode::Pattern(pattern) => Driver::Pattern { pattern, next: 0 },
        };
        Self {
            clk,
            ready,
            driver,
            stalled_cycles: 0,
            stalls: 0,
        }
    }

    /// Cycles for which ready was driven low.
    pub fn stalled_cycles(&self) -> u64 {
        self.stalled_cycles
    }

    /// Number of distinct stalls started.
    pub fn stalls(&self) -> u64 {
        self.stalls
    }

    /// Ready for the coming cycle, or `None` once a pattern is exhausted.
    fn next_ready(&mut self) -> Option<bool> {
        match &mut self.driver {
            Driver::Random {
                rng,
                probability,
                min_run,
                max_run,
                stall_left,
            } => {
                if *stall_left == 0 {
                    if !rng.gen_bool(*probability) {
                        return Some(true);
                    }
                    // The stalled cycles, then one ready cycle before the next roll.
                    *stall_left = rng.gen_range(*min_run..=*max_run) + 1;
                    self.stalls += 1;
                }
                *stall_left -= 1;
                Some(*stall_left == 0)
            }
            Driver::Pattern { pattern, next } => {
                let ready = pattern.get(*next).copied();
                *next += 1;
                if ready == Some(false) {
                    let starts = *next == 1 || pattern.get(*next - 2) != Some(&false);
                    if starts {
                        self.stalls += 1;
                    }
                }
                ready
            }
        }
    }
}

impl Process for BackpressureInjector {
    fn name(&self) -> &str {
        "backpressure"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError> {
        match self.next_ready() {
            Some(ready) => {
                if !ready {
                    self.stalled_cycles += 1;
                }
                ctx.set_bool(self.ready, ready)?;
                Ok(Wait::rising(self.clk))
            }
            None => {
                ctx.set_bool(self.ready, true)?;
                log::debug!("backpressure pattern finished at {}", ctx.now());
                Ok(Wait::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::Level;
    use vigil_sim::{spawn_clock, SimKernel, TaskHandle};

    fn setup(mode: BackpressureMode) -> (SimKernel, SignalId, SignalId, TaskHandle<BackpressureInjector>) {
        let mut k = SimKernel::new();
        let clk = spawn_clock(&mut k, "aclk", 10).unwrap();
        let ready = k.add_signal("tready", 1).unwrap();
        let h = k.spawn(BackpressureInjector::new(clk, ready, mode));
        (k, clk, ready, h)
    }

    /// Ready as seen by a consumer sampling on each rising edge.
    fn trace(k: &mut SimKernel, clk: SignalId, ready: SignalId, cycles: usize) -> Vec<Level> {
        let mut levels = Vec::with_capacity(cycles);
        k.settle().unwrap();
        for _ in 0..cycles {
            levels.push(k.level(ready));
            k.run_until_rising(clk).unwrap();
        }
        levels
    }

    #[test]
    fn pattern_then_reasserts() {
        let (mut k, clk, ready, h) = setup(BackpressureMode::Pattern(vec![
            true, false, false, true, false,
        ]));
        let levels = trace(&mut k, clk, ready, 7);
        use Level::{One, Zero};
        assert_eq!(levels, [One, Zero, Zero, One, Zero, One, One]);
        assert!(!k.is_running(&h));
        assert_eq!(k.task(&h).unwrap().stalls(), 2);
        assert_eq!(k.task(&h).unwrap().stalled_cycles(), 3);
    }

    #[test]
    fn empty_pattern_is_always_ready() {
        let (mut k, clk, ready, h) = setup(BackpressureMode::Pattern(Vec::new()));
        let levels = trace(&mut k, clk, ready, 3);
        assert!(levels.iter().all(|&l| l == Level::One));
        assert!(!k.is_running(&h));
    }

    #[test]
    fn probability_zero_never_stalls() {
        let (mut k, clk, ready, h) = setup(BackpressureMode::Random {
            probability: 0.0,
            min_run: 1,
            max_run: 5,
            seed: 3,
        });
        let levels = trace(&mut k, clk, ready, 50);
        assert!(levels.iter().all(|&l| l == Level::One));
        assert_eq!(k.task(&h).unwrap().stalls(), 0);
    }

    #[test]
    fn probability_one_stalls_within_bounds() {
        let (mut k, clk, ready, h) = setup(BackpressureMode::Random {
            probability: 1.0,
            min_run: 2,
            max_run: 4,
            seed: 11,
        });
        let levels = trace(&mut k, clk, ready, 200);
        // Every stall run is 2..=4 cycles and separated by a single ready cycle.
        let mut run = 0;
        for &level in &levels {
            if level == Level::Zero {
                run += 1;
            } else {
                assert!(run == 0 || (2..=4).contains(&run), "stall of {run} cycles");
                run = 0;
            }
        }
        assert!(k.task(&h).unwrap().stalls() > 10);
    }

    #[test]
    fn same_seed_same_trace() {
        let mode = BackpressureMode::Random {
            probability: 0.3,
            min_run: 1,
            max_run: 5,
            seed: 42,
        };
        let (mut a, clk_a, ready_a, _) = setup(mode.clone());
        let (mut b, clk_b, ready_b, _) = setup(mode);
        assert_eq!(
            trace(&mut a, clk_a, ready_a, 100),
            trace(&mut b, clk_b, ready_b, 100)
        );
    }

    #[test]
    fn from_config() {
        let config = BackpressureConfig::default();
        assert_eq!(
            BackpressureMode::from(&config),
            BackpressureMode::Random {
                probability: 0.3,
                min_run: 1,
                max_run: 5,
                seed: 1
            }
        );
    }
}
