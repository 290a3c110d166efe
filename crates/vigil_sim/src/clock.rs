//! Free-running clock generation.

use vigil_common::LogicVec;

use crate::error::SimError;
use crate::kernel::SimKernel;
use crate::process::{Process, ProcessContext, Wait};
use crate::value::SignalId;

/// Drives a 50% duty-cycle clock, starting low at the time it is spawned.
///
/// Odd periods put the extra femtosecond in the low phase.
#[derive(Debug, Clone)]
pub struct ClockGen {
    clk: SignalId,
    low_fs: u64,
    high_fs: u64,
    level: Option<bool>,
}

impl ClockGen {
    /// Creates a generator for `clk` with the given period.
    pub fn new(clk: SignalId, period_fs: u64) -> Result<Self, SimError> {
        if period_fs < 2 {
            return Err(SimError::InvalidClockPeriod { period_fs });
        }
        let high_fs = period_fs / 2;
        Ok(Self {
            clk,
            low_fs: period_fs - high_fs,
            high_fs,
            level: None,
        })
    }

    /// The full clock period in femtoseconds.
    pub fn period_fs(&self) -> u64 {
        self.low_fs + self.high_fs
    }
}

impl Process for ClockGen {
    fn name(&self) -> &str {
        "clock"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError> {
        let next = match self.level {
            None => false,
            Some(level) => !level,
        };
        ctx.set_bool(self.clk, next)?;
        self.level = Some(next);
        Ok(Wait::delay(if next { self.high_fs } else { self.low_fs }))
    }
}

/// Declares a 1-bit clock signal, initially low, and spawns its generator.
pub fn spawn_clock(kernel: &mut SimKernel, name: &str, period_fs: u64) -> Result<SignalId, SimError> {
    let clk = kernel.add_signal_init(name, LogicVec::from_bool(false))?;
    let generator = ClockGen::new(clk, period_fs)?;
    log::debug!("clock '{name}' with period {period_fs} fs");
    kernel.spawn(generator);
    Ok(clk)
}
