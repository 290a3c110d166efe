//! Combinational threshold comparators ("dataover" circuits).
//!
//! A [`Comparator`] drives `data_over = data_in > threshold` with the
//! threshold taken either from a port or from a constant. A
//! [`ThresholdBank`] is a set of constant-threshold comparators sharing one
//! `data_in`, each with its own `data_over_<label>` output.

use vigil_common::{Comparison, Logic, Sample, SAMPLE_WIDTH};
use vigil_sim::{Process, ProcessContext, SignalId, SimError, SimKernel, Wait};

/// Where a comparator reads its threshold from.
#[derive(Clone, Copy, Debug)]
enum ThresholdInput {
    Port(SignalId),
    Fixed(Sample),
}

/// Ports of a standalone comparator.
#[derive(Clone, Copy, Debug)]
pub struct ComparatorPorts {
    /// 32-bit data input.
    pub data_in: SignalId,
    /// 32-bit threshold input.
    pub threshold: SignalId,
    /// High when `data_in > threshold`.
    pub data_over: SignalId,
}

/// A strict greater-than comparator. Drives X while any input bit is undefined.
#[derive(Debug)]
pub struct Comparator {
    name: String,
    data_in: SignalId,
    threshold: ThresholdInput,
    data_over: SignalId,
    comparison: Comparison,
}

impl Comparator {
    /// Declares `data_in`, `threshold` and `data_over` and spawns the model.
    pub fn instantiate(
        kernel: &mut SimKernel,
        comparison: Comparison,
    ) -> Result<ComparatorPorts, SimError> {
        let ports = ComparatorPorts {
            data_in: kernel.add_signal("data_in", SAMPLE_WIDTH)?,
            threshold: kernel.add_signal("threshold", SAMPLE_WIDTH)?,
            data_over: kernel.add_signal("data_over", 1)?,
        };
        kernel.spawn(Comparator {
            name: "dataover".to_string(),
            data_in: ports.data_in,
            threshold: ThresholdInput::Port(ports.threshold),
            data_over: ports.data_over,
            comparison,
        });
        Ok(ports)
    }

    /// Attaches a constant-threshold comparator to an existing signal.
    ///
    /// Declares the 1-bit `output` signal and returns it.
    pub fn attach(
        kernel: &mut SimKernel,
        data_in: SignalId,
        threshold: Sample,
        output: &str,
        comparison: Comparison,
    ) -> Result<SignalId, SimError> {
        let data_over = kernel.add_signal(output, 1)?;
        kernel.spawn(Comparator {
            name: output.to_string(),
            data_in,
            threshold: ThresholdInput::Fixed(threshold),
            data_over,
            comparison,
        });
        Ok(data_over)
    }
}

impl Process for Comparator {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError> {
        let threshold = match self.threshold {
            ThresholdInput::Port(sig) => ctx.read_sample(sig),
            ThresholdInput::Fixed(value) => Some(value),
        };
        match (ctx.read_sample(self.data_in), threshold) {
            (Some(value), Some(threshold)) => {
                ctx.set_bool(self.data_over, self.comparison.greater(value, threshold))?
            }
            _ => ctx.set_all(self.data_over, Logic::X)?,
        }
        Ok(match self.threshold {
            ThresholdInput::Port(sig) => Wait::change(&[self.data_in, sig]),
            ThresholdInput::Fixed(_) => Wait::change(&[self.data_in]),
        })
    }
}

/// Names a threshold output: `100` becomes `"100"`, `-50` becomes `"neg50"`.
pub fn threshold_label(threshold: Sample) -> String {
    let value = i64::from(threshold.signed());
    if value < 0 {
        format!("neg{}", -value)
    } else {
        value.to_string()
    }
}

/// One output of a [`ThresholdBank`].
#[derive(Clone, Debug)]
pub struct BankOutput {
    /// The constant threshold.
    pub threshold: Sample,
    /// The output's declared name, `data_over_<label>`.
    pub name: String,
    /// The output signal.
    pub signal: SignalId,
}

/// Ports of a [`ThresholdBank`].
#[derive(Clone, Debug)]
pub struct BankPorts {
    /// Shared 32-bit data input.
    pub data_in: SignalId,
    /// One output per threshold, in construction order.
    pub outputs: Vec<BankOutput>,
}

impl BankPorts {
    /// The output signals in threshold order.
    pub fn signals(&self) -> Vec<SignalId> {
        self.outputs.iter().map(|o| o.signal).collect()
    }
}

/// A fixed set of signed comparators sharing one input.
pub struct ThresholdBank;

impl ThresholdBank {
    /// Declares `data_in` and one `data_over_<label>` output per threshold.
    pub fn instantiate(
        kernel: &mut SimKernel,
        thresholds: &[Sample],
    ) -> Result<BankPorts, SimError> {
        let data_in = kernel.add_signal("data_in", SAMPLE_WIDTH)?;
        let mut outputs = Vec::with_capacity(thresholds.len());
        for &threshold in thresholds {
            let name = format!("data_over_{}", threshold_label(threshold));
            let signal =
                Comparator::attach(kernel, data_in, threshold, &name, Comparison::Signed)?;
            outputs.push(BankOutput {
                threshold,
                name,
                signal,
            });
        }
        Ok(BankPorts { data_in, outputs })
    }
}
