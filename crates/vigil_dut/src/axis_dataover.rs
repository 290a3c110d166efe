//! Playback master with a threshold comparator watching its data bus.

use vigil_common::{Comparison, Sample};
use vigil_sim::{SignalId, SimError, SimKernel, TaskHandle};

use crate::axis::{AxisMasterFile, AxisPorts, ImageSource};
use crate::comparator::Comparator;

/// Threshold the combined circuit compares `m_axis_tdata` against.
pub const DEFAULT_DATAOVER_THRESHOLD: i32 = 1_000_000;

/// Ports of an [`AxisDataover`].
#[derive(Clone, Copy, Debug)]
pub struct AxisDataoverPorts {
    /// The master's bus and control ports.
    pub axis: AxisPorts,
    /// High while `m_axis_tdata` is strictly above the threshold.
    pub data_over: SignalId,
}

/// Builder for the combined master and comparator.
pub struct AxisDataover;

impl AxisDataover {
    /// Instantiates the master on `aclk` and attaches a signed comparator to its data bus.
    pub fn instantiate(
        kernel: &mut SimKernel,
        aclk: SignalId,
        source: impl ImageSource,
        threshold: Sample,
    ) -> Result<(AxisDataoverPorts, TaskHandle<AxisMasterFile>), SimError> {
        let (axis, master) = AxisMasterFile::instantiate(kernel, aclk, source)?;
        let data_over = Comparator::attach(
            kernel,
            axis.m_axis_tdata,
            threshold,
            "data_over",
            Comparison::Signed,
        )?;
        Ok((AxisDataoverPorts { axis, data_over }, master))
    }
}
