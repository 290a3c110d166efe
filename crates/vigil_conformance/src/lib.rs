//! Conformance test fixtures for the Vigil verification harness.
//!
//! Provides on-disk bench directories with reference data and a
//! `vigil.toml`, and a ready-to-run playback master on a fresh kernel, for
//! the integration tests under `tests/`.

#![warn(missing_docs)]

use std::path::Path;

use tempfile::TempDir;
use vigil_bench::datagen::sine_q31;
use vigil_bench::{write_reference, Radix};
use vigil_common::{Sample, FS_PER_NS};
use vigil_config::{load_config, BenchConfig, CONFIG_FILE_NAME};
use vigil_dut::{AxisMasterFile, AxisPorts};
use vigil_sim::{spawn_clock, SimKernel};

/// A temporary bench directory with data files and a loaded configuration.
pub struct BenchDir {
    dir: TempDir,
    /// Configuration loaded from the directory.
    pub config: BenchConfig,
}

impl BenchDir {
    /// A bench directory with default configuration.
    pub fn new(reference: &[Sample], test_data: &[Sample]) -> Self {
        Self::with_toml("", reference, test_data)
    }

    /// A bench directory whose `vigil.toml` holds `toml`.
    ///
    /// The data files are written as `data.csv` (decimal) and
    /// `test_data.csv` (hex) unless `toml` points elsewhere.
    pub fn with_toml(toml: &str, reference: &[Sample], test_data: &[Sample]) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), toml).unwrap();
        write_reference(&dir.path().join("data.csv"), reference, Radix::Decimal).unwrap();
        write_reference(&dir.path().join("test_data.csv"), test_data, Radix::Hex).unwrap();
        let config = load_config(dir.path()).unwrap();
        Self { dir, config }
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Converts signed literals to samples.
pub fn samples(values: &[i32]) -> Vec<Sample> {
    values.iter().map(|&v| Sample::from_signed(v)).collect()
}

/// One second of a 5 Hz sine at 100 Hz: 101 Q31 samples.
pub fn small_sine() -> Vec<Sample> {
    sine_q31(100, 5.0, 1)
}

/// Installs a test logger; repeated calls are harmless.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A playback master on its own kernel, out of reset with `tready` high.
pub struct StreamRig {
    /// The kernel.
    pub kernel: SimKernel,
    /// The master's ports.
    pub ports: AxisPorts,
}

impl StreamRig {
    /// Builds the rig with a 10 ns clock and runs three reset cycles.
    pub fn new(image: Vec<Sample>) -> Self {
        let mut kernel = SimKernel::new();
        let aclk = spawn_clock(&mut kernel, "aclk", 10 * FS_PER_NS).unwrap();
        let (ports, _) = AxisMasterFile::instantiate(&mut kernel, aclk, image).unwrap();
        let p = ports;
        kernel.set_bool(p.aresetn, false).unwrap();
        for sig in [p.i_start, p.i_loop, p.i_restart, p.i_pause, p.i_reload] {
            kernel.set_bool(sig, false).unwrap();
        }
        kernel.set_u64(p.i_gap_cycles, 0).unwrap();
        kernel.set_bool(p.m_axis_tready, true).unwrap();
        kernel.run_cycles(aclk, 3).unwrap();
        kernel.set_bool(p.aresetn, true).unwrap();
        kernel.run_cycles(aclk, 3).unwrap();
        Self { kernel, ports }
    }

    /// Pulses `i_start` for one cycle.
    pub fn start(&mut self) {
        let p = self.ports;
        self.kernel.set_bool(p.i_start, true).unwrap();
        self.kernel.run_until_rising(p.aclk).unwrap();
        self.kernel.set_bool(p.i_start, false).unwrap();
    }
}
