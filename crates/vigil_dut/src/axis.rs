//! AXI4-Stream playback master.
//!
//! Streams a memory image one word per accepted handshake. The image comes
//! from an [`ImageSource`] that is read once at construction and again on
//! every `i_reload` pulse.
//!
//! Control inputs are sampled on the rising edge of `aclk`:
//!
//! | input          | effect                                                  |
//! |----------------|---------------------------------------------------------|
//! | `aresetn` low  | synchronous reset to idle, count cleared                |
//! | `i_reload`     | re-reads the image, returns to idle, count cleared      |
//! | `i_restart`    | aborts the current pass and returns to idle             |
//! | `i_start`      | starts a pass from word 0 when idle                     |
//! | `i_loop`       | after the last word, wraps to word 0 instead of stopping|
//! | `i_gap_cycles` | holds `tvalid` low for that many cycles between words   |
//! | `i_pause`      | masks `tvalid` combinationally                          |
//!
//! `o_done_pulse` is high for the one cycle after the final handshake of a
//! non-looping pass, and `o_sent_count` counts handshakes since the pass
//! started. Every output reads as X until the first reset.

use std::error::Error;

use vigil_common::{Level, Logic, Sample, SAMPLE_WIDTH};
use vigil_sim::{
    Edge, Process, ProcessContext, SignalId, SimError, SimKernel, TaskHandle, Trigger, Wait,
};

/// Provides the word image a playback master streams.
pub trait ImageSource: 'static {
    /// A short description for log messages.
    fn describe(&self) -> String;

    /// Reads the image.
    fn load(&mut self) -> Result<Vec<Sample>, Box<dyn Error + Send + Sync>>;
}

impl ImageSource for Vec<Sample> {
    fn describe(&self) -> String {
        format!("{} literal words", self.len())
    }

    fn load(&mut self) -> Result<Vec<Sample>, Box<dyn Error + Send + Sync>> {
        Ok(self.clone())
    }
}

/// Ports of an [`AxisMasterFile`].
#[derive(Clone, Copy, Debug)]
pub struct AxisPorts {
    /// Bus clock.
    pub aclk: SignalId,
    /// Synchronous reset, active low.
    pub aresetn: SignalId,
    /// Start a pass.
    pub i_start: SignalId,
    /// Repeat passes.
    pub i_loop: SignalId,
    /// Abort to idle.
    pub i_restart: SignalId,
    /// Mask `tvalid`.
    pub i_pause: SignalId,
    /// Idle cycles between words (16 bits).
    pub i_gap_cycles: SignalId,
    /// Re-read the image.
    pub i_reload: SignalId,
    /// High while a pass is in progress.
    pub o_busy: SignalId,
    /// One-cycle pulse at the end of a pass.
    pub o_done_pulse: SignalId,
    /// Handshakes in the current pass (32 bits).
    pub o_sent_count: SignalId,
    /// Stream valid.
    pub m_axis_tvalid: SignalId,
    /// Stream ready, driven by the consumer.
    pub m_axis_tready: SignalId,
    /// Stream data (32 bits).
    pub m_axis_tdata: SignalId,
    /// Last word of a pass.
    pub m_axis_tlast: SignalId,
}

impl AxisPorts {
    fn declare(kernel: &mut SimKernel, aclk: SignalId) -> Result<Self, SimError> {
        Ok(Self {
            aclk,
            aresetn: kernel.add_signal("aresetn", 1)?,
            i_start: kernel.add_signal("i_start", 1)?,
            i_loop: kernel.add_signal("i_loop", 1)?,
            i_restart: kernel.add_signal("i_restart", 1)?,
            i_pause: kernel.add_signal("i_pause", 1)?,
            i_gap_cycles: kernel.add_signal("i_gap_cycles", 16)?,
            i_reload: kernel.add_signal("i_reload", 1)?,
            o_busy: kernel.add_signal("o_busy", 1)?,
            o_done_pulse: kernel.add_signal("o_done_pulse", 1)?,
            o_sent_count: kernel.add_signal("o_sent_count", 32)?,
            m_axis_tvalid: kernel.add_signal("m_axis_tvalid", 1)?,
            m_axis_tready: kernel.add_signal("m_axis_tready", 1)?,
            m_axis_tdata: kernel.add_signal("m_axis_tdata", SAMPLE_WIDTH)?,
            m_axis_tlast: kernel.add_signal("m_axis_tlast", 1)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Send,
    /// Cycles left before `tvalid` is raised again.
    Gap(u32),
}

/// The playback master model.
pub struct AxisMasterFile {
    ports: AxisPorts,
    source: Box<dyn ImageSource>,
    image: Vec<Sample>,
    phase: Phase,
    index: usize,
    count: u32,
    valid: bool,
    busy: bool,
    done: bool,
    out_of_reset: bool,
}

impl AxisMasterFile {
    /// Declares the bus ports, reads the image, and spawns the model on `aclk`.
    pub fn instantiate(
        kernel: &mut SimKernel,
        aclk: SignalId,
        source: impl ImageSource,
    ) -> Result<(AxisPorts, TaskHandle<AxisMasterFile>), SimError> {
        let ports = AxisPorts::declare(kernel, aclk)?;
        let mut source: Box<dyn ImageSource> = Box::new(source);
        let image = load_image(source.as_mut())?;
        log::debug!("axis master image: {} ({} words)", source.describe(), image.len());
        let handle = kernel.spawn(AxisMasterFile {
            ports,
            source,
            image,
            phase: Phase::Idle,
            index: 0,
            count: 0,
            valid: false,
            busy: false,
            done: false,
            out_of_reset: false,
        });
        Ok((ports, handle))
    }

    /// The words currently latched for playback.
    pub fn image(&self) -> &[Sample] {
        &self.image
    }

    fn go_idle(&mut self) {
        self.phase = Phase::Idle;
        self.index = 0;
        self.valid = false;
        self.busy = false;
    }

    fn clock(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), SimError> {
        let p = self.ports;
        match ctx.level(p.aresetn) {
            Level::Zero => {
                self.go_idle();
                self.count = 0;
                self.done = false;
                self.out_of_reset = true;
                return Ok(());
            }
            Level::Unknown => return Ok(()),
            Level::One if !self.out_of_reset => return Ok(()),
            Level::One => {}
        }

        self.done = false;
        if ctx.level(p.i_reload) == Level::One {
            self.image = load_image(self.source.as_mut())?;
            log::debug!("axis master reloaded {} words at {}", self.image.len(), ctx.now());
            self.go_idle();
            self.count = 0;
            return Ok(());
        }
        if ctx.level(p.i_restart) == Level::One {
            self.go_idle();
            return Ok(());
        }

        match self.phase {
            Phase::Idle => {
                if ctx.level(p.i_start) == Level::One {
                    self.count = 0;
                    if self.image.is_empty() {
                        self.done = true;
                    } else {
                        self.phase = Phase::Send;
                        self.index = 0;
                        self.valid = true;
                        self.busy = true;
                    }
                }
            }
            Phase::Send => {
                let accepted = self.valid
                    && ctx.level(p.i_pause) == Level::Zero
                    && ctx.level(p.m_axis_tready) == Level::One;
                if accepted {
                    self.count = self.count.wrapping_add(1);
                    let gap = ctx.read_u64(p.i_gap_cycles).unwrap_or(0) as u32;
                    self.advance(gap, ctx.level(p.i_loop) == Level::One);
                }
            }
            Phase::Gap(remaining) => {
                if remaining <= 1 {
                    self.phase = Phase::Send;
                    self.valid = true;
                } else {
                    self.phase = Phase::Gap(remaining - 1);
                }
            }
        }
        Ok(())
    }

    fn advance(&mut self, gap: u32, looping: bool) {
        let last = self.index + 1 >= self.image.len();
        if last && !looping {
            self.done = true;
            self.go_idle();
            return;
        }
        self.index = if last { 0 } else { self.index + 1 };
        if gap > 0 {
            self.phase = Phase::Gap(gap);
            self.valid = false;
        }
    }

    fn drive(&self, ctx: &mut ProcessContext<'_>) -> Result<(), SimError> {
        let p = self.ports;
        let tvalid = if self.valid {
            match ctx.level(p.i_pause) {
                Level::Zero => Logic::One,
                Level::One => Logic::Zero,
                Level::Unknown => Logic::X,
            }
        } else {
            Logic::Zero
        };
        let word = if self.busy {
            self.image.get(self.index).copied().unwrap_or_default()
        } else {
            Sample::default()
        };
        ctx.set_all(p.m_axis_tvalid, tvalid)?;
        ctx.set_sample(p.m_axis_tdata, word)?;
        ctx.set_bool(
            p.m_axis_tlast,
            self.busy && self.index + 1 == self.image.len(),
        )?;
        ctx.set_bool(p.o_busy, self.busy)?;
        ctx.set_bool(p.o_done_pulse, self.done)?;
        ctx.set_u64(p.o_sent_count, u64::from(self.count))
    }
}

fn load_image(source: &mut dyn ImageSource) -> Result<Vec<Sample>, SimError> {
    source.load().map_err(|e| SimError::TaskFailed {
        task: "axis_master_file".to_string(),
        reason: format!("cannot read {}: {e}", source.describe()),
    })
}

impl Process for AxisMasterFile {
    fn name(&self) -> &str {
        "axis_master_file"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError> {
        if ctx.rose(self.ports.aclk) {
            self.clock(ctx)?;
        }
        if self.out_of_reset {
            self.drive(ctx)?;
        }
        Ok(Wait::Any(vec![
            Trigger::Edge(self.ports.aclk, Edge::Rising),
            Trigger::Change(self.ports.i_pause),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::FS_PER_NS;
    use vigil_sim::spawn_clock;

    fn words(values: &[i32]) -> Vec<Sample> {
        values.iter().map(|&v| Sample::from_signed(v)).collect()
    }

    fn setup(image: Vec<Sample>) -> (SimKernel, AxisPorts, TaskHandle<AxisMasterFile>) {
        let mut k = SimKernel::new();
        let aclk = spawn_clock(&mut k, "aclk", 10 * FS_PER_NS).unwrap();
        let (p, h) = AxisMasterFile::instantiate(&mut k, aclk, image).unwrap();
        k.set_bool(p.aresetn, false).unwrap();
        for sig in [p.i_start, p.i_loop, p.i_restart, p.i_pause, p.i_reload] {
            k.set_bool(sig, false).unwrap();
        }
        k.set_u64(p.i_gap_cycles, 0).unwrap();
        k.set_bool(p.m_axis_tready, true).unwrap();
        k.run_cycles(aclk, 2).unwrap();
        k.set_bool(p.aresetn, true).unwrap();
        k.run_cycles(aclk, 2).unwrap();
        (k, p, h)
    }

    fn pulse(k: &mut SimKernel, p: &AxisPorts, sig: SignalId) {
        k.set_bool(sig, true).unwrap();
        k.run_until_rising(p.aclk).unwrap();
        k.set_bool(sig, false).unwrap();
    }

    /// Collects (data, last) on each rising edge with tvalid and tready high.
    fn collect_until_done(k: &mut SimKernel, p: &AxisPorts, max: u64) -> Vec<(i32, bool)> {
        let mut beats = Vec::new();
        for _ in 0..max {
            let handshake =
                k.level(p.m_axis_tvalid) == Level::One && k.level(p.m_axis_tready) == Level::One;
            let beat = (
                k.read_sample(p.m_axis_tdata).map(Sample::signed),
                k.level(p.m_axis_tlast),
            );
            k.run_until_rising(p.aclk).unwrap();
            if handshake {
                beats.push((beat.0.unwrap(), beat.1 == Level::One));
            }
            if k.level(p.o_done_pulse) == Level::One {
                return beats;
            }
        }
        panic!("no done pulse within {max} cycles");
    }

    #[test]
    fn outputs_unknown_before_reset() {
        let mut k = SimKernel::new();
        let aclk = spawn_clock(&mut k, "aclk", 10).unwrap();
        let (p, _) = AxisMasterFile::instantiate(&mut k, aclk, words(&[1])).unwrap();
        k.run_cycles(aclk, 3).unwrap();
        assert_eq!(k.level(p.m_axis_tvalid), Level::Unknown);
        assert_eq!(k.read_u64(p.o_sent_count), None);
    }

    #[test]
    fn idle_after_reset() {
        let (k, p, h) = setup(words(&[1, 2]));
        assert_eq!(k.level(p.m_axis_tvalid), Level::Zero);
        assert_eq!(k.level(p.o_busy), Level::Zero);
        assert_eq!(k.read_u64(p.o_sent_count), Some(0));
        assert_eq!(k.task(&h).unwrap().image().len(), 2);
    }

    #[test]
    fn oneshot_streams_image_with_tlast() {
        let (mut k, p, _) = setup(words(&[10, -20, 30]));
        pulse(&mut k, &p, p.i_start);
        assert_eq!(k.level(p.o_busy), Level::One);
        let beats = collect_until_done(&mut k, &p, 50);
        assert_eq!(beats, vec![(10, false), (-20, false), (30, true)]);
        assert_eq!(k.read_u64(p.o_sent_count), Some(3));
        assert_eq!(k.level(p.o_busy), Level::Zero);
        k.run_until_rising(p.aclk).unwrap();
        assert_eq!(k.level(p.o_done_pulse), Level::Zero);
    }

    #[test]
    fn pause_masks_tvalid_immediately() {
        let (mut k, p, _) = setup(words(&[1, 2, 3]));
        pulse(&mut k, &p, p.i_start);
        assert_eq!(k.level(p.m_axis_tvalid), Level::One);
        k.set_bool(p.i_pause, true).unwrap();
        k.settle().unwrap();
        assert_eq!(k.level(p.m_axis_tvalid), Level::Zero);
        let count = k.read_u64(p.o_sent_count);
        k.run_cycles(p.aclk, 5).unwrap();
        assert_eq!(k.read_u64(p.o_sent_count), count);
    }

    #[test]
    fn gap_cycles_hold_tvalid_low() {
        let (mut k, p, _) = setup(words(&[1, 2]));
        k.set_u64(p.i_gap_cycles, 3).unwrap();
        pulse(&mut k, &p, p.i_start);
        k.run_until_rising(p.aclk).unwrap();
        assert_eq!(k.read_u64(p.o_sent_count), Some(1));
        let mut low = 0;
        while k.level(p.m_axis_tvalid) == Level::Zero {
            low += 1;
            k.run_until_rising(p.aclk).unwrap();
        }
        assert_eq!(low, 3);
    }

    #[test]
    fn loop_wraps_without_done() {
        let (mut k, p, _) = setup(words(&[7, 8]));
        k.set_bool(p.i_loop, true).unwrap();
        pulse(&mut k, &p, p.i_start);
        for _ in 0..6 {
            k.run_until_rising(p.aclk).unwrap();
            assert_eq!(k.level(p.o_done_pulse), Level::Zero);
        }
        assert_eq!(k.read_u64(p.o_sent_count), Some(6));
        assert_eq!(k.level(p.o_busy), Level::One);
    }

    #[test]
    fn restart_returns_to_idle() {
        let (mut k, p, _) = setup(words(&[1, 2, 3, 4]));
        pulse(&mut k, &p, p.i_start);
        k.run_until_rising(p.aclk).unwrap();
        pulse(&mut k, &p, p.i_restart);
        assert_eq!(k.level(p.o_busy), Level::Zero);
        assert_eq!(k.level(p.m_axis_tvalid), Level::Zero);
    }

    #[test]
    fn empty_image_pulses_done() {
        let (mut k, p, _) = setup(Vec::new());
        pulse(&mut k, &p, p.i_start);
        assert_eq!(k.level(p.o_done_pulse), Level::One);
        assert_eq!(k.level(p.o_busy), Level::Zero);
    }

    #[test]
    fn reload_rereads_source() {
        struct Counting(u32);
        impl ImageSource for Counting {
            fn describe(&self) -> String {
                "counting".into()
            }
            fn load(&mut self) -> Result<Vec<Sample>, Box<dyn Error + Send + Sync>> {
                self.0 += 1;
                Ok(vec![Sample::from_signed(self.0 as i32); self.0 as usize])
            }
        }
        let mut k = SimKernel::new();
        let aclk = spawn_clock(&mut k, "aclk", 10).unwrap();
        let (p, h) = AxisMasterFile::instantiate(&mut k, aclk, Counting(0)).unwrap();
        k.set_bool(p.aresetn, false).unwrap();
        k.run_until_rising(aclk).unwrap();
        k.set_bool(p.aresetn, true).unwrap();
        k.set_bool(p.i_restart, false).unwrap();
        pulse(&mut k, &p, p.i_reload);
        assert_eq!(k.task(&h).unwrap().image(), &words(&[2, 2])[..]);
    }

    #[test]
    fn failing_source_is_reported() {
        struct Broken;
        impl ImageSource for Broken {
            fn describe(&self) -> String {
                "broken.csv".into()
            }
            fn load(&mut self) -> Result<Vec<Sample>, Box<dyn Error + Send + Sync>> {
                Err("no such file".into())
            }
        }
        let mut k = SimKernel::new();
        let aclk = spawn_clock(&mut k, "aclk", 10).unwrap();
        let err = AxisMasterFile::instantiate(&mut k, aclk, Broken)
            .err()
            .unwrap();
        assert!(err.to_string().contains("broken.csv"));
    }
}
