//! AXI4-Stream transfer observer.
//!
//! The observer is a kernel task that samples the bus on every rising clock
//! edge and records one [`Transfer`] per accepted handshake. It never
//! finishes on its own; a scenario stops it by cancelling it through its
//! handle, which also hands back the collected transfers.

use vigil_common::{Level, Sample};
use vigil_dut::AxisPorts;
use vigil_sim::{Process, ProcessContext, SignalId, SimError, Wait};

/// One accepted beat on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// `tdata`, normalized to the signed domain.
    pub data: Sample,
    /// `tlast`.
    pub last: bool,
    /// Side-band level sampled with the beat, if the observer has one.
    pub flag: Option<Level>,
}

/// The bus signals an observer watches.
#[derive(Clone, Copy, Debug)]
pub struct StreamTap {
    /// Bus clock.
    pub clk: SignalId,
    /// `tvalid`.
    pub tvalid: SignalId,
    /// `tready`.
    pub tready: SignalId,
    /// `tdata`.
    pub tdata: SignalId,
    /// `tlast`.
    pub tlast: SignalId,
}

impl From<&AxisPorts> for StreamTap {
    fn from(p: &AxisPorts) -> Self {
        Self {
            clk: p.aclk,
            tvalid: p.m_axis_tvalid,
            tready: p.m_axis_tready,
            tdata: p.m_axis_tdata,
            tlast: p.m_axis_tlast,
        }
    }
}

/// Records accepted transfers.
#[derive(Debug)]
pub struct AxisObserver {
    tap: StreamTap,
    flag: Option<SignalId>,
    received: Vec<Transfer>,
    undefined_beats: usize,
}

impl AxisObserver {
    /// An observer on `tap` with an empty received sequence.
    pub fn new(tap: impl Into<StreamTap>) -> Self {
        Self {
            tap: tap.into(),
            flag: None,
            received: Vec::new(),
            undefined_beats: 0,
        }
    }

    /// Also samples `flag` with every accepted beat.
    pub fn with_flag(mut self, flag: SignalId) -> Self {
        self.flag = Some(flag);
        self
    }

    /// The transfers recorded so far.
    pub fn received(&self) -> &[Transfer] {
        &self.received
    }

    /// Just the data words recorded so far.
    pub fn data(&self) -> Vec<Sample> {
        self.received.iter().map(|t| t.data).collect()
    }

    /// Handshakes whose data or last was undefined; these are not recorded.
    pub fn undefined_beats(&self) -> usize {
        self.undefined_beats
    }

    /// Takes ownership of the recorded transfers.
    pub fn into_received(self) -> Vec<Transfer> {
        self.received
    }

    fn sample(&mut self, ctx: &ProcessContext<'_>) {
        let tap = self.tap;
        match (ctx.level(tap.tvalid), ctx.level(tap.tready)) {
            (Level::One, Level::One) => {}
            (Level::Zero | Level::Unknown, _) | (_, Level::Zero | Level::Unknown) => return,
        }
        let data = ctx.read_sample(tap.tdata);
        let last = ctx.level(tap.tlast).to_bool();
        let (Some(data), Some(last)) = (data, last) else {
            self.undefined_beats += 1;
            log::warn!("undefined data on accepted beat at {}", ctx.now());
            return;
        };
        let transfer = Transfer {
            data,
            last,
            flag: self.flag.map(|f| ctx.level(f)),
        };
        log::debug!(
            "beat {}: {} (last={last}) at {}",
            self.received.len(),
            data,
            ctx.now()
        );
        self.received.push(transfer);
    }
}

impl Process for AxisObserver {
    fn name(&self) -> &str {
        "axis_observer"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError> {
        if ctx.rose(self.tap.clk) {
            self.sample(ctx);
        }
        Ok(Wait::rising(self.tap.clk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::{Logic, SAMPLE_WIDTH};
    use vigil_sim::{spawn_clock, SimKernel};

    fn bus(k: &mut SimKernel) -> StreamTap {
        StreamTap {
            clk: spawn_clock(k, "aclk", 10).unwrap(),
            tvalid: k.add_signal("tvalid", 1).unwrap(),
            tready: k.add_signal("tready", 1).unwrap(),
            tdata: k.add_signal("tdata", SAMPLE_WIDTH).unwrap(),
            tlast: k.add_signal("tlast", 1).unwrap(),
        }
    }

    fn beat(k: &mut SimKernel, t: &StreamTap, valid: bool, ready: bool, data: i32, last: bool) {
        k.set_bool(t.tvalid, valid).unwrap();
        k.set_bool(t.tready, ready).unwrap();
        k.set_sample(t.tdata, Sample::from_signed(data)).unwrap();
        k.set_bool(t.tlast, last).unwrap();
        k.run_until_rising(t.clk).unwrap();
    }

    #[test]
    fn records_only_handshakes() {
        let mut k = SimKernel::new();
        let t = bus(&mut k);
        let h = k.spawn(AxisObserver::new(t));
        beat(&mut k, &t, true, true, 10, false);
        beat(&mut k, &t, true, false, 11, false);
        beat(&mut k, &t, false, true, 12, false);
        beat(&mut k, &t, true, true, -13, true);
        let received = k.cancel(h).unwrap().into_received();
        assert_eq!(
            received,
            [
                Transfer {
                    data: Sample::from_signed(10),
                    last: false,
                    flag: None
                },
                Transfer {
                    data: Sample::from_signed(-13),
                    last: true,
                    flag: None
                },
            ]
        );
    }

    #[test]
    fn unknown_handshake_levels_are_not_transfers() {
        let mut k = SimKernel::new();
        let t = bus(&mut k);
        let h = k.spawn(AxisObserver::new(t));
        k.run_until_rising(t.clk).unwrap();
        k.set_bool(t.tready, true).unwrap();
        k.set_all(t.tvalid, Logic::Z).unwrap();
        k.set_sample(t.tdata, Sample::from_signed(1)).unwrap();
        k.run_until_rising(t.clk).unwrap();
        let obs = k.task(&h).unwrap();
        assert!(obs.received().is_empty());
        assert_eq!(obs.undefined_beats(), 0);
    }

    #[test]
    fn undefined_data_is_counted_not_recorded() {
        let mut k = SimKernel::new();
        let t = bus(&mut k);
        let h = k.spawn(AxisObserver::new(t));
        k.set_bool(t.tvalid, true).unwrap();
        k.set_bool(t.tready, true).unwrap();
        k.set_bool(t.tlast, false).unwrap();
        k.run_until_rising(t.clk).unwrap();
        let obs = k.task(&h).unwrap();
        assert!(obs.received().is_empty());
        assert_eq!(obs.undefined_beats(), 1);
    }

    #[test]
    fn samples_flag_with_beat() {
        let mut k = SimKernel::new();
        let t = bus(&mut k);
        let flag = k.add_signal("flag", 1).unwrap();
        let h = k.spawn(AxisObserver::new(t).with_flag(flag));
        k.set_bool(flag, true).unwrap();
        beat(&mut k, &t, true, true, 3, false);
        let obs = k.task(&h).unwrap();
        assert_eq!(obs.received()[0].flag, Some(Level::One));
        assert_eq!(obs.data(), [Sample::from_signed(3)]);
    }

    #[test]
    fn stops_recording_once_cancelled() {
        let mut k = SimKernel::new();
        let t = bus(&mut k);
        let h = k.spawn(AxisObserver::new(t));
        beat(&mut k, &t, true, true, 1, false);
        let first = k.cancel(h).unwrap();
        beat(&mut k, &t, true, true, 2, false);
        assert_eq!(first.received().len(), 1);
        assert!(k.cancel(h).is_none());
    }
}
