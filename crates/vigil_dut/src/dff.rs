//! D flip-flop with asynchronous active-high reset.

use vigil_common::{Level, Logic};
use vigil_sim::{Edge, Process, ProcessContext, SignalId, SimError, SimKernel, Trigger, Wait};

/// Ports of a [`DFlipFlop`].
#[derive(Clone, Copy, Debug)]
pub struct DffPorts {
    /// Clock input.
    pub clk: SignalId,
    /// Asynchronous reset, active high.
    pub rst: SignalId,
    /// Data input.
    pub d: SignalId,
    /// Registered output.
    pub q: SignalId,
}

/// Captures `d` into `q` on each rising `clk`; `rst` forces `q` low at once.
#[derive(Debug)]
pub struct DFlipFlop {
    ports: DffPorts,
}

impl DFlipFlop {
    /// Declares `rst`, `d` and `q` and spawns the model clocked by `clk`.
    pub fn instantiate(kernel: &mut SimKernel, clk: SignalId) -> Result<DffPorts, SimError> {
        let ports = DffPorts {
            clk,
            rst: kernel.add_signal("rst", 1)?,
            d: kernel.add_signal("d", 1)?,
            q: kernel.add_signal("q", 1)?,
        };
        kernel.spawn(DFlipFlop { ports });
        Ok(ports)
    }
}

impl Process for DFlipFlop {
    fn name(&self) -> &str {
        "dff"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError> {
        let DffPorts { clk, rst, d, q } = self.ports;
        match ctx.level(rst) {
            Level::One => ctx.set_bool(q, false)?,
            Level::Zero if ctx.rose(clk) => match ctx.level(d).to_bool() {
                Some(bit) => ctx.set_bool(q, bit)?,
                None => ctx.set_all(q, Logic::X)?,
            },
            Level::Unknown if ctx.rose(clk) => ctx.set_all(q, Logic::X)?,
            _ => {}
        }
        Ok(Wait::Any(vec![
            Trigger::Edge(clk, Edge::Rising),
            Trigger::Change(rst),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::FS_PER_NS;
    use vigil_sim::spawn_clock;

    fn setup() -> (SimKernel, DffPorts) {
        let mut k = SimKernel::new();
        let clk = spawn_clock(&mut k, "clk", 10 * FS_PER_NS).unwrap();
        let ports = DFlipFlop::instantiate(&mut k, clk).unwrap();
        (k, ports)
    }

    #[test]
    fn output_unknown_before_reset() {
        let (mut k, p) = setup();
        k.settle().unwrap();
        assert_eq!(k.level(p.q), Level::Unknown);
    }

    #[test]
    fn reset_is_asynchronous() {
        let (mut k, p) = setup();
        k.set_bool(p.rst, true).unwrap();
        k.set_bool(p.d, true).unwrap();
        k.settle().unwrap();
        assert_eq!(k.level(p.q), Level::Zero);
        assert_eq!(k.current_time().fs, 0);
    }

    #[test]
    fn captures_on_rising_edge() {
        let (mut k, p) = setup();
        k.set_bool(p.rst, true).unwrap();
        k.run_cycles(p.clk, 2).unwrap();
        k.set_bool(p.rst, false).unwrap();
        k.set_bool(p.d, true).unwrap();
        k.settle().unwrap();
        assert_eq!(k.level(p.q), Level::Zero);
        k.run_until_rising(p.clk).unwrap();
        assert_eq!(k.level(p.q), Level::One);
    }

    #[test]
    fn reset_mid_operation_then_recover() {
        let (mut k, p) = setup();
        k.set_bool(p.rst, true).unwrap();
        k.run_cycles(p.clk, 2).unwrap();
        k.set_bool(p.rst, false).unwrap();
        k.set_bool(p.d, true).unwrap();
        k.run_until_rising(p.clk).unwrap();
        assert_eq!(k.level(p.q), Level::One);

        k.set_bool(p.rst, true).unwrap();
        k.run_for(FS_PER_NS).unwrap();
        assert_eq!(k.level(p.q), Level::Zero);

        k.set_bool(p.rst, false).unwrap();
        k.run_until_rising(p.clk).unwrap();
        assert_eq!(k.level(p.q), Level::One);
    }
}
