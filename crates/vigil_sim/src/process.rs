//! Cooperative tasks and the view they get of the kernel while running.
//!
//! A task implements [`Process`]. Each time the kernel resumes it, the task
//! reads signal values through a [`ProcessContext`], schedules writes, and
//! returns a [`Wait`] describing what should resume it next. Writes made
//! during a delta cycle become visible in the following one, so every task
//! that wakes on the same event samples the same values.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use vigil_common::{Level, Logic, LogicVec, Sample};

use crate::error::SimError;
use crate::time::SimTime;
use crate::value::{Edge, SignalId, SignalState};

/// Opaque ID for a spawned task.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ProcessId(u32);

impl ProcessId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A typed handle to a spawned task.
///
/// The type parameter lets the driver read back or reclaim the concrete
/// task state with [`SimKernel::task`](crate::SimKernel::task) and
/// [`SimKernel::cancel`](crate::SimKernel::cancel).
pub struct TaskHandle<P> {
    id: ProcessId,
    _marker: PhantomData<fn() -> P>,
}

impl<P> TaskHandle<P> {
    pub(crate) fn new(id: ProcessId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped process ID.
    pub fn id(&self) -> ProcessId {
        self.id
    }
}

impl<P> Clone for TaskHandle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for TaskHandle<P> {}

impl<P> fmt::Debug for TaskHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskHandle({})", self.id.0)
    }
}

/// A single condition that can resume a waiting task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// A strict transition on bit 0 of a signal.
    Edge(SignalId, Edge),
    /// Any change of value.
    Change(SignalId),
    /// Bit 0 reads as the given level. Satisfied immediately if it already does.
    Level(SignalId, Level),
    /// A relative delay in femtoseconds. Zero means the next delta cycle.
    Delay(u64),
}

/// What a task waits for after returning control to the kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Resume when the first of these triggers fires.
    Any(Vec<Trigger>),
    /// The task has finished and will not be resumed again.
    Done,
}

impl Wait {
    /// Waits for a rising edge on `signal`.
    pub fn rising(signal: SignalId) -> Self {
        Wait::Any(vec![Trigger::Edge(signal, Edge::Rising)])
    }

    /// Waits for a falling edge on `signal`.
    pub fn falling(signal: SignalId) -> Self {
        Wait::Any(vec![Trigger::Edge(signal, Edge::Falling)])
    }

    /// Waits for any value change on any of `signals`.
    pub fn change(signals: &[SignalId]) -> Self {
        Wait::Any(signals.iter().map(|&s| Trigger::Change(s)).collect())
    }

    /// Waits until bit 0 of `signal` reads as `level`.
    pub fn level(signal: SignalId, level: Level) -> Self {
        Wait::Any(vec![Trigger::Level(signal, level)])
    }

    /// Waits for a fixed simulated duration.
    pub fn delay(fs: u64) -> Self {
        Wait::Any(vec![Trigger::Delay(fs)])
    }
}

/// A write scheduled for the next delta cycle.
#[derive(Clone, Debug)]
pub(crate) struct PendingWrite {
    pub signal: SignalId,
    pub value: LogicVec,
    /// The task that scheduled it, or `None` for the driver.
    pub origin: Option<ProcessId>,
}

/// Checks a write against its target's declared width and queues it.
pub(crate) fn queue_write(
    signals: &[SignalState],
    pending: &mut Vec<PendingWrite>,
    signal: SignalId,
    value: LogicVec,
    origin: Option<ProcessId>,
) -> Result<(), SimError> {
    let state = signals
        .get(signal.index())
        .ok_or_else(|| SimError::UnknownSignal {
            name: signal.to_string(),
        })?;
    if state.width != value.width() {
        return Err(SimError::WidthMismatch {
            signal: state.name.clone(),
            expected: state.width,
            actual: value.width(),
        });
    }
    pending.push(PendingWrite {
        signal,
        value,
        origin,
    });
    Ok(())
}

/// A cooperative task scheduled by the kernel.
///
/// Tasks run one at a time, in ascending spawn order, for each delta cycle
/// in which they are woken.
pub trait Process: 'static {
    /// A short name used in log messages and errors.
    fn name(&self) -> &str;

    /// Runs the task until it next needs to wait.
    fn resume(&mut self, ctx: &mut ProcessContext<'_>) -> Result<Wait, SimError>;
}

/// Object-safe wrapper that lets the kernel hand concrete tasks back to the driver.
pub(crate) trait AnyProcess {
    fn process_mut(&mut self) -> &mut dyn Process;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<P: Process> AnyProcess for P {
    fn process_mut(&mut self) -> &mut dyn Process {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// The kernel as seen by a running task.
pub struct ProcessContext<'k> {
    pub(crate) id: ProcessId,
    pub(crate) now: SimTime,
    pub(crate) signals: &'k [SignalState],
    pub(crate) changed: &'k HashSet<SignalId>,
    pub(crate) pending: &'k mut Vec<PendingWrite>,
}

impl ProcessContext<'_> {
    /// The running task's ID.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// The current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The current value of a signal.
    ///
    /// # Panics
    ///
    /// Panics if `signal` was not issued by this kernel.
    pub fn value(&self, signal: SignalId) -> &LogicVec {
        &self.signals[signal.index()].value
    }

    /// The tri-state level of bit 0 of a signal.
    pub fn level(&self, signal: SignalId) -> Level {
        self.value(signal).level()
    }

    /// The signal as an unsigned integer, or `None` if any bit is undefined.
    pub fn read_u64(&self, signal: SignalId) -> Option<u64> {
        self.value(signal).to_u64()
    }

    /// The signal as a 32-bit sample, or `None` if any bit is undefined.
    pub fn read_sample(&self, signal: SignalId) -> Option<Sample> {
        Sample::from_logic_vec(self.value(signal))
    }

    /// Returns `true` if the signal changed in the current delta cycle.
    pub fn changed(&self, signal: SignalId) -> bool {
        self.changed.contains(&signal)
    }

    /// Returns `true` if the signal rose in the current delta cycle.
    pub fn rose(&self, signal: SignalId) -> bool {
        self.changed(signal) && self.signals[signal.index()].has_edge(Edge::Rising)
    }

    /// Returns `true` if the signal fell in the current delta cycle.
    pub fn fell(&self, signal: SignalId) -> bool {
        self.changed(signal) && self.signals[signal.index()].has_edge(Edge::Falling)
    }

    /// Schedules a write for the next delta cycle.
    pub fn set(&mut self, signal: SignalId, value: LogicVec) -> Result<(), SimError> {
        queue_write(self.signals, self.pending, signal, value, Some(self.id))
    }

    /// Schedules a single-bit write.
    pub fn set_bool(&mut self, signal: SignalId, value: bool) -> Result<(), SimError> {
        self.set(signal, LogicVec::from_bool(value))
    }

    /// Schedules an integer write, truncated to the signal's width.
    pub fn set_u64(&mut self, signal: SignalId, value: u64) -> Result<(), SimError> {
        let width = self.width(signal);
        self.set(signal, LogicVec::from_u64(value, width))
    }

    /// Schedules a 32-bit sample write.
    pub fn set_sample(&mut self, signal: SignalId, sample: Sample) -> Result<(), SimError> {
        self.set(signal, sample.to_logic_vec())
    }

    /// Drives every bit of a signal to the same logic value, typically X.
    pub fn set_all(&mut self, signal: SignalId, value: Logic) -> Result<(), SimError> {
        let width = self.width(signal);
        self.set(signal, LogicVec::filled(width, value))
    }

    fn width(&self, signal: SignalId) -> u32 {
        self.signals
            .get(signal.index())
            .map(|s| s.width)
            .unwrap_or(0)
    }
}
