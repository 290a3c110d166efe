//! The scheduler: signals, tasks, delta cycles, and the driver API.
//!
//! One delta cycle applies every queued write, wakes each task whose trigger
//! matched a change, and then runs the woken tasks in ascending spawn order.
//! Writes made while tasks run are deferred to the next delta cycle. Time
//! only advances once no writes are queued and no task is runnable, which
//! gives every task woken by a clock edge the same pre-edge view of the
//! signals it samples.
//!
//! The driver (usually a scenario) owns the kernel and advances it with
//! [`SimKernel::settle`], [`SimKernel::run_until_edge`] and friends. Driver
//! writes are also deferred and take effect on the next advance.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet};

use vigil_common::{Level, Logic, LogicVec, Sample};

use crate::error::SimError;
use crate::process::{
    queue_write, AnyProcess, PendingWrite, Process, ProcessContext, ProcessId, TaskHandle,
    Trigger, Wait,
};
use crate::time::SimTime;
use crate::value::{Edge, SignalId, SignalState};

/// Default ceiling on delta cycles within one time step.
pub const DEFAULT_MAX_DELTAS: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct TimerEntry {
    fs: u64,
    seq: u64,
    task: usize,
}

enum TaskState {
    /// Spawned but not yet resumed.
    Ready,
    Waiting(Vec<Trigger>),
    Finished,
}

struct TaskSlot {
    name: String,
    task: Box<dyn AnyProcess>,
    state: TaskState,
    /// Sequence number of the live timer, if any. Older heap entries are stale.
    timer: Option<u64>,
}

/// The simulation kernel.
pub struct SimKernel {
    current_time: SimTime,
    signals: Vec<SignalState>,
    names: HashMap<String, SignalId>,
    tasks: Vec<Option<TaskSlot>>,
    timers: BinaryHeap<Reverse<TimerEntry>>,
    next_timer_seq: u64,
    pending: Vec<PendingWrite>,
    wake_next: BTreeSet<usize>,
    changed: HashSet<SignalId>,
    /// Set when a task failed mid-delta; the next delta finishes the same wakeups.
    interrupted: bool,
    max_deltas: u32,
    deltas_at_current_time: u32,
    total_deltas: u64,
}

impl Default for SimKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimKernel {
    /// Creates an empty kernel at time zero.
    pub fn new() -> Self {
        Self {
            current_time: SimTime::zero(),
            signals: Vec::new(),
            names: HashMap::new(),
            tasks: Vec::new(),
            timers: BinaryHeap::new(),
            next_timer_seq: 0,
            pending: Vec::new(),
            wake_next: BTreeSet::new(),
            changed: HashSet::new(),
            interrupted: false,
            max_deltas: DEFAULT_MAX_DELTAS,
            deltas_at_current_time: 0,
            total_deltas: 0,
        }
    }

    /// Sets the delta-cycle ceiling per time step.
    pub fn with_max_deltas(mut self, max_deltas: u32) -> Self {
        self.max_deltas = max_deltas;
        self
    }

    /// The current simulation time.
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Total delta cycles executed so far.
    pub fn total_deltas(&self) -> u64 {
        self.total_deltas
    }

    // ---- signals ----

    /// Declares a signal whose bits all start as X.
    pub fn add_signal(&mut self, name: &str, width: u32) -> Result<SignalId, SimError> {
        self.add_signal_init(name, LogicVec::unknown(width))
    }

    /// Declares a signal with an explicit initial value.
    pub fn add_signal_init(&mut self, name: &str, init: LogicVec) -> Result<SignalId, SimError> {
        if self.names.contains_key(name) {
            return Err(SimError::DuplicateSignal {
                name: name.to_string(),
            });
        }
        let id = SignalId::from_raw(self.signals.len() as u32);
        self.signals.push(SignalState::new(name, init));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a signal by name.
    pub fn signal(&self, name: &str) -> Result<SignalId, SimError> {
        self.find_signal(name).ok_or_else(|| SimError::UnknownSignal {
            name: name.to_string(),
        })
    }

    /// Looks up a signal by name, returning `None` if it is not declared.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.names.get(name).copied()
    }

    /// The declared name of a signal.
    pub fn signal_name(&self, signal: SignalId) -> &str {
        &self.state(signal).name
    }

    /// Number of declared signals.
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    fn state(&self, signal: SignalId) -> &SignalState {
        &self.signals[signal.index()]
    }

    /// The current value of a signal.
    ///
    /// # Panics
    ///
    /// Panics if `signal` was not issued by this kernel.
    pub fn value(&self, signal: SignalId) -> &LogicVec {
        &self.state(signal).value
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

    /// Queues a driver write. It takes effect on the next advance.
    pub fn set(&mut self, signal: SignalId, value: LogicVec) -> Result<(), SimError> {
        queue_write(&self.signals, &mut self.pending, signal, value, None)
    }

    /// Queues a single-bit driver write.
    pub fn set_bool(&mut self, signal: SignalId, value: bool) -> Result<(), SimError> {
        self.set(signal, LogicVec::from_bool(value))
    }

    /// Queues an integer driver write, truncated to the signal's width.
    pub fn set_u64(&mut self, signal: SignalId, value: u64) -> Result<(), SimError> {
        let width = self.width_of(signal)?;
        self.set(signal, LogicVec::from_u64(value, width))
    }

    /// Queues a 32-bit sample driver write.
    pub fn set_sample(&mut self, signal: SignalId, sample: Sample) -> Result<(), SimError> {
        self.set(signal, sample.to_logic_vec())
    }

    /// Queues a write driving every bit of a signal to `value`.
    pub fn set_all(&mut self, signal: SignalId, value: Logic) -> Result<(), SimError> {
        let width = self.width_of(signal)?;
        self.set(signal, LogicVec::filled(width, value))
    }

    fn width_of(&self, signal: SignalId) -> Result<u32, SimError> {
        self.signals
            .get(signal.index())
            .map(|s| s.width)
            .ok_or_else(|| SimError::UnknownSignal {
                name: signal.to_string(),
            })
    }

    // ---- tasks ----

    /// Spawns a task. It first runs in the next delta cycle.
    pub fn spawn<P: Process>(&mut self, task: P) -> TaskHandle<P> {
        let index = self.tasks.len();
        let name = task.name().to_string();
        log::trace!("spawn task '{name}' as #{index} at {}", self.current_time);
        self.tasks.push(Some(TaskSlot {
            name,
            task: Box::new(task),
            state: TaskState::Ready,
            timer: None,
        }));
        self.wake_next.insert(index);
        TaskHandle::new(ProcessId::from_index(index))
    }

    /// Borrows a live task's state.
    pub fn task<P: Process>(&self, handle: &TaskHandle<P>) -> Option<&P> {
        self.tasks
            .get(handle.id().index())?
            .as_ref()?
            .task
            .as_any()
            .downcast_ref::<P>()
    }

    /// Mutably borrows a live task's state.
    pub fn task_mut<P: Process>(&mut self, handle: &TaskHandle<P>) -> Option<&mut P> {
        self.tasks
            .get_mut(handle.id().index())?
            .as_mut()?
            .task
            .as_any_mut()
            .downcast_mut::<P>()
    }

    /// Returns `true` if the task was not cancelled and has not returned [`Wait::Done`].
    pub fn is_running<P: Process>(&self, handle: &TaskHandle<P>) -> bool {
        matches!(
            self.tasks.get(handle.id().index()),
            Some(Some(slot)) if !matches!(slot.state, TaskState::Finished)
        )
    }

    /// Cancels a task and hands its state back.
    ///
    /// Takes effect immediately: the task never runs again, and any writes it
    /// queued that have not yet been applied are discarded. Cancelling a task
    /// twice returns `None` the second time.
    pub fn cancel<P: Process>(&mut self, handle: TaskHandle<P>) -> Option<P> {
        let index = handle.id().index();
        let entry = self.tasks.get_mut(index)?;
        if !entry.as_ref()?.task.as_any().is::<P>() {
            return None;
        }
        let slot = entry.take()?;
        self.wake_next.remove(&index);
        let id = handle.id();
        self.pending.retain(|w| w.origin != Some(id));
        log::trace!("cancel task '{}' at {}", slot.name, self.current_time);
        slot.task.into_any().downcast::<P>().ok().map(|b| *b)
    }

    // ---- scheduling ----

    /// Returns `true` if no writes are queued and no task is runnable.
    pub fn is_quiescent(&self) -> bool {
        self.pending.is_empty() && self.wake_next.is_empty()
    }

    /// Executes one delta cycle, advancing time first if the current step is quiescent.
    ///
    /// Returns `false` if there is nothing left to do at all.
    pub fn step(&mut self) -> Result<bool, SimError> {
        if self.is_quiescent() {
            let Some(fs) = self.next_timer_fs() else {
                return Ok(false);
            };
            self.current_time = self.current_time.advance_to(fs);
            self.deltas_at_current_time = 0;
            self.interrupted = false;
            self.fire_timers(fs);
        } else {
            if self.deltas_at_current_time >= self.max_deltas {
                return Err(SimError::DeltaCycleLimit {
                    fs: self.current_time.fs,
                    max_deltas: self.max_deltas,
                });
            }
            self.current_time = SimTime {
                fs: self.current_time.fs,
                delta: self.deltas_at_current_time,
            };
        }
        self.run_delta()?;
        self.deltas_at_current_time += 1;
        self.total_deltas += 1;
        Ok(true)
    }

    /// Runs delta cycles until the current time step is quiescent.
    pub fn settle(&mut self) -> Result<(), SimError> {
        while !self.is_quiescent() {
            self.step()?;
        }
        Ok(())
    }

    /// Runs for `duration_fs` femtoseconds of simulated time.
    pub fn run_for(&mut self, duration_fs: u64) -> Result<(), SimError> {
        let end = self.current_time.fs.saturating_add(duration_fs);
        self.settle()?;
        while let Some(fs) = self.next_timer_fs() {
            if fs > end {
                break;
            }
            self.step()?;
            self.settle()?;
        }
        if self.current_time.fs < end {
            self.current_time = self.current_time.advance_to(end);
            self.deltas_at_current_time = 0;
        }
        Ok(())
    }

    /// Runs until the next `edge` on `signal`, then settles that time step.
    ///
    /// Any driver writes are applied first. When this returns, every task
    /// woken by the edge has run and its writes are visible.
    pub fn run_until_edge(&mut self, signal: SignalId, edge: Edge) -> Result<(), SimError> {
        let name = self
            .signals
            .get(signal.index())
            .map(|s| s.name.clone())
            .ok_or_else(|| SimError::UnknownSignal {
                name: signal.to_string(),
            })?;
        self.settle()?;
        loop {
            if !self.step()? {
                return Err(SimError::Stalled {
                    signal: name,
                    time_fs: self.current_time.fs,
                });
            }
            if self.changed.contains(&signal) && self.state(signal).has_edge(edge) {
                return self.settle();
            }
        }
    }

    /// Runs until the next rising edge on `clk`.
    pub fn run_until_rising(&mut self, clk: SignalId) -> Result<(), SimError> {
        self.run_until_edge(clk, Edge::Rising)
    }

    /// Runs `cycles` rising edges of `clk`.
    pub fn run_cycles(&mut self, clk: SignalId, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            self.run_until_rising(clk)?;
        }
        Ok(())
    }

    /// Runs clock cycles until `done` holds after a rising edge.
    ///
    /// Returns the number of cycles taken, or [`SimError::Timeout`] once
    /// `max_cycles` edges have passed without `done` holding.
    pub fn run_until<F>(
        &mut self,
        clk: SignalId,
        max_cycles: u64,
        waiting_for: &str,
        mut done: F,
    ) -> Result<u64, SimError>
    where
        F: FnMut(&SimKernel) -> bool,
    {
        for cycle in 1..=max_cycles {
            self.run_until_rising(clk)?;
            if done(self) {
                return Ok(cycle);
            }
        }
        Err(SimError::Timeout {
            waiting_for: waiting_for.to_string(),
            cycles: max_cycles,
        })
    }

    /// Earliest live timer, discarding stale heap entries on the way.
    fn next_timer_fs(&mut self) -> Option<u64> {
        while let Some(Reverse(entry)) = self.timers.peek().copied() {
            if self.timer_is_live(&entry) {
                return Some(entry.fs);
            }
            self.timers.pop();
        }
        None
    }

    fn timer_is_live(&self, entry: &TimerEntry) -> bool {
        matches!(
            self.tasks.get(entry.task),
            Some(Some(slot)) if slot.timer == Some(entry.seq)
        )
    }

    fn fire_timers(&mut self, fs: u64) {
        while let Some(Reverse(entry)) = self.timers.peek().copied() {
            if entry.fs != fs {
                break;
            }
            self.timers.pop();
            if let Some(Some(slot)) = self.tasks.get_mut(entry.task) {
                if slot.timer == Some(entry.seq) {
                    slot.timer = None;
                    self.wake_next.insert(entry.task);
                }
            }
        }
    }

    fn run_delta(&mut self) -> Result<(), SimError> {
        if !std::mem::take(&mut self.interrupted) {
            self.apply_writes();
        }
        self.resume_woken()
    }

    fn apply_writes(&mut self) {
        // The last write to a signal in one delta wins.
        self.changed.clear();
        let mut finals: BTreeMap<SignalId, LogicVec> = BTreeMap::new();
        for write in self.pending.drain(..) {
            finals.insert(write.signal, write.value);
        }
        for (signal, value) in finals {
            if self.signals[signal.index()].update(value) {
                self.changed.insert(signal);
            }
        }

        if !self.changed.is_empty() {
            for (index, entry) in self.tasks.iter_mut().enumerate() {
                let Some(slot) = entry else { continue };
                if let TaskState::Waiting(triggers) = &slot.state {
                    if triggers
                        .iter()
                        .any(|t| trigger_fired(t, &self.signals, &self.changed))
                    {
                        slot.timer = None;
                        self.wake_next.insert(index);
                    }
                }
            }
        }
    }

    fn resume_woken(&mut self) -> Result<(), SimError> {
        let mut runnable = std::mem::take(&mut self.wake_next).into_iter();
        while let Some(index) = runnable.next() {
            let Some(slot) = self.tasks.get_mut(index).and_then(Option::as_mut) else {
                continue;
            };
            if matches!(slot.state, TaskState::Finished) {
                continue;
            }
            let mut ctx = ProcessContext {
                id: ProcessId::from_index(index),
                now: self.current_time,
                signals: &self.signals,
                changed: &self.changed,
                pending: &mut self.pending,
            };
            match slot.task.process_mut().resume(&mut ctx) {
                Ok(wait) => self.schedule(index, wait),
                Err(err) => {
                    // Tasks not yet resumed still see this delta's changes.
                    self.wake_next.extend(runnable);
                    self.interrupted = !self.wake_next.is_empty();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn schedule(&mut self, index: usize, wait: Wait) {
        let now = self.current_time.fs;
        let triggers = match wait {
            Wait::Done => {
                if let Some(Some(slot)) = self.tasks.get_mut(index) {
                    log::trace!("task '{}' finished at {}", slot.name, self.current_time);
                    slot.state = TaskState::Finished;
                    slot.timer = None;
                }
                return;
            }
            Wait::Any(triggers) => triggers,
        };

        let mut immediate = false;
        let mut due: Option<u64> = None;
        for trigger in &triggers {
            match *trigger {
                Trigger::Delay(0) => immediate = true,
                Trigger::Delay(fs) => {
                    let at = now.saturating_add(fs);
                    due = Some(due.map_or(at, |d| d.min(at)));
                }
                Trigger::Level(signal, level) => {
                    if self
                        .signals
                        .get(signal.index())
                        .is_some_and(|s| s.level() == level)
                    {
                        immediate = true;
                    }
                }
                Trigger::Edge(..) | Trigger::Change(_) => {}
            }
        }

        let timer = due.map(|fs| {
            let seq = self.next_timer_seq;
            self.next_timer_seq += 1;
            self.timers.push(Reverse(TimerEntry {
                fs,
                seq,
                task: index,
            }));
            seq
        });
        if immediate {
            self.wake_next.insert(index);
        }
        if let Some(Some(slot)) = self.tasks.get_mut(index) {
            slot.state = TaskState::Waiting(triggers);
            slot.timer = timer;
        }
    }
}

fn trigger_fired(trigger: &Trigger, signals: &[SignalState], changed: &HashSet<SignalId>) -> bool {
    let changed_state = |signal: SignalId| {
        if changed.contains(&signal) {
            signals.get(signal.index())
        } else {
            None
        }
    };
    match *trigger {
        Trigger::Edge(signal, edge) => changed_state(signal).is_some_and(|s| s.has_edge(edge)),
        Trigger::Change(signal) => changed_state(signal).is_some(),
        Trigger::Level(signal, level) => changed_state(signal).is_some_and(|s| s.level() == level),
        Trigger::Delay(_) => false,
    }
}
