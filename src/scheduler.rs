//! Elapsed-time gating and the cooperative schedule table.
//!
//! [`PeriodicGate`] answers "is this interval due yet?" against a monotonic
//! millisecond clock; every periodic activity uses one instead of sleeping a
//! fixed amount per step.  [`Scheduler`] holds one gate per activity and, in
//! the cooperative variant, notifies a [`SchedulerDelegate`] for each
//! activity that is due on a given pass.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   Scheduler.tick(now_ms)                                 │
//! │                                                          │
//! │   ┌───────────┐ ┌───────────┐ ┌───────────┐              │
//! │   │ Acquire   │ │ Terminal  │ │ Telemetry │  gates       │
//! │   └─────┬─────┘ └─────┬─────┘ └─────┬─────┘              │
//! │         ▼             ▼             ▼                    │
//! │   ┌────────────────────────────────────────────┐         │
//! │   │        SchedulerDelegate::on_due           │         │
//! │   └────────────────────────────────────────────┘         │
//! └──────────────────────────────────────────────────────────┘
//! ```

use heapless::Vec;
use log::info;

// ═══════════════════════════════════════════════════════════════
//  Periodic gate
// ═══════════════════════════════════════════════════════════════

/// Fires at most once per interval.  The first check always fires.
#[derive(Debug, Clone)]
pub struct PeriodicGate {
    interval_ms: u64,
    next_due_ms: Option<u64>,
}

impl PeriodicGate {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms.max(1)),
            next_due_ms: None,
        }
    }

    /// Returns `true` if the interval has elapsed, and re-arms the gate.
    ///
    /// When the caller falls more than one interval behind, the missed
    /// periods are dropped rather than replayed back to back.
    pub fn due(&mut self, now_ms: u64) -> bool {
        match self.next_due_ms {
            Some(next) if now_ms < next => false,
            Some(next) => {
                let rearm = next + self.interval_ms;
                self.next_due_ms = Some(if now_ms >= rearm {
                    now_ms + self.interval_ms
                } else {
                    rearm
                });
                true
            }
            None => {
                self.next_due_ms = Some(now_ms + self.interval_ms);
                true
            }
        }
    }

    /// Next deadline, or `None` if the gate has never fired.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Schedule table
// ═══════════════════════════════════════════════════════════════

/// The periodic activities of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Sensor acquisition pipeline (gates its own sample/publish cadence).
    Acquire,
    /// Command protocol engine: read, dispatch, respond.
    Terminal,
    /// Telemetry publisher.
    Telemetry,
}

/// Callback invoked for each activity due on a scheduler pass.
pub trait SchedulerDelegate {
    fn on_due(&mut self, activity: Activity, now_ms: u64);
}

/// Maximum number of schedule entries (stack-allocated).
const MAX_SCHEDULES: usize = 4;

struct ScheduleEntry {
    activity: Activity,
    gate: PeriodicGate,
}

/// Cooperative schedule table.
pub struct Scheduler {
    entries: Vec<ScheduleEntry, MAX_SCHEDULES>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an activity with its interval.  Returns `false` if the table is full.
    pub fn add(&mut self, activity: Activity, interval_ms: u32) -> bool {
        let entry = ScheduleEntry {
            activity,
            gate: PeriodicGate::new(interval_ms),
        };
        if self.entries.push(entry).is_err() {
            return false;
        }
        info!("Scheduler: {:?} every {} ms", activity, interval_ms);
        true
    }

    /// Run one pass: notify the delegate of every due activity, in the
    /// order they were added.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for entry in &mut self.entries {
            if entry.gate.due(now_ms) {
                delegate.on_due(entry.activity, now_ms);
            }
        }
    }

    /// Earliest upcoming deadline across all entries.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.iter().filter_map(|e| e.gate.next_due_ms()).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
