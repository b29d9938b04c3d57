//! Firmware service: the shared state and one step per activity.
//!
//! [`Firmware`] owns everything the periodic activities share: the sensor
//! state, the debug flags, the actuator bank and the coordinated serial
//! link.  Each activity also has private state (filter windows, line
//! buffer, gates) kept in [`Activities`], which is split between threads in
//! the threaded variant or stepped together by [`Firmware::run_cooperative_once`].
//!
//! ```text
//!               ┌──────────────── Firmware ────────────────┐
//!  Acquire ────▶│ SensorState ───────────────┐              │
//!               │                            ▼              │
//!  Terminal ───▶│ DebugFlags · ActuatorBank ─▶ Telemetry ───│──▶ link
//!               │            Coordinator<Transport>         │
//!               └───────────────────────────────────────────┘
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::info;

use crate::config::{MAX_CHANNELS, SystemConfig};
use crate::coordinator::Coordinator;
use crate::drivers::pump::ActuatorBank;
use crate::error::{ActuatorError, Result};
use crate::protocol::engine::{CommandEngine, CommandTarget};
use crate::protocol::terminal::{Terminal, TerminalStep};
use crate::protocol::transport::Transport;
use crate::scheduler::{Activity, PeriodicGate, Scheduler, SchedulerDelegate};
use crate::sensors::AcquisitionPipeline;
use crate::telemetry;

use super::ports::{ActuatorLines, AnalogPort};
use super::state::{DebugFlags, SensorSnapshot, SensorState};

/// Actuator bank shared between the terminal and the telemetry publisher.
pub type SharedActuators<L> = BlockingMutex<CriticalSectionRawMutex, RefCell<ActuatorBank<L>>>;

// ───────────────────────────────────────────────────────────────
// Firmware (shared state)
// ───────────────────────────────────────────────────────────────

pub struct Firmware<L: ActuatorLines, T: Transport> {
    config: SystemConfig,
    sensors: SensorState,
    flags: DebugFlags,
    actuators: SharedActuators<L>,
    link: Coordinator<T>,
}

impl<L: ActuatorLines, T: Transport> Firmware<L, T> {
    /// Validate `config`, build the actuator bank (all channels stopped)
    /// and wrap `transport` in the coordinator.
    pub fn new(config: SystemConfig, lines: L, transport: T) -> Result<Self> {
        config.validate()?;
        let bank = ActuatorBank::new(&config.channels, lines)?;
        let link = Coordinator::new(transport, config.serial_wait_ticks, config.tick_ms);
        info!(
            "Firmware: {} channel(s), prefix {:?}, {:?} scheduling",
            bank.channel_count(),
            config.command_prefix.as_str(),
            config.scheduling
        );
        Ok(Self {
            config,
            sensors: SensorState::new(),
            flags: DebugFlags::new(),
            actuators: BlockingMutex::new(RefCell::new(bank)),
            link,
        })
    }

    /// Private per-activity state for this configuration.
    pub fn activities(&self, info: &'static str) -> Activities {
        Activities::new(&self.config, info)
    }

    // ── Activity steps ────────────────────────────────────────

    /// Acquisition step.  Returns `true` if sensor state was published.
    pub fn acquire_step(
        &self,
        pipeline: &mut AcquisitionPipeline,
        now_ms: u64,
        adc: &mut impl AnalogPort,
        delay: &mut impl DelayNs,
    ) -> bool {
        pipeline.poll(now_ms, adc, delay, &self.sensors)
    }

    /// Terminal step: answer every complete line waiting on the link.
    pub fn terminal_step(&self, terminal: &mut Terminal, delay: &mut impl DelayNs) -> TerminalStep {
        let mut controls = Controls {
            flags: &self.flags,
            actuators: &self.actuators,
        };
        terminal.step(&self.link, delay, &mut controls)
    }

    /// Telemetry step.  Returns the number of frames written.
    pub fn telemetry_step(&self, delay: &mut impl DelayNs) -> usize {
        let frames = telemetry::frames_for(&self.flags, self.sensors.snapshot(), || self.speeds());
        telemetry::publish(&frames, &self.link, delay)
    }

    /// One pass of the cooperative variant: run every activity that is due.
    pub fn run_cooperative_once(
        &self,
        activities: &mut Activities,
        now_ms: u64,
        adc: &mut impl AnalogPort,
        delay: &mut impl DelayNs,
    ) {
        let Activities {
            scheduler,
            pipeline,
            terminal,
            ..
        } = activities;
        let mut pass = CooperativePass {
            firmware: self,
            pipeline,
            terminal,
            adc,
            delay,
        };
        scheduler.tick(now_ms, &mut pass);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn sensors(&self) -> SensorSnapshot {
        self.sensors.snapshot()
    }

    pub fn flags(&self) -> &DebugFlags {
        &self.flags
    }

    pub fn speeds(&self) -> Vec<i16, MAX_CHANNELS> {
        self.actuators.lock(|bank| bank.borrow().speeds())
    }

    pub fn current_speed(&self, channel: usize) -> core::result::Result<i16, ActuatorError> {
        self.actuators.lock(|bank| bank.borrow().current_speed(channel))
    }

    /// Direct actuator command, bypassing the protocol (still clamped).
    pub fn set_speed(&self, channel: usize, value: i32) -> core::result::Result<i16, ActuatorError> {
        self.actuators.lock(|bank| bank.borrow_mut().set_speed(channel, value))
    }

    /// Inspect the actuator line driver (used by host tests).
    pub fn with_lines<R>(&self, f: impl FnOnce(&L) -> R) -> R {
        self.actuators.lock(|bank| f(bank.borrow().lines()))
    }

    pub fn link(&self) -> &Coordinator<T> {
        &self.link
    }
}

// ───────────────────────────────────────────────────────────────
// Command target view
// ───────────────────────────────────────────────────────────────

struct Controls<'a, L: ActuatorLines> {
    flags: &'a DebugFlags,
    actuators: &'a SharedActuators<L>,
}

impl<L: ActuatorLines> CommandTarget for Controls<'_, L> {
    fn set_fast_telemetry(&mut self, on: bool) {
        self.flags.set_fast_telemetry(on);
    }

    fn set_pump_telemetry(&mut self, on: bool) {
        self.flags.set_pump_telemetry(on);
    }

    fn channel_count(&self) -> usize {
        self.actuators.lock(|bank| bank.borrow().channel_count())
    }

    fn set_speed(&mut self, channel: usize, value: i32) -> core::result::Result<i16, ActuatorError> {
        self.actuators.lock(|bank| bank.borrow_mut().set_speed(channel, value))
    }
}

// ───────────────────────────────────────────────────────────────
// Per-activity private state
// ───────────────────────────────────────────────────────────────

pub struct Activities {
    pub pipeline: AcquisitionPipeline,
    pub terminal: Terminal,
    /// Gates for the threaded variant.
    pub terminal_gate: PeriodicGate,
    pub telemetry_gate: PeriodicGate,
    /// Schedule table for the cooperative variant.
    pub scheduler: Scheduler,
}

impl Activities {
    pub fn new(config: &SystemConfig, info: &'static str) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.add(Activity::Acquire, config.sample_interval_ms);
        scheduler.add(Activity::Terminal, config.terminal_interval_ms);
        scheduler.add(Activity::Telemetry, config.telemetry_interval_ms);

        Self {
            pipeline: AcquisitionPipeline::new(config),
            terminal: Terminal::new(CommandEngine::new(config.command_prefix.clone(), info)),
            terminal_gate: PeriodicGate::new(config.terminal_interval_ms),
            telemetry_gate: PeriodicGate::new(config.telemetry_interval_ms),
            scheduler,
        }
    }
}

struct CooperativePass<'a, L: ActuatorLines, T: Transport, A, D> {
    firmware: &'a Firmware<L, T>,
    pipeline: &'a mut AcquisitionPipeline,
    terminal: &'a mut Terminal,
    adc: &'a mut A,
    delay: &'a mut D,
}

impl<L, T, A, D> SchedulerDelegate for CooperativePass<'_, L, T, A, D>
where
    L: ActuatorLines,
    T: Transport,
    A: AnalogPort,
    D: DelayNs,
{
    fn on_due(&mut self, activity: Activity, now_ms: u64) {
        match activity {
            Activity::Acquire => {
                self.firmware
                    .acquire_step(&mut *self.pipeline, now_ms, &mut *self.adc, &mut *self.delay);
            }
            Activity::Terminal => {
                self.firmware.terminal_step(&mut *self.terminal, &mut *self.delay);
            }
            Activity::Telemetry => {
                self.firmware.telemetry_step(&mut *self.delay);
            }
        }
    }
}
