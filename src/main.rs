//! Bioreactor Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdc   HardwareLines   UartTransport   SystemClock     │
//! │  (AnalogPort)  (ActuatorLines) (Transport)     (Clock)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                 Firmware (shared state)                │    │
//! │  │  SensorState · DebugFlags · ActuatorBank · Coordinator │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Activities: acquire · terminal · telemetry                    │
//! │  (one FreeRTOS task each, or one cooperative loop)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

use bioreactor::adapters::hardware::{HardwareAdc, HardwareLines};
use bioreactor::adapters::time::{SystemClock, ThreadDelay};
use bioreactor::adapters::uart::UartTransport;
use bioreactor::app::ports::Clock;
use bioreactor::app::service::{Activities, Firmware};
use bioreactor::config::{SchedulingMode, SystemConfig};
use bioreactor::drivers::hw_init;
use bioreactor::drivers::task_pin::{Core, TaskSpec, spawn_task};
use bioreactor::pins;
use bioreactor::protocol::engine::DEFAULT_INFO;

type BoardFirmware = Firmware<HardwareLines, UartTransport>;

const ACQUIRE_TASK: TaskSpec = TaskSpec {
    name: "acquire\0",
    core: Core::App,
    priority: 5,
    stack_kb: 6,
};

const TERMINAL_TASK: TaskSpec = TaskSpec {
    name: "terminal\0",
    core: Core::App,
    priority: 6,
    stack_kb: 8,
};

const TELEMETRY_TASK: TaskSpec = TaskSpec {
    name: "telemetry\0",
    core: Core::App,
    priority: 5,
    stack_kb: 6,
};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Bioreactor v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().context("peripheral init")?;

    // ── 3. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().context("default configuration")?;

    // ── 4. Shared state (lives for the process lifetime) ──────
    let adc = HardwareAdc::new(config.adc_full_scale);
    let firmware: &'static BoardFirmware = Box::leak(Box::new(Firmware::new(
        config,
        HardwareLines,
        UartTransport::new(pins::UART_PORT),
    )?));
    let activities = firmware.activities(DEFAULT_INFO);

    // ── 5. Activities ─────────────────────────────────────────
    match firmware.config().scheduling {
        SchedulingMode::Threaded => run_threaded(firmware, activities, adc),
        SchedulingMode::Cooperative => run_cooperative(firmware, activities, adc),
    }
}

/// One FreeRTOS task per activity.  `main` parks once they are running.
fn run_threaded(fw: &'static BoardFirmware, activities: Activities, mut adc: HardwareAdc) -> Result<()> {
    let Activities {
        mut pipeline,
        mut terminal,
        mut terminal_gate,
        mut telemetry_gate,
        ..
    } = activities;
    let tick_ms = fw.config().tick_ms;

    spawn_task(ACQUIRE_TASK, move || {
        let clock = SystemClock::new();
        let mut delay = ThreadDelay;
        loop {
            let now = clock.now_ms();
            fw.acquire_step(&mut pipeline, now, &mut adc, &mut delay);
            let wait = pipeline.next_due_ms().saturating_sub(clock.now_ms());
            delay.delay_ms(wait.clamp(1, u64::from(tick_ms)) as u32);
        }
    })?;

    spawn_task(TERMINAL_TASK, move || {
        let clock = SystemClock::new();
        let mut delay = ThreadDelay;
        loop {
            if terminal_gate.due(clock.now_ms()) {
                fw.terminal_step(&mut terminal, &mut delay);
            }
            delay.delay_ms(tick_ms);
        }
    })?;

    spawn_task(TELEMETRY_TASK, move || {
        let clock = SystemClock::new();
        let mut delay = ThreadDelay;
        loop {
            if telemetry_gate.due(clock.now_ms()) {
                fw.telemetry_step(&mut delay);
            }
            delay.delay_ms(tick_ms);
        }
    })?;

    info!("Threaded scheduling: 3 activities running");
    loop {
        std::thread::park();
        warn!("main: spurious unpark");
    }
}

/// Every activity stepped from a single loop.
fn run_cooperative(fw: &'static BoardFirmware, mut activities: Activities, mut adc: HardwareAdc) -> Result<()> {
    info!("Cooperative scheduling");
    let clock = SystemClock::new();
    let mut delay = ThreadDelay;
    let tick_ms = fw.config().tick_ms;
    loop {
        fw.run_cooperative_once(&mut activities, clock.now_ms(), &mut adc, &mut delay);
        let next = activities.scheduler.next_due_ms().unwrap_or(0);
        let wait = next.saturating_sub(clock.now_ms());
        delay.delay_ms(wait.clamp(1, u64::from(tick_ms)) as u32);
    }
}
