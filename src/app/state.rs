//! Process-wide shared state.
//!
//! Both structs are lock-free: every field is an atomic with a single
//! writer and any number of readers.  A read of [`SensorState`] is an
//! eventually-consistent snapshot: the three fields are stored one at a
//! time, so a reader may observe a new pH next to a previous temperature.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

// ---------------------------------------------------------------------------
// Sensor state (written only by the acquisition pipeline)
// ---------------------------------------------------------------------------

/// Latest published sensor readings.
///
/// `f32` values are stored as their bit patterns.
#[derive(Debug)]
pub struct SensorState {
    ph: AtomicU32,
    temperature_c: AtomicU32,
    gravity_voltage: AtomicU32,
}

/// A point-in-time copy of [`SensorState`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Filtered pH.
    pub ph: f32,
    /// Thermistor temperature (°C).
    pub temperature_c: f32,
    /// pH channel voltage before pH scaling (volts).
    pub gravity_voltage: f32,
}

impl SensorState {
    pub const fn new() -> Self {
        // 0.0f32 has an all-zero bit pattern.
        Self {
            ph: AtomicU32::new(0),
            temperature_c: AtomicU32::new(0),
            gravity_voltage: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            ph: f32::from_bits(self.ph.load(Ordering::Acquire)),
            temperature_c: f32::from_bits(self.temperature_c.load(Ordering::Acquire)),
            gravity_voltage: f32::from_bits(self.gravity_voltage.load(Ordering::Acquire)),
        }
    }

    pub(crate) fn store_ph(&self, ph: f32, voltage: f32) {
        self.gravity_voltage.store(voltage.to_bits(), Ordering::Release);
        self.ph.store(ph.to_bits(), Ordering::Release);
    }

    pub(crate) fn store_temperature(&self, celsius: f32) {
        self.temperature_c.store(celsius.to_bits(), Ordering::Release);
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Debug flags (written only by the command engine)
// ---------------------------------------------------------------------------

/// Telemetry enable flags toggled by `DEBUG_FAST` / `DEBUG_PUMP`.
#[derive(Debug)]
pub struct DebugFlags {
    fast_telemetry: AtomicBool,
    pump_telemetry: AtomicBool,
}

impl DebugFlags {
    pub const fn new() -> Self {
        Self {
            fast_telemetry: AtomicBool::new(false),
            pump_telemetry: AtomicBool::new(false),
        }
    }

    pub fn fast_telemetry(&self) -> bool {
        self.fast_telemetry.load(Ordering::Acquire)
    }

    pub fn pump_telemetry(&self) -> bool {
        self.pump_telemetry.load(Ordering::Acquire)
    }

    pub(crate) fn set_fast_telemetry(&self, on: bool) {
        self.fast_telemetry.store(on, Ordering::Release);
    }

    pub(crate) fn set_pump_telemetry(&self, on: bool) {
        self.pump_telemetry.store(on, Ordering::Release);
    }
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self::new()
    }
}
