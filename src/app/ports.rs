//! Port traits: the boundary between the controller core and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ core (sensors · actuators · protocol)
//! ```
//!
//! Board bring-up code implements these; the core consumes them through
//! generics, so the acquisition pipeline, actuator layer and command engine
//! never touch registers directly.  The serial byte stream is the fourth
//! port and lives with the protocol ([`Transport`](crate::protocol::transport::Transport)).

// ───────────────────────────────────────────────────────────────
// Analog port (driven adapter: hardware → core)
// ───────────────────────────────────────────────────────────────

/// Logical analog inputs the pipeline samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogInput {
    /// pH probe amplifier; also the source of the gravity voltage.
    Ph,
    /// NTC thermistor divider.
    Temperature,
}

/// Read-side port: one raw ADC conversion per call.
pub trait AnalogPort {
    fn read_analog(&mut self, input: AnalogInput) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator line port (driven adapter: core → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: raw digital and PWM line writes.
pub trait ActuatorLines {
    /// Drive a direction line high or low.
    fn digital_write(&mut self, pin: i32, high: bool);

    /// Set the duty of a PWM line (0 – 255).
    fn pwm_write(&mut self, line: u32, duty: u8);

    /// Drive a unipolar (servo style) line to a native position.
    fn servo_write(&mut self, line: u32, native: u16);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used for elapsed-time gating.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

