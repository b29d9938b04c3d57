//! Pump actuator bank.
//!
//! Every channel takes a signed speed command in `[-255, 255]`.  Two kinds
//! of hardware sit behind the same interface:
//!
//! - **Unipolar** (servo-driven dosing valve): the speed is remapped
//!   linearly onto the native position range (e.g. `0..=180`).  The reported
//!   speed is the inverse mapping of the native value actually written, so
//!   it is subject to the native quantisation step.
//! - **Bidirectional** (DC pump behind an H-bridge): the sign selects the
//!   direction lines (`>= 0` → A high / B low, `< 0` → A low / B high) and
//!   the magnitude is written as PWM duty.  Reported speed is exact.
//!
//! Out-of-range commands are clamped here regardless of what the caller
//! validated.  This driver is open-loop: it reports what was commanded.

use heapless::Vec;
use log::{debug, info};

use crate::app::ports::ActuatorLines;
use crate::config::{ChannelConfig, MAX_CHANNELS};
use crate::error::ActuatorError;

pub const SPEED_MAX: i16 = 255;
pub const SPEED_MIN: i16 = -255;

const SPEED_SPAN: i32 = (SPEED_MAX as i32) - (SPEED_MIN as i32);

/// Bipolar speed → native position, rounded to nearest.
pub fn speed_to_native(speed: i16, native_min: u16, native_max: u16) -> u16 {
    let speed = i32::from(speed.clamp(SPEED_MIN, SPEED_MAX));
    let span = i32::from(native_max) - i32::from(native_min);
    let scaled = ((speed - i32::from(SPEED_MIN)) * span + SPEED_SPAN / 2) / SPEED_SPAN;
    (i32::from(native_min) + scaled) as u16
}

/// Native position → bipolar speed, rounded to nearest.
pub fn native_to_speed(native: u16, native_min: u16, native_max: u16) -> i16 {
    let span = i32::from(native_max) - i32::from(native_min);
    if span <= 0 {
        return 0;
    }
    let offset = i32::from(native.clamp(native_min, native_max)) - i32::from(native_min);
    let scaled = (offset * SPEED_SPAN + span / 2) / span;
    (i32::from(SPEED_MIN) + scaled) as i16
}

/// One configured channel and its last command.
#[derive(Debug, Clone, Copy)]
pub struct ActuatorChannel {
    config: ChannelConfig,
    /// Last signed command after clamping.
    commanded: i16,
    /// Last native position written (unipolar only).
    native: u16,
}

impl ActuatorChannel {
    fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            commanded: 0,
            native: 0,
        }
    }

    pub fn config(&self) -> ChannelConfig {
        self.config
    }

    pub fn is_unipolar(&self) -> bool {
        matches!(self.config, ChannelConfig::Unipolar { .. })
    }

    /// Speed as reported to telemetry.
    pub fn current_speed(&self) -> i16 {
        match self.config {
            ChannelConfig::Unipolar {
                native_min,
                native_max,
                ..
            } => native_to_speed(self.native, native_min, native_max),
            ChannelConfig::Bidirectional { .. } => self.commanded,
        }
    }

    fn drive(&mut self, speed: i16, lines: &mut impl ActuatorLines) {
        match self.config {
            ChannelConfig::Unipolar {
                line,
                native_min,
                native_max,
            } => {
                let native = speed_to_native(speed, native_min, native_max);
                lines.servo_write(line, native);
                self.native = native;
            }
            ChannelConfig::Bidirectional {
                pwm_line,
                dir_a,
                dir_b,
            } => {
                let forward = speed >= 0;
                lines.digital_write(dir_a, forward);
                lines.digital_write(dir_b, !forward);
                lines.pwm_write(pwm_line, speed.unsigned_abs() as u8);
            }
        }
        self.commanded = speed;
    }
}

/// All actuator channels plus the line driver they write through.
pub struct ActuatorBank<L: ActuatorLines> {
    channels: Vec<ActuatorChannel, MAX_CHANNELS>,
    lines: L,
}

impl<L: ActuatorLines> ActuatorBank<L> {
    /// Build the bank and drive every channel to speed 0.
    pub fn new(layout: &[ChannelConfig], lines: L) -> Result<Self, ActuatorError> {
        if layout.is_empty() || layout.len() > MAX_CHANNELS {
            return Err(ActuatorError::InvalidLayout);
        }
        let mut bank = Self {
            channels: layout.iter().copied().map(ActuatorChannel::new).collect(),
            lines,
        };
        for ch in &mut bank.channels {
            ch.drive(0, &mut bank.lines);
        }
        info!("Actuators: {} channel(s) stopped", bank.channels.len());
        Ok(bank)
    }

    /// Command `channel` to `value` (clamped to `[-255, 255]`).  Returns the
    /// value actually applied.
    pub fn set_speed(&mut self, channel: usize, value: i32) -> Result<i16, ActuatorError> {
        let count = self.channels.len();
        let ch = self
            .channels
            .get_mut(channel)
            .ok_or(ActuatorError::ChannelOutOfRange { channel, count })?;

        let speed = value.clamp(i32::from(SPEED_MIN), i32::from(SPEED_MAX)) as i16;
        ch.drive(speed, &mut self.lines);
        debug!("pump {} -> {}", channel, speed);
        Ok(speed)
    }

    pub fn current_speed(&self, channel: usize) -> Result<i16, ActuatorError> {
        self.channels
            .get(channel)
            .map(ActuatorChannel::current_speed)
            .ok_or(ActuatorError::ChannelOutOfRange {
                channel,
                count: self.channels.len(),
            })
    }

    /// Reported speeds of every channel, in index order.
    pub fn speeds(&self) -> Vec<i16, MAX_CHANNELS> {
        self.channels.iter().map(ActuatorChannel::current_speed).collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[ActuatorChannel] {
        &self.channels
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }
}
