//! Hardware adapter: bridges real peripherals to the core's port traits.
//!
//! [`HardwareAdc`] implements [`AnalogPort`] over ADC1 and
//! [`HardwareLines`] implements [`ActuatorLines`] over GPIO and LEDC.  These
//! are the only types in the system that touch actual hardware; on
//! non-espidf targets the underlying `hw_init` calls are simulation stubs.

use log::warn;

use crate::app::ports::{ActuatorLines, AnalogInput, AnalogPort};
use crate::drivers::hw_init;
use crate::pins;

// ── AnalogPort implementation ─────────────────────────────────

/// ADC1 oneshot reader.
///
/// The converter is 12-bit; readings are rescaled to the configured full
/// scale so the calibration constants stay board-independent.
pub struct HardwareAdc {
    full_scale: u32,
}

impl HardwareAdc {
    pub fn new(adc_full_scale: f32) -> Self {
        Self {
            full_scale: adc_full_scale as u32,
        }
    }

    fn rescale(&self, raw: u16) -> u16 {
        let native_full = 1u32 << pins::ADC_NATIVE_BITS;
        (u32::from(raw) * self.full_scale / native_full) as u16
    }
}

impl AnalogPort for HardwareAdc {
    fn read_analog(&mut self, input: AnalogInput) -> u16 {
        let channel = match input {
            AnalogInput::Ph => pins::ADC1_CH_PH,
            AnalogInput::Temperature => pins::ADC1_CH_TEMP,
        };
        match hw_init::adc1_read(channel) {
            Ok(raw) => self.rescale(raw),
            Err(e) => {
                warn!("{:?}: {}", input, e);
                0
            }
        }
    }
}

// ── ActuatorLines implementation ──────────────────────────────

/// Direction GPIOs, pump PWM and servo duty.
pub struct HardwareLines;

impl ActuatorLines for HardwareLines {
    fn digital_write(&mut self, pin: i32, high: bool) {
        hw_init::gpio_write(pin, high);
    }

    fn pwm_write(&mut self, line: u32, duty: u8) {
        hw_init::ledc_set(line, u32::from(duty));
    }

    fn servo_write(&mut self, line: u32, native: u16) {
        hw_init::ledc_set(line, hw_init::servo_duty(native));
    }
}
