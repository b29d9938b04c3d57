//! System configuration parameters
//!
//! Every value the core consumes but does not own: pin-to-channel mapping,
//! intervals, filter sizing, thermistor constants, voltage reference.
//! Defaults match the reference board; a JSON override document can be
//! loaded with [`SystemConfig::from_json`].

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

/// Upper bound on actuator channels (stack-allocated bank).
pub const MAX_CHANNELS: usize = 8;

/// Upper bound on any filter window.
pub const MAX_FILTER_WINDOW: usize = 64;

/// Upper bound on the command prefix length.
pub const MAX_PREFIX_LEN: usize = 8;

/// Smallest accepted ADC full scale (a 4-bit converter).
pub const MIN_ADC_FULL_SCALE: f32 = 16.0;

/// How the pH channel's raw samples are reduced to one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterPolicy {
    /// Sorted window; drop `trim` lowest and `trim` highest, average the rest.
    TrimmedMean { window: usize, trim: usize },
    /// Circular window; average excluding the single min and max found while scanning.
    MinMaxExcluding { window: usize },
}

impl FilterPolicy {
    pub fn window(&self) -> usize {
        match *self {
            Self::TrimmedMean { window, .. } | Self::MinMaxExcluding { window } => window,
        }
    }
}

/// Physical wiring and kind of one actuator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelConfig {
    /// Single drive line with a non-negative native range (servo style).
    Unipolar {
        line: u32,
        native_min: u16,
        native_max: u16,
    },
    /// Two direction lines plus one duty line (H-bridge).
    Bidirectional { pwm_line: u32, dir_a: i32, dir_b: i32 },
}

/// How the periodic activities are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingMode {
    /// One thread (FreeRTOS task) per activity, fixed priorities.
    Threaded,
    /// A single loop stepping every due activity per iteration.
    Cooperative,
}

/// NTC thermistor constants for the Beta equation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermistorConfig {
    /// Nominal resistance at `t0_c` (ohms).
    pub r0_ohms: f32,
    /// Nominal temperature (Celsius).
    pub t0_c: f32,
    /// Beta coefficient (Kelvin).
    pub beta: f32,
    /// Fixed divider resistor (ohms).
    pub series_ohms: f32,
}

impl Default for ThermistorConfig {
    fn default() -> Self {
        Self {
            r0_ohms: 10_000.0,
            t0_c: 25.0,
            beta: 3950.0,
            series_ohms: 10_000.0,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Protocol ---
    /// First field every command line must carry.
    pub command_prefix: String<MAX_PREFIX_LEN>,
    /// Scheduler ticks a task waits for the serial link before skipping its cycle.
    pub serial_wait_ticks: u32,
    /// Length of one scheduler tick (milliseconds).
    pub tick_ms: u32,

    // --- Timing ---
    /// Raw pH sample interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Sensor state publish interval (milliseconds)
    pub publish_interval_ms: u32,
    /// Terminal (command read) interval (milliseconds)
    pub terminal_interval_ms: u32,
    /// Telemetry frame interval (milliseconds)
    pub telemetry_interval_ms: u32,

    // --- Analog front end ---
    /// ADC code corresponding to the reference voltage.
    pub adc_full_scale: f32,
    /// ADC reference voltage (volts).
    pub reference_voltage: f32,

    // --- pH ---
    pub ph_filter: FilterPolicy,
    /// pH units per volt.
    pub ph_slope: f32,
    pub ph_offset: f32,

    // --- Temperature ---
    pub thermistor: ThermistorConfig,
    /// Raw samples averaged per temperature reading.
    pub temp_samples: u8,
    /// Delay between those samples (milliseconds).
    pub temp_sample_delay_ms: u32,

    // --- Actuators ---
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,

    pub scheduling: SchedulingMode,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut command_prefix = String::new();
        let _ = command_prefix.push_str("CMD");

        let mut channels = Vec::new();
        let _ = channels.push(ChannelConfig::Unipolar {
            line: pins::LEDC_CH_PUMP0,
            native_min: 0,
            native_max: 180,
        });
        let _ = channels.push(ChannelConfig::Bidirectional {
            pwm_line: pins::LEDC_CH_PUMP1,
            dir_a: pins::PUMP1_DIR_A_GPIO,
            dir_b: pins::PUMP1_DIR_B_GPIO,
        });
        let _ = channels.push(ChannelConfig::Bidirectional {
            pwm_line: pins::LEDC_CH_PUMP2,
            dir_a: pins::PUMP2_DIR_A_GPIO,
            dir_b: pins::PUMP2_DIR_B_GPIO,
        });
        let _ = channels.push(ChannelConfig::Bidirectional {
            pwm_line: pins::LEDC_CH_PUMP3,
            dir_a: pins::PUMP3_DIR_A_GPIO,
            dir_b: pins::PUMP3_DIR_B_GPIO,
        });

        Self {
            // Protocol
            command_prefix,
            serial_wait_ticks: 5,
            tick_ms: 10,

            // Timing
            sample_interval_ms: 20,
            publish_interval_ms: 800,
            terminal_interval_ms: 15,
            telemetry_interval_ms: 200,

            // Analog (10-bit converter on a 5 V reference)
            adc_full_scale: 1024.0,
            reference_voltage: 5.0,

            // pH
            ph_filter: FilterPolicy::TrimmedMean { window: 10, trim: 2 },
            ph_slope: 3.5,
            ph_offset: 0.0,

            // Temperature
            thermistor: ThermistorConfig::default(),
            temp_samples: 5,
            temp_sample_delay_ms: 10,

            channels,
            scheduling: SchedulingMode::Threaded,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON override document and validate it.
    pub fn from_json(doc: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(doc).map_err(|_| Error::Config("malformed config document"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent values rather than clamping them.
    pub fn validate(&self) -> Result<()> {
        if self.command_prefix.is_empty() || self.command_prefix.contains(',') {
            return Err(Error::Config("command prefix must be non-empty and comma-free"));
        }
        if self.tick_ms == 0
            || self.sample_interval_ms == 0
            || self.publish_interval_ms == 0
            || self.terminal_interval_ms == 0
            || self.telemetry_interval_ms == 0
        {
            return Err(Error::Config("intervals must be non-zero"));
        }
        if self.sample_interval_ms > self.publish_interval_ms {
            return Err(Error::Config("sample interval exceeds publish interval"));
        }
        if !(self.adc_full_scale >= MIN_ADC_FULL_SCALE) || !(self.reference_voltage > 0.0) {
            return Err(Error::Config("ADC full scale too small or reference not positive"));
        }

        let window = self.ph_filter.window();
        if window == 0 || window > MAX_FILTER_WINDOW {
            return Err(Error::Config("pH filter window out of range"));
        }
        if let FilterPolicy::TrimmedMean { trim, .. } = self.ph_filter {
            if trim * 2 >= window {
                return Err(Error::Config("pH filter trims the whole window"));
            }
        }

        let t = &self.thermistor;
        if t.r0_ohms <= 0.0 || t.beta <= 0.0 || t.series_ohms <= 0.0 || t.t0_c <= -273.15 {
            return Err(Error::Config("thermistor constants must be physical"));
        }
        if self.temp_samples == 0 {
            return Err(Error::Config("temperature burst needs at least one sample"));
        }

        if self.channels.is_empty() {
            return Err(Error::Config("at least one actuator channel required"));
        }
        let mut unipolar = 0;
        for ch in &self.channels {
            if let ChannelConfig::Unipolar {
                native_min,
                native_max,
                ..
            } = *ch
            {
                unipolar += 1;
                if native_max <= native_min {
                    return Err(Error::Config("unipolar native range is empty"));
                }
            }
        }
        if unipolar > 1 {
            return Err(Error::Config("at most one unipolar channel supported"));
        }
        Ok(())
    }
}
