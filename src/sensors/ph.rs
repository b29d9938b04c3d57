//! pH probe channel.
//!
//! Raw samples feed the configured [`PolicyFilter`]; the filtered ADC value
//! is converted to a voltage and then linearly to pH.  The voltage itself is
//! also exported as the "gravity" signal.

use crate::config::SystemConfig;

use super::filter::{PolicyFilter, SampleFilter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhReading {
    /// Filtered ADC counts.
    pub raw_avg: f32,
    /// Probe amplifier output (volts).
    pub voltage: f32,
    pub ph: f32,
    /// False while the filter window is still filling.
    pub settled: bool,
}

pub struct PhProbe {
    filter: PolicyFilter,
    slope: f32,
    offset: f32,
    volts_per_count: f32,
}

impl PhProbe {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            filter: PolicyFilter::from_policy(config.ph_filter),
            slope: config.ph_slope,
            offset: config.ph_offset,
            volts_per_count: config.reference_voltage / config.adc_full_scale,
        }
    }

    pub fn push(&mut self, raw: u16) {
        self.filter.push(raw);
    }

    /// `None` until the first sample arrives.
    pub fn reading(&self) -> Option<PhReading> {
        let raw_avg = self.filter.average()?;
        let voltage = raw_avg * self.volts_per_count;
        Some(PhReading {
            raw_avg,
            voltage,
            ph: self.slope * voltage + self.offset,
            settled: self.filter.is_warm(),
        })
    }

    pub fn samples(&self) -> usize {
        self.filter.len()
    }
}
