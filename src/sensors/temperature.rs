//! NTC thermistor temperature sensor.
//!
//! Wired in a voltage divider with a fixed series resistor.  Each reading
//! averages a short burst of conversions, converts the averaged code to a
//! resistance and applies the simplified Beta (Steinhart-Hart) equation:
//!
//! ```text
//! R     = R_series / (full_scale / avg - 1)
//! 1 / T = 1 / T0 + ln(R / R0) / B
//! ```

use embedded_hal::delay::DelayNs;

use crate::app::ports::{AnalogInput, AnalogPort};
use crate::config::{MIN_ADC_FULL_SCALE, SystemConfig, ThermistorConfig};

const KELVIN_OFFSET: f32 = 273.15;

#[derive(Debug, Clone, Copy)]
pub struct TemperatureReading {
    /// Averaged ADC counts.
    pub raw_avg: f32,
    pub resistance_ohms: f32,
    pub celsius: f32,
}

pub struct Thermistor {
    constants: ThermistorConfig,
    full_scale: f32,
    samples: u8,
    sample_delay_ms: u32,
}

impl Thermistor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            constants: config.thermistor,
            // Keeps the clamp range in `convert` non-empty.
            full_scale: config.adc_full_scale.max(MIN_ADC_FULL_SCALE),
            samples: config.temp_samples.max(1),
            sample_delay_ms: config.temp_sample_delay_ms,
        }
    }

    /// Take a burst of samples and convert their average.
    pub fn read(&self, adc: &mut impl AnalogPort, delay: &mut impl DelayNs) -> TemperatureReading {
        let mut sum = 0u32;
        for i in 0..self.samples {
            if i > 0 {
                delay.delay_ms(self.sample_delay_ms);
            }
            sum += adc.read_analog(AnalogInput::Temperature) as u32;
        }
        let raw_avg = sum as f32 / self.samples as f32;
        let (resistance_ohms, celsius) = self.convert(raw_avg);
        TemperatureReading {
            raw_avg,
            resistance_ohms,
            celsius,
        }
    }

    /// Averaged counts → (ohms, °C).  Rail readings are pulled one count
    /// inside the range so the result stays finite.
    pub fn convert(&self, raw_avg: f32) -> (f32, f32) {
        let avg = raw_avg.clamp(1.0, self.full_scale - 1.0);
        let ohms = self.constants.series_ohms / (self.full_scale / avg - 1.0);

        let t0_k = self.constants.t0_c + KELVIN_OFFSET;
        let inv_t = 1.0 / t0_k + (ohms / self.constants.r0_ohms).ln() / self.constants.beta;
        (ohms, 1.0 / inv_t - KELVIN_OFFSET)
    }
}
