//! Sensor acquisition pipeline: filters, probe conversions and the
//! aggregating [`AcquisitionPipeline`].
//!
//! The pipeline owns its sampling buffers privately and is the only writer
//! of [`SensorState`].  Raw pH samples are taken on one interval and the
//! filtered values are published on a slower one, so readers see a stable
//! value instead of per-sample jitter.
//!
//! ```text
//!  sample gate (20 ms)          publish gate (800 ms)
//!  ──────────────────▶ PhProbe ─────────────────────▶ SensorState.ph / gravity
//!                      Thermistor burst ────────────▶ SensorState.temperature
//! ```

pub mod filter;
pub mod ph;
pub mod temperature;

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::{AnalogInput, AnalogPort};
use crate::app::state::SensorState;
use crate::config::SystemConfig;
use crate::scheduler::PeriodicGate;
use ph::PhProbe;
use temperature::Thermistor;

pub struct AcquisitionPipeline {
    ph: PhProbe,
    thermistor: Thermistor,
    sample_gate: PeriodicGate,
    publish_gate: PeriodicGate,
}

impl AcquisitionPipeline {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            ph: PhProbe::new(config),
            thermistor: Thermistor::new(config),
            sample_gate: PeriodicGate::new(config.sample_interval_ms),
            publish_gate: PeriodicGate::new(config.publish_interval_ms),
        }
    }

    /// Run whatever is due at `now_ms`.  Returns `true` if new values were
    /// published to `state` on this call.
    ///
    /// Never blocks for a whole interval; the only wait is the short
    /// inter-sample delay of the temperature burst on publish cycles.
    pub fn poll(
        &mut self,
        now_ms: u64,
        adc: &mut impl AnalogPort,
        delay: &mut impl DelayNs,
        state: &SensorState,
    ) -> bool {
        if self.sample_gate.due(now_ms) {
            self.sample_ph(adc);
        }
        if self.publish_gate.due(now_ms) {
            self.publish(adc, delay, state);
            return true;
        }
        false
    }

    /// Take one raw pH sample into the filter window.
    pub fn sample_ph(&mut self, adc: &mut impl AnalogPort) {
        let raw = adc.read_analog(AnalogInput::Ph);
        self.ph.push(raw);
    }

    /// Recompute the filtered pH, read temperature and store both.
    pub fn publish(&mut self, adc: &mut impl AnalogPort, delay: &mut impl DelayNs, state: &SensorState) {
        if let Some(r) = self.ph.reading() {
            state.store_ph(r.ph, r.voltage);
            debug!(
                "pH {:.3} ({:.3} V, raw {:.1}, {} samples{})",
                r.ph,
                r.voltage,
                r.raw_avg,
                self.ph.samples(),
                if r.settled { "" } else { ", warming up" }
            );
        }

        let t = self.thermistor.read(adc, delay);
        state.store_temperature(t.celsius);
        debug!("temp {:.2} C ({:.0} ohm, raw {:.1})", t.celsius, t.resistance_ohms, t.raw_avg);
    }

    /// Earliest time at which [`poll`](Self::poll) has work to do.
    pub fn next_due_ms(&self) -> u64 {
        match (self.sample_gate.next_due_ms(), self.publish_gate.next_due_ms()) {
            (Some(a), Some(b)) => a.min(b),
            _ => 0,
        }
    }
}
