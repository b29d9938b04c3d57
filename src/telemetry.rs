//! Telemetry publisher.
//!
//! Each cycle, for every enabled debug flag, one frame is formatted and
//! written through the coordinated link:
//!
//! ```text
//! $<DF?PH:7.012,TEMP:24.875,GS:2.003>&      fast (sensor) frame
//! $<DP?0:10,1:-20,2:30>&                    pump frame
//! ```
//!
//! The fast frame always precedes the pump frame.  When the link is busy
//! past the bounded wait the whole cycle is skipped silently.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use log::warn;

use crate::app::state::{DebugFlags, SensorSnapshot};
use crate::config::MAX_CHANNELS;
use crate::coordinator::Coordinator;
use crate::error::CommsError;
use crate::protocol::transport::{Transport, write_line};

/// Longest formatted frame.
pub const MAX_FRAME_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryFrame {
    Fast {
        ph: f32,
        temperature_c: f32,
        gravity_voltage: f32,
    },
    Pump {
        speeds: Vec<i16, MAX_CHANNELS>,
    },
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast {
                ph,
                temperature_c,
                gravity_voltage,
            } => write!(
                f,
                "$<DF?PH:{:.3},TEMP:{:.3},GS:{:.3}>&",
                ph, temperature_c, gravity_voltage
            ),
            Self::Pump { speeds } => {
                f.write_str("$<DP?")?;
                for (i, s) in speeds.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}:{}", i, s)?;
                }
                f.write_str(">&")
            }
        }
    }
}

impl TelemetryFrame {
    pub fn render(&self) -> Result<String<MAX_FRAME_LEN>, CommsError> {
        let mut out = String::new();
        write!(out, "{}", self).map_err(|_| CommsError::LineOverflow)?;
        Ok(out)
    }
}

/// Frames due this cycle, in emission order.
pub fn frames_for(
    flags: &DebugFlags,
    sensors: SensorSnapshot,
    speeds: impl FnOnce() -> Vec<i16, MAX_CHANNELS>,
) -> Vec<TelemetryFrame, 2> {
    let mut frames = Vec::new();
    if flags.fast_telemetry() {
        let _ = frames.push(TelemetryFrame::Fast {
            ph: sensors.ph,
            temperature_c: sensors.temperature_c,
            gravity_voltage: sensors.gravity_voltage,
        });
    }
    if flags.pump_telemetry() {
        let _ = frames.push(TelemetryFrame::Pump { speeds: speeds() });
    }
    frames
}

/// Write `frames` while holding the link.  Returns how many were written;
/// 0 when there was nothing to send or the link stayed busy.
pub fn publish<T: Transport>(
    frames: &[TelemetryFrame],
    link: &Coordinator<T>,
    delay: &mut impl DelayNs,
) -> usize {
    if frames.is_empty() {
        return 0;
    }
    let Some(mut port) = link.acquire(delay) else {
        return 0;
    };

    let mut written = 0;
    for frame in frames {
        let result = frame.render().and_then(|line| write_line(&mut *port, &line));
        match result {
            Ok(()) => written += 1,
            Err(e) => warn!("telemetry: frame dropped: {}", e),
        }
    }
    written
}
