//! Fuzz target: `CommandEngine::handle`
//!
//! Every line must produce exactly one reply, never panic, and only
//! touch actuators with in-range channels and speeds.
//!
//! cargo fuzz run fuzz_command_engine

#![no_main]

use bioreactor::error::ActuatorError;
use bioreactor::protocol::engine::{CommandEngine, CommandTarget, DEFAULT_INFO, Reply};
use bioreactor::protocol::response::format_response;
use libfuzzer_sys::fuzz_target;

struct Bounds {
    count: usize,
}

impl CommandTarget for Bounds {
    fn set_fast_telemetry(&mut self, _on: bool) {}

    fn set_pump_telemetry(&mut self, _on: bool) {}

    fn channel_count(&self) -> usize {
        self.count
    }

    fn set_speed(&mut self, channel: usize, value: i32) -> Result<i16, ActuatorError> {
        assert!(channel < self.count, "channel {channel} escaped validation");
        assert!((-255..=255).contains(&value), "speed {value} escaped validation");
        Ok(value as i16)
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let prefix = heapless::String::try_from("CMD").unwrap();
    let engine = CommandEngine::new(prefix, DEFAULT_INFO);

    match engine.handle(line, &mut Bounds { count: 4 }) {
        Reply::Info(text) => assert_eq!(line, "?", "info for {text:?}"),
        Reply::Coded(code) => {
            let _ = format_response(line, code);
        }
    }
});
