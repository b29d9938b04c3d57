//! Application core: shared state, port traits and the firmware service.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod ports;
pub mod service;
pub mod state;
