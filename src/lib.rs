//! Bioreactor controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pins;
pub mod protocol;
pub mod scheduler;
pub mod sensors;
pub mod telemetry;

// Hardware-facing modules; the actual implementations are guarded by cfg
// attributes inside and fall back to host stubs.
pub mod adapters;
pub mod drivers;
