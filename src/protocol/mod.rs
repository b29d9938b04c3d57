//! Line-oriented serial command protocol.
//!
//! ```text
//!  Transport ──bytes──▶ LineDecoder ──Line──▶ CommandEngine ──Reply──▶ write_line
//!                                                 │
//!                                                 ▼
//!                                           CommandTarget
//!                                   (debug flags · actuator bank)
//! ```

pub mod codec;
pub mod command;
pub mod engine;
pub mod response;
pub mod terminal;
pub mod transport;
