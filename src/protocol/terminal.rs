//! Terminal activity: read lines from the link, answer each one.
//!
//! One step holds the coordinated link for its whole read/dispatch/respond
//! pass, so a response is never interleaved with a telemetry frame.  If the
//! link cannot be taken within the bounded wait, the step is skipped and
//! unread bytes stay in the transport until the next cycle.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::coordinator::Coordinator;
use crate::error::CommsError;

use super::codec::LineDecoder;
use super::engine::{CommandEngine, CommandTarget, Reply};
use super::response::format_response;
use super::transport::{Transport, write_line};

/// Sent once when the terminal first gets the link.
pub const CONNECTED_BANNER: &str = "CONNECTED";

/// Bytes pulled from the transport per read call.
const READ_CHUNK: usize = 32;

/// Upper bound on read calls per step so a flooding peer cannot starve
/// the other activities.
const MAX_READS_PER_STEP: usize = 8;

/// Result of one terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStep {
    /// The link was busy for the whole bounded wait.
    Skipped,
    /// The link was held; `lines` lines were answered.
    Served { lines: usize },
}

pub struct Terminal {
    engine: CommandEngine,
    decoder: LineDecoder,
    banner_sent: bool,
}

impl Terminal {
    pub fn new(engine: CommandEngine) -> Self {
        Self {
            engine,
            decoder: LineDecoder::new(),
            banner_sent: false,
        }
    }

    pub fn engine(&self) -> &CommandEngine {
        &self.engine
    }

    pub fn step<T: Transport>(
        &mut self,
        link: &Coordinator<T>,
        delay: &mut impl DelayNs,
        target: &mut dyn CommandTarget,
    ) -> TerminalStep {
        let Some(mut guard) = link.acquire(delay) else {
            return TerminalStep::Skipped;
        };
        let port: &mut T = &mut guard;

        if !self.banner_sent {
            if write_line(port, CONNECTED_BANNER).is_ok() {
                info!("terminal: link up");
            }
            self.banner_sent = true;
        }

        let mut lines = 0;
        let mut buf = [0u8; READ_CHUNK];
        for _ in 0..MAX_READS_PER_STEP {
            let n = match port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!("terminal: read failed: {:?}", e);
                    break;
                }
            };
            for &b in &buf[..n] {
                if let Some(line) = self.decoder.push(b) {
                    let reply = self.engine.handle_line(&line, target);
                    if let Err(e) = respond(port, line.as_str(), reply) {
                        warn!("terminal: response lost: {}", e);
                    }
                    lines += 1;
                }
            }
        }
        TerminalStep::Served { lines }
    }
}

fn respond<T: Transport>(port: &mut T, line: &str, reply: Reply) -> Result<(), CommsError> {
    match reply {
        Reply::Info(text) => {
            for l in text.lines() {
                write_line(port, l)?;
            }
            Ok(())
        }
        Reply::Coded(code) => write_line(port, &format_response(line, code)),
    }
}
