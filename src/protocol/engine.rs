//! Command engine: validates one line and dispatches it.
//!
//! Every line passes through a fixed sequence of gates, structural before
//! semantic:
//!
//! 1. **Syntax**: `?` is answered with the info text; empty, over-long,
//!    non-ASCII, single-field or prefix-mismatched lines get `BadSyntax`.
//! 2. **Name**: looked up in the dispatch table; unknown names get
//!    `InvalidCommand`.
//! 3. **Parameters**: each handler checks its field count, then the shape
//!    of each parameter, then its range; any failure is
//!    `InvalidParameter`.
//!
//! The engine never fails: every outcome is a [`Reply`].

use heapless::String;
use log::debug;

use crate::config::MAX_PREFIX_LEN;
use crate::drivers::pump::{SPEED_MAX, SPEED_MIN};
use crate::error::ActuatorError;

use super::codec::Line;
use super::command::Command;
use super::response::ResponseCode;

/// Text sent in answer to `?`.
pub const DEFAULT_INFO: &str = "\n\
/*--------------------------------------------------*/\n\
/*------------------ BIO REACTOR -------------------*/\n\
/*---------------------- INFO ----------------------*/\n\
\n\
DEBUG ...";

/// Whatever the commands act on.
pub trait CommandTarget {
    fn set_fast_telemetry(&mut self, on: bool);
    fn set_pump_telemetry(&mut self, on: bool);
    fn channel_count(&self) -> usize;
    fn set_speed(&mut self, channel: usize, value: i32) -> Result<i16, ActuatorError>;
}

/// What to send back for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Free-form info text, sent line by line without an envelope.
    Info(&'static str),
    /// `<line>|ERROR:<code>`.
    Coded(ResponseCode),
}

type Handler = fn(&Command<'_>, &mut dyn CommandTarget) -> ResponseCode;

struct CommandSpec {
    name: &'static str,
    handler: Handler,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "DEBUG_FAST", handler: debug_fast },
    CommandSpec { name: "DEBUG_PUMP", handler: debug_pump },
    CommandSpec { name: "SET_PUMP", handler: set_pump },
];

pub struct CommandEngine {
    prefix: String<MAX_PREFIX_LEN>,
    info: &'static str,
}

impl CommandEngine {
    pub fn new(prefix: String<MAX_PREFIX_LEN>, info: &'static str) -> Self {
        Self { prefix, info }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Names in the dispatch table.
    pub fn command_names(&self) -> impl Iterator<Item = &'static str> {
        COMMANDS.iter().map(|c| c.name)
    }

    pub fn handle_line(&self, line: &Line, target: &mut dyn CommandTarget) -> Reply {
        if !line.is_intact() {
            debug!("engine: over-long or non-ASCII line rejected");
            return Reply::Coded(ResponseCode::BadSyntax);
        }
        self.handle(line.as_str(), target)
    }

    pub fn handle(&self, line: &str, target: &mut dyn CommandTarget) -> Reply {
        if line == "?" {
            return Reply::Info(self.info);
        }

        let Some(cmd) = Command::tokenize(line, &self.prefix) else {
            return Reply::Coded(ResponseCode::BadSyntax);
        };
        if !cmd.prefix_ok {
            return Reply::Coded(ResponseCode::BadSyntax);
        }

        let Some(spec) = COMMANDS.iter().find(|c| c.name == cmd.name) else {
            debug!("engine: unknown command {:?}", cmd.name);
            return Reply::Coded(ResponseCode::InvalidCommand);
        };

        let code = (spec.handler)(&cmd, target);
        debug!("engine: {} -> {:?}", spec.name, code);
        Reply::Coded(code)
    }
}

// ── Handlers ──────────────────────────────────────────────────

fn flag_value(cmd: &Command<'_>) -> Option<bool> {
    if cmd.field_count != 3 {
        return None;
    }
    match cmd.params.first().copied() {
        Some("0") => Some(false),
        Some("1") => Some(true),
        _ => None,
    }
}

fn debug_fast(cmd: &Command<'_>, target: &mut dyn CommandTarget) -> ResponseCode {
    let Some(on) = flag_value(cmd) else {
        return ResponseCode::InvalidParameter;
    };
    target.set_fast_telemetry(on);
    ResponseCode::Ok
}

fn debug_pump(cmd: &Command<'_>, target: &mut dyn CommandTarget) -> ResponseCode {
    let Some(on) = flag_value(cmd) else {
        return ResponseCode::InvalidParameter;
    };
    target.set_pump_telemetry(on);
    ResponseCode::Ok
}

fn set_pump(cmd: &Command<'_>, target: &mut dyn CommandTarget) -> ResponseCode {
    if cmd.field_count != 4 {
        return ResponseCode::InvalidParameter;
    }
    let (Some(channel), Some(value)) = (cmd.int_param(0), cmd.int_param(1)) else {
        return ResponseCode::InvalidParameter;
    };

    let count = target.channel_count();
    let channel_ok = 0 <= channel && (channel as usize) < count;
    let value_ok = i32::from(SPEED_MIN) <= value && value <= i32::from(SPEED_MAX);
    if !channel_ok || !value_ok {
        return ResponseCode::InvalidParameter;
    }

    match target.set_speed(channel as usize, value) {
        Ok(_) => ResponseCode::Ok,
        Err(_) => ResponseCode::InvalidParameter,
    }
}
