//! Response codes and the `<line>|ERROR:<code>` envelope.

use core::fmt::{self, Write};

use heapless::String;

use super::codec::MAX_LINE_LEN;

/// Longest formatted response: the echoed line plus `|ERROR:<n>`.
pub const MAX_RESPONSE_LEN: usize = MAX_LINE_LEN + 16;

/// Outcome of one command line, returned as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    Ok = 0,
    /// Empty, unsplittable, over-long or prefix-mismatched line.
    BadSyntax = 1,
    /// Unknown command name.
    InvalidCommand = 2,
    /// Wrong field count, non-integer or out-of-range parameter.
    InvalidParameter = 3,
}

impl ResponseCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Echo `line` with its response code appended.
pub fn format_response(line: &str, code: ResponseCode) -> String<MAX_RESPONSE_LEN> {
    let mut out = String::new();
    // Cannot fail for lines up to MAX_LINE_LEN.
    let _ = write!(out, "{}|ERROR:{}", line, code);
    out
}
