//! Newline-delimited line codec.
//!
//! The decoder accumulates incoming bytes and yields one [`Line`] per
//! `\n`.  A single `Transport::read` may return part of a line or several
//! lines; the decoder is fed byte by byte and keeps partial state across
//! calls.
//!
//! Lines longer than [`MAX_LINE_LEN`] are not split: the excess is dropped
//! until the terminating `\n`, and the line is yielded with `overflowed`
//! set so it still gets exactly one (error) response.  Lines carrying
//! non-ASCII bytes are flagged the same way.
//!
//! A `\r` is held back until the next byte: dropped if that byte is `\n`,
//! buffered otherwise, so a CRLF terminator never counts toward the limit.

use heapless::{String, Vec};

/// Longest line kept in full (excluding `\r\n`).
pub const MAX_LINE_LEN: usize = 64;

/// One received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line text, truncated to [`MAX_LINE_LEN`] if it overflowed.
    /// Non-ASCII bytes are replaced with `?`.
    pub text: String<MAX_LINE_LEN>,
    pub overflowed: bool,
    /// At least one byte was outside ASCII.
    pub non_ascii: bool,
}

impl Line {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// False if the text does not faithfully hold what was received.
    pub fn is_intact(&self) -> bool {
        !self.overflowed && !self.non_ascii
    }
}

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
    non_ascii: bool,
    cr_held: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
            non_ascii: false,
            cr_held: false,
        }
    }

    /// Feed one byte.  Returns `Some(Line)` when `byte` completes a line.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        if byte == b'\n' {
            self.cr_held = false;
            return Some(self.take_line());
        }
        if self.cr_held {
            self.store(b'\r');
        }
        self.cr_held = byte == b'\r';
        if !self.cr_held {
            self.store(byte);
        }
        None
    }

    fn store(&mut self, byte: u8) {
        if !byte.is_ascii() {
            self.non_ascii = true;
        }
        if self.buf.push(byte).is_err() {
            self.overflowed = true;
        }
    }

    fn take_line(&mut self) -> Line {
        let mut text = String::new();
        for &b in &self.buf {
            let c = if b.is_ascii() { b as char } else { '?' };
            // Cannot fail: one char per byte and both buffers share a capacity.
            let _ = text.push(c);
        }
        let line = Line {
            text,
            overflowed: self.overflowed,
            non_ascii: self.non_ascii,
        };
        self.reset();
        line
    }

    /// Feed a chunk, invoking `on_line` for every completed line.
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(Line)) {
        for &b in data {
            if let Some(line) = self.push(b) {
                on_line(line);
            }
        }
    }

    /// Bytes currently buffered for the unfinished line.
    pub fn pending(&self) -> usize {
        self.buf.len() + usize::from(self.cr_held)
    }

    /// Drop any partial line (e.g. after a transport reset).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflowed = false;
        self.non_ascii = false;
        self.cr_held = false;
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}
