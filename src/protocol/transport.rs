//! Transport abstraction: any byte-oriented channel.
//!
//! On the board this is the UART terminal; in tests it is an in-memory
//! buffer.  The line layer ([`LineDecoder`](super::codec::LineDecoder) and
//! [`write_line`]) sits on top, so the engine never sees raw bytes.

use log::warn;

use crate::error::CommsError;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

fn write_all<T: Transport>(transport: &mut T, mut data: &[u8]) -> Result<(), CommsError> {
    while !data.is_empty() {
        match transport.write(data) {
            Ok(0) => return Err(CommsError::WriteFailed),
            Ok(n) => data = &data[n.min(data.len())..],
            Err(e) => {
                warn!("transport write failed: {:?}", e);
                return Err(CommsError::WriteFailed);
            }
        }
    }
    Ok(())
}

/// Write `line` followed by `\n`, as one unit.
pub fn write_line<T: Transport>(transport: &mut T, line: &str) -> Result<(), CommsError> {
    write_all(transport, line.as_bytes())?;
    write_all(transport, b"\n")?;
    transport.flush().map_err(|e| {
        warn!("transport flush failed: {:?}", e);
        CommsError::WriteFailed
    })
}
