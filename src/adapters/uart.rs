//! UART transport for the operator terminal.
//!
//! Non-blocking reads from the UART driver's RX ring buffer; writes are
//! queued into the TX buffer and `flush` waits for them to drain.  The
//! driver itself is installed by `hw_init::init_peripherals()`.

use crate::error::CommsError;
use crate::protocol::transport::Transport;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Longest time `flush` waits for the TX FIFO to drain.
#[cfg(target_os = "espidf")]
const TX_DRAIN_TICKS: u32 = 20;

pub struct UartTransport {
    port: i32,
}

impl UartTransport {
    pub fn new(port: i32) -> Self {
        Self { port }
    }
}

#[cfg(target_os = "espidf")]
impl Transport for UartTransport {
    type Error = CommsError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CommsError> {
        // SAFETY: driver installed at boot; zero timeout makes this a
        // non-blocking copy out of the RX ring buffer.
        let n = unsafe { uart_read_bytes(self.port, buf.as_mut_ptr().cast(), buf.len() as u32, 0) };
        if n < 0 {
            return Err(CommsError::ReadFailed);
        }
        Ok(n as usize)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, CommsError> {
        // SAFETY: driver installed at boot; `data` outlives the call.
        let n = unsafe { uart_write_bytes(self.port, data.as_ptr().cast(), data.len()) };
        if n < 0 {
            return Err(CommsError::WriteFailed);
        }
        Ok(n as usize)
    }

    fn flush(&mut self) -> Result<(), CommsError> {
        // SAFETY: driver installed at boot.
        let ret = unsafe { uart_wait_tx_done(self.port, TX_DRAIN_TICKS) };
        if ret != ESP_OK as i32 {
            return Err(CommsError::WriteFailed);
        }
        Ok(())
    }

    fn available(&self) -> bool {
        let mut len: usize = 0;
        // SAFETY: driver installed at boot; `len` is a valid out-pointer.
        let ret = unsafe { uart_get_buffered_data_len(self.port, &mut len) };
        ret == ESP_OK as i32 && len > 0
    }
}

/// Host stub: no input, output discarded.
#[cfg(not(target_os = "espidf"))]
impl Transport for UartTransport {
    type Error = CommsError;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, CommsError> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, CommsError> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}
