//! Shared-resource coordinator for the single serial link.
//!
//! The terminal and the telemetry publisher both talk over one byte
//! stream.  Each must [`acquire`](Coordinator::acquire) it first; the wait
//! is bounded to a fixed number of scheduler ticks, after which the caller
//! skips its I/O for this cycle instead of blocking.  Access is scoped:
//! the returned guard releases the link when dropped, on every exit path.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embedded_hal::delay::DelayNs;
use log::debug;

/// Scoped hold on the coordinated resource.
pub type LinkGuard<'a, T> = MutexGuard<'a, CriticalSectionRawMutex, T>;

pub struct Coordinator<T> {
    resource: Mutex<CriticalSectionRawMutex, T>,
    wait_ticks: u32,
    tick_ms: u32,
}

impl<T> Coordinator<T> {
    pub fn new(resource: T, wait_ticks: u32, tick_ms: u32) -> Self {
        Self {
            resource: Mutex::new(resource),
            wait_ticks,
            tick_ms,
        }
    }

    /// Try to take the resource, retrying once per tick for up to
    /// `wait_ticks` ticks.  `None` means the caller must skip this cycle.
    pub fn acquire(&self, delay: &mut impl DelayNs) -> Option<LinkGuard<'_, T>> {
        if let Ok(guard) = self.resource.try_lock() {
            return Some(guard);
        }
        for _ in 0..self.wait_ticks {
            delay.delay_ms(self.tick_ms);
            if let Ok(guard) = self.resource.try_lock() {
                return Some(guard);
            }
        }
        debug!("coordinator: busy after {} tick(s), skipping", self.wait_ticks);
        None
    }

    /// Single attempt, no waiting.
    pub fn try_acquire(&self) -> Option<LinkGuard<'_, T>> {
        self.resource.try_lock().ok()
    }

    /// Worst-case time spent in [`acquire`](Self::acquire) before giving up.
    pub fn max_wait_ms(&self) -> u32 {
        self.wait_ticks.saturating_mul(self.tick_ms)
    }
}
