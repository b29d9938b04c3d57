//! Windowed statistical filters for raw ADC samples.
//!
//! Two spike-resistant policies are available behind [`SampleFilter`]:
//!
//! - [`TrimmedMean`]: sliding window, sorted on demand, the `trim` lowest and
//!   `trim` highest samples dropped and the centre averaged.
//! - [`MinMaxExcludingMean`]: circular window, averaged in one pass while
//!   tracking the single minimum and maximum, which are then excluded.
//!
//! Until a window has filled, both fall back to a plain mean of the samples
//! collected so far.

use heapless::{Deque, Vec};

use crate::config::{FilterPolicy, MAX_FILTER_WINDOW};

/// A filter that reduces a stream of raw samples to one scalar.
pub trait SampleFilter {
    /// Insert a raw sample, evicting the oldest once the window is full.
    fn push(&mut self, raw: u16);

    /// Current filtered value in ADC counts; `None` before the first sample.
    fn average(&self) -> Option<f32>;

    /// Number of samples currently held.
    fn len(&self) -> usize;

    /// True once the window is full and the spike-rejecting path is active.
    fn is_warm(&self) -> bool;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn plain_mean(samples: impl Iterator<Item = u16>) -> Option<f32> {
    let (sum, n) = samples.fold((0u32, 0u32), |(s, n), x| (s + x as u32, n + 1));
    (n > 0).then(|| sum as f32 / n as f32)
}

// ---------------------------------------------------------------------------
// Trimmed mean
// ---------------------------------------------------------------------------

pub struct TrimmedMean {
    window: Deque<u16, MAX_FILTER_WINDOW>,
    capacity: usize,
    trim: usize,
}

impl TrimmedMean {
    /// `capacity` is clamped to `1..=MAX_FILTER_WINDOW`; `trim` is reduced
    /// until at least one sample survives trimming.
    pub fn new(capacity: usize, trim: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_FILTER_WINDOW);
        Self {
            window: Deque::new(),
            capacity,
            trim: trim.min((capacity - 1) / 2),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn trim(&self) -> usize {
        self.trim
    }
}

impl SampleFilter for TrimmedMean {
    fn push(&mut self, raw: u16) {
        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        // Cannot fail: len < capacity <= MAX_FILTER_WINDOW after the pop.
        let _ = self.window.push_back(raw);
    }

    fn average(&self) -> Option<f32> {
        if !self.is_warm() {
            return plain_mean(self.window.iter().copied());
        }

        let mut sorted: Vec<u16, MAX_FILTER_WINDOW> = self.window.iter().copied().collect();
        sorted.sort_unstable();
        let kept = &sorted[self.trim..sorted.len() - self.trim];
        plain_mean(kept.iter().copied())
    }

    fn len(&self) -> usize {
        self.window.len()
    }

    fn is_warm(&self) -> bool {
        self.window.len() >= self.capacity
    }
}

// ---------------------------------------------------------------------------
// Min/max-excluding mean
// ---------------------------------------------------------------------------

pub struct MinMaxExcludingMean {
    ring: [u16; MAX_FILTER_WINDOW],
    capacity: usize,
    head: usize,
    count: usize,
}

impl MinMaxExcludingMean {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: [0; MAX_FILTER_WINDOW],
            capacity: capacity.clamp(1, MAX_FILTER_WINDOW),
            head: 0,
            count: 0,
        }
    }
}

impl SampleFilter for MinMaxExcludingMean {
    fn push(&mut self, raw: u16) {
        self.ring[self.head] = raw;
        self.head = (self.head + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    fn average(&self) -> Option<f32> {
        let held = &self.ring[..self.count];
        if !self.is_warm() || self.count <= 2 {
            return plain_mean(held.iter().copied());
        }

        let mut sum = 0u32;
        let mut min = u16::MAX;
        let mut max = u16::MIN;
        for &x in held {
            sum += x as u32;
            min = min.min(x);
            max = max.max(x);
        }
        let trimmed = sum - min as u32 - max as u32;
        Some(trimmed as f32 / (self.count - 2) as f32)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn is_warm(&self) -> bool {
        self.count >= self.capacity
    }
}

// ---------------------------------------------------------------------------
// Policy dispatch
// ---------------------------------------------------------------------------

/// The configured filter, selected at construction from a [`FilterPolicy`].
pub enum PolicyFilter {
    Trimmed(TrimmedMean),
    MinMax(MinMaxExcludingMean),
}

impl PolicyFilter {
    pub fn from_policy(policy: FilterPolicy) -> Self {
        match policy {
            FilterPolicy::TrimmedMean { window, trim } => {
                Self::Trimmed(TrimmedMean::new(window, trim))
            }
            FilterPolicy::MinMaxExcluding { window } => {
                Self::MinMax(MinMaxExcludingMean::new(window))
            }
        }
    }

    fn inner(&self) -> &dyn SampleFilter {
        match self {
            Self::Trimmed(f) => f,
            Self::MinMax(f) => f,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SampleFilter {
        match self {
            Self::Trimmed(f) => f,
            Self::MinMax(f) => f,
        }
    }
}

impl SampleFilter for PolicyFilter {
    fn push(&mut self, raw: u16) {
        self.inner_mut().push(raw);
    }

    fn average(&self) -> Option<f32> {
        self.inner().average()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn is_warm(&self) -> bool {
        self.inner().is_warm()
    }
}
