//! Fixed-capacity FIFO window of distance samples.

use std::collections::VecDeque;

/// The most recent `capacity` samples for one finger, oldest first.
///
/// Pushing into a full buffer evicts the oldest sample, so `len()` never
/// exceeds `capacity()`.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    samples:  VecDeque<f32>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        HistoryBuffer {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, sample: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self)      -> usize { self.samples.len() }
    pub fn capacity(&self) -> usize { self.capacity }
    pub fn is_empty(&self) -> bool  { self.samples.is_empty() }

    /// True once the warm-up period is over.
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.samples.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Arithmetic mean, `None` when empty.
    pub fn mean(&self) -> Option<f32> {
        mean_f64(&self.samples).map(|m| m as f32)
    }

    /// Population standard deviation, `None` when empty.
    pub fn std_dev(&self) -> Option<f32> {
        let mean = mean_f64(&self.samples)?;
        let var = self.samples.iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum::<f64>() / self.samples.len() as f64;
        Some(var.sqrt() as f32)
    }
}

// Accumulate in f64 so a window of identical samples has zero spread.
fn mean_f64(samples: &VecDeque<f32>) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
