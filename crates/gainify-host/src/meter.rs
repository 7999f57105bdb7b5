//! Peak hand-off from the audio thread to the editor.

use std::sync::atomic::{AtomicU64, Ordering};

/// Bit pattern marking "nothing published since the last take".
const EMPTY: u64 = u64::MAX;

/// Lock-free cell holding the highest peak published since the last read.
///
/// The audio thread calls [`publish`](Self::publish) once per block; the
/// editor calls [`take`](Self::take) once per sync tick. Several blocks
/// between two ticks fold into their maximum, so short transients still reach
/// the meter.
pub struct PeakCell {
    bits: AtomicU64,
}

impl PeakCell {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            bits: AtomicU64::new(EMPTY),
        }
    }

    /// Publish a linear peak amplitude.
    ///
    /// Negative values are stored as their magnitude. NaN and infinities are
    /// discarded, as the wire format cannot carry them.
    pub fn publish(&self, amplitude: f64) {
        if !amplitude.is_finite() {
            return;
        }
        let amplitude = amplitude.abs();
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == EMPTY || amplitude > f64::from_bits(current) {
                    Some(amplitude.to_bits())
                } else {
                    None
                }
            });
    }

    /// Publish the peak magnitude of a block of samples.
    pub fn publish_block(&self, samples: &[f32]) {
        let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        self.publish(peak as f64);
    }

    /// Take the pending peak, leaving the cell empty.
    pub fn take(&self) -> Option<f64> {
        match self.bits.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            bits => Some(f64::from_bits(bits)),
        }
    }
}

impl Default for PeakCell {
    fn default() -> Self {
        Self::new()
    }
}
