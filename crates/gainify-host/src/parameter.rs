//! The plugin's authoritative gain parameter.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use gainify_core::config::KnobConfig;
use gainify_core::format::Formatter;
use gainify_core::gain::{db_to_gain, gain_to_db};
use gainify_core::range::{RangeMapper, SkewedRange};

/// Gain parameter with atomic storage.
///
/// The value is held as a normalized `f64` in an `AtomicU64`, mapped through
/// a skewed range so that unity gain sits at the middle of host automation
/// lanes. Plain values are linear gain, matching the wire protocol.
///
/// Every store raises a "changed" flag which the editor consumes with
/// [`take_changed`](Self::take_changed) to decide whether the GUI needs an
/// update.
///
/// # Example
///
/// ```
/// use gainify_host::GainParameter;
///
/// let gain = GainParameter::default();
/// assert!((gain.get() - 1.0).abs() < 1e-9);
///
/// gain.set(0.5);
/// assert_eq!(gain.display(), "-6.02 dB");
/// ```
pub struct GainParameter {
    /// Atomic storage for the normalized value (0.0-1.0)
    value: AtomicU64,
    changed: AtomicBool,
    range: SkewedRange,
    formatter: Formatter,
}

impl GainParameter {
    /// Create a gain parameter spanning the configured dB range.
    ///
    /// # Panics
    ///
    /// Panics if the configuration describes an empty or inverted range.
    pub fn new(config: &KnobConfig) -> Self {
        let range = SkewedRange::gain_db(config.min_db, config.max_db, config.default_db);
        Self {
            value: AtomicU64::new(range.default_normalized().to_bits()),
            changed: AtomicBool::new(false),
            range,
            formatter: Formatter::Fixed {
                precision: config.precision,
            },
        }
    }

    // === Value access ===

    /// Current value as linear gain.
    #[inline]
    pub fn get(&self) -> f64 {
        self.range.denormalize(self.normalized())
    }

    /// Current value in dB.
    pub fn get_db(&self) -> f64 {
        gain_to_db(self.get())
    }

    /// Store a linear gain value, clamped to the range.
    ///
    /// NaN is ignored.
    pub fn set(&self, value: f64) {
        if value.is_nan() {
            log::warn!("ignoring NaN gain");
            return;
        }
        self.store(self.range.normalize(value));
    }

    /// Current normalized value.
    #[inline]
    pub fn normalized(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Store a normalized value, clamped to `[0, 1]`.
    pub fn set_normalized(&self, normalized: f64) {
        if normalized.is_nan() {
            log::warn!("ignoring NaN normalized gain");
            return;
        }
        self.store(normalized.clamp(0.0, 1.0));
    }

    fn store(&self, normalized: f64) {
        self.value.store(normalized.to_bits(), Ordering::Relaxed);
        self.changed.store(true, Ordering::Relaxed);
    }

    /// Clear and return the "changed" flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::Relaxed)
    }

    // === Display ===

    /// Current value as display text, e.g. "-6.02 dB".
    pub fn display(&self) -> String {
        self.formatter.display(self.get_db())
    }

    /// Parse display text (dB, unit optional) into linear gain.
    ///
    /// The result is clamped to the range.
    pub fn parse(&self, s: &str) -> Option<f64> {
        let db = self.formatter.parse(s)?;
        Some(self.range.clamp(db_to_gain(db)))
    }

    /// The value range.
    pub fn range(&self) -> &SkewedRange {
        &self.range
    }
}

impl Default for GainParameter {
    fn default() -> Self {
        Self::new(&KnobConfig::GAIN)
    }
}
