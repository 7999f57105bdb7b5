//! Range mapping between raw parameter values and the unit interval.
//!
//! Gestures are expressed in normalized units (a full drag sweep is 0.0 to
//! 1.0 regardless of what the parameter measures). A [`RangeMapper`] converts
//! between that space and the raw domain, which for the gain knob is linear
//! amplitude.
//!
//! - [`LinearRange`] - straight-line mapping, used by the GUI knob
//! - [`SkewedRange`] - power-curve mapping, used by the host parameter store
//!
//! Ranges are validated on construction. An empty or inverted range has no
//! valid mapping at all, so the panicking constructors fail fast; the
//! `try_new` variants report the same problems as [`ConfigError`].

use crate::error::{ConfigError, Result};
use crate::gain::db_to_gain;

/// Bidirectional mapping between a bounded raw domain and `[0, 1]`.
pub trait RangeMapper: Send + Sync {
    /// Map a raw value to `[0, 1]`. Values outside the range are clamped.
    fn normalize(&self, value: f64) -> f64;

    /// Map a normalized value back to the raw domain.
    ///
    /// Inputs outside `[0, 1]` are clamped first, so the result always lies
    /// within `[min, max]`.
    fn denormalize(&self, normalized: f64) -> f64;

    /// Lower bound of the raw domain.
    fn min(&self) -> f64;

    /// Upper bound of the raw domain.
    fn max(&self) -> f64;

    /// Default raw value.
    fn default_value(&self) -> f64;

    /// Default value in normalized units.
    fn default_normalized(&self) -> f64 {
        self.normalize(self.default_value())
    }

    /// Clamp a raw value into `[min, max]`.
    ///
    /// NaN has no nearest bound and is returned unchanged; callers decide
    /// whether to drop it.
    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min(), self.max())
    }
}

fn validate(min: f64, max: f64, default: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || !default.is_finite() {
        return Err(ConfigError::NonFiniteBound);
    }
    if max <= min {
        return Err(ConfigError::EmptyRange { min, max });
    }
    if default < min || default > max {
        return Err(ConfigError::DefaultOutOfRange { default, min, max });
    }
    Ok(())
}

/// Clamp a normalized value to `[0, 1]`; NaN maps to the start of travel.
#[inline]
fn unit_clamp(normalized: f64) -> f64 {
    if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    }
}

// =============================================================================
// LinearRange
// =============================================================================

/// Linear mapping: `normalize(v) = (v - min) / (max - min)`.
///
/// `normalize` and `denormalize` are exact inverses up to floating-point
/// rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRange {
    min: f64,
    max: f64,
    default: f64,
}

impl LinearRange {
    /// Create a linear range.
    ///
    /// # Panics
    ///
    /// Panics if `max <= min`, if any value is not finite, or if `default`
    /// lies outside the range.
    pub fn new(min: f64, max: f64, default: f64) -> Self {
        match Self::try_new(min, max, default) {
            Ok(range) => range,
            Err(e) => panic!("invalid parameter range: {e}"),
        }
    }

    /// Create a linear range, reporting invalid bounds as an error.
    pub fn try_new(min: f64, max: f64, default: f64) -> Result<Self> {
        validate(min, max, default)?;
        Ok(Self { min, max, default })
    }

    /// Linear range over a decibel span, expressed in linear gain.
    ///
    /// # Example
    ///
    /// ```
    /// use gainify_core::range::{LinearRange, RangeMapper};
    ///
    /// let range = LinearRange::from_db(-30.0, 30.0, 0.0);
    /// assert!((range.default_value() - 1.0).abs() < 1e-12);
    /// ```
    pub fn from_db(min_db: f64, max_db: f64, default_db: f64) -> Self {
        Self::new(db_to_gain(min_db), db_to_gain(max_db), db_to_gain(default_db))
    }
}

impl RangeMapper for LinearRange {
    fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    fn denormalize(&self, normalized: f64) -> f64 {
        let u = unit_clamp(normalized);
        (self.min + u * (self.max - self.min)).clamp(self.min, self.max)
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn default_value(&self) -> f64 {
        self.default
    }
}

// =============================================================================
// SkewedRange
// =============================================================================

/// Skew factor that puts the dB midpoint of `min_db..=max_db` at the middle
/// of normalized travel when the range is expressed in linear gain.
///
/// For a symmetric span such as -30..=30 dB this places 0 dB (unity gain)
/// at 0.5.
pub fn gain_skew_factor(min_db: f64, max_db: f64) -> f64 {
    let min_gain = db_to_gain(min_db);
    let max_gain = db_to_gain(max_db);
    let middle_gain = db_to_gain((min_db + max_db) / 2.0);

    0.5_f64.ln() / ((middle_gain - min_gain) / (max_gain - min_gain)).ln()
}

/// Power-curve mapping: `normalize(v) = ((v - min) / (max - min))^factor`.
///
/// A factor below 1.0 spends more of the travel near the lower end, which is
/// what a gain control in linear amplitude needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewedRange {
    min: f64,
    max: f64,
    default: f64,
    factor: f64,
}

impl SkewedRange {
    /// Create a skewed range.
    ///
    /// # Panics
    ///
    /// Panics on the same conditions as [`LinearRange::new`], or if `factor`
    /// is not finite and positive.
    pub fn new(min: f64, max: f64, default: f64, factor: f64) -> Self {
        match Self::try_new(min, max, default, factor) {
            Ok(range) => range,
            Err(e) => panic!("invalid parameter range: {e}"),
        }
    }

    /// Create a skewed range, reporting invalid input as an error.
    pub fn try_new(min: f64, max: f64, default: f64, factor: f64) -> Result<Self> {
        validate(min, max, default)?;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::InvalidSkew(factor));
        }
        Ok(Self {
            min,
            max,
            default,
            factor,
        })
    }

    /// Gain range over a decibel span with the skew from [`gain_skew_factor`].
    pub fn gain_db(min_db: f64, max_db: f64, default_db: f64) -> Self {
        Self::new(
            db_to_gain(min_db),
            db_to_gain(max_db),
            db_to_gain(default_db),
            gain_skew_factor(min_db, max_db),
        )
    }

    /// The skew exponent.
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl RangeMapper for SkewedRange {
    fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        let linear = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        linear.powf(self.factor)
    }

    fn denormalize(&self, normalized: f64) -> f64 {
        let u = unit_clamp(normalized);
        let linear = u.powf(self.factor.recip());
        (self.min + linear * (self.max - self.min)).clamp(self.min, self.max)
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn default_value(&self) -> f64 {
        self.default
    }
}
