//! Knob configuration.
//!
//! The control surface is configured entirely at compile time. Nothing here
//! is negotiated with the plugin; both sides agree on the range because both
//! are built from the same constants.
//!
//! # Example
//!
//! ```
//! use gainify_core::config::{KnobConfig, Orientation};
//!
//! pub static TRIM: KnobConfig = KnobConfig::new(-12.0, 12.0, 0.0)
//!     .with_precision(1)
//!     .with_orientation(Orientation::Horizontal);
//! ```

use crate::gain::METER_FLOOR_DB;
use crate::range::LinearRange;

/// Normalized units of travel per pixel of pointer movement.
pub const DRAG_SENSITIVITY: f64 = 0.003;

/// Decimal places of the knob's decibel readout.
pub const DISPLAY_PRECISION: usize = 2;

/// Lowest value the peak meter can show.
pub const METER_FLOOR: f64 = METER_FLOOR_DB;

/// Direction of pointer travel that turns the knob.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Dragging up increases the value.
    #[default]
    Vertical,
    /// Dragging right increases the value.
    Horizontal,
}

impl Orientation {
    /// Signed travel for a pointer movement in screen coordinates
    /// (y grows downward).
    pub fn travel(&self, dx: f64, dy: f64) -> f64 {
        match self {
            Orientation::Vertical => -dy,
            Orientation::Horizontal => dx,
        }
    }
}

/// Compile-time configuration for a decibel knob.
///
/// Bounds are given in dB; the raw parameter domain is the matching linear
/// gain range (see [`KnobConfig::range`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobConfig {
    /// Lower bound in dB.
    pub min_db: f64,
    /// Upper bound in dB.
    pub max_db: f64,
    /// Default value in dB.
    pub default_db: f64,
    /// Decimal places of the readout.
    pub precision: usize,
    /// Normalized units per pixel of drag.
    pub drag_sensitivity: f64,
    /// Which pointer axis turns the knob.
    pub orientation: Orientation,
    /// Keyboard step in raw units. Zero disables stepping.
    pub step: f64,
    /// Coarse keyboard step in raw units. Zero disables stepping.
    pub step_larger: f64,
}

impl KnobConfig {
    /// The output gain knob: -30 dB to +30 dB around unity.
    ///
    /// Keyboard steps are zero, so arrow keys re-send the current value
    /// without moving it.
    pub const GAIN: KnobConfig = KnobConfig::new(-30.0, 30.0, 0.0);

    /// Create a configuration with default precision, sensitivity and
    /// orientation, and keyboard stepping disabled.
    pub const fn new(min_db: f64, max_db: f64, default_db: f64) -> Self {
        Self {
            min_db,
            max_db,
            default_db,
            precision: DISPLAY_PRECISION,
            drag_sensitivity: DRAG_SENSITIVITY,
            orientation: Orientation::Vertical,
            step: 0.0,
            step_larger: 0.0,
        }
    }

    /// Set the readout precision.
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Set the drag sensitivity.
    pub const fn with_drag_sensitivity(mut self, sensitivity: f64) -> Self {
        self.drag_sensitivity = sensitivity;
        self
    }

    /// Set the drag orientation.
    pub const fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the fine and coarse keyboard steps (raw units).
    pub const fn with_steps(mut self, step: f64, step_larger: f64) -> Self {
        self.step = step;
        self.step_larger = step_larger;
        self
    }

    /// Raw (linear gain) range described by this configuration.
    ///
    /// # Panics
    ///
    /// Panics if `max_db <= min_db` or the default lies outside the bounds.
    pub fn range(&self) -> LinearRange {
        LinearRange::from_db(self.min_db, self.max_db, self.default_db)
    }
}

impl Default for KnobConfig {
    fn default() -> Self {
        Self::GAIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::db_to_gain;
    use crate::range::RangeMapper;

    #[test]
    fn test_gain_config() {
        let config = KnobConfig::GAIN;
        assert_eq!(config.precision, 2);
        assert_eq!(config.drag_sensitivity, 0.003);
        assert_eq!(config.step, 0.0);
        assert_eq!(config.step_larger, 0.0);

        let range = config.range();
        assert!((range.min() - db_to_gain(-30.0)).abs() < 1e-12);
        assert!((range.max() - db_to_gain(30.0)).abs() < 1e-12);
        assert!((range.default_value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_builder() {
        const TRIM: KnobConfig = KnobConfig::new(-12.0, 12.0, 0.0)
            .with_precision(1)
            .with_drag_sensitivity(0.01)
            .with_orientation(Orientation::Horizontal)
            .with_steps(0.1, 1.0);

        assert_eq!(TRIM.precision, 1);
        assert_eq!(TRIM.drag_sensitivity, 0.01);
        assert_eq!(TRIM.orientation, Orientation::Horizontal);
        assert_eq!(TRIM.step, 0.1);
        assert_eq!(TRIM.step_larger, 1.0);
    }

    #[test]
    fn test_orientation_travel() {
        assert_eq!(Orientation::Vertical.travel(5.0, -10.0), 10.0);
        assert_eq!(Orientation::Vertical.travel(5.0, 10.0), -10.0);
        assert_eq!(Orientation::Horizontal.travel(5.0, -10.0), 5.0);
    }

    #[test]
    #[should_panic(expected = "invalid parameter range")]
    fn test_inverted_config_panics() {
        KnobConfig::new(10.0, -10.0, 0.0).range();
    }
}
