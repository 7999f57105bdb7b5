//! Decibel formatting and parsing for readouts.
//!
//! The formatter separates the number from the unit:
//! - `text()` returns the bare value (e.g., "-6.02", "30")
//! - `unit()` returns "dB"
//! - `display()` joins them with a space (e.g., "-6.02 dB")
//!
//! Inputs are always decibel values. Rounding happens on the dB value only,
//! never on the linear gain it came from, so a readout is rounded exactly once.
//!
//! # Example
//!
//! ```
//! use gainify_core::format::Formatter;
//!
//! let knob = Formatter::Trimmed { precision: 2 };
//! assert_eq!(knob.display(29.999999999999996), "30 dB");
//!
//! let meter = Formatter::Fixed { precision: 2 };
//! assert_eq!(meter.text(-10.0), "-10.00");
//! ```

use crate::gain::METER_FLOOR_DB;

/// Decibel readout formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// Round to `precision` decimals, then drop trailing zeros.
    ///
    /// Format: "0", "30", "-6.02", "29.5"
    Trimmed {
        /// Maximum number of decimal places.
        precision: usize,
    },

    /// Always print `precision` decimals.
    ///
    /// Format: "-10.00", "-100.00"
    Fixed {
        /// Number of decimal places.
        precision: usize,
    },
}

impl Formatter {
    /// Format a decibel value without its unit.
    ///
    /// A value that rounds to zero prints without a sign.
    pub fn text(&self, db: f64) -> String {
        match self {
            Formatter::Trimmed { precision } => {
                let rounded = round_to(db, *precision);
                format!("{}", rounded)
            }
            Formatter::Fixed { precision } => {
                let rounded = round_to(db, *precision);
                format!("{:.prec$}", rounded, prec = *precision)
            }
        }
    }

    /// Format a decibel value followed by the unit.
    pub fn display(&self, db: f64) -> String {
        format!("{} {}", self.text(db), self.unit())
    }

    /// Parse user text into a decibel value.
    ///
    /// Accepts the number with or without the unit. `-inf` and its spellings
    /// parse to the meter floor. Returns `None` for anything else.
    pub fn parse(&self, s: &str) -> Option<f64> {
        let trimmed = s
            .trim()
            .trim_end_matches(" dB")
            .trim_end_matches("dB")
            .trim();

        if trimmed.eq_ignore_ascii_case("-inf")
            || trimmed.eq_ignore_ascii_case("-infinity")
            || trimmed == "-∞"
        {
            return Some(METER_FLOOR_DB);
        }

        let db: f64 = trimmed.parse().ok()?;
        db.is_finite().then_some(db)
    }

    /// The unit string.
    pub fn unit(&self) -> &'static str {
        "dB"
    }

    /// The configured precision.
    pub fn precision(&self) -> usize {
        match self {
            Formatter::Trimmed { precision } | Formatter::Fixed { precision } => *precision,
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Trimmed { precision: 2 }
    }
}

/// Round through the decimal text representation, folding `-0` into `0`.
fn round_to(value: f64, precision: usize) -> f64 {
    let rounded: f64 = format!("{:.prec$}", value, prec = precision)
        .parse()
        .unwrap_or(value);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
