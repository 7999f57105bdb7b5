//! Linear gain ↔ decibel conversion.
//!
//! Both the knob readout and the peak meter work in decibels, but neither can
//! draw negative infinity. Silence and garbage input therefore collapse onto a
//! fixed floor instead of producing `-inf` or NaN.

/// Decibel value substituted for silence (gain ≤ 0) and invalid samples.
pub const METER_FLOOR_DB: f64 = -100.0;

/// Upper bound for converted values. Only reached by infinite input.
pub const MAX_DB: f64 = 200.0;

/// Convert linear gain to decibels, floored at [`METER_FLOOR_DB`].
///
/// Returns `20 * log10(gain)` for finite positive gain. Zero, negative and
/// NaN input yield the floor; positive infinity yields [`MAX_DB`].
///
/// # Example
///
/// ```
/// use gainify_core::gain::{gain_to_db, METER_FLOOR_DB};
///
/// assert!((gain_to_db(1.0)).abs() < 1e-12);
/// assert_eq!(gain_to_db(0.0), METER_FLOOR_DB);
/// ```
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    gain_to_db_floored(gain, METER_FLOOR_DB)
}

/// Convert linear gain to decibels with a caller-chosen floor.
///
/// The result is never below `floor` and never non-finite. A non-finite
/// floor falls back to [`METER_FLOOR_DB`]; a floor above [`MAX_DB`] is
/// lowered to it.
pub fn gain_to_db_floored(gain: f64, floor: f64) -> f64 {
    let floor = if floor.is_finite() {
        floor.min(MAX_DB)
    } else {
        METER_FLOOR_DB
    };
    if gain.is_nan() || gain <= 0.0 {
        return floor;
    }
    if gain.is_infinite() {
        return MAX_DB;
    }
    (20.0 * gain.log10()).clamp(floor, MAX_DB)
}

/// Convert decibels to linear gain: `10^(db / 20)`.
///
/// NaN is treated as silence and returns 0.0.
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    if db.is_nan() {
        return 0.0;
    }
    10.0_f64.powf(db / 20.0)
}
