//! Knob interaction state.
//!
//! [`KnobController`] owns the raw parameter value and turns gestures into
//! new values. Every user-driven mutation returns the [`PluginRequest`] that
//! must be sent for it; the caller forwards it in the same event handler.
//! [`KnobController::apply_external`] is the one mutation that returns
//! nothing, so a value received from the plugin can never be echoed back.
//!
//! # Gestures
//!
//! ```text
//! pointer down  -> begin_drag()
//! pointer move  -> drag_by(dx, dy)      one SetGain per call
//! pointer up    -> end_drag()
//! key press     -> key(KnobKey::..)     one SetGain per call
//! plugin update -> apply_external(raw)  no SetGain
//! ```

use crate::config::{KnobConfig, Orientation};
use crate::format::Formatter;
use crate::gain::gain_to_db;
use crate::protocol::PluginRequest;
use crate::range::{LinearRange, RangeMapper};

/// Direction of a keyboard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Increase,
    Decrease,
}

/// Keyboard actions the knob responds to.
///
/// The host page maps physical keys onto these (arrows, page up/down,
/// home/end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobKey {
    Increase,
    Decrease,
    IncreaseLarge,
    DecreaseLarge,
    ToMin,
    ToMax,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    /// Normalized position when the gesture started.
    origin: f64,
    /// Accumulated pointer travel in pixels.
    travel: f64,
}

/// Owner of the knob's raw value.
#[derive(Debug, Clone)]
pub struct KnobController {
    range: LinearRange,
    formatter: Formatter,
    drag_sensitivity: f64,
    orientation: Orientation,
    step: f64,
    step_larger: f64,
    raw: f64,
    drag: Option<Drag>,
}

impl KnobController {
    /// Create a controller at the configured default.
    ///
    /// # Panics
    ///
    /// Panics if the configuration describes an empty or inverted range.
    pub fn new(config: &KnobConfig) -> Self {
        let range = config.range();
        Self {
            range,
            formatter: Formatter::Trimmed {
                precision: config.precision,
            },
            drag_sensitivity: config.drag_sensitivity,
            orientation: config.orientation,
            step: config.step,
            step_larger: config.step_larger,
            raw: range.default_value(),
            drag: None,
        }
    }

    // -------------------------------------------------------------------------
    // User gestures (each returns exactly one request)
    // -------------------------------------------------------------------------

    /// Move the knob to a normalized position.
    ///
    /// NaN keeps the current position. The request is still produced so that
    /// a gesture always settles with the plugin holding the displayed value.
    #[must_use = "the returned request must be sent to the plugin"]
    pub fn set_from_normalized(&mut self, normalized: f64) -> PluginRequest {
        let normalized = if normalized.is_nan() {
            self.normalized()
        } else {
            normalized
        };
        self.raw = self.range.clamp(self.range.denormalize(normalized));
        PluginRequest::SetGain { value: self.raw }
    }

    /// Step the value by the fine or coarse keyboard increment.
    ///
    /// With a zero step the value stays put and is re-sent.
    #[must_use = "the returned request must be sent to the plugin"]
    pub fn step(&mut self, direction: StepDirection, large: bool) -> PluginRequest {
        let size = if large { self.step_larger } else { self.step };
        let target = match direction {
            StepDirection::Increase => self.raw + size,
            StepDirection::Decrease => self.raw - size,
        };
        let normalized = self.range.normalize(self.range.clamp(target));
        self.set_from_normalized(normalized)
    }

    /// Handle a keyboard action.
    #[must_use = "the returned request must be sent to the plugin"]
    pub fn key(&mut self, key: KnobKey) -> PluginRequest {
        match key {
            KnobKey::Increase => self.step(StepDirection::Increase, false),
            KnobKey::Decrease => self.step(StepDirection::Decrease, false),
            KnobKey::IncreaseLarge => self.step(StepDirection::Increase, true),
            KnobKey::DecreaseLarge => self.step(StepDirection::Decrease, true),
            KnobKey::ToMin => self.set_from_normalized(0.0),
            KnobKey::ToMax => self.set_from_normalized(1.0),
        }
    }

    /// Start a drag gesture at the current position.
    pub fn begin_drag(&mut self) {
        self.drag = Some(Drag {
            origin: self.normalized(),
            travel: 0.0,
        });
    }

    /// Apply a pointer movement in screen coordinates.
    ///
    /// Starts a gesture if none is active.
    #[must_use = "the returned request must be sent to the plugin"]
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> PluginRequest {
        let travel = self.orientation.travel(dx, dy);
        self.drag_travel(travel)
    }

    /// Apply signed travel (pixels, positive increases the value).
    #[must_use = "the returned request must be sent to the plugin"]
    pub fn drag_travel(&mut self, travel: f64) -> PluginRequest {
        let origin = self.normalized();
        let sensitivity = self.drag_sensitivity;
        let drag = self.drag.get_or_insert(Drag {
            origin,
            travel: 0.0,
        });
        if travel.is_finite() {
            drag.travel += travel;
        }
        let target = (drag.origin + drag.travel * sensitivity).clamp(0.0, 1.0);
        self.set_from_normalized(target)
    }

    /// End the drag gesture. No request is produced.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    // -------------------------------------------------------------------------
    // Plugin updates
    // -------------------------------------------------------------------------

    /// Store a value received from the plugin. Never produces a request.
    ///
    /// Out-of-range values are clamped; NaN is dropped.
    pub fn apply_external(&mut self, raw: f64) {
        if raw.is_nan() {
            log::warn!("dropping NaN parameter value from plugin");
            return;
        }
        let clamped = self.range.clamp(raw);
        if clamped != raw {
            log::debug!("clamped external value {raw} to {clamped}");
        }
        self.raw = clamped;
        // An in-flight drag continues from where the plugin put the value.
        if let Some(drag) = self.drag.as_mut() {
            drag.origin = self.range.normalize(clamped);
            drag.travel = 0.0;
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current raw value (linear gain).
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// Current position in `[0, 1]`, recomputed from the raw value.
    pub fn normalized(&self) -> f64 {
        self.range.normalize(self.raw)
    }

    /// Current value in dB, rounded to the readout precision.
    ///
    /// Rounding applies to the dB value, not to the raw gain.
    pub fn rounded_db(&self) -> f64 {
        self.formatter
            .text(gain_to_db(self.raw))
            .parse()
            .unwrap_or_else(|_| gain_to_db(self.raw))
    }

    /// Readout text, e.g. "0 dB" or "-6.02 dB".
    pub fn display_value(&self) -> String {
        self.formatter.display(gain_to_db(self.raw))
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The raw value range.
    pub fn range(&self) -> &LinearRange {
        &self.range
    }
}

impl Default for KnobController {
    fn default() -> Self {
        Self::new(&KnobConfig::GAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::db_to_gain;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_defaults_to_unity() {
        let knob = KnobController::default();
        assert_close(knob.raw(), 1.0);
        assert_eq!(knob.display_value(), "0 dB");
        assert!(!knob.is_dragging());
    }

    #[test]
    fn test_set_from_normalized_emits_new_value() {
        let mut knob = KnobController::default();
        let request = knob.set_from_normalized(1.0);
        assert_close(request.value(), db_to_gain(30.0));
        assert_close(knob.raw(), db_to_gain(30.0));
        assert_eq!(knob.display_value(), "30 dB");

        let request = knob.set_from_normalized(0.0);
        assert_close(request.value(), db_to_gain(-30.0));
        assert_eq!(knob.display_value(), "-30 dB");
    }

    #[test]
    fn test_set_from_normalized_clamps() {
        let mut knob = KnobController::default();
        assert_close(knob.set_from_normalized(4.0).value(), db_to_gain(30.0));
        assert_close(knob.set_from_normalized(-1.0).value(), db_to_gain(-30.0));
    }

    #[test]
    fn test_nan_position_keeps_value() {
        let mut knob = KnobController::default();
        let request = knob.set_from_normalized(f64::NAN);
        assert_close(request.value(), 1.0);
        assert_close(knob.raw(), 1.0);
    }

    #[test]
    fn test_zero_step_resends_current_value() {
        let mut knob = KnobController::default();
        let request = knob.step(StepDirection::Increase, false);
        assert_close(request.value(), 1.0);
        let request = knob.key(KnobKey::DecreaseLarge);
        assert_close(request.value(), 1.0);
    }

    #[test]
    fn test_configured_steps() {
        let config = KnobConfig::GAIN.with_steps(0.5, 2.0);
        let mut knob = KnobController::new(&config);

        assert_close(knob.key(KnobKey::Increase).value(), 1.5);
        assert_close(knob.key(KnobKey::IncreaseLarge).value(), 3.5);
        assert_close(knob.key(KnobKey::Decrease).value(), 3.0);
        assert_close(knob.key(KnobKey::DecreaseLarge).value(), 1.0);
    }

    #[test]
    fn test_step_stops_at_bounds() {
        let config = KnobConfig::GAIN.with_steps(100.0, 100.0);
        let mut knob = KnobController::new(&config);
        assert_close(knob.key(KnobKey::Increase).value(), db_to_gain(30.0));
        assert_close(knob.key(KnobKey::Decrease).value(), db_to_gain(-30.0));
    }

    #[test]
    fn test_home_and_end() {
        let mut knob = KnobController::default();
        assert_close(knob.key(KnobKey::ToMax).value(), db_to_gain(30.0));
        assert_close(knob.key(KnobKey::ToMin).value(), db_to_gain(-30.0));
    }

    #[test]
    fn test_vertical_drag() {
        let mut knob = KnobController::default();
        knob.set_from_normalized(0.5).value();
        knob.begin_drag();
        assert!(knob.is_dragging());

        // 100px upward at 0.003 per pixel
        let request = knob.drag_by(0.0, -100.0);
        assert_close(knob.normalized(), 0.8);
        assert_close(request.value(), knob.raw());

        // Back down past the start
        knob.drag_by(0.0, 200.0).value();
        assert_close(knob.normalized(), 0.2);

        knob.end_drag();
        assert!(!knob.is_dragging());
    }

    #[test]
    fn test_drag_clamps_at_ends() {
        let mut knob = KnobController::default();
        knob.begin_drag();
        let request = knob.drag_by(0.0, -10_000.0);
        assert_close(request.value(), db_to_gain(30.0));
    }

    #[test]
    fn test_horizontal_drag_and_implicit_begin() {
        let config = KnobConfig::GAIN.with_orientation(Orientation::Horizontal);
        let mut knob = KnobController::new(&config);
        let start = knob.normalized();

        knob.drag_by(50.0, 999.0).value();
        assert!(knob.is_dragging());
        assert_close(knob.normalized(), start + 0.15);
    }

    #[test]
    fn test_apply_external_is_silent_and_clamps() {
        let mut knob = KnobController::default();
        knob.apply_external(2.0);
        assert_close(knob.raw(), 2.0);

        knob.apply_external(1000.0);
        assert_close(knob.raw(), db_to_gain(30.0));

        knob.apply_external(-1.0);
        assert_close(knob.raw(), db_to_gain(-30.0));

        knob.apply_external(f64::INFINITY);
        assert_close(knob.raw(), db_to_gain(30.0));
    }

    #[test]
    fn test_apply_external_drops_nan() {
        let mut knob = KnobController::default();
        knob.apply_external(f64::NAN);
        assert_close(knob.raw(), 1.0);
    }

    #[test]
    fn test_external_update_rebases_drag() {
        let mut knob = KnobController::default();
        knob.begin_drag();
        knob.drag_travel(100.0).value();

        knob.apply_external(1.0);
        let origin = knob.normalized();
        knob.drag_travel(10.0).value();
        assert_close(knob.normalized(), origin + 0.03);
    }

    #[test]
    fn test_rounded_db() {
        let mut knob = KnobController::default();
        knob.apply_external(0.5);
        assert_eq!(knob.rounded_db(), -6.02);
        assert_eq!(knob.display_value(), "-6.02 dB");
    }
}
