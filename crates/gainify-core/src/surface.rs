//! Composition root for the gain control surface.
//!
//! [`ControlSurface`] wires a [`KnobController`] and a [`PeakTracker`] to a
//! [`MessageBridge`]:
//!
//! ```text
//!            gestures                     SetGain
//! user ──► KnobController ──────────────────────────► bridge ──► plugin
//!                 ▲
//!                 │ apply_external        ParamChange
//!                 └──────────────────────────────────  bridge ◄── plugin
//!          PeakTracker ◄───────────────── PeakMeterData
//! ```
//!
//! Each gesture computes the new value and sends the request within the same
//! call. The state borrow is released before sending, so a bridge that
//! delivers replies synchronously does not re-enter a borrow.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::{MessageBridge, Subscription};
use crate::config::KnobConfig;
use crate::knob::{KnobController, KnobKey, StepDirection};
use crate::peak::{PeakState, PeakTracker};
use crate::protocol::{PluginMessage, PluginRequest};

struct SurfaceState {
    knob: KnobController,
    peak: PeakTracker,
}

impl SurfaceState {
    fn handle(&mut self, message: PluginMessage) {
        match message {
            PluginMessage::ParamChange { value } => self.knob.apply_external(value),
            PluginMessage::PeakMeterData { value } => {
                self.peak.record(value);
            }
        }
    }
}

/// A mounted gain knob with its peak meter.
///
/// Dropping the surface (or calling [`unmount`](Self::unmount)) releases the
/// bridge subscription.
pub struct ControlSurface<B: MessageBridge> {
    bridge: B,
    state: Rc<RefCell<SurfaceState>>,
    subscription: Subscription,
}

impl<B: MessageBridge> ControlSurface<B> {
    /// Build the knob and meter and take over the bridge's inbound handler.
    ///
    /// # Panics
    ///
    /// Panics if `config` describes an empty or inverted range.
    pub fn mount(bridge: B, config: &KnobConfig) -> Self {
        let state = Rc::new(RefCell::new(SurfaceState {
            knob: KnobController::new(config),
            peak: PeakTracker::new(),
        }));

        let inbound = Rc::downgrade(&state);
        let subscription = bridge.subscribe(Box::new(move |message| {
            if let Some(state) = inbound.upgrade() {
                state.borrow_mut().handle(message);
            }
        }));

        Self {
            bridge,
            state,
            subscription,
        }
    }

    /// Release the subscription and hand the bridge back.
    pub fn unmount(self) -> B {
        let Self {
            bridge,
            subscription,
            ..
        } = self;
        drop(subscription);
        bridge
    }

    fn gesture(&self, f: impl FnOnce(&mut KnobController) -> PluginRequest) {
        let request = f(&mut self.state.borrow_mut().knob);
        self.bridge.send(request);
    }

    // -------------------------------------------------------------------------
    // Gestures
    // -------------------------------------------------------------------------

    /// Move the knob to a normalized position.
    pub fn set_normalized(&self, normalized: f64) {
        self.gesture(|knob| knob.set_from_normalized(normalized));
    }

    /// Pointer down on the knob.
    pub fn begin_drag(&self) {
        self.state.borrow_mut().knob.begin_drag();
    }

    /// Pointer moved while dragging.
    pub fn drag_by(&self, dx: f64, dy: f64) {
        self.gesture(|knob| knob.drag_by(dx, dy));
    }

    /// Pointer released.
    pub fn end_drag(&self) {
        self.state.borrow_mut().knob.end_drag();
    }

    /// Keyboard step.
    pub fn step(&self, direction: StepDirection, large: bool) {
        self.gesture(|knob| knob.step(direction, large));
    }

    /// Keyboard action.
    pub fn key(&self, key: KnobKey) {
        self.gesture(|knob| knob.key(key));
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    /// Current raw value (linear gain).
    pub fn raw_value(&self) -> f64 {
        self.state.borrow().knob.raw()
    }

    /// Knob position in `[0, 1]`.
    pub fn normalized(&self) -> f64 {
        self.state.borrow().knob.normalized()
    }

    /// Knob readout, e.g. "0 dB".
    pub fn display_value(&self) -> String {
        self.state.borrow().knob.display_value()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.state.borrow().knob.is_dragging()
    }

    /// Meter snapshot.
    pub fn peak(&self) -> PeakState {
        self.state.borrow().peak.state()
    }

    /// Whether this surface still owns the bridge's inbound handler.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_active()
    }

    /// The underlying bridge.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }
}
