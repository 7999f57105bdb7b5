//! Control layer for a webview-hosted gain plugin GUI.
//!
//! This crate holds everything between a pointer event and a parameter
//! request, with no rendering and no DSP:
//!
//! - [`range`] - raw value ↔ normalized mapping
//! - [`gain`] - linear gain ↔ dB conversion with a meter floor
//! - [`peak`] - peak meter with a running maximum
//! - [`knob`] - knob state machine (drag, keyboard, external updates)
//! - [`protocol`] - JSON messages exchanged with the plugin
//! - [`bridge`] / [`script`] - transports for those messages
//! - [`surface`] - composition root wiring it all together
//!
//! # Example
//!
//! ```
//! use gainify_core::prelude::*;
//!
//! let surface = ControlSurface::mount(ChannelBridge::new(), &KnobConfig::GAIN);
//! let requests = surface.bridge().outbound_receiver();
//!
//! surface.set_normalized(1.0);
//! assert_eq!(surface.display_value(), "30 dB");
//! assert_eq!(requests.try_iter().count(), 1);
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod format;
pub mod gain;
pub mod knob;
pub mod peak;
pub mod protocol;
pub mod range;
pub mod script;
pub mod surface;

pub use bridge::{ChannelBridge, HandlerSlot, MessageBridge, MessageHandler, Subscription};
pub use config::{KnobConfig, Orientation, DISPLAY_PRECISION, DRAG_SENSITIVITY, METER_FLOOR};
pub use error::{ConfigError, ProtocolError};
pub use format::Formatter;
pub use gain::{db_to_gain, gain_to_db, gain_to_db_floored, MAX_DB, METER_FLOOR_DB};
pub use knob::{KnobController, KnobKey, StepDirection};
pub use peak::{PeakState, PeakTracker};
pub use protocol::{
    decode_message, decode_request, encode_message, encode_request, PluginMessage, PluginRequest,
};
pub use range::{gain_skew_factor, LinearRange, RangeMapper, SkewedRange};
pub use script::ScriptBridge;
pub use surface::ControlSurface;

/// Common imports for embedding the control surface.
pub mod prelude {
    pub use crate::bridge::{ChannelBridge, MessageBridge, Subscription};
    pub use crate::config::{KnobConfig, Orientation};
    pub use crate::gain::{db_to_gain, gain_to_db};
    pub use crate::knob::{KnobKey, StepDirection};
    pub use crate::peak::PeakState;
    pub use crate::protocol::{PluginMessage, PluginRequest};
    pub use crate::script::ScriptBridge;
    pub use crate::surface::ControlSurface;
}
