//! Wire protocol between the GUI and the plugin.
//!
//! Messages are JSON objects tagged by a `type` field:
//!
//! ```text
//! plugin -> GUI   {"type":"ParamChange","value":1.0}
//!                 {"type":"PeakMeterData","value":0.25}
//! GUI -> plugin   {"type":"SetGain","value":1.0}
//! ```
//!
//! All values are linear (gain or amplitude), never dB. Unknown tags decode
//! to `Ok(None)` so an older GUI keeps working against a newer plugin.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Plugin-originated event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PluginMessage {
    /// Authoritative parameter value (linear gain).
    #[serde(alias = "param_change")]
    ParamChange { value: f64 },
    /// Latest peak amplitude (linear, ≥ 0).
    PeakMeterData { value: f64 },
}

/// GUI-originated request. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PluginRequest {
    /// Set the gain parameter (linear gain).
    SetGain { value: f64 },
}

impl PluginRequest {
    /// The carried raw value.
    pub fn value(&self) -> f64 {
        match self {
            PluginRequest::SetGain { value } => *value,
        }
    }
}

/// Decoding target that tolerates tags this build doesn't know.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum InboundFrame {
    #[serde(alias = "param_change")]
    ParamChange { value: f64 },
    PeakMeterData { value: f64 },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum OutboundFrame {
    SetGain { value: f64 },
    #[serde(other)]
    Unknown,
}

/// Decode a plugin-to-GUI frame.
///
/// Returns `Ok(None)` for a well-formed frame with an unknown `type`.
pub fn decode_message(json: &str) -> Result<Option<PluginMessage>, ProtocolError> {
    let frame = match serde_json::from_str::<InboundFrame>(json)? {
        InboundFrame::ParamChange { value } => Some(PluginMessage::ParamChange { value }),
        InboundFrame::PeakMeterData { value } => Some(PluginMessage::PeakMeterData { value }),
        InboundFrame::Unknown => None,
    };
    Ok(frame)
}

/// Encode a plugin-to-GUI frame.
pub fn encode_message(message: &PluginMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode a GUI-to-plugin frame.
///
/// Returns `Ok(None)` for a well-formed frame with an unknown `type`.
pub fn decode_request(json: &str) -> Result<Option<PluginRequest>, ProtocolError> {
    let frame = match serde_json::from_str::<OutboundFrame>(json)? {
        OutboundFrame::SetGain { value } => Some(PluginRequest::SetGain { value }),
        OutboundFrame::Unknown => None,
    };
    Ok(frame)
}

/// Encode a GUI-to-plugin frame.
pub fn encode_request(request: &PluginRequest) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(request)?)
}
