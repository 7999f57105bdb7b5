//! Error types for the control layer.
//!
//! Only two things can actually fail: building a range from bad bounds, and
//! decoding or encoding a protocol frame. Everything else (NaN samples,
//! overshooting parameter values) is clamped at the point of use.

/// Errors raised while validating a parameter range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// `max` is not strictly greater than `min`.
    EmptyRange { min: f64, max: f64 },
    /// One of the bounds (or the default) is NaN or infinite.
    NonFiniteBound,
    /// The default value lies outside `[min, max]`.
    DefaultOutOfRange { default: f64, min: f64, max: f64 },
    /// A skew factor that is not finite and positive.
    InvalidSkew(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRange { min, max } => {
                write!(f, "range max ({max}) must be greater than min ({min})")
            }
            Self::NonFiniteBound => write!(f, "range bounds must be finite"),
            Self::DefaultOutOfRange { default, min, max } => {
                write!(f, "default {default} lies outside {min}..={max}")
            }
            Self::InvalidSkew(factor) => {
                write!(f, "skew factor must be finite and positive, got {factor}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by the JSON wire codec.
#[derive(Debug)]
pub enum ProtocolError {
    /// The frame was not valid JSON or did not match the message shape.
    Json(serde_json::Error),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed message: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for range validation.
pub type Result<T> = std::result::Result<T, ConfigError>;
