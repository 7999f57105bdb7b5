//! Plugin-side peer of the Gainify GUI protocol.
//!
//! The audio processor owns an `Arc<GainParameter>` and an `Arc<PeakCell>`;
//! the editor owns an [`EditorSync`] over the same two and pumps it from the
//! host's UI timer.
//!
//! ```
//! use std::sync::Arc;
//! use gainify_host::{EditorSync, GainParameter, PeakCell};
//!
//! let gain = Arc::new(GainParameter::default());
//! let peak = Arc::new(PeakCell::new());
//! let editor = EditorSync::new(gain.clone(), peak.clone());
//!
//! // audio thread
//! peak.publish_block(&[0.5, -0.25]);
//!
//! // UI timer
//! let mut frames = Vec::new();
//! editor.pump([r#"{"type":"SetGain","value":2.0}"#], &mut (), &mut |json| {
//!     frames.push(json.to_string())
//! });
//! assert!((gain.get() - 2.0).abs() < 1e-9);
//! assert_eq!(frames, vec![r#"{"type":"PeakMeterData","value":0.5}"#]);
//! ```

pub mod editor;
pub mod meter;
pub mod parameter;

pub use editor::{EditorSync, HostEdits, SyncReport};
pub use meter::PeakCell;
pub use parameter::GainParameter;
