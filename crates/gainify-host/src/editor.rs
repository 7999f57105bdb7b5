//! Editor sync loop: the plugin-side end of the GUI protocol.
//!
//! The host calls [`EditorSync::pump`] on its UI timer with whatever frames
//! the webview posted since the last tick. One pump:
//!
//! 1. applies every `SetGain` from the GUI as a host edit gesture,
//! 2. if the GUI sent nothing and the parameter moved (automation, preset,
//!    host UI), pushes one `ParamChange` back,
//! 3. pushes one `PeakMeterData` if the audio thread published a new peak.
//!
//! A change that came from the GUI is never reported back to it.

use std::sync::Arc;

use gainify_core::protocol::{decode_request, encode_message, PluginMessage, PluginRequest};

use crate::meter::PeakCell;
use crate::parameter::GainParameter;

/// Host-side automation gesture for the gain parameter.
///
/// Maps onto the format's begin/perform/end edit calls so the host records
/// each GUI change as one undoable, automatable edit.
pub trait HostEdits {
    /// Start an edit gesture.
    fn begin_edit(&mut self);

    /// Report the new normalized value.
    fn perform_edit(&mut self, normalized: f64);

    /// Finish the edit gesture.
    fn end_edit(&mut self);
}

/// Host that does not track edits (standalone, tests).
impl HostEdits for () {
    fn begin_edit(&mut self) {}
    fn perform_edit(&mut self, _normalized: f64) {}
    fn end_edit(&mut self) {}
}

/// What one [`EditorSync::pump`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// `SetGain` requests applied.
    pub applied: usize,
    /// Frames that were malformed or of an unknown type.
    pub rejected: usize,
    /// Frames posted to the GUI.
    pub posted: usize,
}

/// Bridges the gain parameter and peak cell to the webview.
pub struct EditorSync {
    parameter: Arc<GainParameter>,
    peak: Arc<PeakCell>,
}

impl EditorSync {
    /// Create a sync loop over shared plugin state.
    pub fn new(parameter: Arc<GainParameter>, peak: Arc<PeakCell>) -> Self {
        Self { parameter, peak }
    }

    /// Process one tick.
    ///
    /// `frames` are the JSON strings the GUI posted since the previous tick,
    /// in order. Outgoing frames are handed to `post`.
    pub fn pump<I, S>(
        &self,
        frames: I,
        host: &mut dyn HostEdits,
        post: &mut dyn FnMut(&str),
    ) -> SyncReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = SyncReport::default();

        for frame in frames {
            let frame = frame.as_ref();
            match decode_request(frame) {
                Ok(Some(PluginRequest::SetGain { value })) => {
                    self.apply(value, host);
                    report.applied += 1;
                }
                Ok(None) => {
                    log::debug!("ignoring unknown GUI request: {frame}");
                    report.rejected += 1;
                }
                Err(e) => {
                    log::warn!("invalid GUI request ({e}): {frame}");
                    report.rejected += 1;
                }
            }
        }

        // Always consume the flag so the GUI's own edit is not echoed next tick.
        let changed = self.parameter.take_changed();
        if report.applied == 0 && changed {
            let value = self.parameter.get();
            if Self::post_message(PluginMessage::ParamChange { value }, post) {
                report.posted += 1;
            }
        }

        if let Some(value) = self.peak.take() {
            if Self::post_message(PluginMessage::PeakMeterData { value }, post) {
                report.posted += 1;
            }
        }

        report
    }

    fn apply(&self, value: f64, host: &mut dyn HostEdits) {
        if value.is_nan() {
            log::warn!("ignoring NaN SetGain from GUI");
            return;
        }
        self.parameter.set(value);
        host.begin_edit();
        host.perform_edit(self.parameter.normalized());
        host.end_edit();
    }

    fn post_message(message: PluginMessage, post: &mut dyn FnMut(&str)) -> bool {
        match encode_message(&message) {
            Ok(json) => {
                post(&json);
                true
            }
            Err(e) => {
                log::error!("failed to serialize {message:?}: {e}");
                false
            }
        }
    }

    /// The shared parameter.
    pub fn parameter(&self) -> &Arc<GainParameter> {
        &self.parameter
    }

    /// The shared peak cell.
    pub fn peak(&self) -> &Arc<PeakCell> {
        &self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gainify_core::gain::db_to_gain;
    use gainify_core::protocol::decode_message;

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<String>,
    }

    impl HostEdits for RecordingHost {
        fn begin_edit(&mut self) {
            self.calls.push("begin".into());
        }
        fn perform_edit(&mut self, normalized: f64) {
            self.calls.push(format!("perform {normalized:.3}"));
        }
        fn end_edit(&mut self) {
            self.calls.push("end".into());
        }
    }

    fn sync() -> EditorSync {
        EditorSync::new(Arc::new(GainParameter::default()), Arc::new(PeakCell::new()))
    }

    fn decoded(frames: &[String]) -> Vec<PluginMessage> {
        frames
            .iter()
            .map(|f| decode_message(f).unwrap().unwrap())
            .collect()
    }

    #[test]
    fn test_gui_request_becomes_host_edit() {
        let sync = sync();
        let mut host = RecordingHost::default();
        let mut out = Vec::new();

        let report = sync.pump(
            [r#"{"type":"SetGain","value":31.622776601683793}"#],
            &mut host,
            &mut |json| out.push(json.to_string()),
        );

        assert_eq!(report.applied, 1);
        assert!((sync.parameter().get_db() - 30.0).abs() < 1e-9);
        assert_eq!(host.calls, vec!["begin", "perform 1.000", "end"]);
        // No echo of the GUI's own change
        assert!(out.is_empty());

        // Nor on the following tick
        let report = sync.pump(Vec::<String>::new(), &mut host, &mut |json| {
            out.push(json.to_string())
        });
        assert_eq!(report.posted, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_external_change_is_reported_once() {
        let sync = sync();
        let mut out = Vec::new();

        sync.parameter().set(0.5);
        sync.pump(Vec::<String>::new(), &mut (), &mut |json| {
            out.push(json.to_string())
        });
        sync.pump(Vec::<String>::new(), &mut (), &mut |json| {
            out.push(json.to_string())
        });

        let messages = decoded(&out);
        assert_eq!(messages.len(), 1);
        match messages[0] {
            PluginMessage::ParamChange { value } => assert!((value - 0.5).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_peak_is_forwarded() {
        let sync = sync();
        let mut out = Vec::new();

        sync.peak().publish(db_to_gain(-12.0));
        let report = sync.pump(Vec::<String>::new(), &mut (), &mut |json| {
            out.push(json.to_string())
        });

        assert_eq!(report.posted, 1);
        match decoded(&out)[0] {
            PluginMessage::PeakMeterData { value } => {
                assert!((value - db_to_gain(-12.0)).abs() < 1e-12)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_infinite_peak_never_reaches_the_wire() {
        let sync = sync();
        let mut out = Vec::new();

        sync.peak().publish(f64::INFINITY);
        sync.peak().publish_block(&[f32::INFINITY, 0.25]);
        let report = sync.pump(Vec::<String>::new(), &mut (), &mut |json| {
            out.push(json.to_string())
        });

        // Every posted frame decodes, and the infinite samples were dropped
        assert_eq!(report.posted, 0);
        assert!(decoded(&out).is_empty());

        sync.peak().publish(0.25);
        sync.pump(Vec::<String>::new(), &mut (), &mut |json| {
            out.push(json.to_string())
        });
        assert_eq!(decoded(&out), vec![PluginMessage::PeakMeterData { value: 0.25 }]);
    }

    #[test]
    fn test_bad_frames_are_skipped() {
        let sync = sync();
        let mut host = RecordingHost::default();

        let report = sync.pump(
            [
                "garbage",
                r#"{"type":"Init"}"#,
                r#"{"type":"SetGain","value":2.0}"#,
            ],
            &mut host,
            &mut |_| {},
        );

        assert_eq!(report.rejected, 2);
        assert_eq!(report.applied, 1);
        assert!((sync.parameter().get() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_requests_apply_in_order() {
        let sync = sync();
        let frames: Vec<String> = [0.5, 2.0, 4.0]
            .iter()
            .map(|v| format!(r#"{{"type":"SetGain","value":{v}}}"#))
            .collect();

        sync.pump(&frames, &mut (), &mut |_| {});
        assert!((sync.parameter().get() - 4.0).abs() < 1e-9);
    }
}
