//! JSON bridge for a webview-hosted surface.
//!
//! The webview exchanges strings with the plugin: the page posts request
//! frames through a script message handler, and the plugin evaluates a
//! callback with message frames. [`ScriptBridge`] is the GUI-side end of that
//! pipe. Outgoing requests are encoded and handed to a post function;
//! incoming frames are fed to [`ScriptBridge::receive_json`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::{HandlerSlot, MessageBridge, MessageHandler, Subscription};
use crate::protocol::{decode_message, encode_request, PluginRequest};

/// Function that delivers one encoded request frame to the plugin.
pub type PostFn = Rc<dyn Fn(&str)>;

/// Bridge that speaks the JSON wire protocol.
pub struct ScriptBridge {
    slot: HandlerSlot,
    post: RefCell<Option<PostFn>>,
}

impl ScriptBridge {
    /// Create a bridge that posts outgoing frames with `post`.
    pub fn new(post: impl Fn(&str) + 'static) -> Self {
        let post: PostFn = Rc::new(post);
        Self {
            slot: HandlerSlot::new(),
            post: RefCell::new(Some(post)),
        }
    }

    /// Decode one incoming frame and deliver it to the handler.
    ///
    /// Malformed frames and unknown message types are dropped. Returns `true`
    /// if a handler received the message.
    pub fn receive_json(&self, json: &str) -> bool {
        match decode_message(json) {
            Ok(Some(message)) => self.slot.dispatch(message),
            Ok(None) => {
                log::debug!("ignoring unknown message: {json}");
                false
            }
            Err(e) => {
                log::warn!("invalid IPC message ({e}): {json}");
                false
            }
        }
    }

    /// Detach from the webview. Later sends are silently dropped.
    ///
    /// Safe to call from inside the post function.
    pub fn invalidate(&self) {
        self.post.borrow_mut().take();
    }

    /// Whether outgoing frames are still delivered.
    pub fn is_attached(&self) -> bool {
        self.post.borrow().is_some()
    }
}

impl MessageBridge for ScriptBridge {
    fn subscribe(&self, handler: MessageHandler) -> Subscription {
        self.slot.subscribe(handler)
    }

    fn send(&self, request: PluginRequest) {
        // Clone out so no borrow is held while the webview runs.
        let Some(post) = self.post.borrow().clone() else {
            return;
        };

        match encode_request(&request) {
            Ok(json) => post(&json),
            Err(e) => log::error!("failed to serialize {request:?}: {e}"),
        }
    }
}
