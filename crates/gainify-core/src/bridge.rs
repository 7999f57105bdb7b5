//! The two-way channel between the control surface and the plugin.
//!
//! A [`MessageBridge`] carries plugin events in and GUI requests out. It
//! holds at most one inbound handler; subscribing again replaces the previous
//! handler, which is how a freshly mounted surface takes over. Subscribing
//! returns a [`Subscription`] that releases the handler when dropped.
//!
//! Implementations:
//! - [`ChannelBridge`] - in-process queues, drained on the UI thread
//! - [`ScriptBridge`](crate::script::ScriptBridge) - JSON frames to and from a webview
//!
//! The bridge never reorders or coalesces. Inbound messages reach the handler
//! in the order the transport produced them, outbound requests leave in the
//! order they were sent.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::protocol::{PluginMessage, PluginRequest};

/// Inbound message callback.
pub type MessageHandler = Box<dyn FnMut(PluginMessage)>;

/// Two-way message channel to the plugin.
///
/// Bridges are single-threaded: handlers run on the thread that drives the
/// bridge and may capture `Rc` state.
pub trait MessageBridge {
    /// Install the inbound handler, replacing any previous one.
    fn subscribe(&self, handler: MessageHandler) -> Subscription;

    /// Send a request to the plugin. Never blocks and never reports back.
    fn send(&self, request: PluginRequest);
}

impl<B: MessageBridge + ?Sized> MessageBridge for Rc<B> {
    fn subscribe(&self, handler: MessageHandler) -> Subscription {
        (**self).subscribe(handler)
    }

    fn send(&self, request: PluginRequest) {
        (**self).send(request)
    }
}

// =============================================================================
// HandlerSlot
// =============================================================================

#[derive(Default)]
struct SlotState {
    /// Token of the subscription that currently owns the slot.
    owner: Option<u64>,
    /// The handler. Temporarily `None` while it is being called.
    handler: Option<MessageHandler>,
    next_token: u64,
    /// Set while the handler runs.
    dispatching: bool,
    /// Messages dispatched from inside the running handler.
    pending: VecDeque<PluginMessage>,
}

/// Single-handler slot shared by bridge implementations.
///
/// The handler is taken out of the slot while it runs, so it may subscribe,
/// unsubscribe or send without re-entering a borrow.
#[derive(Clone, Default)]
pub struct HandlerSlot {
    state: Rc<RefCell<SlotState>>,
}

impl HandlerSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` and return the handle that owns it.
    pub fn subscribe(&self, handler: MessageHandler) -> Subscription {
        let (token, had_owner, old) = {
            let mut state = self.state.borrow_mut();
            let token = state.next_token;
            state.next_token += 1;
            let had_owner = state.owner.replace(token).is_some();
            let old = state.handler.replace(handler);
            (token, had_owner, old)
        };
        if had_owner {
            log::debug!("inbound handler replaced");
        }
        drop(old);

        Subscription {
            state: Rc::downgrade(&self.state),
            token,
        }
    }

    /// Deliver one message to the current handler.
    ///
    /// A message dispatched from inside the running handler is queued and
    /// delivered right after it returns, so inbound order is preserved.
    /// Returns `false` if no handler was installed and the message was dropped.
    pub fn dispatch(&self, message: PluginMessage) -> bool {
        let taken = {
            let mut state = self.state.borrow_mut();
            if state.dispatching {
                state.pending.push_back(message);
                return true;
            }
            let owner = state.owner;
            match (owner, state.handler.take()) {
                (Some(token), Some(handler)) => {
                    state.dispatching = true;
                    Some((token, handler))
                }
                (_, handler) => {
                    state.handler = handler;
                    None
                }
            }
        };
        let Some((token, mut handler)) = taken else {
            log::debug!("no inbound handler, dropping {message:?}");
            return false;
        };

        let mut next = Some(message);
        while let Some(message) = next {
            handler(message);
            let mut state = self.state.borrow_mut();
            next = if state.owner == Some(token) {
                state.pending.pop_front()
            } else {
                None
            };
        }

        // Put the handler back unless it was released or replaced meanwhile.
        let (stale, orphaned) = {
            let mut state = self.state.borrow_mut();
            state.dispatching = false;
            let orphaned = std::mem::take(&mut state.pending);
            if state.owner == Some(token) && state.handler.is_none() {
                state.handler = Some(handler);
                (None, orphaned)
            } else {
                (Some(handler), orphaned)
            }
        };
        drop(stale);

        // Queued after a replacement: hand them to the successor.
        for message in orphaned {
            self.dispatch(message);
        }
        true
    }

    /// Whether a handler is installed.
    pub fn is_subscribed(&self) -> bool {
        self.state.borrow().owner.is_some()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Ownership of a bridge's inbound handler.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// removes the handler, unless a later subscription has already replaced it.
#[must_use = "dropping a subscription removes the handler immediately"]
pub struct Subscription {
    state: Weak<RefCell<SlotState>>,
    token: u64,
}

impl Subscription {
    /// Whether this subscription still owns the handler slot.
    pub fn is_active(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                let owner = state.borrow().owner;
                owner == Some(self.token)
            }
            None => false,
        }
    }

    /// Release the handler now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let released = {
            let mut state = state.borrow_mut();
            if state.owner == Some(self.token) {
                state.owner = None;
                state.handler.take()
            } else {
                None
            }
        };
        drop(released);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// ChannelBridge
// =============================================================================

/// In-process bridge backed by unbounded channels.
///
/// Plugin-side producers push messages through [`inbound_sender`]
/// from any thread; the UI thread calls [`pump`] to deliver them, in FIFO
/// order, to the subscribed handler. Requests sent by the surface are queued
/// on the channel returned by [`outbound_receiver`].
///
/// [`inbound_sender`]: Self::inbound_sender
/// [`pump`]: Self::pump
/// [`outbound_receiver`]: Self::outbound_receiver
pub struct ChannelBridge {
    slot: HandlerSlot,
    inbound_tx: Sender<PluginMessage>,
    inbound_rx: Receiver<PluginMessage>,
    outbound_tx: Sender<PluginRequest>,
    outbound_rx: Receiver<PluginRequest>,
}

impl ChannelBridge {
    /// Create a bridge with empty queues.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = unbounded();
        let (outbound_tx, outbound_rx) = unbounded();
        Self {
            slot: HandlerSlot::new(),
            inbound_tx,
            inbound_rx,
            outbound_tx,
            outbound_rx,
        }
    }

    /// Sender for plugin-originated messages. Cloneable and `Send`.
    pub fn inbound_sender(&self) -> Sender<PluginMessage> {
        self.inbound_tx.clone()
    }

    /// Receiver for GUI-originated requests.
    pub fn outbound_receiver(&self) -> Receiver<PluginRequest> {
        self.outbound_rx.clone()
    }

    /// Deliver every queued inbound message. Returns how many were drained.
    pub fn pump(&self) -> usize {
        let mut count = 0;
        while let Ok(message) = self.inbound_rx.try_recv() {
            self.slot.dispatch(message);
            count += 1;
        }
        count
    }

    /// Deliver one message immediately, bypassing the queue.
    pub fn deliver(&self, message: PluginMessage) -> bool {
        self.slot.dispatch(message)
    }

    /// Whether a handler is installed.
    pub fn is_subscribed(&self) -> bool {
        self.slot.is_subscribed()
    }
}

impl Default for ChannelBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBridge for ChannelBridge {
    fn subscribe(&self, handler: MessageHandler) -> Subscription {
        self.slot.subscribe(handler)
    }

    fn send(&self, request: PluginRequest) {
        // The bridge holds a receiver, so the channel cannot be disconnected.
        if let Err(e) = self.outbound_tx.send(request) {
            log::warn!("failed to queue {:?}", e.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<PluginMessage>>>, MessageHandler) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, Box::new(move |msg| sink.borrow_mut().push(msg)))
    }

    #[test]
    fn test_dispatch_without_handler_drops() {
        let slot = HandlerSlot::new();
        assert!(!slot.dispatch(PluginMessage::PeakMeterData { value: 1.0 }));
    }

    #[test]
    fn test_subscription_receives_and_releases() {
        let slot = HandlerSlot::new();
        let (log, handler) = recorder();
        let sub = slot.subscribe(handler);
        assert!(sub.is_active());

        assert!(slot.dispatch(PluginMessage::ParamChange { value: 1.0 }));
        assert_eq!(log.borrow().len(), 1);

        sub.unsubscribe();
        assert!(!slot.is_subscribed());
        assert!(!slot.dispatch(PluginMessage::ParamChange { value: 2.0 }));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_replaced_subscription_does_not_tear_down_successor() {
        let slot = HandlerSlot::new();
        let (first_log, first) = recorder();
        let (second_log, second) = recorder();

        let old = slot.subscribe(first);
        let new = slot.subscribe(second);
        assert!(!old.is_active());
        assert!(new.is_active());

        drop(old);
        slot.dispatch(PluginMessage::ParamChange { value: 1.0 });
        assert!(first_log.borrow().is_empty());
        assert_eq!(second_log.borrow().len(), 1);
    }

    #[test]
    fn test_handler_may_resubscribe_during_dispatch() {
        let slot = HandlerSlot::new();
        let (second_log, second) = recorder();
        let held: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let inner_slot = slot.clone();
        let inner_held = held.clone();
        let mut second = Some(second);
        let first: MessageHandler = Box::new(move |_| {
            if let Some(handler) = second.take() {
                *inner_held.borrow_mut() = Some(inner_slot.subscribe(handler));
            }
        });
        let _first_sub = slot.subscribe(first);

        slot.dispatch(PluginMessage::ParamChange { value: 1.0 });
        slot.dispatch(PluginMessage::ParamChange { value: 2.0 });
        assert_eq!(
            *second_log.borrow(),
            vec![PluginMessage::ParamChange { value: 2.0 }]
        );
    }

    #[test]
    fn test_nested_dispatch_is_delivered_in_order() {
        let slot = HandlerSlot::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let sink = log.clone();
        let inner_slot = slot.clone();
        let _sub = slot.subscribe(Box::new(move |msg| {
            sink.borrow_mut().push(msg);
            if let PluginMessage::ParamChange { value } = msg {
                assert!(inner_slot.dispatch(PluginMessage::PeakMeterData { value }));
                assert!(inner_slot.dispatch(PluginMessage::PeakMeterData { value: -value }));
            }
        }));

        assert!(slot.dispatch(PluginMessage::ParamChange { value: 1.0 }));
        assert!(slot.dispatch(PluginMessage::PeakMeterData { value: 9.0 }));
        assert_eq!(
            *log.borrow(),
            vec![
                PluginMessage::ParamChange { value: 1.0 },
                PluginMessage::PeakMeterData { value: 1.0 },
                PluginMessage::PeakMeterData { value: -1.0 },
                PluginMessage::PeakMeterData { value: 9.0 },
            ]
        );
    }

    #[test]
    fn test_channel_bridge_is_fifo() {
        let bridge = ChannelBridge::new();
        let (log, handler) = recorder();
        let _sub = bridge.subscribe(handler);

        let tx = bridge.inbound_sender();
        let producer = std::thread::spawn(move || {
            for i in 0..10 {
                tx.send(PluginMessage::PeakMeterData { value: i as f64 }).unwrap();
            }
        });
        producer.join().unwrap();

        assert_eq!(bridge.pump(), 10);
        let values: Vec<f64> = log
            .borrow()
            .iter()
            .map(|m| match m {
                PluginMessage::PeakMeterData { value } => *value,
                PluginMessage::ParamChange { value } => *value,
            })
            .collect();
        assert_eq!(values, (0..10).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(bridge.pump(), 0);
    }

    #[test]
    fn test_channel_bridge_send_order() {
        let bridge = ChannelBridge::new();
        let rx = bridge.outbound_receiver();
        bridge.send(PluginRequest::SetGain { value: 1.0 });
        bridge.send(PluginRequest::SetGain { value: 2.0 });

        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                PluginRequest::SetGain { value: 1.0 },
                PluginRequest::SetGain { value: 2.0 },
            ]
        );
    }

    #[test]
    fn test_messages_without_subscriber_are_drained() {
        let bridge = ChannelBridge::new();
        bridge
            .inbound_sender()
            .send(PluginMessage::ParamChange { value: 1.0 })
            .unwrap();
        assert!(!bridge.is_subscribed());
        assert_eq!(bridge.pump(), 1);
    }
}
