#![forbid(unsafe_code)]

//! The event dispatcher.
//!
//! Every envelope walks a small state machine:
//!
//! ```text
//! Received ──resolve──▶ Resolved ──channel hop──▶ Marshaled ──▶ Delivered
//!     │                     │
//!     └──unknown id─────────┴──disposed after marshal──▶ Dropped
//! ```
//!
//! Resolution happens twice: cheaply on the posting thread against the
//! live-id set, and again after the channel hop, because the target may
//! have been disposed while the envelope was in flight. Both failures
//! drop silently; stale events are routine under remote latency.
//!
//! Listeners are registered per `(widget id, event key)` tuple; a tuple
//! may carry any number of independent listeners, fired in registration
//! order.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use rwt_core::event::{EventKey, EventState};
use rwt_core::id::WidgetId;

use crate::channel::{LiveIds, UiChannel, UiReceiver, UiTask};
use crate::envelope::EventEnvelope;

/// Where an envelope is in its lifecycle. `Delivered` and `Dropped` are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchState {
    /// Accepted from the transport, not yet resolved.
    Received,
    /// Target id resolved as live.
    Resolved,
    /// Queued for the UI thread.
    Marshaled,
    /// Listeners have run.
    Delivered,
    /// Discarded (unknown target, disposed target, or torn-down loop).
    Dropped,
}

/// Counters the dispatcher keeps while pumping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Envelopes whose listeners ran.
    pub delivered: u64,
    /// Envelopes dropped after marshaling (target disposed in flight).
    pub dropped_disposed: u64,
    /// Marshaled closures executed.
    pub executed: u64,
}

/// Handle identifying one registered listener.
pub type ListenerId = u64;

/// A decoded event as seen by listeners.
#[derive(Clone, Debug)]
pub struct UiEvent {
    /// Target widget.
    pub widget_id: WidgetId,
    /// Routing key the event arrived under.
    pub key: EventKey,
    /// Decoded parameters; defaults when the payload was absent or
    /// malformed.
    pub state: EventState,
}

type Listener = Rc<RefCell<Box<dyn FnMut(&UiEvent)>>>;

/// Routes inbound envelopes to listeners on the UI thread.
///
/// Not `Send`: the dispatcher lives on the UI thread. Transport threads
/// talk to it only through the [`UiChannel`].
pub struct Dispatcher {
    receiver: UiReceiver,
    routes: RefCell<HashMap<(WidgetId, EventKey), Vec<(ListenerId, Listener)>>>,
    next_listener: Cell<ListenerId>,
    stats: Cell<DispatchStats>,
}

impl Dispatcher {
    /// Create a dispatcher plus the channel transport threads post to.
    pub fn new() -> (Self, UiChannel) {
        Self::with_live(LiveIds::new())
    }

    /// Create a dispatcher over an existing live-id set.
    pub fn with_live(live: LiveIds) -> (Self, UiChannel) {
        let (channel, receiver) = UiChannel::with_live(live);
        (
            Self {
                receiver,
                routes: RefCell::new(HashMap::new()),
                next_listener: Cell::new(1),
                stats: Cell::new(DispatchStats::default()),
            },
            channel,
        )
    }

    /// The live-id set shared with the posting side.
    pub fn live(&self) -> &LiveIds {
        self.receiver.live()
    }

    /// Register a listener for one `(widget, key)` tuple.
    ///
    /// Listeners on the same tuple fire in registration order.
    pub fn subscribe(
        &self,
        widget_id: WidgetId,
        key: EventKey,
        listener: impl FnMut(&UiEvent) + 'static,
    ) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.routes
            .borrow_mut()
            .entry((widget_id, key))
            .or_default()
            .push((id, Rc::new(RefCell::new(Box::new(listener)))));
        id
    }

    /// Remove one listener. Returns whether it was registered.
    pub fn unsubscribe(&self, widget_id: WidgetId, key: &EventKey, listener: ListenerId) -> bool {
        let mut routes = self.routes.borrow_mut();
        if let Some(entries) = routes.get_mut(&(widget_id, key.clone())) {
            let before = entries.len();
            entries.retain(|(id, _)| *id != listener);
            if entries.is_empty() {
                routes.remove(&(widget_id, key.clone()));
            }
            return before > 0;
        }
        false
    }

    /// Remove every listener registered for a widget (disposal path).
    pub fn drop_widget(&self, widget_id: WidgetId) {
        self.routes
            .borrow_mut()
            .retain(|(id, _), _| *id != widget_id);
    }

    /// Number of listeners currently registered for a tuple.
    pub fn listener_count(&self, widget_id: WidgetId, key: &EventKey) -> usize {
        self.routes
            .borrow()
            .get(&(widget_id, key.clone()))
            .map_or(0, Vec::len)
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> DispatchStats {
        self.stats.get()
    }

    /// Drain and handle everything queued for the UI thread.
    ///
    /// Returns the number of tasks handled. Must run on the UI thread;
    /// this is the only place listeners ever execute.
    pub fn pump(&self) -> usize {
        let mut handled = 0;
        while let Some(task) = self.receiver.try_next() {
            match task {
                UiTask::Deliver(envelope) => match self.deliver(envelope) {
                    DispatchState::Delivered => self.bump(|stats| stats.delivered += 1),
                    _ => self.bump(|stats| stats.dropped_disposed += 1),
                },
                UiTask::Run(f) => {
                    f();
                    self.bump(|stats| stats.executed += 1);
                }
            }
            handled += 1;
        }
        handled
    }

    /// Walk one marshaled envelope to its terminal state.
    fn deliver(&self, envelope: EventEnvelope) -> DispatchState {
        // Re-resolve: the widget may have been disposed between post and
        // pump. Same silent-drop policy as the transport side.
        if !self.receiver.live().contains(envelope.widget_id) {
            tracing::debug!(
                widget_id = envelope.widget_id.as_u64(),
                key = %envelope.key,
                "dropping in-flight envelope; target disposed"
            );
            return DispatchState::Dropped;
        }

        let event = UiEvent {
            widget_id: envelope.widget_id,
            key: envelope.key.clone(),
            state: envelope.decode_state().unwrap_or_default(),
        };

        // Snapshot the listener list so a listener may subscribe or
        // unsubscribe without holding the routes borrow.
        let listeners: Vec<Listener> = self
            .routes
            .borrow()
            .get(&(envelope.widget_id, envelope.key))
            .map(|entries| entries.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();

        tracing::trace!(
            widget_id = event.widget_id.as_u64(),
            key = %event.key,
            listeners = listeners.len(),
            "delivering event"
        );
        for listener in listeners {
            (listener.borrow_mut())(&event);
        }
        DispatchState::Delivered
    }

    fn bump(&self, f: impl FnOnce(&mut DispatchStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.borrow().len())
            .field("stats", &self.stats.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::rc::Rc;

    fn selection_envelope(id: u64, selected: bool) -> EventEnvelope {
        EventEnvelope::new(
            WidgetId::from_raw(id),
            EventKey::selection(),
            json!({ "selection": selected }),
        )
    }

    #[test]
    fn delivers_to_live_widget() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(1);
        dispatcher.live().insert(id);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        dispatcher.subscribe(id, EventKey::selection(), move |event| {
            sink.borrow_mut().push(event.state.selection);
        });

        channel.post(selection_envelope(1, true));
        assert_eq!(dispatcher.pump(), 1);
        assert_eq!(*seen.borrow(), vec![Some(true)]);
        assert_eq!(dispatcher.stats().delivered, 1);
    }

    #[test]
    fn unknown_widget_produces_no_listener_call_and_no_panic() {
        let (dispatcher, channel) = Dispatcher::new();
        assert_eq!(channel.post(selection_envelope(99, true)), DispatchState::Dropped);
        assert_eq!(dispatcher.pump(), 0);
        assert_eq!(dispatcher.stats().delivered, 0);
    }

    #[test]
    fn disposed_in_flight_is_dropped_after_marshal() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(2);
        dispatcher.live().insert(id);

        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        dispatcher.subscribe(id, EventKey::selection(), move |_| flag.set(true));

        assert_eq!(channel.post(selection_envelope(2, true)), DispatchState::Marshaled);
        dispatcher.live().remove(id); // disposed while in flight
        dispatcher.pump();

        assert!(!fired.get());
        assert_eq!(dispatcher.stats().dropped_disposed, 1);
    }

    #[test]
    fn two_listeners_fire_in_registration_order() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(3);
        dispatcher.live().insert(id);

        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let sink = Rc::clone(&order);
            dispatcher.subscribe(id, EventKey::selection(), move |_| {
                sink.borrow_mut().push(tag);
            });
        }

        channel.post(selection_envelope(3, true));
        dispatcher.pump();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_one_listener_only() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(4);
        dispatcher.live().insert(id);

        let count = Rc::new(Cell::new(0u32));
        let a = Rc::clone(&count);
        let first = dispatcher.subscribe(id, EventKey::selection(), move |_| a.set(a.get() + 1));
        let b = Rc::clone(&count);
        dispatcher.subscribe(id, EventKey::selection(), move |_| b.set(b.get() + 1));

        assert!(dispatcher.unsubscribe(id, &EventKey::selection(), first));
        assert!(!dispatcher.unsubscribe(id, &EventKey::selection(), first));

        channel.post(selection_envelope(4, true));
        dispatcher.pump();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn keys_route_independently() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(5);
        dispatcher.live().insert(id);

        let hits = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&hits);
        dispatcher.subscribe(id, EventKey::selection(), move |_| {
            a.borrow_mut().push("selection");
        });
        let b = Rc::clone(&hits);
        dispatcher.subscribe(id, EventKey::resized(), move |_| {
            b.borrow_mut().push("resize");
        });

        channel.post(EventEnvelope::new(id, EventKey::resized(), json!({})));
        dispatcher.pump();
        assert_eq!(*hits.borrow(), vec!["resize"]);
    }

    #[test]
    fn drop_widget_clears_all_routes() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(6);
        dispatcher.live().insert(id);
        dispatcher.subscribe(id, EventKey::selection(), |_| {});
        dispatcher.subscribe(id, EventKey::moved(), |_| {});
        assert_eq!(dispatcher.listener_count(id, &EventKey::selection()), 1);

        dispatcher.drop_widget(id);
        assert_eq!(dispatcher.listener_count(id, &EventKey::selection()), 0);
        assert_eq!(dispatcher.listener_count(id, &EventKey::moved()), 0);

        // Routes gone but id still live: delivery is a silent no-op.
        channel.post(selection_envelope(6, true));
        dispatcher.pump();
        assert_eq!(dispatcher.stats().delivered, 1);
    }

    #[test]
    fn malformed_params_deliver_default_state() {
        let (dispatcher, channel) = Dispatcher::new();
        let id = WidgetId::from_raw(7);
        dispatcher.live().insert(id);

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        dispatcher.subscribe(id, EventKey::selection(), move |event| {
            *sink.borrow_mut() = Some(event.state.clone());
        });

        channel.post(EventEnvelope::new(id, EventKey::selection(), json!("garbage")));
        dispatcher.pump();
        assert_eq!(seen.borrow().clone().unwrap(), EventState::default());
    }

    #[test]
    fn every_marshaled_envelope_reaches_a_terminal_state() {
        let (dispatcher, channel) = Dispatcher::new();
        let delivered = WidgetId::from_raw(1);
        let doomed = WidgetId::from_raw(2);
        dispatcher.live().insert(delivered);
        dispatcher.live().insert(doomed);

        assert_eq!(channel.post(selection_envelope(1, true)), DispatchState::Marshaled);
        assert_eq!(channel.post(selection_envelope(2, true)), DispatchState::Marshaled);
        dispatcher.live().remove(doomed);

        assert_eq!(dispatcher.pump(), 2);
        let stats = dispatcher.stats();
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.dropped_disposed, 1);
    }

    #[test]
    fn marshaled_closures_execute_during_pump() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let (dispatcher, channel) = Dispatcher::new();
        let ran = Arc::new(AtomicBool::new(false));

        let remote = channel.clone();
        let flag = Arc::clone(&ran);
        std::thread::spawn(move || {
            remote.async_exec(move || flag.store(true, Ordering::SeqCst));
        })
        .join()
        .unwrap();

        assert!(!ran.load(Ordering::SeqCst), "must not run before the pump");
        dispatcher.pump();
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(dispatcher.stats().executed, 1);
    }
}
