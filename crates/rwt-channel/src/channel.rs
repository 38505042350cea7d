#![forbid(unsafe_code)]

//! Cross-thread marshaling onto the UI thread.
//!
//! [`UiChannel`] is the `Send + Clone` handle given to transport threads.
//! Posting an envelope (or a closure, via [`UiChannel::async_exec`])
//! enqueues it for the UI thread; the dispatcher drains the queue from
//! [`UiReceiver`] during a pump. The post itself never blocks and never
//! touches widget state.

use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rwt_core::id::WidgetId;

use crate::dispatcher::DispatchState;
use crate::envelope::EventEnvelope;

/// Thread-safe set of widget ids the remote renderer may address.
///
/// Maintained by the identity registry on the UI thread, consulted by
/// transport threads to resolve targets before marshaling. Disposal
/// removes the id, so in-flight envelopes for a disposed widget drop at
/// the resolve step.
#[derive(Clone, Debug, Default)]
pub struct LiveIds {
    inner: Arc<Mutex<HashSet<WidgetId>>>,
}

impl LiveIds {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an id as addressable.
    pub fn insert(&self, id: WidgetId) {
        self.inner.lock().unwrap().insert(id);
    }

    /// Remove an id (widget disposed or forgotten).
    pub fn remove(&self, id: WidgetId) {
        self.inner.lock().unwrap().remove(&id);
    }

    /// Whether the id is currently addressable.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.inner.lock().unwrap().contains(&id)
    }

    /// Number of live ids.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether no ids are live.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

/// Work item queued for the UI thread.
pub enum UiTask {
    /// Deliver an inbound event envelope.
    Deliver(EventEnvelope),
    /// Run an arbitrary marshaled closure.
    Run(Box<dyn FnOnce() + Send>),
}

impl std::fmt::Debug for UiTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiTask::Deliver(envelope) => f.debug_tuple("Deliver").field(envelope).finish(),
            UiTask::Run(_) => f.write_str("Run(..)"),
        }
    }
}

/// Sending half: `Send + Clone`, handed to transport threads.
#[derive(Clone)]
pub struct UiChannel {
    tx: mpsc::Sender<UiTask>,
    live: LiveIds,
}

impl UiChannel {
    /// Create a channel pair plus the live-id set both halves share.
    pub fn new() -> (UiChannel, UiReceiver) {
        Self::with_live(LiveIds::new())
    }

    /// Create a channel pair over an existing live-id set.
    pub fn with_live(live: LiveIds) -> (UiChannel, UiReceiver) {
        let (tx, rx) = mpsc::channel();
        (
            UiChannel {
                tx,
                live: live.clone(),
            },
            UiReceiver { rx, live },
        )
    }

    /// The live-id set used for transport-side resolution.
    pub fn live(&self) -> &LiveIds {
        &self.live
    }

    /// Resolve a target id against the live-id set.
    ///
    /// The transport-side step of the envelope lifecycle: `Resolved` when
    /// the target is live, `Dropped` otherwise.
    pub fn resolve(&self, id: WidgetId) -> DispatchState {
        if self.live.contains(id) {
            DispatchState::Resolved
        } else {
            DispatchState::Dropped
        }
    }

    /// Post an envelope toward the UI thread.
    ///
    /// Resolution happens here: envelopes addressed to unknown or
    /// disposed widgets are dropped silently, which is routine under
    /// remote latency, not an error.
    pub fn post(&self, envelope: EventEnvelope) -> DispatchState {
        tracing::trace!(
            widget_id = envelope.widget_id.as_u64(),
            key = %envelope.key,
            state = ?DispatchState::Received,
            "envelope accepted"
        );
        if self.resolve(envelope.widget_id) == DispatchState::Dropped {
            tracing::debug!(
                widget_id = envelope.widget_id.as_u64(),
                key = %envelope.key,
                "dropping envelope for unknown widget"
            );
            return DispatchState::Dropped;
        }
        match self.tx.send(UiTask::Deliver(envelope)) {
            Ok(()) => DispatchState::Marshaled,
            Err(_) => DispatchState::Dropped, // UI loop already torn down
        }
    }

    /// Marshal a closure onto the UI thread.
    ///
    /// The only way for a non-UI thread to cause widget mutation.
    /// Returns `false` if the UI loop is gone.
    pub fn async_exec(&self, f: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(UiTask::Run(Box::new(f))).is_ok()
    }
}

impl std::fmt::Debug for UiChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiChannel")
            .field("live", &self.live.len())
            .finish_non_exhaustive()
    }
}

/// Receiving half, owned by the dispatcher on the UI thread.
pub struct UiReceiver {
    rx: mpsc::Receiver<UiTask>,
    live: LiveIds,
}

impl UiReceiver {
    /// Take the next queued task, if any. Never blocks.
    pub fn try_next(&self) -> Option<UiTask> {
        self.rx.try_recv().ok()
    }

    /// The shared live-id set.
    pub fn live(&self) -> &LiveIds {
        &self.live
    }
}

impl std::fmt::Debug for UiReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiReceiver").finish_non_exhaustive()
    }
}
