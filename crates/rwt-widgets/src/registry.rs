#![forbid(unsafe_code)]

//! The identity registry.
//!
//! Maps widget ids to their cores, weakly: the registry never keeps a
//! widget alive, it only guarantees that while a core is alive, every
//! lookup for its id yields that same core. Create-on-miss
//! ([`Registry::lookup_or_insert`]) gives the classic `getInstance`
//! guarantee that at most one wrapper is ever constructed per identity.
//!
//! The registry also owns the session's [`LiveIds`] set. Remote-backed
//! widgets join it at registration and leave it at `forget`, which is how
//! transport threads resolve event targets without touching the registry
//! map itself.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use rwt_channel::LiveIds;
use rwt_core::config::BackendKind;
use rwt_core::id::WidgetId;

use crate::widget::WidgetCore;

/// Counts of live and collectable registry entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Entries whose core is still reachable.
    pub live: usize,
    /// Entries whose core has been dropped but not yet pruned.
    pub dead: usize,
}

/// Weak id-to-core map plus the shared live-id set.
pub struct Registry {
    entries: RefCell<HashMap<WidgetId, Weak<WidgetCore>>>,
    live: LiveIds,
}

impl Registry {
    /// Create a registry over the given live-id set.
    pub fn new(live: LiveIds) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            live,
        }
    }

    /// The live-id set shared with the inbound channel.
    pub fn live(&self) -> &LiveIds {
        &self.live
    }

    /// Register a core under its id.
    ///
    /// Only remote-backed widgets join the live-id set; native peers never
    /// receive envelopes from the remote renderer.
    pub fn register(&self, core: &Rc<WidgetCore>) {
        self.entries
            .borrow_mut()
            .insert(core.id(), Rc::downgrade(core));
        if core.backend() == BackendKind::Remote {
            self.live.insert(core.id());
        }
        tracing::trace!(widget_id = core.id().as_u64(), kind = %core.kind(), "registered");
    }

    /// The core registered under `id`, while it is still alive.
    pub fn lookup(&self, id: WidgetId) -> Option<Rc<WidgetCore>> {
        self.entries.borrow().get(&id).and_then(Weak::upgrade)
    }

    /// Look up `id`, constructing and registering via `factory` on a miss.
    ///
    /// A dead entry counts as a miss, so a collected core is replaced by a
    /// fresh one rather than resurrected. Two lookups never yield two
    /// distinct live cores for one id.
    pub fn lookup_or_insert(
        &self,
        id: WidgetId,
        factory: impl FnOnce() -> Rc<WidgetCore>,
    ) -> Rc<WidgetCore> {
        if let Some(core) = self.lookup(id) {
            return core;
        }
        let core = factory();
        self.register(&core);
        core
    }

    /// Drop the entry for `id` and remove it from the live-id set.
    ///
    /// Returns whether an entry existed. A later lookup misses, so a
    /// subsequent `lookup_or_insert` builds a fresh wrapper instead of
    /// double-wrapping.
    pub fn forget(&self, id: WidgetId) -> bool {
        self.live.remove(id);
        self.entries.borrow_mut().remove(&id).is_some()
    }

    /// Sweep entries whose core has been dropped. Returns how many went.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|id, weak| {
            let alive = weak.strong_count() > 0;
            if !alive {
                self.live.remove(*id);
            }
            alive
        });
        before - entries.len()
    }

    /// Live/dead entry counts.
    pub fn stats(&self) -> RegistryStats {
        let entries = self.entries.borrow();
        let live = entries
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count();
        RegistryStats {
            live,
            dead: entries.len() - live,
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
