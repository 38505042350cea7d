#![forbid(unsafe_code)]

//! The UI session.
//!
//! One [`Session`] owns everything a widget tree needs: the identity
//! registry, the change queue and its outbound bridge, the inbound
//! dispatcher, id allocation, and the native host. The thread that
//! creates the session becomes the UI thread; every widget mutation is
//! checked against it, and other threads reach the session only through
//! the [`UiChannel`] handle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use rwt_channel::{DispatchStats, Dispatcher, LiveIds, UiChannel};
use rwt_core::config::SessionConfig;
use rwt_core::error::{Error, Result};
use rwt_core::id::{ResourceId, WidgetId};
use rwt_sync::bridge::{RemoteBridge, Transport};
use rwt_sync::queue::ChangeQueue;
use rwt_values::resource::{FontSpec, ForeignResource, Image, Resource};

use crate::delegate::NativeHost;
use crate::registry::{Registry, RegistryStats};
use crate::widget::WidgetCore;

pub(crate) struct SessionInner {
    config: SessionConfig,
    thread: ThreadId,
    next_widget: Cell<u64>,
    next_resource: Cell<u64>,
    registry: Registry,
    queue: Arc<ChangeQueue>,
    bridge: RemoteBridge,
    dispatcher: Dispatcher,
    channel: UiChannel,
    host: Rc<dyn NativeHost>,
    roots: RefCell<Vec<Rc<WidgetCore>>>,
}

impl SessionInner {
    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn ensure_ui_thread(&self) -> Result<()> {
        if thread::current().id() == self.thread {
            Ok(())
        } else {
            Err(Error::ThreadAccess)
        }
    }

    pub(crate) fn allocate_widget_id(&self) -> WidgetId {
        let raw = self.next_widget.get();
        self.next_widget.set(raw + 1);
        WidgetId::from_raw(raw)
    }

    pub(crate) fn allocate_resource_id(&self) -> ResourceId {
        let raw = self.next_resource.get();
        self.next_resource.set(raw + 1);
        ResourceId::from_raw(raw)
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn queue(&self) -> &Arc<ChangeQueue> {
        &self.queue
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn host(&self) -> Rc<dyn NativeHost> {
        Rc::clone(&self.host)
    }

    pub(crate) fn adopt_root(&self, core: &Rc<WidgetCore>) {
        self.roots.borrow_mut().push(Rc::clone(core));
    }

    pub(crate) fn forget_root(&self, id: WidgetId) {
        self.roots.borrow_mut().retain(|root| root.id() != id);
    }
}

/// Handle on one UI session. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

impl Session {
    /// Create a session on the current thread.
    ///
    /// The calling thread becomes the UI thread. `host` realizes
    /// native-backed widgets; `transport` carries outbound snapshots for
    /// remote-backed ones.
    pub fn new(
        config: SessionConfig,
        host: Rc<dyn NativeHost>,
        transport: Box<dyn Transport>,
    ) -> Session {
        let queue = Arc::new(ChangeQueue::new());
        let live = LiveIds::new();
        let registry = Registry::new(live.clone());
        let (dispatcher, channel) = Dispatcher::with_live(live);
        let bridge = RemoteBridge::new(Arc::clone(&queue), transport);

        tracing::debug!(backend = %config.default_backend(), "session started");
        Session {
            inner: Rc::new(SessionInner {
                config,
                thread: thread::current().id(),
                next_widget: Cell::new(1),
                next_resource: Cell::new(1),
                registry,
                queue,
                bridge,
                dispatcher,
                channel,
                host,
                roots: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn inner(&self) -> &Rc<SessionInner> {
        &self.inner
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        self.inner.config()
    }

    /// Whether the current thread is this session's UI thread.
    pub fn is_ui_thread(&self) -> bool {
        self.inner.ensure_ui_thread().is_ok()
    }

    /// A `Send + Clone` handle for transport threads to post envelopes
    /// and marshal closures through.
    pub fn channel(&self) -> UiChannel {
        self.inner.channel.clone()
    }

    /// The core registered under `id`, while it is alive.
    pub fn widget(&self, id: WidgetId) -> Option<Rc<WidgetCore>> {
        self.inner.registry.lookup(id)
    }

    /// Number of widgets with unflushed changes.
    pub fn pending(&self) -> usize {
        self.inner.queue.pending()
    }

    /// Drain the inbound queue: deliver marshaled envelopes and run
    /// marshaled closures. Must run on the UI thread.
    pub fn pump(&self) -> Result<usize> {
        self.inner.ensure_ui_thread()?;
        Ok(self.inner.dispatcher.pump())
    }

    /// Flush dirty widgets to the transport. Must run on the UI thread.
    ///
    /// Returns the number of messages sent.
    pub fn flush(&self) -> Result<usize> {
        self.inner.ensure_ui_thread()?;
        Ok(self.inner.bridge.flush())
    }

    /// Dispatch counters accumulated so far.
    pub fn dispatch_stats(&self) -> DispatchStats {
        self.inner.dispatcher.stats()
    }

    /// Registry entry counts.
    pub fn registry_stats(&self) -> RegistryStats {
        self.inner.registry.stats()
    }

    /// Sweep registry entries whose widget has been dropped.
    pub fn prune(&self) -> usize {
        self.inner.registry.prune()
    }

    /// Allocate an image resource owned by this session.
    pub fn new_image(&self, width: i32, height: i32, data: Vec<u8>) -> Resource {
        Resource::Image(Rc::new(Image::new(
            self.inner.allocate_resource_id(),
            width,
            height,
            data,
        )))
    }

    /// Allocate a font resource owned by this session.
    pub fn new_font(&self, name: &str, height: i32) -> Result<Resource> {
        if name.trim().is_empty() {
            return Err(Error::NullArgument("font name"));
        }
        if height <= 0 {
            return Err(Error::InvalidArgument(format!("font height {height}")));
        }
        Ok(Resource::Font(Rc::new(FontSpec::new(
            self.inner.allocate_resource_id(),
            name,
            height,
        ))))
    }

    /// Wrap a platform-private resource the renderer cannot decode.
    ///
    /// It keeps its identity locally but serializes to `null` on the wire.
    pub fn new_foreign(&self, origin: &str) -> Resource {
        Resource::Foreign(Rc::new(ForeignResource {
            id: self.inner.allocate_resource_id(),
            origin: origin.to_owned(),
        }))
    }

    /// Dispose every root (and transitively the whole tree).
    pub fn dispose(&self) -> Result<()> {
        self.inner.ensure_ui_thread()?;
        let roots = std::mem::take(&mut *self.inner.roots.borrow_mut());
        for root in &roots {
            WidgetCore::dispose(root)?;
        }
        tracing::debug!(disposed_roots = roots.len(), "session disposed");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pending", &self.pending())
            .field("registry", &self.registry_stats())
            .finish_non_exhaustive()
    }
}
