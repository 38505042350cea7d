#![forbid(unsafe_code)]

//! The widget core shared by every kind.
//!
//! A [`WidgetCore`] carries the stable identity, style, tree links, the
//! disposed flag, and the backend [`Delegate`]. Wrapper types
//! (`Composite`, `Button`, ...) are thin handles over an `Rc<WidgetCore>`
//! and add kind-specific accessors; everything lifecycle-shaped lives
//! here.
//!
//! Every mutating entry point goes through [`WidgetCore::check_widget`],
//! which fails fast on disposed widgets and off-thread access. Mutations
//! on the remote backend apply to the canonical snapshot and stage it in
//! the change queue; mutations on the native backend forward to the host
//! and never touch the snapshot machinery.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rwt_channel::{ListenerId, UiEvent};
use rwt_core::config::BackendKind;
use rwt_core::error::{Error, Result};
use rwt_core::event::{EventKey, EventState};
use rwt_core::geometry::Rect;
use rwt_core::id::{HandleId, WidgetId, WidgetKind};
use rwt_core::style::Style;
use rwt_values::resource::Resource;
use rwt_values::value::Value;

use crate::composite::Composite;
use crate::delegate::{Delegate, NativeDelegate, PropValue, RemoteDelegate};
use crate::session::SessionInner;

/// Identity, tree position, lifecycle state, and backend of one widget.
pub struct WidgetCore {
    id: WidgetId,
    kind: WidgetKind,
    style: Style,
    session: Weak<SessionInner>,
    parent: RefCell<Weak<WidgetCore>>,
    children: RefCell<Vec<Rc<WidgetCore>>>,
    disposed: Cell<bool>,
    delegate: Delegate,
}

impl WidgetCore {
    /// Build a root widget, picking its backend from the session config.
    pub(crate) fn new_root(
        session: &Rc<SessionInner>,
        kind: WidgetKind,
        style: Style,
    ) -> Result<Rc<WidgetCore>> {
        session.ensure_ui_thread()?;
        let backend = session.config().backend_for(kind);
        let core = Self::build(session, None, kind, style, backend);
        session.adopt_root(&core);
        Ok(core)
    }

    /// Build a child widget, inheriting the parent's backend.
    ///
    /// A per-kind config override that disagrees with the parent's branch
    /// is a construction error: branches never mix backends.
    pub(crate) fn new_child(
        parent: &Rc<WidgetCore>,
        kind: WidgetKind,
        style: Style,
    ) -> Result<Rc<WidgetCore>> {
        parent.check_widget()?;
        let session = parent.session()?;
        let backend = parent.backend();
        if session.config().has_override(kind) {
            let forced = session.config().backend_for(kind);
            if forced != backend {
                return Err(Error::BackendMismatch {
                    parent: backend.name(),
                    child: forced.name(),
                });
            }
        }
        Ok(Self::build(&session, Some(parent), kind, style, backend))
    }

    fn build(
        session: &Rc<SessionInner>,
        parent: Option<&Rc<WidgetCore>>,
        kind: WidgetKind,
        style: Style,
        backend: BackendKind,
    ) -> Rc<WidgetCore> {
        let id = session.allocate_widget_id();
        let delegate = match backend {
            BackendKind::Native => {
                let parent_handle = parent.and_then(|p| p.handle());
                Delegate::Native(NativeDelegate::new(
                    session.host(),
                    id,
                    kind,
                    style,
                    parent_handle,
                ))
            }
            BackendKind::Remote => {
                Delegate::Remote(RemoteDelegate::new(Value::new(kind, id, style)))
            }
        };

        let core = Rc::new(WidgetCore {
            id,
            kind,
            style,
            session: Rc::downgrade(session),
            parent: RefCell::new(parent.map_or_else(Weak::new, Rc::downgrade)),
            children: RefCell::new(Vec::new()),
            disposed: Cell::new(false),
            delegate,
        });

        if let Some(parent) = parent {
            parent.children.borrow_mut().push(Rc::clone(&core));
            parent.attach_child_value(id, session);
        }
        session.registry().register(&core);

        if let Delegate::Remote(remote) = &core.delegate {
            // The whole fresh snapshot is new state for the renderer.
            session.queue().mark_dirty(&remote.value());
            install_hooks(&core, session);
        }
        tracing::debug!(widget_id = id.as_u64(), %kind, backend = %backend, "widget created");
        core
    }

    /// Stable widget id.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Widget kind.
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Construction-time style bits.
    pub fn style(&self) -> Style {
        self.style
    }

    /// The backend this widget was realized on.
    pub fn backend(&self) -> BackendKind {
        self.delegate.backend()
    }

    /// Whether the widget has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Native handle, for native-backed widgets.
    pub fn handle(&self) -> Option<HandleId> {
        match &self.delegate {
            Delegate::Native(native) => Some(native.handle()),
            Delegate::Remote(_) => None,
        }
    }

    /// The parent core, while both ends are alive.
    pub fn parent(&self) -> Option<Rc<WidgetCore>> {
        self.parent.borrow().upgrade()
    }

    /// Ids of current children, in z-order.
    pub fn child_ids(&self) -> Vec<WidgetId> {
        self.children.borrow().iter().map(|c| c.id).collect()
    }

    /// Whether the widget has unflushed changes.
    pub fn is_dirty(&self) -> bool {
        self.session()
            .map(|session| session.queue().is_dirty(self.id))
            .unwrap_or(false)
    }

    /// Fail fast on disposed widgets and off-thread access.
    pub fn check_widget(&self) -> Result<()> {
        if self.disposed.get() {
            return Err(Error::WidgetDisposed(self.id));
        }
        self.session()?.ensure_ui_thread()
    }

    pub(crate) fn session(&self) -> Result<Rc<SessionInner>> {
        // A widget that outlived its session behaves as disposed.
        self.session.upgrade().ok_or(Error::WidgetDisposed(self.id))
    }

    /// Apply one mutation through the active backend.
    ///
    /// Native: the property write is forwarded to the host. Remote: the
    /// canonical snapshot is updated and staged for the next flush.
    pub(crate) fn write(
        &self,
        prop: &'static str,
        native: impl FnOnce() -> PropValue,
        apply: impl FnOnce(&mut Value),
    ) -> Result<()> {
        self.check_widget()?;
        match &self.delegate {
            Delegate::Native(delegate) => delegate.set(prop, native()),
            Delegate::Remote(delegate) => {
                let session = self.session()?;
                let mut value = delegate.value_mut();
                apply(&mut value);
                session.queue().stage(&value);
            }
        }
        Ok(())
    }

    /// Read one property through the active backend.
    pub(crate) fn read<T>(
        &self,
        prop: &'static str,
        native: impl FnOnce(PropValue) -> T,
        remote: impl FnOnce(&Value) -> T,
    ) -> Result<T> {
        self.check_widget()?;
        match &self.delegate {
            Delegate::Native(delegate) => Ok(native(delegate.get(prop))),
            Delegate::Remote(delegate) => Ok(remote(&delegate.value())),
        }
    }

    /// Update the canonical snapshot without staging it.
    ///
    /// Used by inbound sync for state the renderer already holds (text,
    /// geometry); echoing it back would be redundant traffic.
    fn update_silent(&self, apply: impl FnOnce(&mut Value)) {
        if let Delegate::Remote(delegate) = &self.delegate {
            apply(&mut delegate.value_mut());
        }
    }

    /// Register a listener for one event key on this widget.
    pub fn subscribe(
        &self,
        key: EventKey,
        listener: impl FnMut(&UiEvent) + 'static,
    ) -> Result<ListenerId> {
        self.check_widget()?;
        let session = self.session()?;
        Ok(session.dispatcher().subscribe(self.id, key, listener))
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, key: &EventKey, listener: ListenerId) -> Result<bool> {
        self.check_widget()?;
        let session = self.session()?;
        Ok(session.dispatcher().unsubscribe(self.id, key, listener))
    }

    // Common control properties.

    /// Set the bounds within the parent.
    pub fn set_bounds(&self, bounds: Rect) -> Result<()> {
        self.write(
            "bounds",
            || PropValue::Rect(bounds),
            |v| v.control_mut().bounds = Some(bounds),
        )
    }

    /// Current bounds, if explicitly set.
    pub fn bounds(&self) -> Result<Option<Rect>> {
        self.read("bounds", |p| p.as_rect(), |v| v.control().bounds)
    }

    /// Enable or disable input.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.write(
            "enabled",
            || PropValue::Bool(enabled),
            |v| v.control_mut().enabled = enabled,
        )
    }

    /// Whether the control accepts input.
    pub fn is_enabled(&self) -> Result<bool> {
        self.read(
            "enabled",
            |p| p.as_bool().unwrap_or(true),
            |v| v.control().enabled,
        )
    }

    /// Show or hide the control.
    pub fn set_visible(&self, visible: bool) -> Result<()> {
        self.write(
            "visible",
            || PropValue::Bool(visible),
            |v| v.control_mut().visible = visible,
        )
    }

    /// Whether the control is shown.
    pub fn is_visible(&self) -> Result<bool> {
        self.read(
            "visible",
            |p| p.as_bool().unwrap_or(true),
            |v| v.control().visible,
        )
    }

    /// Set or clear the hover tool tip.
    pub fn set_tool_tip(&self, tip: Option<&str>) -> Result<()> {
        let owned = tip.map(str::to_owned);
        self.write(
            "toolTip",
            || owned.clone().map_or(PropValue::Null, PropValue::Str),
            |v| v.control_mut().tool_tip = owned.clone(),
        )
    }

    /// Set the font.
    pub fn set_font(&self, font: Resource) -> Result<()> {
        if !matches!(font, Resource::Font(_)) {
            return Err(Error::InvalidArgument(format!(
                "resource {} is a {}, not a font",
                font.id(),
                font.kind()
            )));
        }
        self.write(
            "font",
            || PropValue::Int(font.id().as_u64() as i64),
            |v| v.control_mut().font = Some(font.clone()),
        )
    }

    // Parent-side snapshot maintenance.

    fn attach_child_value(&self, child: WidgetId, session: &SessionInner) {
        if let Delegate::Remote(delegate) = &self.delegate {
            let mut value = delegate.value_mut();
            if let Some(composite) = value.as_composite_mut() {
                composite.children.push(child);
                session.queue().stage(&value);
            }
        }
    }

    fn detach_child_value(&self, child: WidgetId, session: &SessionInner) {
        if let Delegate::Remote(delegate) = &self.delegate {
            let mut value = delegate.value_mut();
            if let Some(composite) = value.as_composite_mut() {
                composite.children.retain(|id| *id != child);
                session.queue().stage(&value);
            }
        }
    }

    /// Move the widget under a new parent composite.
    ///
    /// Both ends must belong to the same session and the same backend;
    /// crossing either boundary is rejected, as is making a widget its
    /// own ancestor. On the remote backend both affected composites
    /// restage their child lists.
    pub fn set_parent(core: &Rc<WidgetCore>, new_parent: &Rc<WidgetCore>) -> Result<()> {
        core.check_widget()?;
        new_parent.check_widget()?;
        let session = core.session()?;
        if !Rc::ptr_eq(&session, &new_parent.session()?) {
            return Err(Error::CrossSession);
        }
        if new_parent.kind() != WidgetKind::Composite {
            return Err(Error::InvalidArgument(format!(
                "widget {} is a {}, not a composite",
                new_parent.id,
                new_parent.kind()
            )));
        }
        if new_parent.backend() != core.backend() {
            return Err(Error::BackendMismatch {
                parent: new_parent.backend().name(),
                child: core.backend().name(),
            });
        }
        let mut ancestor = Some(Rc::clone(new_parent));
        while let Some(candidate) = ancestor {
            if candidate.id == core.id {
                return Err(Error::InvalidArgument(format!(
                    "widget {} cannot become its own ancestor",
                    core.id
                )));
            }
            ancestor = candidate.parent();
        }

        match core.parent.borrow().upgrade() {
            Some(old) if Rc::ptr_eq(&old, new_parent) => return Ok(()),
            Some(old) => {
                old.children.borrow_mut().retain(|c| c.id != core.id);
                old.detach_child_value(core.id, &session);
            }
            None => session.forget_root(core.id),
        }

        *core.parent.borrow_mut() = Rc::downgrade(new_parent);
        new_parent.children.borrow_mut().push(Rc::clone(core));
        new_parent.attach_child_value(core.id, &session);
        if let Delegate::Native(native) = &core.delegate {
            if let Some(handle) = new_parent.handle() {
                native.set("parent", PropValue::Int(handle.as_u64() as i64));
            }
        }
        tracing::debug!(
            widget_id = core.id.as_u64(),
            parent_id = new_parent.id.as_u64(),
            "widget reparented"
        );
        Ok(())
    }

    /// Dispose the widget and, transitively, its children.
    ///
    /// Children go first. Each disposed widget is tombstoned in the change
    /// queue, forgotten by the registry (which removes it from the live-id
    /// set, so in-flight envelopes drop at resolution), stripped of its
    /// listeners, and its native peer destroyed. Idempotent.
    pub fn dispose(core: &Rc<WidgetCore>) -> Result<()> {
        if core.disposed.get() {
            return Ok(());
        }
        let session = core.session()?;
        session.ensure_ui_thread()?;

        Self::dispose_inner(core, &session);

        if let Some(parent) = core.parent.borrow().upgrade() {
            parent.children.borrow_mut().retain(|c| c.id != core.id);
            parent.detach_child_value(core.id, &session);
        } else {
            session.forget_root(core.id);
        }
        Ok(())
    }

    fn dispose_inner(core: &Rc<WidgetCore>, session: &Rc<SessionInner>) {
        if core.disposed.replace(true) {
            return;
        }
        let children = std::mem::take(&mut *core.children.borrow_mut());
        for child in &children {
            Self::dispose_inner(child, session);
        }

        session.queue().discard(core.id);
        session.registry().forget(core.id);
        session.dispatcher().drop_widget(core.id);
        if let Delegate::Native(native) = &core.delegate {
            native.release();
        }
        tracing::debug!(widget_id = core.id.as_u64(), kind = %core.kind, "widget disposed");
    }

    #[cfg(test)]
    pub(crate) fn detached(id: WidgetId, kind: WidgetKind, style: Style) -> Rc<WidgetCore> {
        Rc::new(WidgetCore {
            id,
            kind,
            style,
            session: Weak::new(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            disposed: Cell::new(false),
            delegate: Delegate::Remote(RemoteDelegate::new(Value::new(kind, id, style))),
        })
    }

    // Inbound sync, invoked by the hooks below before user listeners.

    fn sync_geometry(&self, state: &EventState) {
        if let Some(bounds) = state.bounds {
            self.update_silent(|v| v.control_mut().bounds = Some(bounds));
        } else if let Some(location) = state.location {
            self.update_silent(|v| {
                let control = v.control_mut();
                let size = control.bounds.map(|b| b.size()).unwrap_or_default();
                control.bounds = Some(Rect::new(location.x, location.y, size.width, size.height));
            });
        }
    }

    fn sync_text(&self, state: &EventState) {
        if let Some(text) = &state.text {
            let text = text.clone();
            self.update_silent(|v| {
                if let Some(t) = v.as_text_mut() {
                    t.text = text;
                }
            });
        }
    }

    fn sync_selection(&self, selected: bool) {
        let Ok(session) = self.session() else {
            return;
        };
        // Radio group discipline: selecting one radio deselects its
        // selected siblings, each through the normal staging path, before
        // the target's own listeners fire.
        if self.style.contains(Style::RADIO) && selected {
            if let Some(parent) = self.parent.borrow().upgrade() {
                for sibling in parent.children.borrow().iter() {
                    if sibling.id == self.id || !sibling.style.contains(Style::RADIO) {
                        continue;
                    }
                    if let Delegate::Remote(delegate) = &sibling.delegate {
                        let mut value = delegate.value_mut();
                        let was_selected = value.as_button().is_some_and(|b| b.selection);
                        if was_selected {
                            if let Some(button) = value.as_button_mut() {
                                button.selection = false;
                            }
                            session.queue().stage(&value);
                            tracing::trace!(
                                widget_id = sibling.id.as_u64(),
                                "radio sibling deselected"
                            );
                        }
                    }
                }
            }
        }
        if self
            .style
            .intersects(Style::CHECK | Style::RADIO | Style::TOGGLE)
        {
            if let Delegate::Remote(delegate) = &self.delegate {
                let mut value = delegate.value_mut();
                if let Some(button) = value.as_button_mut() {
                    button.selection = selected;
                }
                session.queue().stage(&value);
            }
        }
    }
}

impl std::fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetCore")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("backend", &self.backend())
            .field("disposed", &self.disposed.get())
            .finish_non_exhaustive()
    }
}

/// Subscribe the state-sync hooks that keep the canonical snapshot
/// current with what the renderer reports. Hooks are registered before
/// any user listener can be, so they always run first.
fn install_hooks(core: &Rc<WidgetCore>, session: &SessionInner) {
    let dispatcher = session.dispatcher();

    let weak = Rc::downgrade(core);
    dispatcher.subscribe(core.id(), EventKey::moved(), move |event| {
        if let Some(core) = weak.upgrade() {
            core.sync_geometry(&event.state);
        }
    });
    let weak = Rc::downgrade(core);
    dispatcher.subscribe(core.id(), EventKey::resized(), move |event| {
        if let Some(core) = weak.upgrade() {
            core.sync_geometry(&event.state);
        }
    });

    match core.kind() {
        WidgetKind::Button => {
            let weak = Rc::downgrade(core);
            dispatcher.subscribe(core.id(), EventKey::selection(), move |event| {
                if let Some(core) = weak.upgrade() {
                    core.sync_selection(event.state.selection.unwrap_or(true));
                }
            });
        }
        WidgetKind::Text => {
            let weak = Rc::downgrade(core);
            dispatcher.subscribe(core.id(), EventKey::modified(), move |event| {
                if let Some(core) = weak.upgrade() {
                    core.sync_text(&event.state);
                }
            });
        }
        WidgetKind::Composite | WidgetKind::Label => {}
    }
}

/// Behavior common to every widget wrapper.
///
/// Implementors only supply [`Control::core`]; everything else forwards
/// to the shared core.
pub trait Control {
    /// The underlying widget core.
    fn core(&self) -> &Rc<WidgetCore>;

    /// Stable widget id.
    fn id(&self) -> WidgetId {
        self.core().id()
    }

    /// Widget kind.
    fn kind(&self) -> WidgetKind {
        self.core().kind()
    }

    /// Construction-time style bits.
    fn style(&self) -> Style {
        self.core().style()
    }

    /// The backend this widget was realized on.
    fn backend(&self) -> BackendKind {
        self.core().backend()
    }

    /// Whether the widget has been disposed.
    fn is_disposed(&self) -> bool {
        self.core().is_disposed()
    }

    /// Whether the widget has unflushed changes.
    fn is_dirty(&self) -> bool {
        self.core().is_dirty()
    }

    /// Dispose this widget and its children.
    fn dispose(&self) -> Result<()> {
        WidgetCore::dispose(self.core())
    }

    /// Move this widget under a new parent composite in the same
    /// session and on the same backend.
    fn set_parent(&self, parent: &Composite) -> Result<()> {
        WidgetCore::set_parent(self.core(), parent.core())
    }

    /// Set the bounds within the parent.
    fn set_bounds(&self, bounds: Rect) -> Result<()> {
        self.core().set_bounds(bounds)
    }

    /// Current bounds, if explicitly set.
    fn bounds(&self) -> Result<Option<Rect>> {
        self.core().bounds()
    }

    /// Enable or disable input.
    fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.core().set_enabled(enabled)
    }

    /// Whether the control accepts input.
    fn is_enabled(&self) -> Result<bool> {
        self.core().is_enabled()
    }

    /// Show or hide the control.
    fn set_visible(&self, visible: bool) -> Result<()> {
        self.core().set_visible(visible)
    }

    /// Whether the control is shown.
    fn is_visible(&self) -> Result<bool> {
        self.core().is_visible()
    }

    /// Set or clear the hover tool tip.
    fn set_tool_tip(&self, tip: Option<&str>) -> Result<()> {
        self.core().set_tool_tip(tip)
    }

    /// Set the font.
    fn set_font(&self, font: Resource) -> Result<()> {
        self.core().set_font(font)
    }

    /// Register a listener for one event key.
    fn add_listener(
        &self,
        key: EventKey,
        listener: impl FnMut(&UiEvent) + 'static,
    ) -> Result<ListenerId> {
        self.core().subscribe(key, listener)
    }

    /// Remove a previously registered listener.
    fn remove_listener(&self, key: &EventKey, listener: ListenerId) -> Result<bool> {
        self.core().unsubscribe(key, listener)
    }
}
