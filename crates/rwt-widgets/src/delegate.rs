#![forbid(unsafe_code)]

//! Backend delegates: the two realizations a widget can have.
//!
//! A [`Delegate`] is chosen once at construction and owned 1:1 by the
//! widget core. The native variant forwards property writes synchronously
//! to the platform through the [`NativeHost`] collaborator and never
//! touches the snapshot machinery. The remote variant keeps the widget's
//! canonical [`Value`] and funnels every mutation through the change
//! queue, so the remote renderer eventually observes it.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use rwt_core::config::BackendKind;
use rwt_core::geometry::{Point, Rect};
use rwt_core::id::{HandleId, WidgetId, WidgetKind};
use rwt_core::style::Style;
use rwt_values::value::Value;

/// A loosely typed property value exchanged with the native host.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// No value / property unset.
    Null,
    /// Boolean property.
    Bool(bool),
    /// Integer property.
    Int(i64),
    /// String property.
    Str(String),
    /// Rectangle property (bounds).
    Rect(Rect),
    /// Point property (location).
    Point(Point),
}

impl PropValue {
    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The rectangle payload, if this is a rectangle.
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            PropValue::Rect(r) => Some(*r),
            _ => None,
        }
    }

    /// The string payload, consumed, if this is a string.
    pub fn into_string(self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// The platform collaborator behind native-backed widgets.
///
/// The toolkit consumes this trait; real implementations wrap an actual
/// platform toolkit and live outside this workspace. [`MockHost`] is the
/// test double.
pub trait NativeHost {
    /// Create a native peer for a widget and return its handle.
    fn create_handle(&self, kind: WidgetKind, style: Style, parent: Option<HandleId>) -> HandleId;
    /// Destroy a native peer.
    fn destroy_handle(&self, handle: HandleId);
    /// Write one property on a native peer.
    fn set_property(&self, handle: HandleId, name: &str, value: PropValue);
    /// Read one property off a native peer.
    fn get_property(&self, handle: HandleId, name: &str) -> PropValue;
    /// Associate a handle with the toolkit-side widget id.
    fn register_handle(&self, handle: HandleId, id: WidgetId);
    /// Break the handle/widget association before destruction.
    fn deregister_handle(&self, handle: HandleId);
}

/// Native realization: an opaque handle plus the host that issued it.
pub struct NativeDelegate {
    handle: HandleId,
    host: Rc<dyn NativeHost>,
}

impl NativeDelegate {
    /// Create the native peer and register it under the widget id.
    pub fn new(
        host: Rc<dyn NativeHost>,
        id: WidgetId,
        kind: WidgetKind,
        style: Style,
        parent: Option<HandleId>,
    ) -> Self {
        let handle = host.create_handle(kind, style, parent);
        host.register_handle(handle, id);
        Self { handle, host }
    }

    /// The native handle.
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Forward a property write to the host.
    pub fn set(&self, name: &str, value: PropValue) {
        self.host.set_property(self.handle, name, value);
    }

    /// Read a property back from the host.
    pub fn get(&self, name: &str) -> PropValue {
        self.host.get_property(self.handle, name)
    }

    /// Deregister and destroy the native peer.
    pub fn release(&self) {
        self.host.deregister_handle(self.handle);
        self.host.destroy_handle(self.handle);
    }
}

impl std::fmt::Debug for NativeDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeDelegate")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Remote realization: the canonical snapshot, mutated on the UI thread.
#[derive(Debug)]
pub struct RemoteDelegate {
    value: RefCell<Value>,
}

impl RemoteDelegate {
    /// Wrap a fresh snapshot.
    pub fn new(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    /// Shared access to the canonical snapshot.
    pub fn value(&self) -> Ref<'_, Value> {
        self.value.borrow()
    }

    /// Mutable access to the canonical snapshot.
    pub fn value_mut(&self) -> RefMut<'_, Value> {
        self.value.borrow_mut()
    }
}

/// The backend realization of one widget.
#[derive(Debug)]
pub enum Delegate {
    /// Handle-based native peer.
    Native(NativeDelegate),
    /// Value-based remote peer.
    Remote(RemoteDelegate),
}

impl Delegate {
    /// Which backend this delegate belongs to.
    pub fn backend(&self) -> BackendKind {
        match self {
            Delegate::Native(_) => BackendKind::Native,
            Delegate::Remote(_) => BackendKind::Remote,
        }
    }
}

/// Recording [`NativeHost`] used by tests and headless runs.
///
/// Hands out sequential handles and stores properties in a flat map, so
/// tests can assert exactly what the platform was asked to do.
#[derive(Default)]
pub struct MockHost {
    next_handle: Cell<u64>,
    props: RefCell<HashMap<(HandleId, String), PropValue>>,
    registered: RefCell<HashMap<HandleId, WidgetId>>,
    created: RefCell<Vec<(HandleId, WidgetKind)>>,
    destroyed: RefCell<Vec<HandleId>>,
}

impl MockHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles created so far, in creation order.
    pub fn created(&self) -> Vec<(HandleId, WidgetKind)> {
        self.created.borrow().clone()
    }

    /// Handles destroyed so far, in destruction order.
    pub fn destroyed(&self) -> Vec<HandleId> {
        self.destroyed.borrow().clone()
    }

    /// The widget id a handle is registered under, if any.
    pub fn widget_for(&self, handle: HandleId) -> Option<WidgetId> {
        self.registered.borrow().get(&handle).copied()
    }

    /// Direct read of a stored property, bypassing the trait.
    pub fn property(&self, handle: HandleId, name: &str) -> PropValue {
        self.props
            .borrow()
            .get(&(handle, name.to_owned()))
            .cloned()
            .unwrap_or(PropValue::Null)
    }
}

impl NativeHost for MockHost {
    fn create_handle(&self, kind: WidgetKind, _style: Style, _parent: Option<HandleId>) -> HandleId {
        let raw = self.next_handle.get() + 1;
        self.next_handle.set(raw);
        let handle = HandleId::from_raw(raw);
        self.created.borrow_mut().push((handle, kind));
        handle
    }

    fn destroy_handle(&self, handle: HandleId) {
        self.props
            .borrow_mut()
            .retain(|(owner, _), _| *owner != handle);
        self.destroyed.borrow_mut().push(handle);
    }

    fn set_property(&self, handle: HandleId, name: &str, value: PropValue) {
        self.props
            .borrow_mut()
            .insert((handle, name.to_owned()), value);
    }

    fn get_property(&self, handle: HandleId, name: &str) -> PropValue {
        self.property(handle, name)
    }

    fn register_handle(&self, handle: HandleId, id: WidgetId) {
        self.registered.borrow_mut().insert(handle, id);
    }

    fn deregister_handle(&self, handle: HandleId) {
        self.registered.borrow_mut().remove(&handle);
    }
}

impl std::fmt::Debug for MockHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHost")
            .field("created", &self.created.borrow().len())
            .field("destroyed", &self.destroyed.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_delegate_registers_then_releases() {
        let host = Rc::new(MockHost::new());
        let id = WidgetId::from_raw(7);
        let delegate = NativeDelegate::new(
            Rc::clone(&host) as Rc<dyn NativeHost>,
            id,
            WidgetKind::Button,
            Style::PUSH,
            None,
        );

        assert_eq!(host.widget_for(delegate.handle()), Some(id));
        delegate.set("text", PropValue::Str("OK".into()));
        assert_eq!(delegate.get("text"), PropValue::Str("OK".into()));

        delegate.release();
        assert_eq!(host.widget_for(delegate.handle()), None);
        assert_eq!(host.destroyed(), vec![delegate.handle()]);
        // Properties died with the handle.
        assert_eq!(host.property(delegate.handle(), "text"), PropValue::Null);
    }

    #[test]
    fn mock_host_hands_out_distinct_handles() {
        let host = MockHost::new();
        let a = host.create_handle(WidgetKind::Label, Style::empty(), None);
        let b = host.create_handle(WidgetKind::Text, Style::SINGLE, Some(a));
        assert_ne!(a, b);
        assert_eq!(host.created().len(), 2);
    }

    #[test]
    fn delegate_reports_its_backend() {
        let remote = Delegate::Remote(RemoteDelegate::new(Value::new(
            WidgetKind::Label,
            WidgetId::from_raw(1),
            Style::empty(),
        )));
        assert_eq!(remote.backend(), BackendKind::Remote);
    }

    #[test]
    fn unread_properties_come_back_null() {
        let host = MockHost::new();
        let h = host.create_handle(WidgetKind::Button, Style::PUSH, None);
        assert_eq!(host.get_property(h, "text"), PropValue::Null);
        assert_eq!(PropValue::Null.as_bool(), None);
        assert_eq!(PropValue::Bool(true).as_bool(), Some(true));
    }
}
