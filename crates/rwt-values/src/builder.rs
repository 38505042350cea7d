#![forbid(unsafe_code)]

//! Per-widget staging of pending snapshot changes.
//!
//! A builder exists only while a widget has unflushed changes: it is
//! created by the first mutation after a flush and consumed by the next
//! flush. Later mutations restage over earlier ones, so a flush emits one
//! snapshot per widget with last-writer-wins per field.

use rwt_core::id::WidgetId;

use crate::value::Value;

/// Mutable accumulator for one widget's pending changes.
#[derive(Clone, Debug)]
pub struct ValueBuilder {
    id: WidgetId,
    staged: Value,
    revision: u64,
}

impl ValueBuilder {
    /// Open a builder seeded from the widget's current state.
    pub fn new(seed: &Value) -> Self {
        Self {
            id: seed.id(),
            staged: seed.clone(),
            revision: 1,
        }
    }

    /// The widget this builder stages changes for.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Number of times this builder has been (re)staged since it opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the staged state with the widget's current state.
    ///
    /// Called on every mutation after the first; the newest state always
    /// wins.
    pub fn restage(&mut self, current: &Value) {
        debug_assert_eq!(current.id(), self.id, "builder restaged with a foreign value");
        current.clone_into(&mut self.staged);
        self.revision += 1;
    }

    /// Read-only view of the staged snapshot.
    pub fn staged(&self) -> &Value {
        &self.staged
    }

    /// Consume the builder, yielding the snapshot to transmit.
    pub fn finish(self) -> Value {
        self.staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwt_core::id::WidgetKind;
    use rwt_core::style::Style;

    fn value(id: u64) -> Value {
        Value::new(WidgetKind::Button, WidgetId::from_raw(id), Style::PUSH)
    }

    #[test]
    fn builder_takes_identity_from_seed() {
        let b = ValueBuilder::new(&value(8));
        assert_eq!(b.id(), WidgetId::from_raw(8));
        assert_eq!(b.revision(), 1);
    }

    #[test]
    fn restage_is_last_writer_wins() {
        let mut v = value(1);
        let mut b = ValueBuilder::new(&v);

        v.as_button_mut().unwrap().text = "first".into();
        b.restage(&v);
        assert_eq!(b.staged().as_button().unwrap().text, "first");

        v.as_button_mut().unwrap().text = "second".into();
        b.restage(&v);
        assert_eq!(b.staged().as_button().unwrap().text, "second");

        assert_eq!(b.revision(), 3);
        let snapshot = b.finish();
        assert_eq!(snapshot.as_button().unwrap().text, "second");
    }
}
