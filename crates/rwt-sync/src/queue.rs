#![forbid(unsafe_code)]

//! The change queue (dirty tracker).
//!
//! One builder per dirty widget, keyed by widget id. Marking is
//! idempotent; the builder table and the dirty set are the same
//! structure, so the "every builder id is dirty and vice versa"
//! invariant holds by construction. `flush` swaps the whole table out
//! under the lock, which makes it atomic with respect to concurrent
//! mutation: a mutation lands entirely in the flushed batch or entirely
//! in the next one.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rwt_core::id::WidgetId;
use rwt_values::builder::ValueBuilder;
use rwt_values::value::Value;

/// Process-wide set of widgets with unflushed pending changes.
#[derive(Debug, Default)]
pub struct ChangeQueue {
    builders: Mutex<BTreeMap<WidgetId, ValueBuilder>>,
}

impl ChangeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a widget dirty without changing any staged field.
    ///
    /// Used when a widget is first created (its whole snapshot is new) or
    /// when an external effect invalidates it. Idempotent: an already
    /// dirty widget keeps its builder untouched.
    pub fn mark_dirty(&self, seed: &Value) {
        let mut builders = self.builders.lock().unwrap();
        builders
            .entry(seed.id())
            .or_insert_with(|| ValueBuilder::new(seed));
    }

    /// Stage the widget's current state, opening a builder if needed.
    ///
    /// Called after every mutation; the builder ends up holding the
    /// newest state, so repeated mutations coalesce last-writer-wins.
    pub fn stage(&self, current: &Value) {
        let mut builders = self.builders.lock().unwrap();
        match builders.entry(current.id()) {
            std::collections::btree_map::Entry::Occupied(mut entry) => {
                entry.get_mut().restage(current);
            }
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(ValueBuilder::new(current));
            }
        }
    }

    /// Whether the widget has unflushed changes.
    pub fn is_dirty(&self, id: WidgetId) -> bool {
        self.builders.lock().unwrap().contains_key(&id)
    }

    /// Tombstone a disposed widget: drop its builder so the next flush
    /// does not emit a stale snapshot. Returns whether a builder existed.
    pub fn discard(&self, id: WidgetId) -> bool {
        self.builders.lock().unwrap().remove(&id).is_some()
    }

    /// Number of widgets currently dirty.
    pub fn pending(&self) -> usize {
        self.builders.lock().unwrap().len()
    }

    /// Drain the queue, yielding `(id, snapshot)` pairs ordered by id.
    ///
    /// The builder table is swapped out in one critical section; widgets
    /// dirtied while the batch is being processed land in the next flush.
    pub fn flush(&self) -> Vec<(WidgetId, Value)> {
        let drained = {
            let mut builders = self.builders.lock().unwrap();
            std::mem::take(&mut *builders)
        };
        drained
            .into_iter()
            .map(|(id, builder)| (id, builder.finish()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rwt_core::id::WidgetKind;
    use rwt_core::style::Style;

    fn value(id: u64) -> Value {
        Value::new(WidgetKind::Button, WidgetId::from_raw(id), Style::PUSH)
    }

    #[test]
    fn marking_twice_yields_one_snapshot() {
        let queue = ChangeQueue::new();
        let v = value(1);
        queue.mark_dirty(&v);
        queue.mark_dirty(&v);
        assert_eq!(queue.pending(), 1);

        let batch = queue.flush();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].0, WidgetId::from_raw(1));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn staging_coalesces_last_writer_wins() {
        let queue = ChangeQueue::new();
        let mut v = value(1);

        v.as_button_mut().unwrap().text = "a".into();
        queue.stage(&v);
        v.as_button_mut().unwrap().text = "b".into();
        queue.stage(&v);

        let batch = queue.flush();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].1.as_button().unwrap().text, "b");
    }

    #[test]
    fn flush_clears_dirtiness() {
        let queue = ChangeQueue::new();
        queue.mark_dirty(&value(1));
        assert!(queue.is_dirty(WidgetId::from_raw(1)));
        queue.flush();
        assert!(!queue.is_dirty(WidgetId::from_raw(1)));
    }

    #[test]
    fn discard_tombstones_a_dirty_widget() {
        let queue = ChangeQueue::new();
        queue.mark_dirty(&value(1));
        queue.mark_dirty(&value(2));

        assert!(queue.discard(WidgetId::from_raw(1)));
        assert!(!queue.discard(WidgetId::from_raw(1)), "second discard is a no-op");

        let batch = queue.flush();
        let ids: Vec<u64> = batch.iter().map(|(id, _)| id.as_u64()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn flush_is_ordered_by_id() {
        let queue = ChangeQueue::new();
        for id in [5u64, 1, 9, 3] {
            queue.mark_dirty(&value(id));
        }
        let ids: Vec<u64> = queue.flush().iter().map(|(id, _)| id.as_u64()).collect();
        assert_eq!(ids, vec![1, 3, 5, 9]);
    }

    #[test]
    fn mutation_during_flush_lands_in_next_batch() {
        // Single-threaded approximation: dirty again after the swap.
        let queue = ChangeQueue::new();
        queue.mark_dirty(&value(1));
        let first = queue.flush();
        assert_eq!(first.len(), 1);

        queue.stage(&value(1));
        let second = queue.flush();
        assert_eq!(second.len(), 1);
    }

    proptest! {
        /// Any interleaving of marks and stages yields exactly one
        /// snapshot per distinct widget, holding the last staged text.
        #[test]
        fn coalescing_holds_for_arbitrary_interleavings(
            ops in proptest::collection::vec((1u64..6, ".{0,8}"), 1..40)
        ) {
            let queue = ChangeQueue::new();
            let mut last_text: std::collections::BTreeMap<u64, String> =
                std::collections::BTreeMap::new();

            for (id, text) in &ops {
                let mut v = value(*id);
                v.as_button_mut().unwrap().text = text.clone();
                queue.stage(&v);
                last_text.insert(*id, text.clone());
            }

            let batch = queue.flush();
            prop_assert_eq!(batch.len(), last_text.len());
            for (id, snapshot) in batch {
                prop_assert_eq!(
                    &snapshot.as_button().unwrap().text,
                    &last_text[&id.as_u64()]
                );
            }
        }
    }
}
