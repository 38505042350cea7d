#![forbid(unsafe_code)]

//! The outbound bridge: drives flushes through a transport.
//!
//! A flush drains the change queue, nests children under composites that
//! flushed in the same batch (so a freshly built subtree arrives as one
//! message instead of many), serializes each top-level snapshot, and
//! hands `(topic, payload)` pairs to the transport. Sending is
//! fire-and-forget; backpressure and retries belong to the transport.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value as Json;

use rwt_core::id::{WidgetId, WidgetKind};
use rwt_values::value::Value;

use crate::queue::ChangeQueue;
use crate::serializer::Serializer;

/// Where wire payloads go. Implementations must not block the caller on
/// network I/O.
pub trait Transport: Send {
    /// Deliver one payload under the given topic.
    fn send(&self, topic: &str, payload: &Json);
}

/// In-memory transport that records everything it is asked to send.
///
/// The standard test double, also useful for headless runs.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<(String, Json)>>,
}

impl MemoryTransport {
    /// Create an empty recording transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<(String, Json)> {
        self.sent.lock().unwrap().clone()
    }

    /// Drain and return everything sent so far.
    pub fn take(&self) -> Vec<(String, Json)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl Transport for MemoryTransport {
    fn send(&self, topic: &str, payload: &Json) {
        self.sent
            .lock()
            .unwrap()
            .push((topic.to_owned(), payload.clone()));
    }
}

// Lets callers keep a handle on a shared transport while the bridge owns
// its own.
impl<T: Transport + Sync + ?Sized> Transport for Arc<T> {
    fn send(&self, topic: &str, payload: &Json) {
        (**self).send(topic, payload);
    }
}

/// Flush pipeline from the change queue to a transport.
pub struct RemoteBridge {
    queue: Arc<ChangeQueue>,
    serializer: Mutex<Serializer>,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for RemoteBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBridge")
            .field("pending", &self.queue.pending())
            .finish_non_exhaustive()
    }
}

impl RemoteBridge {
    /// Create a bridge over the given queue and transport.
    pub fn new(queue: Arc<ChangeQueue>, transport: Box<dyn Transport>) -> Self {
        Self {
            queue,
            serializer: Mutex::new(Serializer::new()),
            transport,
        }
    }

    /// The change queue this bridge drains.
    pub fn queue(&self) -> &Arc<ChangeQueue> {
        &self.queue
    }

    /// Outbound topic for a widget snapshot.
    pub fn topic(kind: WidgetKind, id: WidgetId) -> String {
        format!("{kind}/{id}")
    }

    /// Drain the queue and send one message per top-level dirty widget.
    ///
    /// Returns the number of messages sent. A snapshot that fails to
    /// serialize is logged and skipped; it never blocks the rest of the
    /// batch.
    pub fn flush(&self) -> usize {
        let batch = self.queue.flush();
        if batch.is_empty() {
            return 0;
        }
        let batch_len = batch.len();

        let by_id: BTreeMap<WidgetId, Value> = batch.into_iter().collect();

        // Child -> parent edges, restricted to composites in this batch.
        let mut parent_of: HashMap<WidgetId, WidgetId> = HashMap::new();
        for (id, value) in &by_id {
            if let Some(children) = value.children() {
                for child in children {
                    if by_id.contains_key(child) {
                        parent_of.insert(*child, *id);
                    }
                }
            }
        }

        let mut serializer = self.serializer.lock().unwrap();
        let mut sent = 0;
        for (id, value) in &by_id {
            if parent_of.contains_key(id) {
                continue; // delivered nested under its parent
            }
            match encode_subtree(&mut serializer, value, &by_id) {
                Ok(payload) => {
                    let topic = Self::topic(value.kind(), *id);
                    tracing::trace!(widget_id = id.as_u64(), %topic, "sending snapshot");
                    self.transport.send(&topic, &payload);
                    sent += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        widget_id = id.as_u64(),
                        error = %err,
                        "skipping unserializable snapshot"
                    );
                }
            }
        }
        tracing::debug!(dirty = batch_len, sent, "flush complete");
        sent
    }
}

fn encode_subtree(
    serializer: &mut Serializer,
    value: &Value,
    batch: &BTreeMap<WidgetId, Value>,
) -> Result<Json, crate::serializer::SerializeError> {
    let mut json = serializer.serialize(value)?;
    if let Some(children) = value.children() {
        let mut nested = Vec::new();
        for child in children {
            if let Some(child_value) = batch.get(child) {
                nested.push(encode_subtree(serializer, child_value, batch)?);
            }
        }
        if !nested.is_empty() {
            if let Json::Object(obj) = &mut json {
                obj.insert("children".to_owned(), Json::Array(nested));
            }
        }
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use rwt_core::id::ResourceId;
    use rwt_core::style::Style;
    use rwt_values::resource::{Image, Resource};

    fn bridge_with_memory() -> (RemoteBridge, Arc<ChangeQueue>, Arc<MemoryTransport>) {
        let queue = Arc::new(ChangeQueue::new());
        let transport = Arc::new(MemoryTransport::new());
        let bridge = RemoteBridge::new(Arc::clone(&queue), Box::new(Arc::clone(&transport)));
        (bridge, queue, transport)
    }

    fn button(id: u64) -> Value {
        Value::new(WidgetKind::Button, WidgetId::from_raw(id), Style::PUSH)
    }

    fn composite(id: u64, children: &[u64]) -> Value {
        let mut v = Value::new(WidgetKind::Composite, WidgetId::from_raw(id), Style::empty());
        v.as_composite_mut().unwrap().children = children
            .iter()
            .map(|raw| WidgetId::from_raw(*raw))
            .collect();
        v
    }

    #[test]
    fn empty_queue_sends_nothing() {
        let (bridge, _queue, transport) = bridge_with_memory();
        assert_eq!(bridge.flush(), 0);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn each_dirty_widget_gets_one_topic() {
        let (bridge, queue, transport) = bridge_with_memory();
        queue.mark_dirty(&button(1));
        queue.mark_dirty(&button(2));

        assert_eq!(bridge.flush(), 2);
        let topics: Vec<String> = transport.sent().into_iter().map(|(t, _)| t).collect();
        assert_eq!(topics, vec!["Button/1", "Button/2"]);
    }

    #[test]
    fn child_nests_under_parent_in_same_batch() {
        let (bridge, queue, transport) = bridge_with_memory();
        queue.mark_dirty(&composite(1, &[2, 3]));
        queue.mark_dirty(&button(2));
        queue.mark_dirty(&button(3));

        assert_eq!(bridge.flush(), 1);
        let sent = transport.sent();
        assert_eq!(sent[0].0, "Composite/1");
        let children = sent[0].1["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["id"], 2);
        assert_eq!(children[1]["id"], 3);
    }

    #[test]
    fn child_flushes_standalone_when_parent_is_clean() {
        let (bridge, queue, transport) = bridge_with_memory();
        queue.mark_dirty(&button(2));

        assert_eq!(bridge.flush(), 1);
        assert_eq!(transport.sent()[0].0, "Button/2");
    }

    #[test]
    fn shared_image_is_referenced_by_id_across_widgets() {
        let (bridge, queue, transport) = bridge_with_memory();
        let shared = Resource::Image(Rc::new(Image::new(ResourceId::from_raw(40), 4, 4, vec![1])));

        let mut a = button(1);
        a.as_button_mut().unwrap().image = Some(shared.clone());
        let mut b = button(2);
        b.as_button_mut().unwrap().image = Some(shared);

        queue.stage(&a);
        queue.stage(&b);
        assert_eq!(bridge.flush(), 2);

        let sent = transport.sent();
        let full = &sent[0].1["image"];
        let reference = &sent[1].1["image"];
        assert_eq!(full["id"], 40);
        assert!(full.get("$ref").is_none());
        assert_eq!(reference["$ref"], 40);
    }

    #[test]
    fn flush_count_reflects_nesting() {
        let (bridge, queue, _transport) = bridge_with_memory();
        queue.mark_dirty(&composite(1, &[2]));
        queue.mark_dirty(&button(2));
        queue.mark_dirty(&button(9));
        // Composite/1 carries button 2; button 9 goes alone.
        assert_eq!(bridge.flush(), 2);
    }
}
