#![forbid(unsafe_code)]

//! The inbound event envelope.
//!
//! Wire shape: `{ "widgetId": 7, "category": "Selection",
//! "name": "Selection", "params": { ... } }`. Envelopes are transient;
//! nothing retains them after dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use rwt_core::event::{EventCategory, EventKey, EventName, EventState};
use rwt_core::id::WidgetId;

/// One widget-addressed interaction event from the remote renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct EventEnvelope {
    /// Target widget.
    pub widget_id: WidgetId,
    /// Normalized routing key.
    pub key: EventKey,
    /// Opaque parameter payload; decoded to [`EventState`] at delivery.
    pub params: Json,
}

impl EventEnvelope {
    /// Build an envelope.
    pub fn new(widget_id: WidgetId, key: EventKey, params: Json) -> Self {
        Self {
            widget_id,
            key,
            params,
        }
    }

    /// Decode the parameter payload.
    ///
    /// Only flat parameter shapes are ever decoded; a malformed payload
    /// yields `None` and delivery proceeds with defaults.
    pub fn decode_state(&self) -> Option<EventState> {
        serde_json::from_value(self.params.clone()).ok()
    }
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "widgetId")]
    widget_id: u64,
    category: String,
    name: String,
    #[serde(default)]
    params: Json,
}

impl Serialize for EventEnvelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEnvelope {
            widget_id: self.widget_id.as_u64(),
            category: self.key.category.to_string(),
            name: self.key.name.to_string(),
            params: self.params.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventEnvelope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireEnvelope::deserialize(deserializer)?;
        Ok(EventEnvelope {
            widget_id: WidgetId::from_raw(wire.widget_id),
            key: EventKey {
                category: EventCategory::from_wire(&wire.category),
                name: EventName::from_wire(&wire.name),
            },
            params: wire.params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_roundtrips_wire_shape() {
        let envelope = EventEnvelope::new(
            WidgetId::from_raw(7),
            EventKey::selection(),
            json!({ "selection": true }),
        );
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire["widgetId"], 7);
        assert_eq!(wire["category"], "Selection");
        assert_eq!(wire["name"], "Selection");

        let back: EventEnvelope = serde_json::from_value(wire).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn missing_params_default_to_null() {
        let back: EventEnvelope = serde_json::from_value(json!({
            "widgetId": 3,
            "category": "Control",
            "name": "Move",
        }))
        .unwrap();
        assert_eq!(back.key, EventKey::moved());
        assert!(back.params.is_null());
    }

    #[test]
    fn decode_state_tolerates_garbage() {
        let envelope = EventEnvelope::new(
            WidgetId::from_raw(1),
            EventKey::selection(),
            json!([1, 2, 3]),
        );
        assert!(envelope.decode_state().is_none());

        let ok = EventEnvelope::new(
            WidgetId::from_raw(1),
            EventKey::selection(),
            json!({ "selection": false }),
        );
        assert_eq!(ok.decode_state().unwrap().selection, Some(false));
    }
}
