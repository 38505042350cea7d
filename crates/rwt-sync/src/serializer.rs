#![forbid(unsafe_code)]

//! Snapshot serialization with resource id reuse.
//!
//! A serializer instance lives as long as its remote peer's view of the
//! world: the first snapshot to reference a shared resource carries the
//! full encoding, every later reference (any widget, any flush) encodes
//! as `{"$ref": id}`. Foreign resources the remote renderer cannot map
//! degrade to `null` instead of failing the batch.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Value as Json, json};

use rwt_core::id::ResourceId;
use rwt_values::resource::Resource;
use rwt_values::value::Value;

/// Error produced when a snapshot cannot be converted to JSON.
#[derive(Debug)]
pub struct SerializeError(serde_json::Error);

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot serialization failed: {}", self.0)
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Converts snapshots into wire JSON, reusing resource ids.
#[derive(Debug, Default)]
pub struct Serializer {
    seen: HashSet<ResourceId>,
}

impl Serializer {
    /// Create a serializer with an empty reuse table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a resource has already been emitted in full.
    pub fn known(&self, id: ResourceId) -> bool {
        self.seen.contains(&id)
    }

    /// Forget all emitted resources (e.g. after a renderer restart).
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Encode one snapshot into its wire object.
    ///
    /// Fields at their defaults are absent; resource fields are attached
    /// here rather than by the derive so the reuse table applies.
    pub fn serialize(&mut self, value: &Value) -> Result<Json, SerializeError> {
        let mut json = serde_json::to_value(value).map_err(SerializeError)?;
        for (field, resource) in value.resources() {
            let encoded = self.encode_resource(resource)?;
            if let Json::Object(obj) = &mut json {
                obj.insert(field.to_owned(), encoded);
            }
        }
        Ok(json)
    }

    fn encode_resource(&mut self, resource: &Resource) -> Result<Json, SerializeError> {
        let id = resource.id();
        match resource {
            Resource::Foreign(foreign) => {
                // Degrade locally instead of failing every other widget
                // in the batch.
                tracing::warn!(
                    resource_id = id.as_u64(),
                    origin = %foreign.origin,
                    "foreign resource cannot be encoded; sending null"
                );
                Ok(Json::Null)
            }
            Resource::Image(image) if self.seen.insert(id) => {
                let mut json = serde_json::to_value(&**image).map_err(SerializeError)?;
                if let Json::Object(obj) = &mut json {
                    obj.insert("kind".to_owned(), json!("image"));
                }
                Ok(json)
            }
            Resource::Font(font) if self.seen.insert(id) => {
                let mut json = serde_json::to_value(&**font).map_err(SerializeError)?;
                if let Json::Object(obj) = &mut json {
                    obj.insert("kind".to_owned(), json!("font"));
                }
                Ok(json)
            }
            _ => Ok(json!({ "$ref": id.as_u64() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use rwt_core::id::{WidgetId, WidgetKind};
    use rwt_core::style::Style;
    use rwt_values::resource::{FontSpec, ForeignResource, Image};

    fn button_with_image(widget_id: u64, image: &Resource) -> Value {
        let mut v = Value::new(WidgetKind::Button, WidgetId::from_raw(widget_id), Style::PUSH);
        v.as_button_mut().unwrap().image = Some(image.clone());
        v
    }

    fn image(id: u64) -> Resource {
        Resource::Image(Rc::new(Image::new(
            ResourceId::from_raw(id),
            8,
            8,
            vec![0xAB],
        )))
    }

    #[test]
    fn shared_resource_is_encoded_once() {
        let shared = image(7);
        let mut serializer = Serializer::new();

        let first = serializer
            .serialize(&button_with_image(1, &shared))
            .unwrap();
        let second = serializer
            .serialize(&button_with_image(2, &shared))
            .unwrap();

        assert_eq!(first["image"]["id"], 7);
        assert_eq!(first["image"]["kind"], "image");
        assert_eq!(second["image"], json!({ "$ref": 7 }));
        assert!(serializer.known(ResourceId::from_raw(7)));
    }

    #[test]
    fn reuse_table_survives_across_batches() {
        let shared = image(3);
        let mut serializer = Serializer::new();

        let _ = serializer.serialize(&button_with_image(1, &shared)).unwrap();
        // Later flush, same serializer: still a reference.
        let again = serializer.serialize(&button_with_image(1, &shared)).unwrap();
        assert_eq!(again["image"], json!({ "$ref": 3 }));

        serializer.reset();
        let fresh = serializer.serialize(&button_with_image(1, &shared)).unwrap();
        assert_eq!(fresh["image"]["id"], 3);
    }

    #[test]
    fn foreign_resource_degrades_to_null() {
        let foreign = Resource::Foreign(Rc::new(ForeignResource {
            id: ResourceId::from_raw(9),
            origin: "platform-icon".into(),
        }));
        let mut serializer = Serializer::new();
        let json = serializer.serialize(&button_with_image(1, &foreign)).unwrap();
        assert_eq!(json["image"], Json::Null);
        // A null never occupies the reuse table.
        assert!(!serializer.known(ResourceId::from_raw(9)));
    }

    #[test]
    fn fonts_share_the_same_reuse_table() {
        let font = Resource::Font(Rc::new(FontSpec::new(ResourceId::from_raw(4), "Sans", 12)));
        let mut v = Value::new(WidgetKind::Label, WidgetId::from_raw(1), Style::empty());
        v.control_mut().font = Some(font.clone());

        let mut serializer = Serializer::new();
        let first = serializer.serialize(&v).unwrap();
        let second = serializer.serialize(&v).unwrap();
        assert_eq!(first["font"]["name"], "Sans");
        assert_eq!(first["font"]["kind"], "font");
        assert_eq!(second["font"], json!({ "$ref": 4 }));
    }
}
