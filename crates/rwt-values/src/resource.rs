#![forbid(unsafe_code)]

//! Shared resources referenced from snapshots.
//!
//! Resources (images, fonts) are reference-counted and may be reachable
//! from several widgets at once. The serializer encodes each resource at
//! most once per serializer instance and refers to it by id thereafter,
//! so sharing on the heap becomes sharing on the wire.

use std::rc::Rc;

use serde::Serialize;

use rwt_core::id::ResourceId;

/// Raw image data plus dimensions.
///
/// Decoding and format handling happen outside the toolkit; the sync core
/// only moves the bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Stable resource id.
    pub id: ResourceId,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Encoded pixel data, base64 on the wire.
    #[serde(serialize_with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

impl Image {
    /// Create an image resource.
    pub fn new(id: ResourceId, width: i32, height: i32, data: Vec<u8>) -> Self {
        Self {
            id,
            width,
            height,
            data,
        }
    }
}

/// A font description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FontSpec {
    /// Stable resource id.
    pub id: ResourceId,
    /// Face name.
    pub name: String,
    /// Height in points.
    pub height: i32,
    /// Bold face.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    /// Italic face.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
}

impl FontSpec {
    /// Create a plain font spec.
    pub fn new(id: ResourceId, name: impl Into<String>, height: i32) -> Self {
        Self {
            id,
            name: name.into(),
            height,
            bold: false,
            italic: false,
        }
    }
}

/// A resource the toolkit cannot map onto the remote renderer.
///
/// Platform-private handles end up here. They keep their identity so the
/// widget layer can still pass them around, but the serializer degrades
/// them to `null` on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignResource {
    /// Stable resource id.
    pub id: ResourceId,
    /// Free-form description of where the resource came from, for
    /// diagnostics only.
    pub origin: String,
}

/// A shared, reference-counted resource.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    /// An image.
    Image(Rc<Image>),
    /// A font.
    Font(Rc<FontSpec>),
    /// An unmapped platform resource; serializes to `null`.
    Foreign(Rc<ForeignResource>),
}

impl Resource {
    /// The resource's stable id.
    pub fn id(&self) -> ResourceId {
        match self {
            Resource::Image(image) => image.id,
            Resource::Font(font) => font.id,
            Resource::Foreign(foreign) => foreign.id,
        }
    }

    /// Kind name used in wire objects and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Image(_) => "image",
            Resource::Font(_) => "font",
            Resource::Foreign(_) => "foreign",
        }
    }
}

fn base64_bytes<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use base64::Engine as _;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_data_encodes_as_base64() {
        let image = Image::new(ResourceId::from_raw(1), 2, 2, vec![1, 2, 3]);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["data"], "AQID");
    }

    #[test]
    fn empty_image_data_is_omitted() {
        let image = Image::new(ResourceId::from_raw(1), 2, 2, Vec::new());
        let json = serde_json::to_value(&image).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn font_flags_are_omitted_when_plain() {
        let font = FontSpec::new(ResourceId::from_raw(2), "Mono", 11);
        let json = serde_json::to_value(&font).unwrap();
        assert!(json.get("bold").is_none());
        assert!(json.get("italic").is_none());
    }

    #[test]
    fn resource_id_is_uniform_across_kinds() {
        let id = ResourceId::from_raw(9);
        let image = Resource::Image(Rc::new(Image::new(id, 1, 1, Vec::new())));
        let font = Resource::Font(Rc::new(FontSpec::new(id, "Sans", 10)));
        assert_eq!(image.id(), id);
        assert_eq!(font.id(), id);
        assert_eq!(image.kind(), "image");
    }
}
