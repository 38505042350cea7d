#![forbid(unsafe_code)]

//! One snapshot type per widget kind.
//!
//! The wire object for a widget contains only fields that differ from the
//! kind's defaults; everything at its default is skipped during
//! serialization. Shared resources are excluded from the derive and
//! encoded separately by the serializer so their ids can be reused.

use serde::Serialize;

use rwt_core::geometry::Rect;
use rwt_core::id::{WidgetId, WidgetKind};
use rwt_core::style::Style;

use crate::resource::Resource;

fn is_true(value: &bool) -> bool {
    *value
}

/// State common to every control, flattened into each kind's wire object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlValue {
    /// Stable widget identity.
    pub id: WidgetId,
    /// Construction-time style bits.
    pub style: Style,
    /// Bounds within the parent, when explicitly set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Whether the control accepts input. Defaults to `true`.
    #[serde(skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// Whether the control is shown. Defaults to `true`.
    #[serde(skip_serializing_if = "is_true")]
    pub visible: bool,
    /// Hover tool tip text.
    #[serde(rename = "toolTip", skip_serializing_if = "Option::is_none")]
    pub tool_tip: Option<String>,
    /// Font resource; encoded by the serializer, not the derive.
    #[serde(skip)]
    pub font: Option<Resource>,
}

impl ControlValue {
    /// Fresh control state for a new widget.
    pub fn new(id: WidgetId, style: Style) -> Self {
        Self {
            id,
            style,
            bounds: None,
            enabled: true,
            visible: true,
            tool_tip: None,
            font: None,
        }
    }
}

/// Horizontal alignment of label content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Leading edge.
    Left,
    /// Centered.
    Center,
    /// Trailing edge.
    Right,
}

/// A text selection as half-open character offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SelectionRange {
    /// Selection start offset.
    pub start: i32,
    /// Selection end offset.
    pub end: i32,
}

impl SelectionRange {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Snapshot of a button.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ButtonValue {
    /// Common control state.
    #[serde(flatten)]
    pub control: ControlValue,
    /// Button label.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Check/radio/toggle selection state.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selection: bool,
    /// Button image; encoded by the serializer.
    #[serde(skip)]
    pub image: Option<Resource>,
}

/// Snapshot of a label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelValue {
    /// Common control state.
    #[serde(flatten)]
    pub control: ControlValue,
    /// Label text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Content alignment, when explicitly set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    /// Label image; encoded by the serializer.
    #[serde(skip)]
    pub image: Option<Resource>,
}

/// Snapshot of a text entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextValue {
    /// Common control state.
    #[serde(flatten)]
    pub control: ControlValue,
    /// Current content.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Current selection.
    #[serde(skip_serializing_if = "SelectionRange::is_default")]
    pub selection: SelectionRange,
    /// Whether the user may edit the content. Defaults to `true`.
    #[serde(skip_serializing_if = "is_true")]
    pub editable: bool,
    /// Maximum content length, when limited.
    #[serde(rename = "textLimit", skip_serializing_if = "Option::is_none")]
    pub text_limit: Option<i32>,
}

/// Snapshot of a composite container.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositeValue {
    /// Common control state.
    #[serde(flatten)]
    pub control: ControlValue,
    /// Child widget ids in z-order. The serializer nests child payloads
    /// here when parent and child flush in the same batch.
    #[serde(skip)]
    pub children: Vec<WidgetId>,
}

/// A widget snapshot, one variant per kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Composite container snapshot.
    Composite(CompositeValue),
    /// Button snapshot.
    Button(ButtonValue),
    /// Label snapshot.
    Label(LabelValue),
    /// Text entry snapshot.
    Text(TextValue),
}

impl Value {
    /// Fresh snapshot for a newly constructed widget.
    pub fn new(kind: WidgetKind, id: WidgetId, style: Style) -> Self {
        let control = ControlValue::new(id, style);
        match kind {
            WidgetKind::Composite => Value::Composite(CompositeValue {
                control,
                children: Vec::new(),
            }),
            WidgetKind::Button => Value::Button(ButtonValue {
                control,
                text: String::new(),
                selection: false,
                image: None,
            }),
            WidgetKind::Label => Value::Label(LabelValue {
                control,
                text: String::new(),
                alignment: None,
                image: None,
            }),
            WidgetKind::Text => Value::Text(TextValue {
                control,
                text: String::new(),
                selection: SelectionRange::default(),
                editable: true,
                text_limit: None,
            }),
        }
    }

    /// The snapshot's widget kind.
    pub fn kind(&self) -> WidgetKind {
        match self {
            Value::Composite(_) => WidgetKind::Composite,
            Value::Button(_) => WidgetKind::Button,
            Value::Label(_) => WidgetKind::Label,
            Value::Text(_) => WidgetKind::Text,
        }
    }

    /// The widget id this snapshot belongs to.
    pub fn id(&self) -> WidgetId {
        self.control().id
    }

    /// Shared access to the common control state.
    pub fn control(&self) -> &ControlValue {
        match self {
            Value::Composite(v) => &v.control,
            Value::Button(v) => &v.control,
            Value::Label(v) => &v.control,
            Value::Text(v) => &v.control,
        }
    }

    /// Mutable access to the common control state.
    pub fn control_mut(&mut self) -> &mut ControlValue {
        match self {
            Value::Composite(v) => &mut v.control,
            Value::Button(v) => &mut v.control,
            Value::Label(v) => &mut v.control,
            Value::Text(v) => &mut v.control,
        }
    }

    /// Resource-valued fields, as `(wire field name, resource)` pairs.
    ///
    /// The serializer walks this list to apply its identifier-reuse table;
    /// these fields are skipped by the serde derive.
    pub fn resources(&self) -> Vec<(&'static str, &Resource)> {
        let mut out = Vec::new();
        if let Some(font) = &self.control().font {
            out.push(("font", font));
        }
        match self {
            Value::Button(v) => {
                if let Some(image) = &v.image {
                    out.push(("image", image));
                }
            }
            Value::Label(v) => {
                if let Some(image) = &v.image {
                    out.push(("image", image));
                }
            }
            Value::Composite(_) | Value::Text(_) => {}
        }
        out
    }

    /// Child ids for composites, `None` for leaf kinds.
    pub fn children(&self) -> Option<&[WidgetId]> {
        match self {
            Value::Composite(v) => Some(&v.children),
            _ => None,
        }
    }

    /// The button snapshot, if this is a button.
    pub fn as_button(&self) -> Option<&ButtonValue> {
        match self {
            Value::Button(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable button snapshot, if this is a button.
    pub fn as_button_mut(&mut self) -> Option<&mut ButtonValue> {
        match self {
            Value::Button(v) => Some(v),
            _ => None,
        }
    }

    /// The label snapshot, if this is a label.
    pub fn as_label(&self) -> Option<&LabelValue> {
        match self {
            Value::Label(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable label snapshot, if this is a label.
    pub fn as_label_mut(&mut self) -> Option<&mut LabelValue> {
        match self {
            Value::Label(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable text snapshot, if this is a text entry.
    pub fn as_text_mut(&mut self) -> Option<&mut TextValue> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The text snapshot, if this is a text entry.
    pub fn as_text(&self) -> Option<&TextValue> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable composite snapshot, if this is a composite.
    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeValue> {
        match self {
            Value::Composite(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(id: u64) -> Value {
        Value::new(WidgetKind::Button, WidgetId::from_raw(id), Style::PUSH)
    }

    #[test]
    fn fresh_value_carries_identity() {
        let v = button(3);
        assert_eq!(v.id(), WidgetId::from_raw(3));
        assert_eq!(v.kind(), WidgetKind::Button);
        assert_eq!(v.control().style, Style::PUSH);
    }

    #[test]
    fn default_fields_are_omitted_from_wire_object() {
        let json = serde_json::to_value(&button(1)).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json.get("text").is_none(), "empty text must be skipped");
        assert!(json.get("enabled").is_none(), "default enabled must be skipped");
        assert!(json.get("selection").is_none());
        assert!(json.get("bounds").is_none());
    }

    #[test]
    fn changed_fields_appear_on_the_wire() {
        let mut v = button(1);
        {
            let b = v.as_button_mut().unwrap();
            b.text = "OK".into();
            b.selection = true;
            b.control.enabled = false;
        }
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["text"], "OK");
        assert_eq!(json["selection"], true);
        assert_eq!(json["enabled"], false);
    }

    #[test]
    fn resources_lists_image_and_font() {
        use crate::resource::{FontSpec, Image};
        use rwt_core::id::ResourceId;
        use std::rc::Rc;

        let mut v = button(1);
        assert!(v.resources().is_empty());
        v.control_mut().font = Some(Resource::Font(Rc::new(FontSpec::new(
            ResourceId::from_raw(1),
            "Sans",
            10,
        ))));
        v.as_button_mut().unwrap().image = Some(Resource::Image(Rc::new(Image::new(
            ResourceId::from_raw(2),
            4,
            4,
            Vec::new(),
        ))));
        let fields: Vec<&str> = v.resources().iter().map(|(name, _)| *name).collect();
        assert_eq!(fields, vec!["font", "image"]);
    }

    #[test]
    fn composite_children_do_not_serialize_directly() {
        let mut v = Value::new(WidgetKind::Composite, WidgetId::from_raw(5), Style::empty());
        v.as_composite_mut()
            .unwrap()
            .children
            .push(WidgetId::from_raw(6));
        let json = serde_json::to_value(&v).unwrap();
        assert!(json.get("children").is_none());
    }
}
