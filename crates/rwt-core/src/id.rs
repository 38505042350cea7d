#![forbid(unsafe_code)]

//! Stable identifiers for widgets, resources, and native handles.
//!
//! A [`WidgetId`] is assigned once at construction and never changes for
//! the widget's lifetime. The remote renderer addresses widgets by this id,
//! so it must remain stable across flushes and event deliveries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a logical widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Wrap a raw id received from the wire.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id as it appears on the wire.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a shared resource (image, font) referenced from snapshots.
///
/// The serializer uses this id for its reuse table: the first snapshot to
/// mention a resource carries the full encoding, later ones carry only the
/// id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Wrap a raw resource id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle issued by the native host for native-backed widgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    /// Wrap a raw handle value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// The widget kinds the toolkit knows how to synchronize.
///
/// The kind names double as the first segment of outbound wire topics
/// (`Button/42`), so `Display` must match what the remote renderer expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    /// A container that holds child controls.
    Composite,
    /// A push, check, radio, or toggle button.
    Button,
    /// A non-interactive text or image label.
    Label,
    /// A single- or multi-line text entry.
    Text,
}

impl WidgetKind {
    /// All kinds, in a fixed order (used by config override parsing).
    pub const ALL: [WidgetKind; 4] = [
        WidgetKind::Composite,
        WidgetKind::Button,
        WidgetKind::Label,
        WidgetKind::Text,
    ];

    /// Wire name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            WidgetKind::Composite => "Composite",
            WidgetKind::Button => "Button",
            WidgetKind::Label => "Label",
            WidgetKind::Text => "Text",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_id_roundtrips_raw() {
        let id = WidgetId::from_raw(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn widget_id_serializes_transparently() {
        let id = WidgetId::from_raw(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: WidgetId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn kind_names_match_wire_topics() {
        assert_eq!(WidgetKind::Button.to_string(), "Button");
        assert_eq!(WidgetKind::Composite.name(), "Composite");
    }
}
