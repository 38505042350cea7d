#![forbid(unsafe_code)]

//! Typed event keys and decoded event parameters.
//!
//! An inbound interaction is addressed by `(widget id, category, name)`.
//! The category/name pair is a normalized key rather than a free-form
//! string, so the dispatcher's routing table stays type-checkable; the
//! wire form `category/name` round-trips through `Display`/`FromStr`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Listener family an event belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Selection-style interactions (clicks, activations).
    Selection,
    /// Control geometry changes (move, resize).
    Control,
    /// Text content modifications.
    Modify,
    /// Backend-specific category not modeled by the toolkit.
    Custom(String),
}

impl EventCategory {
    /// Parse the wire form; unknown strings become [`EventCategory::Custom`].
    pub fn from_wire(s: &str) -> Self {
        match s {
            "Selection" => EventCategory::Selection,
            "Control" => EventCategory::Control,
            "Modify" => EventCategory::Modify,
            other => EventCategory::Custom(other.to_owned()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            EventCategory::Selection => "Selection",
            EventCategory::Control => "Control",
            EventCategory::Modify => "Modify",
            EventCategory::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

/// Specific event within a category.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Primary selection (single activation).
    Selection,
    /// Default selection (double activation / enter).
    DefaultSelection,
    /// The control moved.
    Move,
    /// The control was resized.
    Resize,
    /// The text content changed.
    Modify,
    /// Backend-specific event name.
    Custom(String),
}

impl EventName {
    /// Parse the wire form; unknown strings become [`EventName::Custom`].
    pub fn from_wire(s: &str) -> Self {
        match s {
            "Selection" => EventName::Selection,
            "DefaultSelection" => EventName::DefaultSelection,
            "Move" => EventName::Move,
            "Resize" => EventName::Resize,
            "Modify" => EventName::Modify,
            other => EventName::Custom(other.to_owned()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            EventName::Selection => "Selection",
            EventName::DefaultSelection => "DefaultSelection",
            EventName::Move => "Move",
            EventName::Resize => "Resize",
            EventName::Modify => "Modify",
            EventName::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_wire(s))
    }
}

/// Normalized `(category, name)` routing key, scoped under a widget id by
/// the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventKey {
    /// Listener family.
    pub category: EventCategory,
    /// Event name within the family.
    pub name: EventName,
}

impl EventKey {
    /// Build a key from its parts.
    pub const fn new(category: EventCategory, name: EventName) -> Self {
        Self { category, name }
    }

    /// `Selection/Selection`.
    pub fn selection() -> Self {
        Self::new(EventCategory::Selection, EventName::Selection)
    }

    /// `Selection/DefaultSelection`.
    pub fn default_selection() -> Self {
        Self::new(EventCategory::Selection, EventName::DefaultSelection)
    }

    /// `Control/Move`.
    pub fn moved() -> Self {
        Self::new(EventCategory::Control, EventName::Move)
    }

    /// `Control/Resize`.
    pub fn resized() -> Self {
        Self::new(EventCategory::Control, EventName::Resize)
    }

    /// `Modify/Modify`.
    pub fn modified() -> Self {
        Self::new(EventCategory::Modify, EventName::Modify)
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Error returned when a wire key does not have the `category/name` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventKeyError(pub String);

impl fmt::Display for ParseEventKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed event key: {:?}", self.0)
    }
}

impl std::error::Error for ParseEventKeyError {}

impl FromStr for EventKey {
    type Err = ParseEventKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, name) = s
            .split_once('/')
            .ok_or_else(|| ParseEventKeyError(s.to_owned()))?;
        if category.is_empty() || name.is_empty() || name.contains('/') {
            return Err(ParseEventKeyError(s.to_owned()));
        }
        Ok(EventKey {
            category: EventCategory::from_wire(category),
            name: EventName::from_wire(name),
        })
    }
}

/// Decoded event parameters.
///
/// Inbound payloads are flat parameter shapes, never full snapshot graphs.
/// Every field is optional; events carry only what the interaction
/// produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventState {
    /// New selection state for selection events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<bool>,
    /// New text for modify events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New bounds for move/resize events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    /// Pointer location, when the interaction had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
    /// Backend-specific detail code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_matches_wire_form() {
        assert_eq!(EventKey::selection().to_string(), "Selection/Selection");
        assert_eq!(EventKey::moved().to_string(), "Control/Move");
    }

    #[test]
    fn key_roundtrips_from_str() {
        for key in [
            EventKey::selection(),
            EventKey::default_selection(),
            EventKey::moved(),
            EventKey::resized(),
            EventKey::modified(),
        ] {
            let parsed: EventKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn unknown_parts_become_custom() {
        let key: EventKey = "Paint/Damage".parse().unwrap();
        assert_eq!(key.category, EventCategory::Custom("Paint".into()));
        assert_eq!(key.name, EventName::Custom("Damage".into()));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!("Selection".parse::<EventKey>().is_err());
        assert!("/Selection".parse::<EventKey>().is_err());
        assert!("Selection/".parse::<EventKey>().is_err());
        assert!("a/b/c".parse::<EventKey>().is_err());
    }

    #[test]
    fn event_state_tolerates_missing_fields() {
        let state: EventState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, EventState::default());
    }

    #[test]
    fn event_state_decodes_selection() {
        let state: EventState = serde_json::from_str(r#"{"selection":true}"#).unwrap();
        assert_eq!(state.selection, Some(true));
        assert!(state.bounds.is_none());
    }
}
