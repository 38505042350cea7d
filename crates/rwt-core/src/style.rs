#![forbid(unsafe_code)]

//! Widget style bits.
//!
//! Styles are chosen at construction and fixed for the widget's lifetime,
//! mirroring the classic toolkit convention of OR-ing style constants into
//! the constructor.

use std::fmt;

use bitflags::bitflags;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Construction-time style bitmask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Style: u32 {
        /// Momentary push button behavior.
        const PUSH = 1 << 0;
        /// Two-state check button behavior.
        const CHECK = 1 << 1;
        /// Mutually-exclusive radio button behavior.
        const RADIO = 1 << 2;
        /// Two-state button that stays pressed.
        const TOGGLE = 1 << 3;
        /// Draw a border around the widget.
        const BORDER = 1 << 4;
        /// Text cannot be edited by the user.
        const READ_ONLY = 1 << 5;
        /// Single-line text entry.
        const SINGLE = 1 << 6;
        /// Multi-line text entry.
        const MULTI = 1 << 7;
        /// Wrap content at the widget edge.
        const WRAP = 1 << 8;
    }
}

impl Style {
    /// Force exactly one of `exclusive` to be set.
    ///
    /// If none of the listed bits is present, `fallback` is added. If more
    /// than one is present, all but the first listed match are cleared.
    /// This mirrors the classic `checkBits` normalization applied by widget
    /// constructors.
    #[must_use]
    pub fn normalize_exclusive(self, exclusive: &[Style], fallback: Style) -> Style {
        let mut chosen = None;
        for &bit in exclusive {
            if self.contains(bit) {
                chosen = Some(bit);
                break;
            }
        }
        let keep = chosen.unwrap_or(fallback);
        let mut out = self;
        for &bit in exclusive {
            out.remove(bit);
        }
        out | keep
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.bits())
    }
}

// Wire form is the raw bit pattern; unknown bits from a newer peer are
// rejected rather than silently dropped.
impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Style::from_bits(bits)
            .ok_or_else(|| D::Error::custom(format!("unknown style bits: {bits:#x}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON_KINDS: &[Style] = &[Style::PUSH, Style::CHECK, Style::RADIO, Style::TOGGLE];

    #[test]
    fn normalize_adds_fallback_when_none_set() {
        let s = Style::BORDER.normalize_exclusive(BUTTON_KINDS, Style::PUSH);
        assert!(s.contains(Style::PUSH));
        assert!(s.contains(Style::BORDER));
    }

    #[test]
    fn normalize_keeps_single_choice() {
        let s = Style::RADIO.normalize_exclusive(BUTTON_KINDS, Style::PUSH);
        assert!(s.contains(Style::RADIO));
        assert!(!s.contains(Style::PUSH));
    }

    #[test]
    fn normalize_clears_extra_choices() {
        let s = (Style::CHECK | Style::TOGGLE).normalize_exclusive(BUTTON_KINDS, Style::PUSH);
        // PUSH is listed first but absent; CHECK wins over TOGGLE.
        assert!(s.contains(Style::CHECK));
        assert!(!s.contains(Style::TOGGLE));
    }

    #[test]
    fn style_serializes_as_bits() {
        let s = Style::RADIO | Style::BORDER;
        let json = serde_json::to_string(&s).unwrap();
        let back: Style = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn unknown_bits_are_rejected() {
        let result: Result<Style, _> = serde_json::from_str("4294967295");
        assert!(result.is_err());
    }
}
