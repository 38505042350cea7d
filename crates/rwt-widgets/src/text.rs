#![forbid(unsafe_code)]

//! Single- and multi-line text entry.

use std::rc::Rc;

use rwt_channel::{ListenerId, UiEvent};
use rwt_core::error::{Error, Result};
use rwt_core::event::EventKey;
use rwt_core::id::WidgetKind;
use rwt_core::style::Style;
use rwt_values::value::SelectionRange;

use crate::composite::Composite;
use crate::delegate::PropValue;
use crate::widget::{Control, WidgetCore};

/// An editable text entry.
///
/// Exactly one of `SINGLE`, `MULTI` is kept, defaulting to `SINGLE`.
/// `READ_ONLY` at construction makes the content non-editable from the
/// start.
#[derive(Clone, Debug)]
pub struct Text {
    core: Rc<WidgetCore>,
}

impl Text {
    const KINDS: &[Style] = &[Style::SINGLE, Style::MULTI];

    /// Create a text entry under `parent`.
    pub fn new(parent: &Composite, style: Style) -> Result<Text> {
        let style = style.normalize_exclusive(Self::KINDS, Style::SINGLE);
        let core = WidgetCore::new_child(parent.core(), WidgetKind::Text, style)?;
        let text = Text { core };
        if style.contains(Style::READ_ONLY) {
            text.set_editable(false)?;
        }
        Ok(text)
    }

    /// Replace the content. Content longer than the text limit is
    /// truncated; the selection collapses to the start.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let limited = self.limit_text(text)?;
        self.core.write(
            "text",
            || PropValue::Str(limited.clone()),
            |v| {
                if let Some(entry) = v.as_text_mut() {
                    entry.text = limited.clone();
                    entry.selection = SelectionRange::default();
                }
            },
        )
    }

    /// The current content.
    pub fn text(&self) -> Result<String> {
        self.core.read(
            "text",
            |p| p.into_string().unwrap_or_default(),
            |v| v.as_text().map(|t| t.text.clone()).unwrap_or_default(),
        )
    }

    /// Append to the content, honoring the text limit.
    pub fn append(&self, suffix: &str) -> Result<()> {
        let mut combined = self.text()?;
        combined.push_str(suffix);
        let limited = self.limit_text(&combined)?;
        self.core.write(
            "text",
            || PropValue::Str(limited.clone()),
            |v| {
                if let Some(entry) = v.as_text_mut() {
                    entry.text = limited.clone();
                }
            },
        )
    }

    /// Set the selection as half-open character offsets.
    pub fn set_selection(&self, selection: SelectionRange) -> Result<()> {
        if selection.start < 0 || selection.end < selection.start {
            return Err(Error::InvalidArgument(format!(
                "selection {}..{}",
                selection.start, selection.end
            )));
        }
        self.core.write(
            "selection",
            || {
                PropValue::Point(rwt_core::geometry::Point::new(
                    selection.start,
                    selection.end,
                ))
            },
            |v| {
                if let Some(entry) = v.as_text_mut() {
                    entry.selection = selection;
                }
            },
        )
    }

    /// Allow or forbid user edits.
    pub fn set_editable(&self, editable: bool) -> Result<()> {
        self.core.write(
            "editable",
            || PropValue::Bool(editable),
            |v| {
                if let Some(entry) = v.as_text_mut() {
                    entry.editable = editable;
                }
            },
        )
    }

    /// Whether the user may edit the content.
    pub fn is_editable(&self) -> Result<bool> {
        self.core.read(
            "editable",
            |p| p.as_bool().unwrap_or(true),
            |v| v.as_text().map(|t| t.editable).unwrap_or(true),
        )
    }

    /// Cap the content length in characters. Must be positive.
    pub fn set_text_limit(&self, limit: i32) -> Result<()> {
        if limit <= 0 {
            return Err(Error::InvalidArgument(format!("text limit {limit}")));
        }
        self.core.write(
            "textLimit",
            || PropValue::Int(limit as i64),
            |v| {
                if let Some(entry) = v.as_text_mut() {
                    entry.text_limit = Some(limit);
                }
            },
        )
    }

    /// Listen for content modifications.
    pub fn add_modify_listener(
        &self,
        listener: impl FnMut(&UiEvent) + 'static,
    ) -> Result<ListenerId> {
        self.add_listener(EventKey::modified(), listener)
    }

    fn limit_text(&self, text: &str) -> Result<String> {
        let limit = self.core.read(
            "textLimit",
            |p| p.as_int().map(|i| i as usize),
            |v| v.as_text().and_then(|t| t.text_limit).map(|l| l as usize),
        )?;
        Ok(match limit {
            Some(limit) if text.chars().count() > limit => text.chars().take(limit).collect(),
            _ => text.to_owned(),
        })
    }
}

impl Control for Text {
    fn core(&self) -> &Rc<WidgetCore> {
        &self.core
    }
}
