#![forbid(unsafe_code)]

//! Push, check, radio, and toggle buttons.

use std::rc::Rc;

use rwt_channel::{ListenerId, UiEvent};
use rwt_core::error::{Error, Result};
use rwt_core::event::EventKey;
use rwt_core::id::WidgetKind;
use rwt_core::style::Style;
use rwt_values::resource::Resource;

use crate::composite::Composite;
use crate::delegate::PropValue;
use crate::widget::{Control, WidgetCore};

/// A button in one of four behaviors, chosen by style bit.
///
/// Exactly one of `PUSH`, `CHECK`, `RADIO`, `TOGGLE` is kept; the
/// constructor normalizes the rest away, defaulting to `PUSH`.
#[derive(Clone, Debug)]
pub struct Button {
    core: Rc<WidgetCore>,
}

impl Button {
    const KINDS: &[Style] = &[Style::PUSH, Style::CHECK, Style::RADIO, Style::TOGGLE];

    /// Create a button under `parent`.
    pub fn new(parent: &Composite, style: Style) -> Result<Button> {
        let style = style.normalize_exclusive(Self::KINDS, Style::PUSH);
        let core = WidgetCore::new_child(parent.core(), WidgetKind::Button, style)?;
        Ok(Button { core })
    }

    /// Set the button label.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let text = text.to_owned();
        self.core.write(
            "text",
            || PropValue::Str(text.clone()),
            |v| {
                if let Some(button) = v.as_button_mut() {
                    button.text = text.clone();
                }
            },
        )
    }

    /// The button label.
    pub fn text(&self) -> Result<String> {
        self.core.read(
            "text",
            |p| p.into_string().unwrap_or_default(),
            |v| v.as_button().map(|b| b.text.clone()).unwrap_or_default(),
        )
    }

    /// Set the check/radio/toggle selection state.
    pub fn set_selection(&self, selected: bool) -> Result<()> {
        self.core.write(
            "selection",
            || PropValue::Bool(selected),
            |v| {
                if let Some(button) = v.as_button_mut() {
                    button.selection = selected;
                }
            },
        )
    }

    /// Current selection state.
    pub fn selection(&self) -> Result<bool> {
        self.core.read(
            "selection",
            |p| p.as_bool().unwrap_or(false),
            |v| v.as_button().is_some_and(|b| b.selection),
        )
    }

    /// Set or clear the button image. Fonts are not images.
    pub fn set_image(&self, image: Option<Resource>) -> Result<()> {
        if let Some(resource) = &image {
            if matches!(resource, Resource::Font(_)) {
                return Err(Error::InvalidArgument(format!(
                    "resource {} is a font, not an image",
                    resource.id()
                )));
            }
        }
        self.core.write(
            "image",
            || {
                image
                    .as_ref()
                    .map_or(PropValue::Null, |r| PropValue::Int(r.id().as_u64() as i64))
            },
            |v| {
                if let Some(button) = v.as_button_mut() {
                    button.image = image.clone();
                }
            },
        )
    }

    /// Listen for primary selection (activation).
    pub fn add_selection_listener(
        &self,
        listener: impl FnMut(&UiEvent) + 'static,
    ) -> Result<ListenerId> {
        self.add_listener(EventKey::selection(), listener)
    }

    /// Listen for default selection (double activation / enter).
    pub fn add_default_selection_listener(
        &self,
        listener: impl FnMut(&UiEvent) + 'static,
    ) -> Result<ListenerId> {
        self.add_listener(EventKey::default_selection(), listener)
    }
}

impl Control for Button {
    fn core(&self) -> &Rc<WidgetCore> {
        &self.core
    }
}
