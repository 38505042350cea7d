#![forbid(unsafe_code)]

//! Non-interactive text or image label.

use std::rc::Rc;

use rwt_core::error::{Error, Result};
use rwt_core::id::WidgetKind;
use rwt_core::style::Style;
use rwt_values::resource::Resource;
use rwt_values::value::Alignment;

use crate::composite::Composite;
use crate::delegate::PropValue;
use crate::widget::{Control, WidgetCore};

/// A label showing static text or an image.
#[derive(Clone, Debug)]
pub struct Label {
    core: Rc<WidgetCore>,
}

impl Label {
    /// Create a label under `parent`.
    pub fn new(parent: &Composite, style: Style) -> Result<Label> {
        let core = WidgetCore::new_child(parent.core(), WidgetKind::Label, style)?;
        Ok(Label { core })
    }

    /// Set the label text.
    pub fn set_text(&self, text: &str) -> Result<()> {
        let text = text.to_owned();
        self.core.write(
            "text",
            || PropValue::Str(text.clone()),
            |v| {
                if let Some(label) = v.as_label_mut() {
                    label.text = text.clone();
                }
            },
        )
    }

    /// The label text.
    pub fn text(&self) -> Result<String> {
        self.core.read(
            "text",
            |p| p.into_string().unwrap_or_default(),
            |v| v.as_label().map(|l| l.text.clone()).unwrap_or_default(),
        )
    }

    /// Set the content alignment.
    pub fn set_alignment(&self, alignment: Alignment) -> Result<()> {
        self.core.write(
            "alignment",
            || {
                PropValue::Str(
                    match alignment {
                        Alignment::Left => "left",
                        Alignment::Center => "center",
                        Alignment::Right => "right",
                    }
                    .to_owned(),
                )
            },
            |v| {
                if let Some(label) = v.as_label_mut() {
                    label.alignment = Some(alignment);
                }
            },
        )
    }

    /// Set or clear the label image. Fonts are not images.
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
                if let Some(label) = v.as_label_mut() {
                    label.image = image.clone();
                }
            },
        )
    }
}

impl Control for Label {
    fn core(&self) -> &Rc<WidgetCore> {
        &self.core
    }
}
