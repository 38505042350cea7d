#![forbid(unsafe_code)]

//! Container widget.

use std::rc::Rc;

use rwt_core::error::Result;
use rwt_core::id::{WidgetId, WidgetKind};
use rwt_core::style::Style;

use crate::session::Session;
use crate::widget::{Control, WidgetCore};

/// A container that holds child controls.
///
/// Children hold only a weak back-reference; the composite owns them and
/// disposes them transitively.
#[derive(Clone, Debug)]
pub struct Composite {
    core: Rc<WidgetCore>,
}

impl Composite {
    /// Create a root composite; its backend comes from the session
    /// configuration and every descendant inherits it.
    pub fn new_root(session: &Session, style: Style) -> Result<Composite> {
        let core = WidgetCore::new_root(session.inner(), WidgetKind::Composite, style)?;
        Ok(Composite { core })
    }

    /// Create a nested composite under `parent`.
    pub fn new(parent: &Composite, style: Style) -> Result<Composite> {
        let core = WidgetCore::new_child(parent.core(), WidgetKind::Composite, style)?;
        Ok(Composite { core })
    }

    /// Ids of current children, in z-order.
    pub fn children(&self) -> Vec<WidgetId> {
        self.core.child_ids()
    }

    /// Number of current children.
    pub fn child_count(&self) -> usize {
        self.core.child_ids().len()
    }
}

impl Control for Composite {
    fn core(&self) -> &Rc<WidgetCore> {
        &self.core
    }
}
