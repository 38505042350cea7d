#![forbid(unsafe_code)]

//! Core: identifiers, style bits, event keys, geometry, and errors.
//!
//! Everything in this crate is plain data shared by the snapshot model,
//! the sync pipeline, the event channel, and the widget layer. It has no
//! opinion about backends or threading; those live in `rwt-widgets`.

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod style;

pub use config::{BackendKind, SessionConfig};
pub use error::{Error, Result};
pub use event::{EventCategory, EventKey, EventName, EventState};
pub use geometry::{Point, Rect, Size};
pub use id::{HandleId, ResourceId, WidgetId, WidgetKind};
pub use style::Style;
