#![forbid(unsafe_code)]

//! Dual-backend widget toolkit with remote state synchronization.
//!
//! Widgets live in a logical tree owned by a [`Session`]. Each widget is
//! realized by one of two backends: a native platform peer addressed by
//! handle, or a remote renderer fed typed state snapshots over a
//! transport. Mutations on the remote backend accumulate in a change
//! queue and go out as one coalesced snapshot per widget on
//! [`Session::flush`]; user interactions come back as event envelopes,
//! are marshaled onto the UI thread, and fire typed listeners during
//! [`Session::pump`].
//!
//! ```no_run
//! use std::rc::Rc;
//! use rwt::prelude::*;
//! use rwt::sync::MemoryTransport;
//! use rwt::widgets::{MockHost, NativeHost};
//!
//! # fn main() -> rwt::core::error::Result<()> {
//! let host: Rc<dyn NativeHost> = Rc::new(MockHost::new());
//! let session = Session::new(
//!     SessionConfig::default(),
//!     host,
//!     Box::new(MemoryTransport::new()),
//! );
//!
//! let shell = Composite::new_root(&session, Style::empty())?;
//! let button = Button::new(&shell, Style::PUSH)?;
//! button.set_text("OK")?;
//! button.add_selection_listener(|_| println!("clicked"))?;
//!
//! session.flush()?; // push snapshots to the renderer
//! session.pump()?;  // deliver any inbound events
//! # Ok(())
//! # }
//! ```

pub use rwt_channel as channel;
pub use rwt_core as core;
pub use rwt_sync as sync;
pub use rwt_values as values;
pub use rwt_widgets as widgets;

pub use rwt_widgets::{Button, Composite, Control, Label, Session, Text};

/// The types most applications need, importable in one line.
pub mod prelude {
    pub use rwt_channel::{UiChannel, UiEvent};
    pub use rwt_core::config::{BackendKind, SessionConfig};
    pub use rwt_core::error::{Error, Result};
    pub use rwt_core::event::{EventKey, EventState};
    pub use rwt_core::geometry::{Point, Rect, Size};
    pub use rwt_core::style::Style;
    pub use rwt_widgets::{Button, Composite, Control, Label, Session, Text};
}
