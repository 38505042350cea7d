#![forbid(unsafe_code)]

//! Widget API surface: the identity registry, the UI session, the
//! backend delegate abstraction, and the widget kinds.
//!
//! Widgets are thin wrappers over a shared core. An application builds a
//! tree under a [`Session`], mutates it through typed setters, and calls
//! [`Session::flush`] to push accumulated changes to the remote renderer
//! (or sees them applied synchronously on the native backend). Inbound
//! interaction events arrive through the session's channel and are
//! delivered by [`Session::pump`].

pub mod button;
pub mod composite;
pub mod delegate;
pub mod label;
pub mod registry;
pub mod session;
pub mod text;
pub mod widget;

pub use button::Button;
pub use composite::Composite;
pub use delegate::{Delegate, MockHost, NativeDelegate, NativeHost, PropValue, RemoteDelegate};
pub use label::Label;
pub use registry::{Registry, RegistryStats};
pub use session::Session;
pub use text::Text;
pub use widget::{Control, WidgetCore};
