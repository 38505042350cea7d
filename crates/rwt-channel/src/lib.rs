#![forbid(unsafe_code)]

//! Inbound event bridging.
//!
//! The transport thread receives interaction events from the remote
//! renderer and posts them through the [`UiChannel`]; the UI thread
//! pumps the [`Dispatcher`], which resolves targets, decodes parameters,
//! and fires listeners. The channel hop is the marshaling boundary:
//! widget state is only ever touched after it.

pub mod channel;
pub mod dispatcher;
pub mod envelope;

pub use channel::{LiveIds, UiChannel, UiReceiver, UiTask};
pub use dispatcher::{DispatchState, DispatchStats, Dispatcher, ListenerId, UiEvent};
pub use envelope::EventEnvelope;
