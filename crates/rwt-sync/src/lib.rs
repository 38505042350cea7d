#![forbid(unsafe_code)]

//! Outbound synchronization: dirty tracking, serialization, and flushing.
//!
//! Mutations stage their changes in the [`ChangeQueue`]; a flush drains
//! the queue atomically, serializes each pending snapshot (reusing ids
//! for shared resources), and hands the wire payloads to the
//! [`Transport`]. Nothing here blocks on I/O; the transport's own
//! delivery policy is out of scope.

pub mod bridge;
pub mod queue;
pub mod serializer;

pub use bridge::{MemoryTransport, RemoteBridge, Transport};
pub use queue::ChangeQueue;
pub use serializer::{SerializeError, Serializer};
