#![forbid(unsafe_code)]

//! Error taxonomy for the toolkit's synchronous API surface.
//!
//! Only argument and lifecycle violations are surfaced to the caller.
//! Timing mismatches that are routine under remote latency (events for
//! widgets that no longer exist, stale builders) are absorbed by the
//! dispatch and flush paths and never appear here.

use std::fmt;

use crate::id::WidgetId;

/// Errors surfaced synchronously at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required argument was missing or empty.
    NullArgument(&'static str),
    /// An argument was present but unusable (disposed resource, bad range).
    InvalidArgument(String),
    /// Operation attempted on a widget that has been disposed.
    WidgetDisposed(WidgetId),
    /// Mutation attempted from a thread other than the UI thread.
    ThreadAccess,
    /// A widget was parented under a tree with a different backend.
    BackendMismatch {
        /// Backend name of the parent branch.
        parent: &'static str,
        /// Backend name requested for the child.
        child: &'static str,
    },
    /// A widget was attached to a parent from a different session.
    CrossSession,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NullArgument(what) => write!(f, "null argument: {what}"),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::WidgetDisposed(id) => write!(f, "widget {id} is disposed"),
            Error::ThreadAccess => write!(f, "invalid thread access: not the UI thread"),
            Error::BackendMismatch { parent, child } => {
                write!(f, "backend mismatch: parent is {parent}, child wants {child}")
            }
            Error::CrossSession => write!(f, "widget belongs to a different session"),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used across the toolkit.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_widget_id() {
        let err = Error::WidgetDisposed(WidgetId::from_raw(9));
        assert_eq!(err.to_string(), "widget 9 is disposed");
    }

    #[test]
    fn display_names_both_backends() {
        let err = Error::BackendMismatch {
            parent: "remote",
            child: "native",
        };
        assert!(err.to_string().contains("remote"));
        assert!(err.to_string().contains("native"));
    }
}
