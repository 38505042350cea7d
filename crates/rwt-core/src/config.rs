#![forbid(unsafe_code)]

//! Session configuration: backend selection and per-kind overrides.
//!
//! A root widget picks its backend from the session configuration; every
//! descendant inherits the root's backend. Overrides let a deployment
//! force individual widget kinds onto a specific backend at the root
//! level (useful while migrating a product widget-by-widget), without
//! ever mixing backends inside one branch.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::id::WidgetKind;

/// Which backend realizes a widget tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Handle-based native toolkit backend.
    Native,
    /// Value-based remote renderer backend.
    Remote,
}

impl BackendKind {
    /// Lowercase name used in config values and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a backend name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError(pub String);

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown backend: {:?} (expected \"native\" or \"remote\")", self.0)
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for BackendKind {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(BackendKind::Native),
            "remote" => Ok(BackendKind::Remote),
            _ => Err(ParseBackendError(s.to_owned())),
        }
    }
}

/// Configuration threaded through a UI session at init time.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    default_backend: BackendKind,
    overrides: HashMap<WidgetKind, BackendKind>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_backend: BackendKind::Remote,
            overrides: HashMap::new(),
        }
    }
}

impl SessionConfig {
    /// Configuration with the given default backend and no overrides.
    pub fn new(default_backend: BackendKind) -> Self {
        Self {
            default_backend,
            overrides: HashMap::new(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// `RWT_BACKEND` sets the default backend; `RWT_BACKEND_<KIND>` (e.g.
    /// `RWT_BACKEND_BUTTON=native`) overrides one kind. Unparseable values
    /// are ignored and the defaults kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("RWT_BACKEND") {
            if let Ok(backend) = value.parse() {
                config.default_backend = backend;
            }
        }
        for kind in WidgetKind::ALL {
            let var = format!("RWT_BACKEND_{}", kind.name().to_ascii_uppercase());
            if let Ok(value) = std::env::var(&var) {
                if let Ok(backend) = value.parse() {
                    config.overrides.insert(kind, backend);
                }
            }
        }
        config
    }

    /// Set the default backend.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.default_backend = backend;
        self
    }

    /// Force one widget kind onto a specific backend at the root level.
    #[must_use]
    pub fn with_override(mut self, kind: WidgetKind, backend: BackendKind) -> Self {
        self.overrides.insert(kind, backend);
        self
    }

    /// The default backend for new roots.
    pub fn default_backend(&self) -> BackendKind {
        self.default_backend
    }

    /// Backend a root of the given kind should use.
    pub fn backend_for(&self, kind: WidgetKind) -> BackendKind {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or(self.default_backend)
    }

    /// Whether the given kind has an explicit override.
    pub fn has_override(&self, kind: WidgetKind) -> bool {
        self.overrides.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_remote() {
        let config = SessionConfig::default();
        assert_eq!(config.default_backend(), BackendKind::Remote);
        assert_eq!(config.backend_for(WidgetKind::Button), BackendKind::Remote);
    }

    #[test]
    fn override_wins_for_its_kind_only() {
        let config = SessionConfig::new(BackendKind::Remote)
            .with_override(WidgetKind::Button, BackendKind::Native);
        assert_eq!(config.backend_for(WidgetKind::Button), BackendKind::Native);
        assert_eq!(config.backend_for(WidgetKind::Label), BackendKind::Remote);
        assert!(config.has_override(WidgetKind::Button));
        assert!(!config.has_override(WidgetKind::Label));
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Native".parse::<BackendKind>().unwrap(), BackendKind::Native);
        assert_eq!(" remote ".parse::<BackendKind>().unwrap(), BackendKind::Remote);
        assert!("flutter".parse::<BackendKind>().is_err());
    }
}
