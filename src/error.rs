//! Error types for the initialisation flow.
//!
//! `InitError` is the single fatal error an initialisation run can end with.
//! `ErrorAndWarnings` is the carrier returned by stages that can produce a
//! fatal error and non-fatal warnings independently of each other.

use thiserror::Error;

/// Fatal initialisation errors
#[derive(Debug, Error)]
pub enum InitError {
    /// The orchestrator was driven out of order (e.g. no workspace assigned)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The workspace could not be loaded
    #[error("failed to load workspace: {0:#}")]
    Workspace(#[source] anyhow::Error),

    /// No database connection string is configured
    #[error("no connection string is set")]
    NoConnectionString,

    /// The dependency installer itself failed
    #[error("failed to install workspace dependencies: {0:#}")]
    Install(#[source] anyhow::Error),

    /// The client connector failed
    #[error("failed to connect to database: {0:#}")]
    Connection(#[source] anyhow::Error),

    /// Client cache settings are unusable
    #[error("invalid cache settings: {0}")]
    CacheSettings(String),

    /// One or more mods in the workspace have unsatisfied requirements
    #[error("{}", .0.join("\n"))]
    ModRequirements(Vec<String>),

    /// A stage panicked; the payload message is preserved
    #[error("unexpected failure during initialisation: {0}")]
    Panicked(String),

    /// The caller's cancellation token fired
    #[error("initialisation cancelled")]
    Cancelled,
}

impl InitError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InitError::Cancelled)
    }
}

/// A fatal error (optional) travelling together with non-fatal warnings.
#[derive(Debug, Default)]
pub struct ErrorAndWarnings {
    pub error: Option<InitError>,
    pub warnings: Vec<String>,
}

impl ErrorAndWarnings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an optional error with no warnings.
    pub fn from_error(error: Option<InitError>) -> Self {
        Self {
            error,
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Fold `other` into `self`. An existing error is kept; warnings are
    /// appended in order.
    pub fn merge(&mut self, other: ErrorAndWarnings) {
        if self.error.is_none() {
            self.error = other.error;
        }
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.warnings.is_empty()
    }

    pub fn error(&self) -> Option<&InitError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_error_display() {
        let err = InitError::NoConnectionString;
        assert_eq!(err.to_string(), "no connection string is set");

        let err = InitError::InvalidState("init called early".to_string());
        assert!(err.to_string().contains("invalid state"));

        let err = InitError::ModRequirements(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "a\nb");
    }

    #[test]
    fn test_connection_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("connection refused").context("dialing db:5432");
        let err = InitError::Connection(inner);
        let text = err.to_string();
        assert!(text.contains("dialing db:5432"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_merge_keeps_first_error() {
        let mut first = ErrorAndWarnings::from_error(Some(InitError::Cancelled));
        first.add_warning("w1");

        let mut second = ErrorAndWarnings::from_error(Some(InitError::NoConnectionString));
        second.add_warning("w2");

        first.merge(second);
        assert!(first.error().is_some_and(InitError::is_cancelled));
        assert_eq!(first.warnings, vec!["w1", "w2"]);
    }

    #[test]
    fn test_merge_adopts_error_when_missing() {
        let mut base = ErrorAndWarnings::empty();
        assert!(base.is_empty());

        base.merge(ErrorAndWarnings::from_error(Some(InitError::Cancelled)));
        assert!(!base.is_empty());
        assert!(base.error().is_some());
    }
}
