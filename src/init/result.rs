use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::InitError;

/// Accumulated outcome of an initialisation run.
///
/// Holds at most one fatal error plus ordered warnings and messages. The
/// presence of `error` alone decides success.
#[derive(Debug, Default)]
pub struct InitResult {
    pub error: Option<InitError>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

/// Serializable snapshot of an [`InitResult`]
#[derive(Debug, Clone, Serialize)]
pub struct InitSummary {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl InitResult {
    pub fn with_error(error: InitError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// Set the fatal error, replacing any previous one
    pub fn set_error(&mut self, error: InitError) {
        self.error = Some(error);
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn add_warnings<I, S>(&mut self, warnings: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings.extend(warnings.into_iter().map(Into::into));
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Write messages, then warnings, one per line
    pub fn display_messages(&self, out: &mut impl Write) -> std::io::Result<()> {
        for message in &self.messages {
            writeln!(out, "{}", message)?;
        }
        for warning in &self.warnings {
            writeln!(out, "Warning: {}", warning)?;
        }
        Ok(())
    }

    pub fn summary(&self) -> InitSummary {
        InitSummary {
            success: !self.has_error(),
            error: self.error.as_ref().map(ToString::to_string),
            warnings: self.warnings.clone(),
            messages: self.messages.clone(),
            generated_at: Utc::now(),
        }
    }
}
