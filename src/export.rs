//! Exporter registry.
//!
//! Exporters are registered before initialisation runs and looked up later by
//! name or by the extension of the requested output file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an exporter named '{0}' is already registered")]
    Duplicate(String),

    #[error("no exporter found for '{0}'")]
    Unknown(String),
}

/// Writes a serialized payload to a destination
pub trait Exporter: Send + Sync {
    /// Unique exporter name, e.g. `json`
    fn name(&self) -> &str;

    /// File extension (with leading dot) this exporter produces
    fn file_extension(&self) -> &str;

    fn export(&self, payload: &serde_json::Value, destination: &Path) -> Result<()>;
}

/// Pretty-printed JSON exporter
#[derive(Debug, Default, Clone)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn name(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        ".json"
    }

    fn export(&self, payload: &serde_json::Value, destination: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(payload).context("Failed to serialize export")?;
        std::fs::write(destination, content)
            .with_context(|| format!("Failed to write export file: {:?}", destination))
    }
}

/// Registry of exporters
#[derive(Default, Clone)]
pub struct ExportManager {
    exporters: Vec<Arc<dyn Exporter>>,
}

impl ExportManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, exporter: Arc<dyn Exporter>) -> Result<(), ExportError> {
        if self.exporters.iter().any(|e| e.name() == exporter.name()) {
            return Err(ExportError::Duplicate(exporter.name().to_string()));
        }
        debug!("Registered exporter {}", exporter.name());
        self.exporters.push(exporter);
        Ok(())
    }

    /// Names of the registered exporters, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.exporters.iter().map(|e| e.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// Find an exporter by name, or by the extension of a file name
    pub fn find(&self, target: &str) -> Result<Arc<dyn Exporter>, ExportError> {
        if let Some(e) = self.exporters.iter().find(|e| e.name() == target) {
            return Ok(e.clone());
        }

        let extension = Path::new(target)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()));
        extension
            .and_then(|ext| {
                self.exporters
                    .iter()
                    .find(|e| e.file_extension().eq_ignore_ascii_case(&ext))
            })
            .cloned()
            .ok_or_else(|| ExportError::Unknown(target.to_string()))
    }

    /// Export `payload` to `destination`, choosing the exporter from the
    /// destination's file name.
    pub fn export(&self, payload: &serde_json::Value, destination: &Path) -> Result<()> {
        let target = destination.to_string_lossy();
        let exporter = self.find(&target)?;
        exporter.export(payload, destination)
    }
}
