//! Workspace: the loaded root mod plus its resolved dependency lock.
//!
//! Workspaces are normally produced by the workspace loader. For the CLI a
//! workspace can also be read from a JSON manifest:
//!
//! ```json
//! {
//!   "mod": { "name": "compliance", "require": { "plugins": [...], "mods": [...] }, "mods": {...} },
//!   "lock": { "mods": { "github.com/acme/net": "1.2.0" }, "plugins": { "aws": "0.101.0" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::modconfig::{Mod, PluginVersionMap};

/// Default manifest file name inside a workspace directory
pub const MANIFEST_FILE: &str = "mod.json";

/// Resolved dependency versions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceLock {
    /// Dependency name to resolved mod version
    #[serde(default)]
    pub mods: BTreeMap<String, String>,
    /// Plugin name to installed plugin version
    #[serde(default)]
    pub plugins: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "mod")]
    root_mod: Mod,
    #[serde(default)]
    lock: Option<WorkspaceLock>,
}

type CloseHandler = Box<dyn FnOnce() + Send + Sync>;

/// A loaded workspace.
///
/// Closing runs the registered close handlers (file watchers and the like)
/// exactly once.
pub struct Workspace {
    path: PathBuf,
    root_mod: Mod,
    lock: Option<WorkspaceLock>,
    close_handlers: Vec<CloseHandler>,
    closed: bool,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>, root_mod: Mod) -> Self {
        Self {
            path: path.into(),
            root_mod,
            lock: None,
            close_handlers: Vec::new(),
            closed: false,
        }
    }

    pub fn with_lock(mut self, lock: WorkspaceLock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Load a workspace from a manifest file, or from `mod.json` inside a
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest_path = if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read workspace manifest: {:?}", manifest_path))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse workspace manifest: {:?}", manifest_path))?;

        info!(
            "Loaded workspace mod '{}' ({} dependency mods)",
            manifest.root_mod.name,
            manifest.root_mod.mods.len()
        );

        let workspace_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            path: workspace_dir,
            root_mod: manifest.root_mod,
            lock: manifest.lock,
            close_handlers: Vec::new(),
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root_mod(&self) -> &Mod {
        &self.root_mod
    }

    pub fn lock(&self) -> Option<&WorkspaceLock> {
        self.lock.as_ref()
    }

    /// Installed plugin versions recorded in the lock
    pub fn plugin_versions(&self) -> PluginVersionMap {
        self.lock
            .as_ref()
            .map(|l| l.plugins.clone().into_iter().collect())
            .unwrap_or_default()
    }

    /// Register a handler to run when the workspace is closed
    pub fn on_close(&mut self, handler: impl FnOnce() + Send + Sync + 'static) {
        self.close_handlers.push(Box::new(handler));
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for handler in self.close_handlers.drain(..) {
            handler();
        }
        debug!("Workspace {:?} closed", self.path);
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("path", &self.path)
            .field("root_mod", &self.root_mod.name)
            .field("closed", &self.closed)
            .finish()
    }
}
