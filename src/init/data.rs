//! Initialisation orchestrator.
//!
//! Runs the startup stages in order, feeding every outcome into a single
//! [`InitResult`]:
//! 1. precondition: a workspace must be assigned
//! 2. telemetry start (failure is a warning)
//! 3. forced dependency install, when `mod-install` is configured
//! 4. database client connection
//! 5. client cache settings validation
//!
//! A fatal error stops the sequence. Panics inside a stage are caught and
//! recorded as the fatal error, and a fired cancellation token is reported
//! when no stage failed. [`InitData::cleanup`] releases whatever was acquired
//! and may be called at any point of the lifecycle.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigRegistry, ARG_MOD_INSTALL};
use crate::db::{validate_client_cache_settings, Client, ClientConnector, ClientOptions};
use crate::error::{ErrorAndWarnings, InitError};
use crate::export::{ExportManager, Exporter};
use crate::installer::{DependencyInstaller, InstallOpts, LockfileInstaller};
use crate::modconfig::{validate_mod_requirements_recursively, PluginVersionMap};
use crate::status::{channel_renderer, MessageRenderer, StatusHooks, StatusReporter, TracingStatus};
use crate::telemetry::{EnvTelemetry, ShutdownTelemetry, TelemetryProvider};
use crate::workspace::Workspace;

use super::client_factory::get_db_client;
use super::result::InitResult;

/// Application name reported to telemetry
pub const APP_NAME: &str = "modinit";

/// The command that triggered initialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invoker {
    Query,
    Check,
    Dashboard,
    Server,
}

impl fmt::Display for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Invoker::Query => "query",
            Invoker::Check => "check",
            Invoker::Dashboard => "dashboard",
            Invoker::Server => "server",
        };
        f.write_str(name)
    }
}

/// External collaborators used by the stages
#[derive(Clone)]
pub struct InitServices {
    pub status: Arc<dyn StatusReporter>,
    pub telemetry: Arc<dyn TelemetryProvider>,
    pub installer: Arc<dyn DependencyInstaller>,
    pub connector: Arc<dyn ClientConnector>,
}

impl InitServices {
    /// Default collaborators around the given connector: log-based status,
    /// environment-configured telemetry and the lock-file installer.
    pub fn new(connector: Arc<dyn ClientConnector>) -> Self {
        Self {
            status: Arc::new(TracingStatus),
            telemetry: Arc::new(EnvTelemetry),
            installer: Arc::new(LockfileInstaller),
            connector,
        }
    }

    pub fn with_status(mut self, status: Arc<dyn StatusReporter>) -> Self {
        self.status = status;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetryProvider>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_installer(mut self, installer: Arc<dyn DependencyInstaller>) -> Self {
        self.installer = installer;
        self
    }
}

/// Initialisation state: the workspace, the client once connected, and the
/// accumulated result.
pub struct InitData {
    pub workspace: Option<Workspace>,
    pub client: Option<Box<dyn Client>>,
    pub result: InitResult,
    pub export_manager: ExportManager,
    shutdown_telemetry: Option<ShutdownTelemetry>,
    config: Arc<ConfigRegistry>,
    services: Option<InitServices>,
}

impl InitData {
    pub fn new(config: Arc<ConfigRegistry>, services: InitServices) -> Self {
        Self {
            workspace: None,
            client: None,
            result: InitResult::default(),
            export_manager: ExportManager::new(),
            shutdown_telemetry: None,
            config,
            services: Some(services),
        }
    }

    /// An already-failed instance, for when initialisation cannot even begin
    pub fn new_error(error: InitError) -> Self {
        Self {
            workspace: None,
            client: None,
            result: InitResult::with_error(error),
            export_manager: ExportManager::new(),
            shutdown_telemetry: None,
            config: Arc::new(ConfigRegistry::default()),
            services: None,
        }
    }

    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// Register exporters. Must happen before [`InitData::init`]. Duplicate
    /// names are logged and skipped.
    pub fn register_exporters<I>(&mut self, exporters: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Exporter>>,
    {
        for exporter in exporters {
            if let Err(e) = self.export_manager.register(exporter) {
                warn!("{}", e);
            }
        }
        self
    }

    pub fn has_telemetry(&self) -> bool {
        self.shutdown_telemetry.is_some()
    }

    /// Run all initialisation stages. Inspect `result.error` afterwards.
    pub async fn init(&mut self, cancel: &CancellationToken, invoker: Invoker, opts: ClientOptions) {
        info!("Initializing ({})...", invoker);

        // messages rendered while connecting become initialisation messages;
        // the receiver lives out here so they survive a panicking stage
        let (renderer, mut rendered) = channel_renderer();

        let outcome = AssertUnwindSafe(self.run_stages(cancel, &opts, renderer))
            .catch_unwind()
            .await;

        while let Ok(message) = rendered.try_recv() {
            self.result.add_message(message);
        }

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Initialisation failed: {}", e);
                self.result.set_error(e);
            }
            Err(panic) => {
                let message = panic_message(panic);
                error!("Initialisation panicked: {}", message);
                self.result.set_error(InitError::Panicked(message));
            }
        }

        // cancellation is only surfaced when nothing else failed
        if !self.result.has_error() && cancel.is_cancelled() {
            self.result.set_error(InitError::Cancelled);
        }
    }

    async fn run_stages(
        &mut self,
        cancel: &CancellationToken,
        opts: &ClientOptions,
        renderer: MessageRenderer,
    ) -> Result<(), InitError> {
        // everything below depends on the workspace
        if self.workspace.is_none() {
            return Err(InitError::InvalidState(
                "init called before setting up workspace".to_string(),
            ));
        }
        let services = self.services.clone().ok_or_else(|| {
            InitError::InvalidState("init called on an instance that already failed".to_string())
        })?;

        let status = StatusHooks::new(services.status.clone());
        status.set_status("Initializing");

        self.start_telemetry(services.telemetry.as_ref());

        if self.config.get_bool(ARG_MOD_INSTALL) {
            self.install_dependencies(cancel, &status, services.installer.as_ref())
                .await?;
        }

        let client = self
            .connect_client(cancel, &status, services.connector.as_ref(), opts, renderer)
            .await?;

        info!("Validating client cache settings");
        let cache_check = validate_client_cache_settings(client.as_ref(), &self.config);
        self.client = Some(client);

        if let Some(ErrorAndWarnings { error, warnings }) = cache_check {
            self.result.add_warnings(warnings);
            if let Some(e) = error {
                return Err(e);
            }
        }

        Ok(())
    }

    fn start_telemetry(&mut self, telemetry: &dyn TelemetryProvider) {
        match telemetry.start(APP_NAME) {
            Ok(shutdown) => self.shutdown_telemetry = Some(shutdown),
            Err(e) => {
                warn!("Failed to start telemetry: {:#}", e);
                self.result.add_warnings([e.to_string()]);
            }
        }
    }

    async fn install_dependencies(
        &mut self,
        cancel: &CancellationToken,
        status: &StatusHooks,
        installer: &dyn DependencyInstaller,
    ) -> Result<(), InitError> {
        status.set_status("Installing workspace dependencies");
        info!("Installing workspace dependencies");

        let workspace = self.workspace.as_ref().ok_or_else(|| {
            InitError::InvalidState("workspace missing during install".to_string())
        })?;

        // forced so that per-dependency failures do not abort the install;
        // mod requirements are validated separately once connected
        let report = installer
            .install(cancel, workspace, InstallOpts { force: true })
            .await
            .map_err(InitError::Install)?;

        debug!(
            "Installed {} dependencies, {} failures",
            report.installed.len(),
            report.failures.len()
        );
        self.result.add_warnings(report.failures);
        Ok(())
    }

    async fn connect_client(
        &mut self,
        cancel: &CancellationToken,
        status: &StatusHooks,
        connector: &dyn ClientConnector,
        opts: &ClientOptions,
        renderer: MessageRenderer,
    ) -> Result<Box<dyn Client>, InitError> {
        let client_status = status.with_message_renderer(renderer);

        status.set_status("Connecting to database");
        info!("Connecting to database");
        let (client, errors_and_warnings) =
            get_db_client(&client_status, &self.config, connector, cancel, None, opts).await;
        let ErrorAndWarnings { error, warnings } = errors_and_warnings;
        if let Some(e) = error {
            return Err(e);
        }
        self.result.add_warnings(warnings);

        client.ok_or_else(|| InitError::Connection(anyhow!("connector returned no client")))
    }

    /// Validate the workspace mod tree against the installed plugin versions,
    /// setting a fatal error listing every violation. Does nothing when the
    /// result already failed.
    pub fn check_mod_requirements(&mut self, plugin_versions: &PluginVersionMap) {
        if self.result.has_error() {
            return;
        }
        let Some(workspace) = self.workspace.as_ref() else {
            self.result.set_error(InitError::InvalidState(
                "mod requirements checked before setting up workspace".to_string(),
            ));
            return;
        };

        let violations = validate_mod_requirements_recursively(workspace.root_mod(), plugin_versions);
        if !violations.is_empty() {
            warn!("{} mod requirement violation(s)", violations.len());
            self.result.set_error(InitError::ModRequirements(violations));
        }
    }

    /// Release the client, telemetry and workspace, in that order. Safe to
    /// call repeatedly and before or after a failed [`InitData::init`].
    pub async fn cleanup(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                warn!("Failed to close database client: {:#}", e);
            }
        }
        if let Some(shutdown) = self.shutdown_telemetry.take() {
            shutdown();
        }
        if let Some(workspace) = self.workspace.as_mut() {
            workspace.close();
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
