use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::{fmt, EnvFilter};

use modinit::db::{ClientOptions, TcpConnector};
use modinit::export::{Exporter, JsonExporter};
use modinit::init::APP_NAME;
use modinit::{InitData, InitError, InitServices, Workspace};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Arc::new(cli.config());
    let services = InitServices::new(Arc::new(TcpConnector));

    let mut init_data = match cli::resolve_workspace_path(cli.workspace.clone())
        .and_then(|path| Workspace::load(&path))
    {
        Ok(workspace) => InitData::new(config, services).with_workspace(workspace),
        Err(e) => {
            error!("{:#}", e);
            InitData::new_error(InitError::Workspace(e))
        }
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling initialisation");
            interrupt.cancel();
        }
    });

    if !init_data.result.has_error() {
        let exporters: Vec<Arc<dyn Exporter>> = vec![Arc::new(JsonExporter)];
        init_data.register_exporters(exporters);

        let opts = ClientOptions::default().with_application_name(APP_NAME);
        init_data.init(&cancel, cli.invoker.into(), opts).await;

        let plugin_versions = init_data
            .workspace
            .as_ref()
            .map(Workspace::plugin_versions)
            .unwrap_or_default();
        init_data.check_mod_requirements(&plugin_versions);
    }

    init_data.result.display_messages(&mut std::io::stdout())?;

    if let Some(destination) = &cli.export {
        let payload = serde_json::to_value(init_data.result.summary())?;
        match init_data.export_manager.export(&payload, destination) {
            Ok(()) => println!("📄 Summary written to {}", destination.display()),
            Err(e) => warn!("Failed to export summary: {:#}", e),
        }
    }

    init_data.cleanup().await;

    if let Some(e) = &init_data.result.error {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    println!("✅ Initialisation complete");
    Ok(())
}
