//! Telemetry lifecycle.
//!
//! Starting telemetry yields a shutdown hook; whoever owns the hook is
//! responsible for calling it exactly once at teardown.

use std::time::Instant;

use anyhow::{bail, Result};
use tracing::{debug, info};

/// Environment variable to disable non-essential traffic (telemetry)
pub const DISABLE_TELEMETRY_ENV: &str = "MODINIT_DISABLE_TELEMETRY";

/// Environment variable selecting what telemetry is collected
pub const OTEL_LEVEL_ENV: &str = "MODINIT_OTEL_LEVEL";

/// Teardown callback returned by a successful telemetry start
pub type ShutdownTelemetry = Box<dyn FnOnce() + Send>;

/// Something that can start telemetry for an application
pub trait TelemetryProvider: Send + Sync {
    fn start(&self, app_name: &str) -> Result<ShutdownTelemetry>;
}

/// Check if telemetry is enabled
pub fn is_telemetry_enabled() -> bool {
    match std::env::var(DISABLE_TELEMETRY_ENV) {
        Ok(val) => {
            let val_lower = val.to_lowercase();
            // Disabled if set to "1", "true", "yes", "on"
            !matches!(val_lower.as_str(), "1" | "true" | "yes" | "on")
        }
        // Enabled by default if env var is not set
        Err(_) => true,
    }
}

/// Telemetry collection level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtelLevel {
    None,
    Trace,
    Metrics,
    All,
}

impl OtelLevel {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "none" => Ok(OtelLevel::None),
            "trace" => Ok(OtelLevel::Trace),
            "metrics" => Ok(OtelLevel::Metrics),
            "all" => Ok(OtelLevel::All),
            other => bail!(
                "invalid telemetry level '{}' in {}: expected one of none, trace, metrics, all",
                other,
                OTEL_LEVEL_ENV
            ),
        }
    }

    fn from_env() -> Result<Self> {
        match std::env::var(OTEL_LEVEL_ENV) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Ok(OtelLevel::None),
        }
    }
}

/// Telemetry configured from the environment
#[derive(Debug, Default, Clone)]
pub struct EnvTelemetry;

impl TelemetryProvider for EnvTelemetry {
    fn start(&self, app_name: &str) -> Result<ShutdownTelemetry> {
        if !is_telemetry_enabled() {
            debug!("Telemetry disabled via {}", DISABLE_TELEMETRY_ENV);
            return Ok(Box::new(|| {}));
        }

        let level = OtelLevel::from_env()?;
        if level == OtelLevel::None {
            return Ok(Box::new(|| {}));
        }

        info!("Telemetry started for {} (level {:?})", app_name, level);
        let app_name = app_name.to_string();
        let started = Instant::now();

        Ok(Box::new(move || {
            info!(
                "Telemetry for {} shut down after {:?}",
                app_name,
                started.elapsed()
            );
        }))
    }
}
