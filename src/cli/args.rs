use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use modinit::config::{
    ConfigRegistry, ARG_CACHE_TTL, ARG_CLIENT_CACHE_ENABLED, ARG_CONNECTION_STRING,
    ARG_MOD_INSTALL,
};
use modinit::Invoker;

/// modinit - initialise a workspace session and validate mod requirements
#[derive(Parser)]
#[command(name = "modinit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Workspace directory or manifest (searches upward for mod.json if absent)
    #[arg(short = 'w', long)]
    pub workspace: Option<String>,

    /// Database connection string
    #[arg(long, env = "MODINIT_CONNECTION_STRING")]
    pub connection_string: Option<String>,

    /// Install workspace mod dependencies before connecting
    #[arg(long, env = "MODINIT_MOD_INSTALL")]
    pub mod_install: bool,

    /// Client cache TTL in seconds
    #[arg(long, env = "MODINIT_CACHE_TTL", allow_negative_numbers = true)]
    pub cache_ttl: Option<i64>,

    /// Enable client side query caching
    #[arg(long, env = "MODINIT_CLIENT_CACHE_ENABLED")]
    pub client_cache_enabled: Option<bool>,

    /// Command on whose behalf initialisation runs
    #[arg(long, value_enum, default_value_t = InvokerArg::Check)]
    pub invoker: InvokerArg,

    /// Write the initialisation summary to this file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InvokerArg {
    Query,
    Check,
    Dashboard,
    Server,
}

impl From<InvokerArg> for Invoker {
    fn from(arg: InvokerArg) -> Self {
        match arg {
            InvokerArg::Query => Invoker::Query,
            InvokerArg::Check => Invoker::Check,
            InvokerArg::Dashboard => Invoker::Dashboard,
            InvokerArg::Server => Invoker::Server,
        }
    }
}

impl Cli {
    /// Configuration registry populated from flags and environment.
    /// Options that were not given are left unset.
    pub fn config(&self) -> ConfigRegistry {
        let mut config = ConfigRegistry::new().with(ARG_MOD_INSTALL, self.mod_install);
        if let Some(connection_string) = &self.connection_string {
            config.set(ARG_CONNECTION_STRING, connection_string.as_str());
        }
        if let Some(ttl) = self.cache_ttl {
            config.set(ARG_CACHE_TTL, ttl);
        }
        if let Some(enabled) = self.client_cache_enabled {
            config.set(ARG_CLIENT_CACHE_ENABLED, enabled);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::parse_from([
            "modinit",
            "--connection-string",
            "postgres://localhost/db",
            "--mod-install",
            "--cache-ttl",
            "60",
            "--invoker",
            "dashboard",
        ]);
        let config = cli.config();

        assert!(config.get_bool(ARG_MOD_INSTALL));
        assert_eq!(config.get_string(ARG_CONNECTION_STRING), "postgres://localhost/db");
        assert_eq!(config.get_int(ARG_CACHE_TTL), 60);
        assert!(!config.is_set(ARG_CLIENT_CACHE_ENABLED));
        assert_eq!(Invoker::from(cli.invoker), Invoker::Dashboard);
    }

    #[test]
    fn test_client_cache_flag_takes_a_value() {
        let cli = Cli::parse_from(["modinit", "--client-cache-enabled", "false"]);
        let config = cli.config();
        assert!(config.is_set(ARG_CLIENT_CACHE_ENABLED));
        assert!(!config.get_bool(ARG_CLIENT_CACHE_ENABLED));
    }
}
