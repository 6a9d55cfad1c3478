use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::status::StatusHooks;

/// Cache settings reported by the database server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub cache_enabled: bool,
    /// Maximum cache TTL the server allows, in seconds
    pub cache_max_ttl: i64,
}

/// A connected database client
#[async_trait]
pub trait Client: Send + Sync {
    /// Close the connection. Called at most once, during cleanup.
    async fn close(&self) -> Result<()>;

    /// Server cache settings, when the server exposes them
    fn server_settings(&self) -> Option<&ServerSettings>;
}

/// Called once the connection is established
pub type DbConnectionCallback = Arc<dyn Fn(&dyn Client) + Send + Sync>;

/// Options forwarded to the client connector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub application_name: Option<String>,
    pub search_path: Vec<String>,
    pub search_path_prefix: Vec<String>,
}

impl ClientOptions {
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn with_search_path(mut self, search_path: Vec<String>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_search_path_prefix(mut self, prefix: Vec<String>) -> Self {
        self.search_path_prefix = prefix;
        self
    }
}

/// Builds connected clients. Implementations perform the actual handshake and
/// must honour `cancel` for long-running connects.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    async fn connect(
        &self,
        cancel: &CancellationToken,
        connection_string: &str,
        on_connect: Option<DbConnectionCallback>,
        status: &StatusHooks,
        opts: &ClientOptions,
    ) -> Result<Box<dyn Client>>;
}
