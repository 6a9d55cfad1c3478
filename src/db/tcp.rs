//! Connector that opens a plain TCP session to the database endpoint named by
//! the connection string.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::status::StatusHooks;

use super::client::{Client, ClientConnector, ClientOptions, DbConnectionCallback, ServerSettings};

/// Default PostgreSQL port, used when the connection string has none
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Database endpoint parsed from a connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
}

impl Endpoint {
    pub fn parse(connection_string: &str) -> Result<Self> {
        let url = Url::parse(connection_string)
            .with_context(|| format!("Invalid connection string: {}", redact(connection_string)))?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            bail!(
                "unsupported connection string scheme '{}', expected postgres",
                url.scheme()
            );
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow!("connection string has no host"))?
            .to_string();

        let database = url
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|db| !db.is_empty())
            .map(str::to_string);

        Ok(Self {
            host,
            port: url.port().unwrap_or(DEFAULT_DB_PORT),
            database,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Strip credentials before a connection string ends up in an error message
fn redact(connection_string: &str) -> String {
    match Url::parse(connection_string) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("xxxxx"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

/// Client holding an open TCP session
pub struct TcpClient {
    endpoint: Endpoint,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpClient {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl Client for TcpClient {
    async fn close(&self) -> Result<()> {
        if let Some(mut stream) = self.stream.lock().await.take() {
            stream
                .shutdown()
                .await
                .with_context(|| format!("Failed to close connection to {}", self.endpoint.address()))?;
            debug!("Closed connection to {}", self.endpoint.address());
        }
        Ok(())
    }

    fn server_settings(&self) -> Option<&ServerSettings> {
        None
    }
}

/// Connects over TCP
#[derive(Debug, Default, Clone)]
pub struct TcpConnector;

#[async_trait]
impl ClientConnector for TcpConnector {
    async fn connect(
        &self,
        cancel: &CancellationToken,
        connection_string: &str,
        on_connect: Option<DbConnectionCallback>,
        status: &StatusHooks,
        opts: &ClientOptions,
    ) -> Result<Box<dyn Client>> {
        let endpoint = Endpoint::parse(connection_string)?;
        let address = endpoint.address();
        debug!("Connecting to {} with {:?}", address, opts);

        let stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => bail!("connection to {} cancelled", address),
            stream = TcpStream::connect(&address) => {
                stream.with_context(|| format!("Failed to connect to {}", address))?
            }
        };

        info!("Connected to {}", address);
        status.message(format!(
            "Connected to {}{}",
            address,
            endpoint
                .database
                .as_deref()
                .map(|db| format!(" (database {})", db))
                .unwrap_or_default()
        ));

        let client = TcpClient {
            endpoint,
            stream: Mutex::new(Some(stream)),
        };

        if let Some(callback) = on_connect {
            callback(&client);
        }

        Ok(Box::new(client))
    }
}
