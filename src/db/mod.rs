//! Database client seam: the client/connector traits, client options, cache
//! settings validation and the TCP connector used by the CLI.

mod cache_settings;
mod client;
mod tcp;

pub use cache_settings::validate_client_cache_settings;
pub use client::{Client, ClientConnector, ClientOptions, DbConnectionCallback, ServerSettings};
pub use tcp::{Endpoint, TcpClient, TcpConnector, DEFAULT_DB_PORT};
