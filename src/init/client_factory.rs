use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{ConfigRegistry, ARG_CONNECTION_STRING};
use crate::db::{Client, ClientConnector, ClientOptions, DbConnectionCallback};
use crate::error::{ErrorAndWarnings, InitError};
use crate::status::StatusHooks;

/// Create a database client from the configured connection string.
///
/// Fails without contacting anything when no connection string is set.
pub async fn get_db_client(
    status: &StatusHooks,
    config: &ConfigRegistry,
    connector: &dyn ClientConnector,
    cancel: &CancellationToken,
    on_connect: Option<DbConnectionCallback>,
    opts: &ClientOptions,
) -> (Option<Box<dyn Client>>, ErrorAndWarnings) {
    let connection_string = config.get_string(ARG_CONNECTION_STRING);
    if connection_string.is_empty() {
        return (
            None,
            ErrorAndWarnings::from_error(Some(InitError::NoConnectionString)),
        );
    }

    status.set_status("Connecting to remote database");
    info!("Connecting to remote database");

    match connector
        .connect(cancel, &connection_string, on_connect, status, opts)
        .await
    {
        Ok(client) => (Some(client), ErrorAndWarnings::empty()),
        Err(e) => (
            None,
            ErrorAndWarnings::from_error(Some(InitError::Connection(e))),
        ),
    }
}
