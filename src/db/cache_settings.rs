//! Client cache settings validation against the server's settings.

use tracing::debug;

use crate::config::{ConfigRegistry, ARG_CACHE_TTL, ARG_CLIENT_CACHE_ENABLED};
use crate::error::{ErrorAndWarnings, InitError};

use super::client::Client;

/// Check the configured client cache settings against the server.
///
/// Returns `None` when the client does not expose server settings, so there
/// is nothing to check.
pub fn validate_client_cache_settings(
    client: &dyn Client,
    config: &ConfigRegistry,
) -> Option<ErrorAndWarnings> {
    let settings = client.server_settings()?;
    debug!("Validating client cache settings against {:?}", settings);

    let mut errors_and_warnings = ErrorAndWarnings::empty();

    if config.is_set(ARG_CLIENT_CACHE_ENABLED)
        && config.get_bool(ARG_CLIENT_CACHE_ENABLED)
        && !settings.cache_enabled
    {
        errors_and_warnings.add_warning("Caching is disabled on the server.");
    }

    if config.is_set(ARG_CACHE_TTL) {
        let client_ttl = config.get_int(ARG_CACHE_TTL);
        if client_ttl <= 0 {
            errors_and_warnings.merge(ErrorAndWarnings::from_error(Some(
                InitError::CacheSettings(format!(
                    "cache ttl must be greater than zero, got {}",
                    client_ttl
                )),
            )));
        } else if client_ttl > settings.cache_max_ttl {
            errors_and_warnings.add_warning(format!(
                "The server cache ttl ({}s) is lower than the client cache ttl ({}s). Cached results will be refreshed after {}s.",
                settings.cache_max_ttl, client_ttl, settings.cache_max_ttl
            ));
        }
    }

    Some(errors_and_warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ServerSettings;
    use async_trait::async_trait;

    struct SettingsClient(Option<ServerSettings>);

    #[async_trait]
    impl Client for SettingsClient {
        async fn close(&self) -> anyhow::Result<()> {
            Ok(())
        }

        fn server_settings(&self) -> Option<&ServerSettings> {
            self.0.as_ref()
        }
    }

    fn server(cache_enabled: bool, cache_max_ttl: i64) -> SettingsClient {
        SettingsClient(Some(ServerSettings {
            cache_enabled,
            cache_max_ttl,
        }))
    }

    #[test]
    fn test_no_server_settings() {
        let config = ConfigRegistry::new().with(ARG_CACHE_TTL, 0i64);
        assert!(validate_client_cache_settings(&SettingsClient(None), &config).is_none());
    }

    #[test]
    fn test_nothing_configured() {
        let result = validate_client_cache_settings(&server(true, 300), &ConfigRegistry::new());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_cache_disabled_on_server() {
        let config = ConfigRegistry::new().with(ARG_CLIENT_CACHE_ENABLED, true);
        let result = validate_client_cache_settings(&server(false, 300), &config).unwrap();
        assert!(result.error().is_none());
        assert_eq!(result.warnings, vec!["Caching is disabled on the server."]);
    }

    #[test]
    fn test_client_ttl_above_server_max() {
        let config = ConfigRegistry::new().with(ARG_CACHE_TTL, 600i64);
        let result = validate_client_cache_settings(&server(true, 300), &config).unwrap();
        assert!(result.error().is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("(300s) is lower than the client cache ttl (600s)"));
    }

    #[test]
    fn test_ttl_above_max_warns_with_server_cache_disabled() {
        let config = ConfigRegistry::new().with(ARG_CACHE_TTL, 600i64);
        let result = validate_client_cache_settings(&server(false, 300), &config).unwrap();
        assert!(result.error().is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("(300s) is lower than the client cache ttl (600s)"));
    }

    #[test]
    fn test_non_positive_ttl_is_fatal() {
        let config = ConfigRegistry::new()
            .with(ARG_CLIENT_CACHE_ENABLED, true)
            .with(ARG_CACHE_TTL, -5i64);
        let result = validate_client_cache_settings(&server(false, 300), &config).unwrap();
        assert!(matches!(result.error(), Some(InitError::CacheSettings(_))));
        assert_eq!(result.warnings.len(), 1);
    }
}
