//! Read-only configuration registry.
//!
//! Values are populated once at startup (from CLI flags and environment
//! variables) and looked up by the well-known keys below.

use std::collections::HashMap;

/// Install workspace mod dependencies before connecting
pub const ARG_MOD_INSTALL: &str = "mod-install";
/// Connection string of the database to connect to
pub const ARG_CONNECTION_STRING: &str = "connection-string";
/// Whether the client wants query caching
pub const ARG_CLIENT_CACHE_ENABLED: &str = "client-cache-enabled";
/// Client cache TTL in seconds
pub const ARG_CACHE_TTL: &str = "cache-ttl";

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

/// Keyed configuration lookup.
///
/// Lookups never fail: a missing key or a value of another type reads as the
/// type's zero value, use [`ConfigRegistry::is_set`] to tell them apart.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    values: HashMap<String, ConfigValue>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(ConfigValue::Bool(b)) => *b,
            Some(ConfigValue::String(s)) => {
                matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
            }
            _ => false,
        }
    }

    pub fn get_int(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(ConfigValue::Int(i)) => *i,
            Some(ConfigValue::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn get_string(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(ConfigValue::String(s)) => s.clone(),
            Some(ConfigValue::Bool(b)) => b.to_string(),
            Some(ConfigValue::Int(i)) => i.to_string(),
            None => String::new(),
        }
    }
}
