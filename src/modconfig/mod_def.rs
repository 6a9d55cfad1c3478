//! Mod definitions as produced by the workspace loader.
//!
//! A mod declares the plugins and other mods it requires, and carries the
//! already-loaded dependency mods keyed by dependency name.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::version::{parse_constraint, satisfies};

/// Map of plugin name to the resolved (installed) plugin version
pub type PluginVersionMap = HashMap<String, String>;

/// A plugin version requirement declared by a mod
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginRequirement {
    pub name: String,
    #[serde(default)]
    pub min_version: String,
}

/// A mod dependency requirement declared by a mod
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModRequirement {
    /// Dependency name, e.g. `github.com/acme/aws-compliance`
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// The `require` block of a mod
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Require {
    #[serde(default)]
    pub plugins: Vec<PluginRequirement>,
    #[serde(default)]
    pub mods: Vec<ModRequirement>,
}

/// A loaded mod and its dependency mods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mod {
    /// Short name of the mod
    pub name: String,
    /// Dependency name. Empty for the workspace root mod.
    #[serde(default)]
    pub dependency_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub require: Require,
    /// Child mods keyed by dependency name. The loader also emits a `local`
    /// alias and, in some cases, the mod itself.
    #[serde(default)]
    pub mods: BTreeMap<String, Mod>,
}

impl Mod {
    pub fn new(name: impl Into<String>, dependency_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency_name: dependency_name.into(),
            ..Default::default()
        }
    }

    pub fn with_plugin(mut self, name: &str, min_version: &str) -> Self {
        self.require.plugins.push(PluginRequirement {
            name: name.to_string(),
            min_version: min_version.to_string(),
        });
        self
    }

    pub fn with_mod_requirement(mut self, name: &str, version: &str) -> Self {
        self.require.mods.push(ModRequirement {
            name: name.to_string(),
            version: version.to_string(),
        });
        self
    }

    /// Add a child mod under `key`
    pub fn with_child(mut self, key: &str, child: Mod) -> Self {
        self.mods.insert(key.to_string(), child);
        self
    }

    /// Name used in user-facing messages
    pub fn display_name(&self) -> &str {
        if self.dependency_name.is_empty() {
            &self.name
        } else {
            &self.dependency_name
        }
    }

    /// Validate this mod's own plugin requirements against the installed
    /// plugin versions. Child mods are not visited.
    pub fn validate_requirements(&self, plugin_versions: &PluginVersionMap) -> Vec<String> {
        let mut errors = Vec::new();

        for plugin in &self.require.plugins {
            let Some(installed) = plugin_versions.get(&plugin.name) else {
                errors.push(format!(
                    "could not find plugin {} which is required by mod '{}'",
                    plugin.name,
                    self.display_name()
                ));
                continue;
            };

            let constraint = match parse_constraint(&plugin.min_version) {
                Ok(c) => c,
                Err(e) => {
                    errors.push(format!(
                        "mod '{}' declares an unusable requirement for plugin {}: {}",
                        self.display_name(),
                        plugin.name,
                        e
                    ));
                    continue;
                }
            };

            if !satisfies(&constraint, installed) {
                errors.push(format!(
                    "mod '{}' requires plugin {} version {}, but version {} is installed",
                    self.display_name(),
                    plugin.name,
                    plugin.min_version,
                    installed
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(pairs: &[(&str, &str)]) -> PluginVersionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_satisfied_requirements() {
        let m = Mod::new("compliance", "").with_plugin("aws", ">=0.100");
        assert!(m
            .validate_requirements(&versions(&[("aws", "0.101.0")]))
            .is_empty());
    }

    #[test]
    fn test_missing_plugin() {
        let m = Mod::new("compliance", "github.com/acme/compliance").with_plugin("aws", ">=0.100");
        let errors = m.validate_requirements(&versions(&[]));
        assert_eq!(
            errors,
            vec!["could not find plugin aws which is required by mod 'github.com/acme/compliance'"]
        );
    }

    #[test]
    fn test_version_too_low() {
        let m = Mod::new("compliance", "").with_plugin("aws", ">=0.100");
        let errors = m.validate_requirements(&versions(&[("aws", "0.99.1")]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("requires plugin aws version >=0.100"));
        assert!(errors[0].contains("0.99.1 is installed"));
    }

    #[test]
    fn test_bad_constraint_is_reported() {
        let m = Mod::new("compliance", "").with_plugin("aws", ">=abc");
        let errors = m.validate_requirements(&versions(&[("aws", "1.0.0")]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unusable requirement"));
    }

    #[test]
    fn test_deserialize_manifest_mod() {
        let raw = r#"{
            "name": "root",
            "require": {"plugins": [{"name": "aws", "min_version": "0.100"}]},
            "mods": {
                "github.com/acme/net": {"name": "net", "dependency_name": "github.com/acme/net"}
            }
        }"#;
        let m: Mod = serde_json::from_str(raw).unwrap();
        assert_eq!(m.display_name(), "root");
        assert_eq!(m.require.plugins.len(), 1);
        assert!(m.mods.contains_key("github.com/acme/net"));
    }
}
