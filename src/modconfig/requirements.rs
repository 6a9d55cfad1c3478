//! Recursive requirement validation over a mod dependency tree.

use super::mod_def::{Mod, PluginVersionMap};
use super::tree::walk_dependency_tree;

/// Validate `root` and every reachable dependency mod against the installed
/// plugin versions, returning one message per violation.
///
/// Each dependency is validated once, even when it is reachable via several
/// paths or the tree loops back on itself. Local aliases and self-named
/// children are not dependencies and are skipped.
pub fn validate_mod_requirements_recursively(
    root: &Mod,
    plugin_versions: &PluginVersionMap,
) -> Vec<String> {
    let mut validation_errors = Vec::new();
    walk_dependency_tree(root, |m| {
        validation_errors.extend(m.validate_requirements(plugin_versions));
    });
    validation_errors
}
