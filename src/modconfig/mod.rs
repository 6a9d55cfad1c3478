//! Mod model and requirement validation.
//!
//! Mods are loaded by the workspace loader; this module only inspects them.

mod mod_def;
mod requirements;
mod tree;
pub mod version;

pub use mod_def::{Mod, ModRequirement, PluginRequirement, PluginVersionMap, Require};
pub use requirements::validate_mod_requirements_recursively;
pub use tree::{walk_dependency_tree, LOCAL_MOD_ALIAS};
