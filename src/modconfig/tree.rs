//! Traversal of a mod dependency tree.

use std::collections::HashSet;

use tracing::debug;

use super::mod_def::Mod;

/// Key the workspace loader uses to alias the workspace mod itself
pub const LOCAL_MOD_ALIAS: &str = "local";

/// Visit `root` and every reachable dependency mod, depth first, children in
/// map order.
///
/// Dependencies are identified by the key they are stored under in their
/// parent, so a dependency reachable via several paths (or looping back on
/// itself) is visited once. Children keyed `local`, and children carrying
/// their parent's dependency name, are artifacts of resource loading rather
/// than real dependency edges and are not visited.
pub fn walk_dependency_tree<'a>(root: &'a Mod, mut visit: impl FnMut(&'a Mod)) {
    let mut visited: HashSet<&str> = HashSet::new();
    if !root.dependency_name.is_empty() {
        visited.insert(root.dependency_name.as_str());
    }

    let mut stack: Vec<(Option<&str>, &Mod)> = vec![(None, root)];
    while let Some((key, m)) = stack.pop() {
        if let Some(key) = key {
            if !visited.insert(key) {
                debug!("Skipping already visited mod {}", key);
                continue;
            }
        }

        visit(m);

        // reversed so children are popped in map order
        for (child_key, child) in m.mods.iter().rev() {
            if is_self_reference(m, child_key, child) {
                continue;
            }
            stack.push((Some(child_key.as_str()), child));
        }
    }
}

fn is_self_reference(parent: &Mod, key: &str, child: &Mod) -> bool {
    key == LOCAL_MOD_ALIAS || parent.dependency_name == child.dependency_name
}
