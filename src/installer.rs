//! Workspace dependency installation.
//!
//! The orchestrator only needs the [`DependencyInstaller`] seam. The
//! [`LockfileInstaller`] shipped here works offline: it resolves every mod
//! requirement in the workspace tree against the workspace lock.

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::modconfig::version::{parse_constraint, satisfies};
use crate::modconfig::{walk_dependency_tree, Mod, ModRequirement};
use crate::workspace::Workspace;

/// Installation options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOpts {
    /// Record per-dependency failures in the report instead of failing the
    /// whole install
    pub force: bool,
}

/// Outcome of an install call that did not fail outright
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// `name@version` of every dependency that is in place
    pub installed: Vec<String>,
    /// Per-dependency failures tolerated because of `force`
    pub failures: Vec<String>,
}

impl InstallReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[async_trait]
pub trait DependencyInstaller: Send + Sync {
    /// Install the workspace's mod dependencies. An `Err` means the install
    /// could not be carried out at all.
    async fn install(
        &self,
        cancel: &CancellationToken,
        workspace: &Workspace,
        opts: InstallOpts,
    ) -> Result<InstallReport>;
}

/// Installer that checks declared mod requirements against the lock
#[derive(Debug, Default, Clone)]
pub struct LockfileInstaller;

#[async_trait]
impl DependencyInstaller for LockfileInstaller {
    async fn install(
        &self,
        cancel: &CancellationToken,
        workspace: &Workspace,
        opts: InstallOpts,
    ) -> Result<InstallReport> {
        if cancel.is_cancelled() {
            bail!("dependency installation cancelled");
        }

        let Some(lock) = workspace.lock() else {
            bail!(
                "workspace {:?} has no dependency lock",
                workspace.path()
            );
        };

        let mut report = InstallReport::default();
        for (requirer, requirement) in collect_mod_requirements(workspace.root_mod()) {
            let Some(resolved) = lock.mods.get(&requirement.name) else {
                report.failures.push(format!(
                    "mod '{}' requires {} which is not in the lock",
                    requirer, requirement.name
                ));
                continue;
            };

            let satisfied = match parse_constraint(&requirement.version) {
                Ok(constraint) => satisfies(&constraint, resolved),
                Err(e) => {
                    report.failures.push(format!("mod '{}': {}", requirer, e));
                    continue;
                }
            };

            if satisfied {
                debug!("{}@{} satisfies {}", requirement.name, resolved, requirement.version);
                report.installed.push(format!("{}@{}", requirement.name, resolved));
            } else {
                report.failures.push(format!(
                    "mod '{}' requires {} version {}, but the lock has {}",
                    requirer, requirement.name, requirement.version, resolved
                ));
            }
        }

        if report.has_failures() {
            if !opts.force {
                bail!(
                    "failed to install dependencies:\n{}",
                    report.failures.join("\n")
                );
            }
            warn!(
                "{} dependency failure(s) ignored by forced install",
                report.failures.len()
            );
        }

        report.installed.sort();
        report.installed.dedup();
        info!("{} workspace dependencies installed", report.installed.len());
        Ok(report)
    }
}

/// Every `(requiring mod, requirement)` pair in the dependency tree
fn collect_mod_requirements(root: &Mod) -> Vec<(String, ModRequirement)> {
    let mut requirements = Vec::new();
    walk_dependency_tree(root, |m| {
        for requirement in &m.require.mods {
            requirements.push((m.display_name().to_string(), requirement.clone()));
        }
    });
    requirements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceLock;

    fn workspace_with_lock(mods: &[(&str, &str)]) -> Workspace {
        let net = Mod::new("net", "github.com/acme/net").with_mod_requirement("github.com/acme/common", ">=2");
        let root = Mod::new("root", "")
            .with_mod_requirement("github.com/acme/net", "^1.2")
            .with_child("github.com/acme/net", net);

        let lock = WorkspaceLock {
            mods: mods
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        Workspace::new("/tmp/ws", root).with_lock(lock)
    }

    #[tokio::test]
    async fn test_all_requirements_locked() {
        let workspace = workspace_with_lock(&[
            ("github.com/acme/net", "1.2.3"),
            ("github.com/acme/common", "2.0.0"),
        ]);
        let report = LockfileInstaller
            .install(&CancellationToken::new(), &workspace, InstallOpts::default())
            .await
            .unwrap();

        assert!(!report.has_failures());
        assert_eq!(
            report.installed,
            vec!["github.com/acme/common@2.0.0", "github.com/acme/net@1.2.3"]
        );
    }

    #[tokio::test]
    async fn test_failures_are_fatal_without_force() {
        let workspace = workspace_with_lock(&[("github.com/acme/net", "1.2.3")]);
        let err = LockfileInstaller
            .install(&CancellationToken::new(), &workspace, InstallOpts::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("github.com/acme/common which is not in the lock"));
    }

    #[tokio::test]
    async fn test_force_records_failures() {
        let workspace = workspace_with_lock(&[
            ("github.com/acme/net", "2.0.0"),
            ("github.com/acme/common", "2.1.0"),
        ]);
        let report = LockfileInstaller
            .install(&CancellationToken::new(), &workspace, InstallOpts { force: true })
            .await
            .unwrap();

        assert_eq!(report.installed, vec!["github.com/acme/common@2.1.0"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("requires github.com/acme/net version ^1.2"));
    }

    #[tokio::test]
    async fn test_requirements_of_unnamed_nested_mod_are_checked() {
        let unnamed = Mod::new("b", "").with_mod_requirement("github.com/acme/common", ">=2");
        let a = Mod::new("a", "github.com/acme/a").with_child("github.com/acme/b", unnamed);
        let root = Mod::new("root", "").with_child("github.com/acme/a", a);
        let workspace = Workspace::new("/tmp/ws", root).with_lock(WorkspaceLock::default());

        let report = LockfileInstaller
            .install(&CancellationToken::new(), &workspace, InstallOpts { force: true })
            .await
            .unwrap();

        assert_eq!(
            report.failures,
            vec!["mod 'b' requires github.com/acme/common which is not in the lock"]
        );
    }

    #[tokio::test]
    async fn test_missing_lock_is_an_error() {
        let workspace = Workspace::new("/tmp/ws", Mod::new("root", ""));
        let result = LockfileInstaller
            .install(&CancellationToken::new(), &workspace, InstallOpts { force: true })
            .await;
        assert!(result.unwrap_err().to_string().contains("has no dependency lock"));
    }

    #[tokio::test]
    async fn test_cancelled_install() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let workspace = workspace_with_lock(&[]);
        let result = LockfileInstaller
            .install(&cancel, &workspace, InstallOpts { force: true })
            .await;
        assert!(result.is_err());
    }
}
