//! Package manager detection and install
//!
//! The package manager of a project is taken from the corepack
//! `packageManager` field of package.json when present, otherwise from the
//! lock file next to it.

use crate::manifest::PackageJson;
use nodemod_foundation::{NodemodError, NodemodResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Node.js package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Executable name
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// Lock files written by this package manager
    pub fn lock_files(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Npm => &["package-lock.json", "npm-shrinkwrap.json"],
            PackageManager::Yarn => &["yarn.lock"],
            PackageManager::Pnpm => &["pnpm-lock.yaml"],
            PackageManager::Bun => &["bun.lockb", "bun.lock"],
        }
    }

    /// Arguments of the install command
    pub fn install_args(&self) -> &'static [&'static str] {
        &["install"]
    }

    /// Parse the corepack `packageManager` field, e.g. `yarn@4.1.0`
    pub fn from_field(field: &str) -> Option<Self> {
        let name = field.split('@').next()?.trim();
        match name {
            "npm" => Some(PackageManager::Npm),
            "yarn" => Some(PackageManager::Yarn),
            "pnpm" => Some(PackageManager::Pnpm),
            "bun" => Some(PackageManager::Bun),
            _ => None,
        }
    }

    /// Whether the executable is on `PATH`
    pub fn is_available(&self) -> bool {
        which::which(self.as_str()).is_ok()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the package manager of the project in `project_path`.
///
/// Lock files are checked in the order bun, pnpm, yarn, npm; a project
/// without any lock file uses npm.
pub fn detect_package_manager(project_path: &Path) -> PackageManager {
    debug!(path = %project_path.display(), "Detecting package manager");

    for manager in [
        PackageManager::Bun,
        PackageManager::Pnpm,
        PackageManager::Yarn,
        PackageManager::Npm,
    ] {
        if let Some(lock) = manager
            .lock_files()
            .iter()
            .find(|lock| project_path.join(lock).exists())
        {
            debug!(lock_file = *lock, manager = %manager, "Detected package manager from lock file");
            return manager;
        }
    }

    debug!("No lock file found, defaulting to npm");
    PackageManager::Npm
}

/// Like [`detect_package_manager`], but a `packageManager` field of the
/// manifest wins over lock files
pub fn detect_for_manifest(project_path: &Path, manifest: &PackageJson) -> PackageManager {
    if let Some(manager) = manifest
        .package_manager_field()
        .and_then(PackageManager::from_field)
    {
        debug!(manager = %manager, "Using packageManager field");
        return manager;
    }
    detect_package_manager(project_path)
}

/// Run `<manager> install` in `project_path`
pub async fn install(project_path: &Path, manager: PackageManager) -> NodemodResult<()> {
    if !manager.is_available() {
        return Err(NodemodError::package_manager(
            project_path,
            format!("{} is not installed", manager),
        ));
    }

    info!(manager = %manager, path = %project_path.display(), "Installing dependencies");

    let output = tokio::process::Command::new(manager.as_str())
        .args(manager.install_args())
        .current_dir(project_path)
        .output()
        .await
        .map_err(|e| {
            NodemodError::package_manager(project_path, format!("Failed to run {}: {}", manager, e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NodemodError::package_manager(
            project_path,
            format!(
                "{} install failed with exit code {:?}: {}",
                manager,
                output.status.code(),
                stderr.trim()
            ),
        ));
    }

    debug!(manager = %manager, "Install completed successfully");
    Ok(())
}
