//! Running a recipe over a directory tree
//!
//! Files are discovered with `walkdir`, read and written with `tokio::fs`
//! and transformed one after another. A file that fails to parse or
//! transform is recorded in the report and never aborts the run.
//!
//! When the recipe replaces an npm package (`chalk`, `@jest/globals`) and
//! the whole run succeeded without any file still importing it, the package
//! is removed from the nearest package.json of every processed file and the
//! project's package manager is run to update the lock file.

use crate::recipe::{Recipe, RecipeDescriptor};
use nodemod_ast::{module_dependencies, SourceRoot};
use nodemod_config::logging::file_span;
use nodemod_config::AppConfig;
use nodemod_foundation::NodemodResult;
use nodemod_package_json::{
    detect_for_manifest, find_package_json, install, PackageJson,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A file the recipe could not process
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one recipe run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub recipe: String,
    pub dry_run: bool,
    /// Files parsed and handed to the recipe
    pub scanned: usize,
    pub changed_files: Vec<PathBuf>,
    pub unchanged: usize,
    pub failed: Vec<FileFailure>,
    /// Obsolete packages removed from package.json
    pub removed_dependencies: Vec<String>,
    /// package.json files rewritten (or that would be, in a dry run)
    pub updated_manifests: Vec<PathBuf>,
}

impl RunReport {
    pub fn changed(&self) -> usize {
        self.changed_files.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Files under `paths` with a handled extension, sorted.
///
/// Paths naming a file are taken as is. Directories listed in
/// `run.ignore_dirs` are not descended into.
pub fn discover_files(paths: &[PathBuf], config: &AppConfig) -> Vec<PathBuf> {
    let handled = |path: &Path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.handles_extension(ext))
    };

    let mut files = BTreeSet::new();
    for path in paths {
        if path.is_file() {
            if handled(path) {
                files.insert(path.clone());
            } else {
                debug!(path = %path.display(), "Skipping file with unhandled extension");
            }
            continue;
        }

        let entries = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry.file_name().to_str().is_some_and(|name| config.ignores_dir(name))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    None
                }
            });

        for entry in entries {
            if entry.file_type().is_file() && handled(entry.path()) {
                files.insert(entry.into_path());
            }
        }
    }
    files.into_iter().collect()
}

/// Result of transforming one file
struct FileResult {
    output: Option<String>,
    /// Obsolete packages the final source still imports
    still_imported: Vec<&'static str>,
}

fn transform_file(
    recipe: &dyn Recipe,
    path: &Path,
    source: String,
) -> NodemodResult<FileResult> {
    let span = file_span(recipe.name(), &path.display().to_string());
    let _enter = span.enter();

    let root = SourceRoot::parse(path, source)?;
    let output = recipe
        .transform(&root)?
        .filter(|output| output != root.source());

    let final_root = match &output {
        Some(output) => root.reparse(output.clone())?,
        None => root,
    };
    let still_imported = recipe
        .obsolete_dependencies()
        .iter()
        .copied()
        .filter(|package| !module_dependencies(&final_root, package).is_empty())
        .collect();

    Ok(FileResult {
        output,
        still_imported,
    })
}

/// Apply `descriptor`'s recipe to every file under `paths`
pub async fn run_recipe(
    descriptor: &RecipeDescriptor,
    paths: &[PathBuf],
    config: &AppConfig,
) -> NodemodResult<RunReport> {
    let recipe = (descriptor.factory)();
    let dry_run = config.run.dry_run;
    let mut report = RunReport {
        recipe: descriptor.name.to_string(),
        dry_run,
        ..Default::default()
    };

    let files = discover_files(paths, config);
    info!(recipe = descriptor.name, files = files.len(), dry_run, "Running recipe");

    let mut still_imported: BTreeSet<&'static str> = BTreeSet::new();
    let mut manifests: BTreeSet<PathBuf> = BTreeSet::new();

    for path in files {
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read file");
                report.failed.push(FileFailure {
                    path,
                    error: e.to_string(),
                });
                continue;
            }
        };
        report.scanned += 1;

        if let Some(manifest) = path.parent().and_then(find_package_json) {
            manifests.insert(manifest);
        }

        let result = match transform_file(recipe.as_ref(), &path, source) {
            Ok(result) => result,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to transform file");
                report.failed.push(FileFailure {
                    path,
                    error: e.to_string(),
                });
                continue;
            }
        };
        still_imported.extend(result.still_imported);

        match result.output {
            Some(output) => {
                if !dry_run {
                    if let Err(e) = tokio::fs::write(&path, output).await {
                        warn!(path = %path.display(), error = %e, "Failed to write file");
                        report.failed.push(FileFailure {
                            path,
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
                info!(path = %path.display(), "Transformed");
                report.changed_files.push(path);
            }
            None => report.unchanged += 1,
        }
    }

    if config.run.update_package_json {
        remove_obsolete_dependencies(recipe.as_ref(), &still_imported, &manifests, config, &mut report)
            .await;
    }

    info!(
        recipe = descriptor.name,
        scanned = report.scanned,
        changed = report.changed(),
        failed = report.failed.len(),
        "Recipe finished"
    );
    Ok(report)
}

async fn remove_obsolete_dependencies(
    recipe: &dyn Recipe,
    still_imported: &BTreeSet<&'static str>,
    manifests: &BTreeSet<PathBuf>,
    config: &AppConfig,
    report: &mut RunReport,
) {
    let obsolete = recipe.obsolete_dependencies();
    if obsolete.is_empty() {
        return;
    }
    if report.has_failures() {
        warn!(
            failed = report.failed.len(),
            "Some files failed, keeping dependencies in package.json"
        );
        return;
    }

    let removable: Vec<&str> = obsolete
        .iter()
        .copied()
        .filter(|package| {
            let used = still_imported.contains(package);
            if used {
                warn!(package, "Still imported after the rewrite, keeping it in package.json");
            }
            !used
        })
        .collect();
    if removable.is_empty() {
        return;
    }

    for manifest_path in manifests {
        if let Err(e) = update_manifest(manifest_path, &removable, config, report).await {
            warn!(path = %manifest_path.display(), error = %e, "Failed to update package.json");
        }
    }
}

async fn update_manifest(
    manifest_path: &Path,
    removable: &[&str],
    config: &AppConfig,
    report: &mut RunReport,
) -> NodemodResult<()> {
    let original = PackageJson::load(manifest_path).await?;
    let mut updated = original.clone();
    let removed: Vec<&str> = removable
        .iter()
        .copied()
        .filter(|package| updated.remove_dependency(package))
        .collect();
    if removed.is_empty() {
        return Ok(());
    }

    for package in &removed {
        if !report.removed_dependencies.iter().any(|p| p == package) {
            report.removed_dependencies.push(package.to_string());
        }
    }
    report.updated_manifests.push(manifest_path.to_path_buf());

    if config.run.dry_run {
        info!(path = %manifest_path.display(), packages = ?removed, "Would remove dependencies");
        return Ok(());
    }

    updated.save(manifest_path).await?;
    info!(path = %manifest_path.display(), packages = ?removed, "Removed dependencies");

    if config.run.install {
        let project = manifest_path.parent().unwrap_or(Path::new("."));
        let manager = detect_for_manifest(project, &original);
        if let Err(e) = install(project, manager).await {
            warn!(error = %e, "Dependency install failed, run it manually");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_files_honors_config() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/lib")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/index.js"), "").unwrap();
        fs::write(dir.path().join("src/lib/a.mts"), "").unwrap();
        fs::write(dir.path().join("src/readme.md"), "").unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "").unwrap();

        let files = discover_files(&[dir.path().to_path_buf()], &AppConfig::default());
        assert_eq!(
            files,
            vec![
                dir.path().join("src/index.js"),
                dir.path().join("src/lib/a.mts"),
            ]
        );
    }

    #[test]
    fn test_discover_explicit_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("main.cjs");
        fs::write(&file, "").unwrap();
        let files = discover_files(&[file.clone(), file.clone()], &AppConfig::default());
        assert_eq!(files, vec![file]);
    }
}
