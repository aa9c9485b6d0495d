//! End-to-end runs of recipes over temporary projects

use nodemod_config::AppConfig;
use nodemod_recipes::{find_recipe, run_recipe};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config(dry_run: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.run.dry_run = dry_run;
    config.run.install = false;
    config
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn test_rewrites_files_and_counts_outcomes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.js", "const util = require('util');\nutil.isArray(x);\n");
    write(dir.path(), "src/b.js", "console.log('nothing to do');\n");
    write(dir.path(), "node_modules/dep/index.js", "const util = require('util');\nutil.isArray(x);\n");

    let report = run_recipe(
        find_recipe("util-is").unwrap(),
        &[dir.path().to_path_buf()],
        &config(false),
    )
    .await
    .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.changed(), 1);
    assert_eq!(report.unchanged, 1);
    assert!(!report.has_failures());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/a.js")).unwrap(),
        "Array.isArray(x);\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("node_modules/dep/index.js")).unwrap(),
        "const util = require('util');\nutil.isArray(x);\n"
    );
}

#[tokio::test]
async fn test_dry_run_leaves_files_alone() {
    let dir = tempdir().unwrap();
    let source = "const os = require('os');\nos.tmpDir();\n";
    write(dir.path(), "index.js", source);

    let report = run_recipe(
        find_recipe("tmpdir-to-tmpdir").unwrap(),
        &[dir.path().to_path_buf()],
        &config(true),
    )
    .await
    .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.changed_files, vec![dir.path().join("index.js")]);
    assert_eq!(fs::read_to_string(dir.path().join("index.js")).unwrap(), source);
}

#[tokio::test]
async fn test_parse_failure_is_reported() {
    let dir = tempdir().unwrap();
    write(dir.path(), "broken.js", "const = ;\n");
    write(dir.path(), "fine.js", "const util = require('util');\nutil.log(1);\n");

    let report = run_recipe(
        find_recipe("util-log-to-console-log").unwrap(),
        &[dir.path().to_path_buf()],
        &config(false),
    )
    .await
    .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, dir.path().join("broken.js"));
    assert_eq!(report.changed(), 1);
}

#[tokio::test]
async fn test_obsolete_dependency_removed_from_package_json() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "package.json",
        "{\n  \"name\": \"demo\",\n  \"dependencies\": {\n    \"chalk\": \"^5.3.0\",\n    \"express\": \"^4.19.0\"\n  }\n}\n",
    );
    write(
        dir.path(),
        "src/log.mjs",
        "import chalk from 'chalk';\nconsole.log(chalk.red('failed'));\n",
    );

    let report = run_recipe(
        find_recipe("chalk-to-util-styletext").unwrap(),
        &[dir.path().join("src")],
        &config(false),
    )
    .await
    .unwrap();

    assert_eq!(report.removed_dependencies, vec!["chalk".to_string()]);
    assert_eq!(
        fs::read_to_string(dir.path().join("src/log.mjs")).unwrap(),
        "import { styleText } from 'node:util';\nconsole.log(styleText('red', 'failed'));\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("package.json")).unwrap(),
        "{\n  \"name\": \"demo\",\n  \"dependencies\": {\n    \"express\": \"^4.19.0\"\n  }\n}\n"
    );
}

#[tokio::test]
async fn test_dependency_kept_while_still_imported() {
    let dir = tempdir().unwrap();
    let manifest = "{\n  \"dependencies\": {\n    \"chalk\": \"^5.3.0\"\n  }\n}\n";
    write(dir.path(), "package.json", manifest);
    write(
        dir.path(),
        "a.mjs",
        "import chalk from 'chalk';\nchalk.rgb(1, 2, 3)('x');\n",
    );

    let report = run_recipe(
        find_recipe("chalk-to-util-styletext").unwrap(),
        &[dir.path().to_path_buf()],
        &config(false),
    )
    .await
    .unwrap();

    assert!(report.removed_dependencies.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), manifest);
}

#[tokio::test]
async fn test_jest_dependency_kept_when_usages_remain() {
    let dir = tempdir().unwrap();
    let manifest = "{\n  \"devDependencies\": {\n    \"@jest/globals\": \"^29.7.0\"\n  }\n}\n";
    write(dir.path(), "package.json", manifest);
    write(
        dir.path(),
        "math.test.js",
        "import { expect, test } from '@jest/globals';\ntest('close', () => {\n  expect(0.1 + 0.2).toBeCloseTo(0.3);\n});\n",
    );

    let report = run_recipe(
        find_recipe("jest-to-node-test").unwrap(),
        &[dir.path().to_path_buf()],
        &config(false),
    )
    .await
    .unwrap();

    assert_eq!(report.changed(), 1);
    assert!(report.removed_dependencies.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("math.test.js")).unwrap(),
        "import { test } from 'node:test';\nimport { expect } from '@jest/globals';\ntest('close', () => {\n  expect(0.1 + 0.2).toBeCloseTo(0.3);\n});\n"
    );
    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), manifest);
}

#[tokio::test]
async fn test_nested_calls_do_not_fail_the_file() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "link.js",
        "const url = require('url');\nmodule.exports = url.parse(url.resolve(base, rel));\n",
    );

    let report = run_recipe(
        find_recipe("node-url-to-whatwg-url").unwrap(),
        &[dir.path().to_path_buf()],
        &config(false),
    )
    .await
    .unwrap();

    assert!(!report.has_failures());
    assert_eq!(
        fs::read_to_string(dir.path().join("link.js")).unwrap(),
        "module.exports = new URL(new URL(rel, base).href);\n"
    );
}
