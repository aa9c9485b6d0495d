//! `os.tmpDir()` (DEP0022)

use super::support::rename_export;
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;

pub struct TmpDirToTmpdir;

impl Recipe for TmpDirToTmpdir {
    fn name(&self) -> &'static str {
        "tmpdir-to-tmpdir"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let edits = rename_export(root, "os", "tmpDir", "tmpdir");
        if edits.is_empty() {
            return Ok(None);
        }
        root.commit(edits).map(Some)
    }
}

nodemod_recipe! {
    name: "tmpdir-to-tmpdir",
    description: "Rename os.tmpDir() to os.tmpdir()",
    deprecations: ["DEP0022"],
    factory: || Box::new(TmpDirToTmpdir),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::support::testing::transform;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Option<String> {
        transform(&TmpDirToTmpdir, "test.js", source)
    }

    #[test]
    fn test_module_object() {
        assert_eq!(
            run("import os from 'node:os';\nconst dir = os.tmpDir();\n").unwrap(),
            "import os from 'node:os';\nconst dir = os.tmpdir();\n"
        );
    }

    #[test]
    fn test_named_binding_and_uses() {
        assert_eq!(
            run("const { tmpDir } = require('os');\nconst dir = tmpDir();\n").unwrap(),
            "const { tmpdir } = require('os');\nconst dir = tmpdir();\n"
        );
    }

    #[test]
    fn test_aliased_binding_keeps_alias() {
        assert_eq!(
            run("import { tmpDir as tmp } from 'os';\ntmp();\n").unwrap(),
            "import { tmpdir as tmp } from 'os';\ntmp();\n"
        );
    }

    #[test]
    fn test_conflicting_name_keeps_local() {
        assert_eq!(
            run("const { tmpDir } = require('os');\nconst tmpdir = tmpDir();\n").unwrap(),
            "const { tmpdir: tmpDir } = require('os');\nconst tmpdir = tmpDir();\n"
        );
    }

    #[test]
    fn test_reference_without_call() {
        assert_eq!(
            run("const os = require('os');\nconst get = os.tmpDir;\n").unwrap(),
            "const os = require('os');\nconst get = os.tmpdir;\n"
        );
    }

    #[test]
    fn test_nothing_to_do() {
        assert_eq!(run("const os = require('os');\nos.tmpdir();\n"), None);
    }
}
