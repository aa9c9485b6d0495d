//! `module.createRequireFromPath()` (DEP0130)

use super::support::rename_export;
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;

pub struct CreateRequireFromPath;

impl Recipe for CreateRequireFromPath {
    fn name(&self) -> &'static str {
        "create-require-from-path"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let edits = rename_export(root, "module", "createRequireFromPath", "createRequire");
        if edits.is_empty() {
            return Ok(None);
        }
        root.commit(edits).map(Some)
    }
}

nodemod_recipe! {
    name: "create-require-from-path",
    description: "Replace module.createRequireFromPath() with module.createRequire()",
    deprecations: ["DEP0130"],
    factory: || Box::new(CreateRequireFromPath),
}
