//! `util.types.isNativeError()` (DEP0197)

use super::support::{export_calls, finish, replace_callee};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;

pub struct UtilTypesIsNativeError;

impl Recipe for UtilTypesIsNativeError {
    fn name(&self) -> &'static str {
        "util-types-is-native-error"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let mut calls = export_calls(root, "util", &["types.isNativeError"]);
        calls.extend(export_calls(root, "util/types", &["isNativeError"]));

        let edits = calls
            .iter()
            .map(|found| replace_callee(root, &found.call, "Error.isError"))
            .collect();

        finish(root, edits, &["util", "util/types"])
    }
}

nodemod_recipe! {
    name: "util-types-is-native-error",
    description: "Replace util.types.isNativeError() with Error.isError()",
    deprecations: ["DEP0197"],
    factory: || Box::new(UtilTypesIsNativeError),
}
