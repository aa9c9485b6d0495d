//! `util._extend()` (DEP0060)

use super::support::{export_calls, finish, replace_callee};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;

pub struct UtilExtendToObjectAssign;

impl Recipe for UtilExtendToObjectAssign {
    fn name(&self) -> &'static str {
        "util-extend-to-object-assign"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let edits = export_calls(root, "util", &["_extend"])
            .iter()
            .map(|found| replace_callee(root, &found.call, "Object.assign"))
            .collect();

        finish(root, edits, &["util"])
    }
}

nodemod_recipe! {
    name: "util-extend-to-object-assign",
    description: "Replace util._extend() with Object.assign()",
    deprecations: ["DEP0060"],
    factory: || Box::new(UtilExtendToObjectAssign),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::support::testing::transform;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extend_calls() {
        let input = "const util = require('node:util');\nconst merged = util._extend({}, defaults);\nutil._extend(target, { a: 1 });\n";
        let expected = "const merged = Object.assign({}, defaults);\nObject.assign(target, { a: 1 });\n";
        assert_eq!(
            transform(&UtilExtendToObjectAssign, "test.js", input).unwrap(),
            expected
        );
    }

    #[test]
    fn test_binding_still_used_is_kept() {
        let input = "const util = require('util');\nutil._extend(a, b);\nutil.inspect(a);\n";
        let expected = "const util = require('util');\nObject.assign(a, b);\nutil.inspect(a);\n";
        assert_eq!(
            transform(&UtilExtendToObjectAssign, "test.js", input).unwrap(),
            expected
        );
    }
}
