//! `process.mainModule` (DEP0138)

use super::support::finish;
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::member_exprs;
use nodemod_ast::{
    declared_names, module_dependencies, resolve_binding_paths, ModuleKind, SourceRoot,
};
use nodemod_foundation::NodemodResult;
use tracing::warn;

pub struct ProcessMainModule;

impl Recipe for ProcessMainModule {
    fn name(&self) -> &'static str {
        "process-main-module"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let dependencies = module_dependencies(root, "process");
        let mut paths = resolve_binding_paths(&dependencies, "$.mainModule");
        // the global, unless a local variable named `process` hides it
        if dependencies.is_empty() && !declared_names(root).contains("process") {
            paths.push("process.mainModule".to_string());
        }

        let members: Vec<_> = paths
            .iter()
            .flat_map(|path| member_exprs(root, path))
            .collect();
        if members.is_empty() {
            return Ok(None);
        }

        if root.module_kind() == ModuleKind::Esm {
            warn!(
                path = %root.path().display(),
                "process.mainModule has no equivalent in ES modules, use import.meta.main"
            );
            return Ok(None);
        }

        let edits = members
            .iter()
            .map(|member| root.replace(member.span, "require.main"))
            .collect();
        finish(root, edits, &["process"])
    }
}

nodemod_recipe! {
    name: "process-main-module",
    description: "Replace process.mainModule with require.main in CommonJS",
    deprecations: ["DEP0138"],
    factory: || Box::new(ProcessMainModule),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::support::testing::transform;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_global_process() {
        let input = "if (process.mainModule === module) {\n  main();\n}\n";
        let expected = "if (require.main === module) {\n  main();\n}\n";
        assert_eq!(
            transform(&ProcessMainModule, "test.cjs", input).unwrap(),
            expected
        );
    }

    #[test]
    fn test_required_process() {
        let input = "const process = require('node:process');\nconst entry = process.mainModule.filename;\n";
        let expected = "const entry = require.main.filename;\n";
        assert_eq!(
            transform(&ProcessMainModule, "test.js", input).unwrap(),
            expected
        );
    }

    #[test]
    fn test_destructured_main_module() {
        let input = "const { mainModule, argv } = require('process');\nconsole.log(mainModule, argv);\n";
        assert_eq!(transform(&ProcessMainModule, "test.js", input), None);
    }

    #[test]
    fn test_es_module_is_skipped() {
        let input = "import fs from 'node:fs';\nconsole.log(process.mainModule);\n";
        assert_eq!(transform(&ProcessMainModule, "test.mjs", input), None);
    }

    #[test]
    fn test_plain_js_script() {
        let input = "if (process.mainModule === module) {\n  main();\n}\n";
        let expected = "if (require.main === module) {\n  main();\n}\n";
        assert_eq!(
            transform(&ProcessMainModule, "bin.js", input).unwrap(),
            expected
        );
    }
}
