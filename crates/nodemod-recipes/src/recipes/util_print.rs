//! `util.print()`, `util.puts()`, `util.debug()` and `util.error()`
//! (DEP0026 to DEP0029)

use super::support::{export_calls, finish, replace_callee};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;

pub struct UtilPrintToConsoleLog;

impl Recipe for UtilPrintToConsoleLog {
    fn name(&self) -> &'static str {
        "util-print-to-console-log"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let edits = export_calls(root, "util", &["print", "puts", "debug", "error"])
            .iter()
            .map(|found| {
                let console = match found.export {
                    "debug" | "error" => "console.error",
                    _ => "console.log",
                };
                replace_callee(root, &found.call, console)
            })
            .collect();

        finish(root, edits, &["util"])
    }
}

nodemod_recipe! {
    name: "util-print-to-console-log",
    description: "Replace util.print/puts/debug/error with console.log and console.error",
    deprecations: ["DEP0026", "DEP0027", "DEP0028", "DEP0029"],
    factory: || Box::new(UtilPrintToConsoleLog),
}
