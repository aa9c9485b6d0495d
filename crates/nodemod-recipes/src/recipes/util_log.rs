//! `util.log()` (DEP0059)

use super::support::{export_calls, finish_inner_first};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::args_text;
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;

/// The timestamp `util.log()` used to prefix its output with
const TIMESTAMP: &str = "new Date().toLocaleString()";

pub struct UtilLogToConsoleLog;

impl Recipe for UtilLogToConsoleLog {
    fn name(&self) -> &'static str {
        "util-log-to-console-log"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        finish_inner_first(root, &["util"], |root| {
            export_calls(root, "util", &["log"])
                .iter()
                .map(|found| {
                    let args = args_text(root, &found.call.args);
                    let replacement = if args.is_empty() {
                        format!("console.log({})", TIMESTAMP)
                    } else {
                        format!("console.log({}, {})", TIMESTAMP, args)
                    };
                    root.replace(found.call.span, replacement)
                })
                .collect()
        })
    }
}

nodemod_recipe! {
    name: "util-log-to-console-log",
    description: "Replace util.log() with a timestamped console.log()",
    deprecations: ["DEP0059"],
    factory: || Box::new(UtilLogToConsoleLog),
}
