//! `buffer.atob()` and `buffer.btoa()` (DEP0165)
//!
//! Both are globals, so calls through the `buffer` module are rewritten to
//! the global functions and the imports dropped.

use super::support::{export_calls, finish, replace_callee};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::{module_dependencies, remove_binding, SourceRoot};
use nodemod_foundation::NodemodResult;

const GLOBALS: &[&str] = &["atob", "btoa"];

pub struct BufferAtobBtoa;

impl Recipe for BufferAtobBtoa {
    fn name(&self) -> &'static str {
        "buffer-atob-btoa"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        // `import { atob } from 'buffer'` shadows the global of the same name
        let shadowing: Vec<String> = module_dependencies(root, "buffer")
            .iter()
            .flat_map(|dep| {
                GLOBALS
                    .iter()
                    .filter(|name| dep.named_local(name) == Some(**name))
                    .map(|name| name.to_string())
                    .collect::<Vec<_>>()
            })
            .collect();

        let edits: Vec<_> = export_calls(root, "buffer", GLOBALS)
            .iter()
            .filter(|found| found.callee != found.export)
            .map(|found| replace_callee(root, &found.call, found.export))
            .collect();

        if edits.is_empty() && shadowing.is_empty() {
            return Ok(None);
        }

        let source = finish(root, edits, &["buffer"])?.unwrap_or_else(|| root.source().to_string());
        let source = drop_shadowing(root.reparse(source)?, &shadowing)?.into_source();
        Ok((source != root.source()).then_some(source))
    }
}

/// Remove named bindings that only shadow the globals. The uses stay and
/// now refer to the globals.
fn drop_shadowing(mut root: SourceRoot, names: &[String]) -> NodemodResult<SourceRoot> {
    for name in names {
        let Some(dep) = module_dependencies(&root, "buffer")
            .into_iter()
            .find(|dep| dep.named_local(name) == Some(name.as_str()))
        else {
            continue;
        };
        if let Some(edit) = remove_binding(&root, &dep, name) {
            root = root.reparse(root.commit(vec![edit])?)?;
        }
    }
    Ok(root)
}

nodemod_recipe! {
    name: "buffer-atob-btoa",
    description: "Replace buffer.atob() and buffer.btoa() with the global functions",
    deprecations: ["DEP0165"],
    factory: || Box::new(BufferAtobBtoa),
}
