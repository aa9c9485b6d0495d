//! Recursive `fs.rmdir()` (DEP0147)
//!
//! `fs.rmdir(path, { recursive: true })` becomes
//! `fs.rm(path, { recursive: true, force: true })`, for the callback, sync
//! and promise variants. Calls without `recursive: true` are left alone.

use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::calls_to;
use nodemod_ast::{
    ensure_named_import, module_dependencies, prune_unused_bindings, resolve_binding_candidates,
    used_bindings, SourceRoot,
};
use nodemod_foundation::{Edit, NodemodResult};
use swc_common::Spanned;
use swc_ecma_ast::{CallExpr, Expr, Lit, ObjectLit, Prop, PropName, PropOrSpread};
use tracing::debug;

/// (module, export path, replacement export)
const TARGETS: &[(&str, &str, &str)] = &[
    ("fs", "rmdir", "rm"),
    ("fs", "rmdirSync", "rmSync"),
    ("fs", "promises.rmdir", "promises.rm"),
    ("fs/promises", "rmdir", "rm"),
];

fn prop_key(prop: &Prop) -> Option<&str> {
    match prop {
        Prop::KeyValue(kv) => match &kv.key {
            PropName::Ident(ident) => Some(ident.sym.as_ref()),
            _ => None,
        },
        Prop::Shorthand(ident) => Some(ident.sym.as_ref()),
        _ => None,
    }
}

fn options(call: &CallExpr) -> Option<&ObjectLit> {
    match &*call.args.get(1)?.expr {
        Expr::Object(object) => Some(object),
        _ => None,
    }
}

/// Whether the options literal contains `recursive: true`
fn is_recursive(options: &ObjectLit) -> bool {
    options.props.iter().any(|prop| match prop {
        PropOrSpread::Prop(prop) => match &**prop {
            Prop::KeyValue(kv) => {
                matches!(&kv.key, PropName::Ident(ident) if ident.sym.as_ref() == "recursive")
                    && matches!(&*kv.value, Expr::Lit(Lit::Bool(b)) if b.value)
            }
            _ => false,
        },
        PropOrSpread::Spread(_) => false,
    })
}

fn has_key(options: &ObjectLit, key: &str) -> bool {
    options.props.iter().any(|prop| match prop {
        PropOrSpread::Prop(prop) => prop_key(prop) == Some(key),
        PropOrSpread::Spread(_) => false,
    })
}

fn add_force(root: &SourceRoot, options: &ObjectLit) -> Option<Edit> {
    if has_key(options, "force") {
        return None;
    }
    let last = options.props.last()?;
    Some(Edit::insert(root.range(last.span()).end, ", force: true"))
}

pub struct Rmdir;

impl Recipe for Rmdir {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let mut edits = Vec::new();
        // (module specifier, export) to import for rewritten destructured calls
        let mut imports: Vec<(String, &str)> = Vec::new();
        let mut candidates: Vec<String> = Vec::new();

        for (module, export, replacement) in TARGETS {
            let dependencies = module_dependencies(root, module);
            for dep in &dependencies {
                for callee in resolve_binding_candidates(dep, &format!("$.{}", export)) {
                    let is_local = !callee.contains('.');
                    if is_local && dep.named_local(export) != Some(callee.as_str()) {
                        debug!(callee = %callee, "Nested destructuring of rmdir is not rewritten");
                        continue;
                    }

                    for call in calls_to(root, &callee) {
                        let Some(options) = options(&call).filter(|o| is_recursive(o)) else {
                            continue;
                        };

                        let new_callee = if is_local {
                            imports.push((dep.specifier.clone(), *replacement));
                            candidates.push(callee.clone());
                            replacement.to_string()
                        } else {
                            let object = &callee[..callee.len() - export.len()];
                            format!("{}{}", object, replacement)
                        };
                        edits.push(root.replace(call.callee.span(), new_callee));
                        edits.extend(add_force(root, options));
                    }
                }
            }
        }

        if edits.is_empty() {
            return Ok(None);
        }

        let mut used: Vec<String> = used_bindings(root, "fs");
        used.extend(used_bindings(root, "fs/promises"));

        let mut updated = root.reparse(root.commit(edits)?)?;
        for (specifier, name) in imports {
            if let Some(edit) = ensure_named_import(&updated, &specifier, name) {
                updated = updated.reparse(updated.commit(vec![edit])?)?;
            }
        }
        updated = prune_unused_bindings(updated, "fs", &used)?;
        updated = prune_unused_bindings(updated, "fs/promises", &used)?;

        let source = updated.into_source();
        Ok((source != root.source()).then_some(source))
    }
}

nodemod_recipe! {
    name: "rmdir",
    description: "Replace recursive fs.rmdir() with fs.rm()",
    deprecations: ["DEP0147"],
    factory: || Box::new(Rmdir),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::support::testing::transform;
    use pretty_assertions::assert_eq;

    fn run(path: &str, source: &str) -> Option<String> {
        transform(&Rmdir, path, source)
    }

    #[test]
    fn test_module_object_variants() {
        let input = r#"const fs = require('node:fs');

fs.rmdir(dir, { recursive: true }, cb);
fs.rmdirSync(dir, { recursive: true });
async function clean() {
  await fs.promises.rmdir(dir, { recursive: true, maxRetries: 3 });
}
"#;
        let expected = r#"const fs = require('node:fs');

fs.rm(dir, { recursive: true, force: true }, cb);
fs.rmSync(dir, { recursive: true, force: true });
async function clean() {
  await fs.promises.rm(dir, { recursive: true, maxRetries: 3, force: true });
}
"#;
        assert_eq!(run("test.cjs", input).unwrap(), expected);
    }

    #[test]
    fn test_non_recursive_calls_untouched() {
        let input = "const fs = require('fs');\nfs.rmdir(dir, cb);\nfs.rmdirSync(dir, { recursive: false });\n";
        assert_eq!(run("test.js", input), None);
    }

    #[test]
    fn test_force_is_not_duplicated() {
        let input = "import fs from 'fs';\nfs.rmdirSync(dir, { force: true, recursive: true });\n";
        let expected = "import fs from 'fs';\nfs.rmSync(dir, { force: true, recursive: true });\n";
        assert_eq!(run("test.mjs", input).unwrap(), expected);
    }

    #[test]
    fn test_destructured_binding_is_replaced() {
        let input = "const { rmdirSync } = require('fs');\nrmdirSync(dir, { recursive: true });\n";
        let expected = "const { rmSync } = require('fs');\nrmSync(dir, { recursive: true, force: true });\n";
        assert_eq!(run("test.cjs", input).unwrap(), expected);
    }

    #[test]
    fn test_non_recursive_use_keeps_binding() {
        let input = "import { rmdir } from 'node:fs/promises';\nrmdir(a, { recursive: true });\nrmdir(b);\n";
        let expected = "import { rmdir, rm } from 'node:fs/promises';\nrm(a, { recursive: true, force: true });\nrmdir(b);\n";
        assert_eq!(run("test.mjs", input).unwrap(), expected);
    }
}
