//! Shared building blocks of the recipes

use nodemod_ast::query::{calls_to, member_exprs};
use nodemod_ast::{
    module_dependencies, prune_unused_bindings, rename_binding_and_uses,
    resolve_binding_candidates, resolve_binding_paths, used_bindings, SourceRoot,
};
use nodemod_foundation::{Edit, NodemodResult};
use swc_common::Spanned;
use swc_ecma_ast::{CallExpr, MemberExpr, MemberProp};
use tracing::debug;

/// A call to an export of a module
pub struct ExportCall {
    /// Export path relative to the module, e.g. `types.isNativeError`
    pub export: &'static str,
    /// Callee as written in this file, e.g. `util.types.isNativeError`
    pub callee: String,
    pub call: CallExpr,
}

/// Calls to any of `exports` of `module`, through every way the file binds
/// the module, in source order
pub fn export_calls(root: &SourceRoot, module: &str, exports: &[&'static str]) -> Vec<ExportCall> {
    let dependencies = module_dependencies(root, module);
    if dependencies.is_empty() {
        return Vec::new();
    }

    let mut found = Vec::new();
    for export in exports {
        for callee in resolve_binding_paths(&dependencies, &format!("$.{}", export)) {
            for call in calls_to(root, &callee) {
                found.push(ExportCall {
                    export: *export,
                    callee: callee.clone(),
                    call,
                });
            }
        }
    }
    found.sort_by_key(|found| found.call.span.lo);
    found
}

/// Edit replacing the callee of `call`
pub fn replace_callee(root: &SourceRoot, call: &CallExpr, callee: &str) -> Edit {
    root.replace(call.callee.span(), callee)
}

/// Edit replacing the property of a member expression, `os.tmpDir` →
/// `os.tmpdir`
pub fn replace_member_prop(root: &SourceRoot, member: &MemberExpr, name: &str) -> Edit {
    match &member.prop {
        MemberProp::Computed(computed) => root.replace(computed.span, format!("['{}']", name)),
        prop => root.replace(prop.span(), name),
    }
}

/// Edits renaming export `old` of `module` to `new` wherever it is used:
/// member accesses on the module object and named bindings with their uses
pub fn rename_export(root: &SourceRoot, module: &str, old: &str, new: &str) -> Vec<Edit> {
    let path = format!("$.{}", old);
    let mut edits = Vec::new();

    for dependency in module_dependencies(root, module) {
        if dependency.named_local(old).is_some() {
            edits.extend(rename_binding_and_uses(root, &dependency, old, new));
        }
        for candidate in resolve_binding_candidates(&dependency, &path) {
            if !candidate.contains('.') {
                continue;
            }
            for member in member_exprs(root, &candidate) {
                edits.push(replace_member_prop(root, &member, new));
            }
        }
    }
    edits
}

/// Commit `edits`, then drop bindings of `modules` that were used before
/// and are not anymore
pub fn finish(root: &SourceRoot, edits: Vec<Edit>, modules: &[&str]) -> NodemodResult<Option<String>> {
    if edits.is_empty() {
        return Ok(None);
    }

    let used = used_before(root, modules);
    let updated = root.reparse(root.commit(edits)?)?;
    prune_newly_unused(root, updated, &used)
}

/// Like [`finish`] for recipes that replace whole calls, where a matched call
/// can sit inside the arguments of another one.
///
/// `rewrite` computes the edits for a parsed file. An edit whose range
/// encloses another edit is held back; the innermost ones are committed and
/// `rewrite` runs again on the result until nothing is held back, so the
/// enclosing call is rebuilt from the already rewritten text.
pub fn finish_inner_first<F>(root: &SourceRoot, modules: &[&str], rewrite: F) -> NodemodResult<Option<String>>
where
    F: Fn(&SourceRoot) -> Vec<Edit>,
{
    let used = used_before(root, modules);
    let mut current: Option<SourceRoot> = None;

    loop {
        let target = current.as_ref().unwrap_or(root);
        let (inner, held): (Vec<Edit>, Vec<Edit>) = {
            let edits = rewrite(target);
            let is_outer = |edit: &Edit| edits.iter().any(|other| encloses(edit, other));
            edits.iter().cloned().partition(|edit| !is_outer(edit))
        };
        if inner.is_empty() {
            break;
        }

        let updated = target.reparse(target.commit(inner)?)?;
        current = Some(updated);
        if held.is_empty() {
            break;
        }
        debug!(held = held.len(), "Rewriting enclosing calls on another pass");
    }

    match current {
        Some(updated) => prune_newly_unused(root, updated, &used),
        None => Ok(None),
    }
}

/// Whether `outer` strictly encloses `inner`
fn encloses(outer: &Edit, inner: &Edit) -> bool {
    outer.start <= inner.start && inner.end <= outer.end && outer.range() != inner.range()
}

fn used_before<'m>(root: &SourceRoot, modules: &[&'m str]) -> Vec<(&'m str, Vec<String>)> {
    modules
        .iter()
        .map(|module| (*module, used_bindings(root, module)))
        .collect()
}

fn prune_newly_unused(
    original: &SourceRoot,
    mut updated: SourceRoot,
    used: &[(&str, Vec<String>)],
) -> NodemodResult<Option<String>> {
    for (module, candidates) in used {
        updated = prune_unused_bindings(updated, module, candidates)?;
    }

    let source = updated.into_source();
    Ok((source != original.source()).then_some(source))
}

/// Escape text for use inside a template literal
pub fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::recipe::Recipe;
    use nodemod_ast::SourceRoot;

    /// Run `recipe` over `source` parsed as `path`
    pub fn transform(recipe: &dyn Recipe, path: &str, source: &str) -> Option<String> {
        let root = SourceRoot::parse(path, source).unwrap();
        recipe.transform(&root).unwrap()
    }
}
