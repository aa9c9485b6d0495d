//! Editing import and require bindings: removal, rename, insertion, and
//! pruning of bindings a rewrite left unused.

use crate::dependencies::{module_dependencies, DependencyKind, ModuleDependency, NamedBinding};
use crate::root::{ModuleKind, SourceRoot};
use crate::scope::{declared_names, is_referenced, reference_sites};
use nodemod_foundation::text::{detect_eol, insertion_offset, list_item_removal_range};
use nodemod_foundation::{Edit, NodemodResult};
use std::collections::HashSet;
use swc_common::Span;
use tracing::{debug, warn};

/// What removing a named binding does to the list holding it
enum ListRemoval {
    /// The list would be left empty
    Whole,
    /// Remove this element from the list
    Item(Span),
}

fn named_removal(named: &[NamedBinding], local: &str) -> Option<ListRemoval> {
    for binding in named {
        let removal = if binding.local.as_deref() == Some(local) {
            ListRemoval::Whole
        } else if binding.nested.is_empty() {
            continue;
        } else {
            match named_removal(&binding.nested, local) {
                Some(ListRemoval::Whole) => ListRemoval::Whole,
                Some(item) => return Some(item),
                None => continue,
            }
        };
        return Some(match removal {
            ListRemoval::Whole if named.len() > 1 => ListRemoval::Item(binding.span),
            other => other,
        });
    }
    None
}

/// Removes the whole declaration, or only the declarator when the
/// declaration declares several variables
fn remove_declaration(root: &SourceRoot, dependency: &ModuleDependency) -> Edit {
    match dependency.declarator {
        Some(declarator) => Edit::delete(list_item_removal_range(
            root.source(),
            root.range(declarator),
        )),
        None => root.remove_statement(dependency.statement),
    }
}

/// End of the `, ` separator following the code ending at `end`
fn after_separator(source: &str, end: usize) -> Option<usize> {
    let rest = &source[end..];
    let comma = rest.find(|c: char| !c.is_whitespace())?;
    if !rest[comma..].starts_with(',') {
        return None;
    }
    let after = &rest[comma + 1..];
    Some(end + comma + 1 + (after.len() - after.trim_start().len()))
}

/// Edit removing the binding `local` from `dependency`.
///
/// Removing the last binding removes the whole statement (with its line
/// break), or only its declarator when the declaration has several.
/// Returns `None` when `local` is not bound by the dependency.
pub fn remove_binding(root: &SourceRoot, dependency: &ModuleDependency, local: &str) -> Option<Edit> {
    let bindings = &dependency.bindings;
    let source = root.source();
    let is_import = dependency.kind == DependencyKind::Import;
    let only = bindings.top_level_count() == 1;

    if let Some(default) = bindings.default.as_ref().filter(|d| d.name == local) {
        if only || !is_import {
            return Some(remove_declaration(root, dependency));
        }
        // `import a, { b } from 'x'` → `import { b } from 'x'`
        let range = root.range(default.span);
        let end = after_separator(source, range.end)?;
        return Some(Edit::delete(range.start..end));
    }

    if let Some(namespace) = bindings.namespace.as_ref().filter(|n| n.name == local) {
        if only {
            return Some(remove_declaration(root, dependency));
        }
        // `import a, * as b from 'x'` → `import a from 'x'`
        let default = bindings.default.as_ref()?;
        return Some(Edit::delete(
            root.range(default.span).end..root.range(namespace.span).end,
        ));
    }

    match named_removal(&bindings.named, local)? {
        ListRemoval::Item(span) => Some(Edit::delete(list_item_removal_range(
            source,
            root.range(span),
        ))),
        ListRemoval::Whole if bindings.default.is_none() && bindings.namespace.is_none() => {
            Some(remove_declaration(root, dependency))
        }
        ListRemoval::Whole => {
            // `import a, { b } from 'x'` → `import a from 'x'`
            let default = bindings.default.as_ref()?;
            let last = bindings.named.last()?;
            let last_end = root.range(last.span).end;
            let close = source[last_end..].find('}')? + last_end + 1;
            Some(Edit::delete(root.range(default.span).end..close))
        }
    }
}

/// Edits renaming the imported name of a named binding, keeping the local
/// name: `{ tmpDir }` → `{ tmpdir as tmpDir }` (or `{ tmpdir: tmpDir }`
/// in a destructuring pattern).
pub fn rename_binding(
    root: &SourceRoot,
    dependency: &ModuleDependency,
    imported: &str,
    new_imported: &str,
) -> Vec<Edit> {
    let Some(binding) = dependency
        .bindings
        .named
        .iter()
        .find(|named| named.imported == imported)
    else {
        return Vec::new();
    };

    if !binding.shorthand {
        return vec![root.replace(binding.imported_span, new_imported)];
    }

    let separator = if dependency.kind == DependencyKind::Import {
        " as "
    } else {
        ": "
    };
    vec![Edit::insert(
        root.range(binding.imported_span).start,
        format!("{}{}", new_imported, separator),
    )]
}

/// Edits renaming a named binding together with all of its uses:
/// `{ tmpDir }` and `tmpDir()` → `{ tmpdir }` and `tmpdir()`.
///
/// Aliased bindings only get their imported name renamed. Falls back to
/// [`rename_binding`] when the new name is already declared in the file.
pub fn rename_binding_and_uses(
    root: &SourceRoot,
    dependency: &ModuleDependency,
    imported: &str,
    new_imported: &str,
) -> Vec<Edit> {
    let Some(binding) = dependency
        .bindings
        .named
        .iter()
        .find(|named| named.imported == imported)
    else {
        return Vec::new();
    };

    if !binding.shorthand {
        return rename_binding(root, dependency, imported, new_imported);
    }
    if declared_names(root).contains(new_imported) {
        debug!(
            name = new_imported,
            "Name already declared, keeping the previous local name"
        );
        return rename_binding(root, dependency, imported, new_imported);
    }

    let mut edits = vec![root.replace(binding.imported_span, new_imported)];
    for reference in reference_sites(root, imported) {
        let replacement = if reference.shorthand {
            format!("{}: {}", imported, new_imported)
        } else {
            new_imported.to_string()
        };
        edits.push(root.replace(reference.span, replacement));
    }
    edits
}

/// Edit importing `name` from `module` unless the file already binds it.
///
/// An existing named import (or object-pattern require) of the module is
/// extended; otherwise a new statement is inserted after the shebang and
/// leading directives, `import { name } from 'module';` in ES modules and
/// `const { name } = require('module');` in CommonJS.
pub fn ensure_named_import(root: &SourceRoot, module: &str, name: &str) -> Option<Edit> {
    let dependencies = module_dependencies(root, module);
    if dependencies
        .iter()
        .any(|dep| dep.named_local(name) == Some(name))
    {
        return None;
    }

    let kind = root.module_kind();
    let wanted = match kind {
        ModuleKind::Esm => DependencyKind::Import,
        ModuleKind::CommonJs => DependencyKind::Require,
    };

    for dep in dependencies.iter().filter(|dep| dep.kind == wanted) {
        if dep.bindings.namespace.is_some() || !dep.object_path.is_empty() {
            continue;
        }
        if let Some(last) = dep.bindings.named.last() {
            let end = root.range(last.span).end;
            return Some(Edit::insert(end, format!(", {}", name)));
        }
        if kind == ModuleKind::Esm {
            if let Some(default) = &dep.bindings.default {
                let end = root.range(default.span).end;
                return Some(Edit::insert(end, format!(", {{ {} }}", name)));
            }
        }
    }

    let eol = detect_eol(root.source());
    let statement = match kind {
        ModuleKind::Esm => format!("import {{ {} }} from '{}';{}", name, module, eol),
        ModuleKind::CommonJs => format!("const {{ {} }} = require('{}');{}", name, module, eol),
    };
    Some(Edit::insert(insertion_offset(root.source()), statement))
}

/// Local names bound from `module` that are currently referenced
pub fn used_bindings(root: &SourceRoot, module: &str) -> Vec<String> {
    let mut used = Vec::new();
    for dep in module_dependencies(root, module) {
        for local in dep.local_names() {
            if is_referenced(root, &local) && !used.contains(&local) {
                used.push(local);
            }
        }
    }
    used
}

/// Remove bindings of `module` listed in `candidates` that are no longer
/// referenced.
///
/// Bindings are removed one at a time and the file is parsed again after
/// each removal, so neighbouring list elements never produce overlapping
/// edits.
pub fn prune_unused_bindings(
    mut root: SourceRoot,
    module: &str,
    candidates: &[String],
) -> NodemodResult<SourceRoot> {
    let mut kept: HashSet<String> = HashSet::new();

    loop {
        let target = module_dependencies(&root, module)
            .into_iter()
            .flat_map(|dep| {
                dep.local_names()
                    .into_iter()
                    .map(move |local| (dep.clone(), local))
            })
            .find(|(_, local)| {
                candidates.contains(local)
                    && !kept.contains(local)
                    && !is_referenced(&root, local)
            });

        let Some((dep, local)) = target else {
            return Ok(root);
        };

        match remove_binding(&root, &dep, &local) {
            Some(edit) => {
                debug!(module, binding = %local, "Removing unused binding");
                let source = root.commit(vec![edit])?;
                root = root.reparse(source)?;
            }
            None => {
                warn!(
                    module,
                    binding = %local,
                    path = %root.path().display(),
                    "Could not remove unused binding"
                );
                kept.insert(local);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn remove(source: &str, module: &str, local: &str) -> String {
        let root = SourceRoot::parse("test.js", source).unwrap();
        let dep = module_dependencies(&root, module)
            .into_iter()
            .find(|dep| dep.binds(local))
            .unwrap();
        let edit = remove_binding(&root, &dep, local).unwrap();
        root.commit(vec![edit]).unwrap()
    }

    #[test]
    fn test_remove_last_binding_removes_statement() {
        assert_eq!(
            remove("import util from 'util';\nfoo();\n", "util", "util"),
            "foo();\n"
        );
        assert_eq!(
            remove("const { isArray } = require('util');\nfoo();\n", "util", "isArray"),
            "foo();\n"
        );
        assert_eq!(
            remove(
                "const { types: { isNativeError } } = require('util');\nfoo();\n",
                "util",
                "isNativeError"
            ),
            "foo();\n"
        );
    }

    #[test]
    fn test_remove_one_of_several() {
        assert_eq!(
            remove("import { isArray, inspect } from 'util';\n", "util", "isArray"),
            "import { inspect } from 'util';\n"
        );
        assert_eq!(
            remove("const { isArray, inspect } = require('util');\n", "util", "inspect"),
            "const { isArray } = require('util');\n"
        );
        assert_eq!(
            remove(
                "const { types: { isNativeError }, inspect } = require('util');\n",
                "util",
                "isNativeError"
            ),
            "const { inspect } = require('util');\n"
        );
    }

    #[test]
    fn test_remove_default_or_named_group() {
        assert_eq!(
            remove("import util, { inspect } from 'util';\n", "util", "util"),
            "import { inspect } from 'util';\n"
        );
        assert_eq!(
            remove("import util, { inspect } from 'util';\n", "util", "inspect"),
            "import util from 'util';\n"
        );
    }

    #[test]
    fn test_remove_declarator() {
        assert_eq!(
            remove("const util = require('util'), fs = require('fs');\n", "util", "util"),
            "const fs = require('fs');\n"
        );
    }

    #[test]
    fn test_rename_binding_keeps_local() {
        let root = SourceRoot::parse("test.js", "import { tmpDir } from 'os';\n").unwrap();
        let dep = &module_dependencies(&root, "os")[0];
        let output = root
            .commit(rename_binding(&root, dep, "tmpDir", "tmpdir"))
            .unwrap();
        assert_eq!(output, "import { tmpdir as tmpDir } from 'os';\n");

        let root = SourceRoot::parse("test.js", "const { tmpDir: t } = require('os');\n").unwrap();
        let dep = &module_dependencies(&root, "os")[0];
        let output = root
            .commit(rename_binding(&root, dep, "tmpDir", "tmpdir"))
            .unwrap();
        assert_eq!(output, "const { tmpdir: t } = require('os');\n");
    }

    #[test]
    fn test_rename_binding_and_uses() {
        let source = "const { tmpDir } = require('os');\nconst dir = tmpDir();\nexport default { tmpDir };\n";
        let root = SourceRoot::parse("test.js", source).unwrap();
        let dep = &module_dependencies(&root, "os")[0];
        let output = root
            .commit(rename_binding_and_uses(&root, dep, "tmpDir", "tmpdir"))
            .unwrap();
        assert_eq!(
            output,
            "const { tmpdir } = require('os');\nconst dir = tmpdir();\nexport default { tmpDir: tmpdir };\n"
        );
    }

    #[test]
    fn test_ensure_named_import() {
        let root = SourceRoot::parse("test.mjs", "#!/usr/bin/env node\nfoo();\n").unwrap();
        let edit = ensure_named_import(&root, "node:util", "styleText").unwrap();
        assert_eq!(
            root.commit(vec![edit]).unwrap(),
            "#!/usr/bin/env node\nimport { styleText } from 'node:util';\nfoo();\n"
        );

        let root = SourceRoot::parse("test.cjs", "'use strict';\nfoo();\n").unwrap();
        let edit = ensure_named_import(&root, "node:util", "styleText").unwrap();
        assert_eq!(
            root.commit(vec![edit]).unwrap(),
            "'use strict';\nconst { styleText } = require('node:util');\nfoo();\n"
        );
    }

    #[test]
    fn test_ensure_named_import_extends_or_skips() {
        let root = SourceRoot::parse("test.mjs", "import { inspect } from 'node:util';\n").unwrap();
        let edit = ensure_named_import(&root, "node:util", "styleText").unwrap();
        assert_eq!(
            root.commit(vec![edit]).unwrap(),
            "import { inspect, styleText } from 'node:util';\n"
        );

        let root = SourceRoot::parse("test.mjs", "import { styleText } from 'util';\n").unwrap();
        assert!(ensure_named_import(&root, "node:util", "styleText").is_none());
    }

    #[test]
    fn test_prune_unused_bindings() {
        let source = "import { isArray, isDate, inspect } from 'util';\nArray.isArray(a);\ninspect(b);\n";
        let root = SourceRoot::parse("test.js", source).unwrap();
        let candidates = vec!["isArray".to_string(), "isDate".to_string(), "inspect".to_string()];
        let root = prune_unused_bindings(root, "util", &candidates).unwrap();
        assert_eq!(
            root.source(),
            "import { inspect } from 'util';\nArray.isArray(a);\ninspect(b);\n"
        );
    }

    #[test]
    fn test_used_bindings() {
        let root = SourceRoot::parse(
            "test.js",
            "const util = require('util');\nconst { inspect } = require('util');\nutil.isArray(a);\n",
        )
        .unwrap();
        assert_eq!(used_bindings(&root, "util"), vec!["util".to_string()]);
    }
}
