//! Binding path resolution.
//!
//! A binding path is a dotted path rooted at the module object, written
//! with a leading `$`: `$.types.isNativeError` is the `types.isNativeError`
//! export of whatever module a [`ModuleDependency`] loads. Resolving it
//! yields the expression the current file has to use to reach that export
//! given how the module was imported:
//!
//! | statement | resolved |
//! |---|---|
//! | `import util from 'util'` | `util.types.isNativeError` |
//! | `import * as u from 'util'` | `u.types.isNativeError` |
//! | `const { types: t } = require('util')` | `t.isNativeError` |
//! | `const { types: { isNativeError: e } } = require('util')` | `e` |
//! | `const types = require('util').types` | `types.isNativeError` |
//! | `import 'util'` | none |

use crate::dependencies::{ModuleDependency, NamedBinding};

/// Prefix standing for the module object
pub const MODULE_ROOT: &str = "$";

fn split_path(path: &str) -> Option<Vec<&str>> {
    if path == MODULE_ROOT {
        return Some(Vec::new());
    }
    let rest = path.strip_prefix("$.")?;
    let segments: Vec<&str> = rest.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }
    Some(segments)
}

fn join(local: &str, rest: &[&str]) -> String {
    let mut out = local.to_string();
    for segment in rest {
        out.push('.');
        out.push_str(segment);
    }
    out
}

fn resolve_named(named: &[NamedBinding], segments: &[&str], out: &mut Vec<String>) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    for binding in named.iter().filter(|binding| binding.imported == *first) {
        if let Some(local) = &binding.local {
            out.push(join(local, rest));
        } else {
            resolve_named(&binding.nested, rest, out);
        }
    }
}

/// Every local expression reaching `path` through `dependency`.
///
/// Named bindings come first, the module object (default or namespace
/// binding) last.
pub fn resolve_binding_candidates(dependency: &ModuleDependency, path: &str) -> Vec<String> {
    let Some(segments) = split_path(path) else {
        return Vec::new();
    };

    // `require('util').types` binds a member of the module, not the module
    let bound = &dependency.object_path;
    if segments.len() < bound.len()
        || !bound
            .iter()
            .zip(&segments)
            .all(|(bound, wanted)| bound.as_str() == *wanted)
    {
        return Vec::new();
    }
    let segments = &segments[bound.len()..];

    let mut out = Vec::new();
    resolve_named(&dependency.bindings.named, segments, &mut out);
    for object in [&dependency.bindings.namespace, &dependency.bindings.default]
        .into_iter()
        .flatten()
    {
        out.push(join(&object.name, segments));
    }
    out
}

/// The local expression reaching `path` through `dependency`, preferring a
/// named binding over the module object
pub fn resolve_binding_path(dependency: &ModuleDependency, path: &str) -> Option<String> {
    resolve_binding_candidates(dependency, path).into_iter().next()
}

/// Candidates over several dependencies, without duplicates
pub fn resolve_binding_paths(dependencies: &[ModuleDependency], path: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for dependency in dependencies {
        for candidate in resolve_binding_candidates(dependency, path) {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::module_dependencies;
    use crate::root::SourceRoot;
    use pretty_assertions::assert_eq;

    fn resolve(source: &str, path: &str) -> Option<String> {
        let root = SourceRoot::parse("test.js", source).unwrap();
        let deps = module_dependencies(&root, "util");
        assert_eq!(deps.len(), 1, "expected one dependency in {source}");
        resolve_binding_path(&deps[0], path)
    }

    #[test]
    fn test_default_and_namespace() {
        assert_eq!(
            resolve("import util from 'node:util';", "$.types.isNativeError").as_deref(),
            Some("util.types.isNativeError")
        );
        assert_eq!(
            resolve("import * as u from 'util';", "$.types.isNativeError").as_deref(),
            Some("u.types.isNativeError")
        );
        assert_eq!(
            resolve("const util = require('util');", "$").as_deref(),
            Some("util")
        );
    }

    #[test]
    fn test_named_and_aliased() {
        assert_eq!(
            resolve("import { types as t } from 'util';", "$.types.isNativeError").as_deref(),
            Some("t.isNativeError")
        );
        assert_eq!(
            resolve("const { types: t } = require('util');", "$.types.isNativeError").as_deref(),
            Some("t.isNativeError")
        );
        assert_eq!(
            resolve("const { types } = require('util');", "$.types.isNativeError").as_deref(),
            Some("types.isNativeError")
        );
        assert_eq!(
            resolve("const { inspect } = require('util');", "$.types.isNativeError"),
            None
        );
    }

    #[test]
    fn test_nested_destructuring() {
        let source = "const { types: { isNativeError: isErr } } = require('util');";
        assert_eq!(
            resolve(source, "$.types.isNativeError").as_deref(),
            Some("isErr")
        );
        assert_eq!(resolve(source, "$.types"), None);
    }

    #[test]
    fn test_member_of_require() {
        let source = "const types = require('util').types;";
        assert_eq!(
            resolve(source, "$.types.isNativeError").as_deref(),
            Some("types.isNativeError")
        );
        assert_eq!(resolve(source, "$.inspect"), None);
    }

    #[test]
    fn test_dynamic_import() {
        let source = "async function f() {\n  const { types } = await import('util');\n}\n";
        assert_eq!(
            resolve(source, "$.types.isNativeError").as_deref(),
            Some("types.isNativeError")
        );
    }

    #[test]
    fn test_side_effect_and_invalid_paths() {
        assert_eq!(resolve("import 'util';", "$.types"), None);
        assert_eq!(resolve("require('util');", "$.types"), None);
        assert_eq!(resolve("import util from 'util';", "types.isNativeError"), None);
        assert_eq!(resolve("import util from 'util';", "$..types"), None);
    }

    #[test]
    fn test_candidates_over_several_statements() {
        let root = SourceRoot::parse(
            "test.js",
            "import util, { types } from 'util';\nimport * as u from 'node:util';\n",
        )
        .unwrap();
        let deps = module_dependencies(&root, "util");
        assert_eq!(
            resolve_binding_paths(&deps, "$.types.isNativeError"),
            vec![
                "types.isNativeError".to_string(),
                "util.types.isNativeError".to_string(),
                "u.types.isNativeError".to_string(),
            ]
        );
    }
}
