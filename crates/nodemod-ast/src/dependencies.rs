//! Discovery of the places a file loads a module.
//!
//! Three syntactic forms are recognized and normalized into a
//! [`ModuleDependency`]:
//!
//! - static imports: `import fs, { readFile as read } from 'node:fs'`
//! - CommonJS requires: `const { readFile } = require('fs')`, also
//!   `const types = require('util').types` and a bare `require('fs');`
//! - dynamic imports: `const fs = await import('fs')`
//!
//! A module name matches with and without the `node:` scheme. Subpath
//! modules (`fs/promises`) are separate modules.

use crate::query::{is_import_call, is_require_call, member_prop_name, string_value, unquote};
use crate::root::SourceRoot;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    Expr, ExprStmt, ImportDecl, ImportSpecifier, ModuleExportName, ObjectPat, ObjectPatProp, Pat,
    PropName, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

/// How a module is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Import,
    Require,
    DynamicImport,
}

/// A plain local name (`import fs from 'fs'`, `const fs = require('fs')`)
#[derive(Debug, Clone, PartialEq)]
pub struct LocalBinding {
    pub name: String,
    pub span: Span,
}

/// A named import specifier or a destructured property
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBinding {
    /// Exported name on the module side
    pub imported: String,
    /// Local name, `None` when the property is destructured further
    pub local: Option<String>,
    /// Bindings of a nested pattern: `{ types: { isNativeError } }`
    pub nested: Vec<NamedBinding>,
    /// Whole specifier or property
    pub span: Span,
    /// Span of the imported name itself
    pub imported_span: Span,
    /// `{ a }` rather than `{ a as b }` / `{ a: b }`
    pub shorthand: bool,
}

impl NamedBinding {
    fn collect_locals(&self, out: &mut Vec<String>) {
        if let Some(local) = &self.local {
            out.push(local.clone());
        }
        for nested in &self.nested {
            nested.collect_locals(out);
        }
    }
}

/// All names a dependency statement binds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub default: Option<LocalBinding>,
    pub namespace: Option<LocalBinding>,
    pub named: Vec<NamedBinding>,
}

impl Bindings {
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }

    /// Number of bindings directly inside the statement
    pub fn top_level_count(&self) -> usize {
        usize::from(self.default.is_some())
            + usize::from(self.namespace.is_some())
            + self.named.len()
    }
}

/// One place where a module is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDependency {
    pub kind: DependencyKind,
    /// Module specifier as written, e.g. `node:fs`
    pub specifier: String,
    /// The whole import declaration, variable declaration or expression statement
    pub statement: Span,
    /// The declarator, when the declaration declares more than one variable
    pub declarator: Option<Span>,
    /// Members accessed on the module before binding: `require('util').types` → `["types"]`
    pub object_path: Vec<String>,
    pub bindings: Bindings,
}

impl ModuleDependency {
    /// Every local name this dependency introduces
    pub fn local_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(default) = &self.bindings.default {
            names.push(default.name.clone());
        }
        if let Some(namespace) = &self.bindings.namespace {
            names.push(namespace.name.clone());
        }
        for named in &self.bindings.named {
            named.collect_locals(&mut names);
        }
        names
    }

    /// Whether `local` is one of the names introduced
    pub fn binds(&self, local: &str) -> bool {
        self.local_names().iter().any(|name| name == local)
    }

    /// Local name of a top-level named binding of `imported`
    pub fn named_local(&self, imported: &str) -> Option<&str> {
        self.bindings
            .named
            .iter()
            .find(|named| named.imported == imported)
            .and_then(|named| named.local.as_deref())
    }

    /// `import 'x'` or a bare `require('x')`
    pub fn is_side_effect(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The local name bound to the module object itself, if any
    pub fn module_object(&self) -> Option<&str> {
        if !self.object_path.is_empty() {
            return None;
        }
        self.bindings
            .namespace
            .as_ref()
            .or(self.bindings.default.as_ref())
            .map(|binding| binding.name.as_str())
    }
}

/// Whether `specifier` refers to `module`, with or without the `node:` scheme
pub fn matches_module(specifier: &str, module: &str) -> bool {
    let module = module.strip_prefix("node:").unwrap_or(module);
    let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);
    specifier == module
}

struct DependencyCollector<'a> {
    root: &'a SourceRoot,
    module: &'a str,
    found: Vec<ModuleDependency>,
}

impl DependencyCollector<'_> {
    /// Resolve an initializer to the module it loads
    fn module_source(&self, expr: &Expr) -> Option<(DependencyKind, String, Vec<String>)> {
        match expr {
            Expr::Await(await_expr) => self.module_source(&await_expr.arg),
            Expr::Paren(paren) => self.module_source(&paren.expr),
            Expr::Call(call) if is_require_call(call) => {
                let specifier = string_value(self.root, &call.args[0].expr)?;
                Some((DependencyKind::Require, specifier, Vec::new()))
            }
            Expr::Call(call) if is_import_call(call) => {
                let specifier = string_value(self.root, &call.args[0].expr)?;
                Some((DependencyKind::DynamicImport, specifier, Vec::new()))
            }
            Expr::Member(member) => {
                let (kind, specifier, mut path) = self.module_source(&member.obj)?;
                path.push(member_prop_name(&member.prop)?);
                Some((kind, specifier, path))
            }
            _ => None,
        }
    }

    fn prop_name(&self, key: &PropName) -> Option<String> {
        match key {
            PropName::Ident(ident) => Some(ident.sym.to_string()),
            PropName::Str(s) => Some(unquote(self.root.text(s.span))),
            _ => None,
        }
    }

    fn named_from_object_pat(&self, pattern: &ObjectPat) -> Vec<NamedBinding> {
        let mut named = Vec::new();
        for prop in &pattern.props {
            match prop {
                ObjectPatProp::Assign(assign) => named.push(NamedBinding {
                    imported: assign.key.id.sym.to_string(),
                    local: Some(assign.key.id.sym.to_string()),
                    nested: Vec::new(),
                    span: assign.span,
                    imported_span: assign.key.id.span,
                    shorthand: true,
                }),
                ObjectPatProp::KeyValue(key_value) => {
                    let Some(imported) = self.prop_name(&key_value.key) else {
                        continue;
                    };
                    let (local, nested) = match &*key_value.value {
                        Pat::Ident(binding) => (Some(binding.id.sym.to_string()), Vec::new()),
                        Pat::Assign(assign) => match &*assign.left {
                            Pat::Ident(binding) => (Some(binding.id.sym.to_string()), Vec::new()),
                            _ => continue,
                        },
                        Pat::Object(inner) => (None, self.named_from_object_pat(inner)),
                        _ => continue,
                    };
                    named.push(NamedBinding {
                        imported,
                        local,
                        nested,
                        span: prop.span(),
                        imported_span: key_value.key.span(),
                        shorthand: false,
                    });
                }
                ObjectPatProp::Rest(_) => {}
            }
        }
        named
    }

    fn bindings_from_pat(&self, pattern: &Pat) -> Bindings {
        match pattern {
            Pat::Ident(binding) => Bindings {
                default: Some(LocalBinding {
                    name: binding.id.sym.to_string(),
                    span: binding.id.span,
                }),
                ..Default::default()
            },
            Pat::Object(object) => Bindings {
                named: self.named_from_object_pat(object),
                ..Default::default()
            },
            _ => {
                debug!(
                    pattern = %self.root.text(pattern.span()),
                    "Unsupported binding pattern for module"
                );
                Bindings::default()
            }
        }
    }
}

impl Visit for DependencyCollector<'_> {
    fn visit_import_decl(&mut self, node: &ImportDecl) {
        if node.type_only {
            return;
        }
        let specifier = unquote(self.root.text(node.src.span));
        if !matches_module(&specifier, self.module) {
            return;
        }

        let mut bindings = Bindings::default();
        for spec in &node.specifiers {
            match spec {
                ImportSpecifier::Default(default) => {
                    bindings.default = Some(LocalBinding {
                        name: default.local.sym.to_string(),
                        span: default.span,
                    });
                }
                ImportSpecifier::Namespace(namespace) => {
                    bindings.namespace = Some(LocalBinding {
                        name: namespace.local.sym.to_string(),
                        span: namespace.span,
                    });
                }
                ImportSpecifier::Named(named) if !named.is_type_only => {
                    let (imported, imported_span, shorthand) = match &named.imported {
                        Some(ModuleExportName::Ident(ident)) => {
                            (ident.sym.to_string(), ident.span, false)
                        }
                        Some(ModuleExportName::Str(s)) => {
                            (unquote(self.root.text(s.span)), s.span, false)
                        }
                        None => (named.local.sym.to_string(), named.local.span, true),
                    };
                    bindings.named.push(NamedBinding {
                        imported,
                        local: Some(named.local.sym.to_string()),
                        nested: Vec::new(),
                        span: named.span,
                        imported_span,
                        shorthand,
                    });
                }
                ImportSpecifier::Named(_) => {}
            }
        }

        self.found.push(ModuleDependency {
            kind: DependencyKind::Import,
            specifier,
            statement: node.span,
            declarator: None,
            object_path: Vec::new(),
            bindings,
        });
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        let several = node.decls.len() > 1;
        for decl in &node.decls {
            let Some(init) = &decl.init else {
                continue;
            };
            let Some((kind, specifier, object_path)) = self.module_source(init) else {
                continue;
            };
            if !matches_module(&specifier, self.module) {
                continue;
            }
            self.found.push(ModuleDependency {
                kind,
                specifier,
                statement: node.span,
                declarator: several.then_some(decl.span),
                object_path,
                bindings: self.bindings_from_pat(&decl.name),
            });
        }
        node.visit_children_with(self);
    }

    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        if let Some((kind, specifier, object_path)) = self.module_source(&node.expr) {
            if object_path.is_empty() && matches_module(&specifier, self.module) {
                self.found.push(ModuleDependency {
                    kind,
                    specifier,
                    statement: node.span,
                    declarator: None,
                    object_path,
                    bindings: Bindings::default(),
                });
                return;
            }
        }
        node.visit_children_with(self);
    }
}

/// Every import, require and dynamic import of `module`, in source order
pub fn module_dependencies(root: &SourceRoot, module: &str) -> Vec<ModuleDependency> {
    let mut collector = DependencyCollector {
        root,
        module,
        found: Vec::new(),
    };
    root.visit(&mut collector);
    collector.found.sort_by_key(|dep| dep.statement.lo);
    collector.found
}

/// `import … from 'module'` declarations
pub fn import_statements(root: &SourceRoot, module: &str) -> Vec<ModuleDependency> {
    of_kind(root, module, DependencyKind::Import)
}

/// `require('module')` declarations and statements
pub fn require_calls(root: &SourceRoot, module: &str) -> Vec<ModuleDependency> {
    of_kind(root, module, DependencyKind::Require)
}

/// `import('module')` declarations and statements
pub fn import_calls(root: &SourceRoot, module: &str) -> Vec<ModuleDependency> {
    of_kind(root, module, DependencyKind::DynamicImport)
}

fn of_kind(root: &SourceRoot, module: &str, kind: DependencyKind) -> Vec<ModuleDependency> {
    module_dependencies(root, module)
        .into_iter()
        .filter(|dep| dep.kind == kind)
        .collect()
}
