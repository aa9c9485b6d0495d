//! Name based reference and declaration queries.
//!
//! Resolution is by name only: a local that shadows an imported binding
//! counts as a use of it. Recipes only use these queries to decide whether
//! a binding can be dropped, where a false positive keeps a binding alive
//! and never removes one that is still needed.

use crate::root::SourceRoot;
use std::collections::HashSet;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BindingIdent, ClassDecl, ClassExpr, ExportNamedSpecifier, Expr, FnDecl, FnExpr,
    Function, ImportDefaultSpecifier, ImportNamedSpecifier, ImportStarAsSpecifier, JSXElementName,
    JSXObject, ModuleExportName, Prop, SimpleAssignTarget, TsEntityName,
};
use swc_ecma_visit::{Visit, VisitWith};

/// One use of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub span: Span,
    /// Used as a shorthand property, `{ name }`, so renaming it has to keep
    /// the key
    pub shorthand: bool,
}

struct ReferenceCollector<'n> {
    name: &'n str,
    found: Vec<Reference>,
}

impl ReferenceCollector<'_> {
    fn check(&mut self, ident: &swc_ecma_ast::Ident) {
        if ident.sym.as_ref() == self.name {
            self.found.push(Reference {
                span: ident.span,
                shorthand: false,
            });
        }
    }
}

impl Visit for ReferenceCollector<'_> {
    fn visit_expr(&mut self, node: &Expr) {
        if let Expr::Ident(ident) = node {
            self.check(ident);
        }
        node.visit_children_with(self);
    }

    fn visit_prop(&mut self, node: &Prop) {
        if let Prop::Shorthand(ident) = node {
            if ident.sym.as_ref() == self.name {
                self.found.push(Reference {
                    span: ident.span,
                    shorthand: true,
                });
            }
        }
        node.visit_children_with(self);
    }

    fn visit_simple_assign_target(&mut self, node: &SimpleAssignTarget) {
        if let SimpleAssignTarget::Ident(binding) = node {
            self.check(&binding.id);
        }
        node.visit_children_with(self);
    }

    fn visit_export_named_specifier(&mut self, node: &ExportNamedSpecifier) {
        if let ModuleExportName::Ident(ident) = &node.orig {
            self.check(ident);
        }
    }

    fn visit_ts_entity_name(&mut self, node: &TsEntityName) {
        if let TsEntityName::Ident(ident) = node {
            self.check(ident);
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_element_name(&mut self, node: &JSXElementName) {
        if let JSXElementName::Ident(ident) = node {
            self.check(ident);
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_object(&mut self, node: &JSXObject) {
        if let JSXObject::Ident(ident) = node {
            self.check(ident);
        }
        node.visit_children_with(self);
    }
}

/// Every use of `name` outside of declarations, in source order
pub fn reference_sites(root: &SourceRoot, name: &str) -> Vec<Reference> {
    let mut collector = ReferenceCollector {
        name,
        found: Vec::new(),
    };
    root.visit(&mut collector);
    collector.found.sort_by_key(|reference| reference.span.lo);
    collector.found
}

/// Spans of every use of `name` outside of declarations
pub fn references(root: &SourceRoot, name: &str) -> Vec<Span> {
    reference_sites(root, name)
        .into_iter()
        .map(|reference| reference.span)
        .collect()
}

/// Whether `name` is used anywhere outside of declarations
pub fn is_referenced(root: &SourceRoot, name: &str) -> bool {
    !references(root, name).is_empty()
}

#[derive(Default)]
struct DeclarationCollector {
    names: HashSet<String>,
}

impl Visit for DeclarationCollector {
    fn visit_binding_ident(&mut self, node: &BindingIdent) {
        self.names.insert(node.id.sym.to_string());
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.names.insert(node.ident.sym.to_string());
        node.visit_children_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        if let Some(ident) = &node.ident {
            self.names.insert(ident.sym.to_string());
        }
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.names.insert(node.ident.sym.to_string());
        node.visit_children_with(self);
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        if let Some(ident) = &node.ident {
            self.names.insert(ident.sym.to_string());
        }
        node.visit_children_with(self);
    }

    fn visit_import_default_specifier(&mut self, node: &ImportDefaultSpecifier) {
        self.names.insert(node.local.sym.to_string());
    }

    fn visit_import_star_as_specifier(&mut self, node: &ImportStarAsSpecifier) {
        self.names.insert(node.local.sym.to_string());
    }

    fn visit_import_named_specifier(&mut self, node: &ImportNamedSpecifier) {
        self.names.insert(node.local.sym.to_string());
    }
}

/// Every name declared anywhere in the file
pub fn declared_names(root: &SourceRoot) -> HashSet<String> {
    let mut collector = DeclarationCollector::default();
    root.visit(&mut collector);
    collector.names
}

struct FunctionFinder<'r> {
    root: &'r SourceRoot,
    offset: usize,
    innermost: Option<Span>,
}

// visited outside-in, so a later match is nested deeper
impl Visit for FunctionFinder<'_> {
    fn visit_function(&mut self, node: &Function) {
        if let Some(body) = &node.body {
            if self.root.range(body.span).contains(&self.offset) {
                self.innermost = Some(node.span);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        if self.root.range(node.body.span()).contains(&self.offset) {
            self.innermost = Some(node.span);
        }
        node.visit_children_with(self);
    }
}

/// Span of the innermost function whose body contains `offset`, or of the
/// whole program when the offset is at top level
pub fn enclosing_function(root: &SourceRoot, offset: usize) -> Span {
    let mut finder = FunctionFinder {
        root,
        offset,
        innermost: None,
    };
    root.visit(&mut finder);
    finder.innermost.unwrap_or_else(|| root.program().span())
}
