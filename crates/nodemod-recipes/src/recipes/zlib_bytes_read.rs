//! `zlib` stream `.bytesRead` (DEP0108)
//!
//! Only streams the file visibly creates are rewritten: variables
//! initialized with a `zlib.create*()` call, and property accesses directly
//! on such a call.

use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::callee_path;
use nodemod_ast::{module_dependencies, resolve_binding_paths, SourceRoot};
use nodemod_foundation::NodemodResult;
use std::collections::HashSet;
use swc_ecma_ast::{Expr, MemberExpr, MemberProp, Pat, VarDeclarator};
use swc_ecma_visit::{Visit, VisitWith};

const FACTORIES: &[&str] = &[
    "createBrotliCompress",
    "createBrotliDecompress",
    "createDeflate",
    "createDeflateRaw",
    "createGunzip",
    "createGzip",
    "createInflate",
    "createInflateRaw",
    "createUnzip",
];

fn is_factory_call(expr: &Expr, factories: &HashSet<String>) -> bool {
    match expr {
        Expr::Call(call) => callee_path(call).is_some_and(|path| factories.contains(&path)),
        Expr::Await(inner) => is_factory_call(&inner.arg, factories),
        Expr::Paren(paren) => is_factory_call(&paren.expr, factories),
        _ => false,
    }
}

struct StreamVariables<'f> {
    factories: &'f HashSet<String>,
    names: HashSet<String>,
}

impl Visit for StreamVariables<'_> {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let (Pat::Ident(binding), Some(init)) = (&node.name, &node.init) {
            if is_factory_call(init, self.factories) {
                self.names.insert(binding.id.sym.to_string());
            }
        }
        node.visit_children_with(self);
    }
}

struct BytesReadAccesses<'a> {
    factories: &'a HashSet<String>,
    streams: &'a HashSet<String>,
    props: Vec<swc_common::Span>,
}

impl Visit for BytesReadAccesses<'_> {
    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if let MemberProp::Ident(prop) = &node.prop {
            let on_stream = match &*node.obj {
                Expr::Ident(ident) => self.streams.contains(ident.sym.as_ref()),
                other => is_factory_call(other, self.factories),
            };
            if on_stream && prop.sym.as_ref() == "bytesRead" {
                self.props.push(prop.span);
            }
        }
        node.visit_children_with(self);
    }
}

pub struct ZlibBytesReadToBytesWritten;

impl Recipe for ZlibBytesReadToBytesWritten {
    fn name(&self) -> &'static str {
        "zlib-bytesread-to-byteswritten"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let dependencies = module_dependencies(root, "zlib");
        if dependencies.is_empty() {
            return Ok(None);
        }

        let factories: HashSet<String> = FACTORIES
            .iter()
            .flat_map(|name| resolve_binding_paths(&dependencies, &format!("$.{}", name)))
            .collect();

        let mut variables = StreamVariables {
            factories: &factories,
            names: HashSet::new(),
        };
        root.visit(&mut variables);

        let mut accesses = BytesReadAccesses {
            factories: &factories,
            streams: &variables.names,
            props: Vec::new(),
        };
        root.visit(&mut accesses);

        if accesses.props.is_empty() {
            return Ok(None);
        }
        let edits = accesses
            .props
            .iter()
            .map(|span| root.replace(*span, "bytesWritten"))
            .collect();
        root.commit(edits).map(Some)
    }
}

nodemod_recipe! {
    name: "zlib-bytesread-to-byteswritten",
    description: "Replace .bytesRead on zlib streams with .bytesWritten",
    deprecations: ["DEP0108"],
    factory: || Box::new(ZlibBytesReadToBytesWritten),
}
