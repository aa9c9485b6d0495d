//! `node:http` classes called without `new` (DEP0195)

use super::support::export_calls;
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::SourceRoot;
use nodemod_foundation::{Edit, NodemodResult};

const CLASSES: &[&str] = &[
    "Agent",
    "ClientRequest",
    "IncomingMessage",
    "OutgoingMessage",
    "Server",
    "ServerResponse",
];

pub struct HttpClassesWithNew;

impl Recipe for HttpClassesWithNew {
    fn name(&self) -> &'static str {
        "http-classes-with-new"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        // a `new X()` is a NewExpr, so every call found here lacks `new`
        let edits: Vec<Edit> = export_calls(root, "http", CLASSES)
            .iter()
            .map(|found| Edit::insert(root.range(found.call.span).start, "new "))
            .collect();

        if edits.is_empty() {
            return Ok(None);
        }
        root.commit(edits).map(Some)
    }
}

nodemod_recipe! {
    name: "http-classes-with-new",
    description: "Instantiate node:http classes with the new keyword",
    deprecations: ["DEP0195"],
    factory: || Box::new(HttpClassesWithNew),
}
