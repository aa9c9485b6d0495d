//! `fs.F_OK`, `fs.R_OK`, `fs.W_OK`, `fs.X_OK` (DEP0176)

use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::member_exprs;
use nodemod_ast::{
    declared_names, ensure_named_import, module_dependencies, prune_unused_bindings,
    reference_sites, resolve_binding_candidates, SourceRoot,
};
use nodemod_foundation::NodemodResult;
use swc_common::Spanned;
use tracing::warn;

const MODES: &[&str] = &["F_OK", "R_OK", "W_OK", "X_OK"];

pub struct FsAccessModeConstants;

impl Recipe for FsAccessModeConstants {
    fn name(&self) -> &'static str {
        "fs-access-mode-constants"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let dependencies = module_dependencies(root, "fs");
        if dependencies.is_empty() {
            return Ok(None);
        }

        let constants_bound = dependencies
            .iter()
            .any(|dep| dep.named_local("constants") == Some("constants"));
        let constants_taken = !constants_bound && declared_names(root).contains("constants");

        let mut edits = Vec::new();
        // (specifier, local) of destructured modes whose uses were rewritten
        let mut named: Vec<(String, String)> = Vec::new();

        for dep in &dependencies {
            for mode in MODES {
                for candidate in resolve_binding_candidates(dep, &format!("$.{}", mode)) {
                    if candidate.contains('.') {
                        for member in member_exprs(root, &candidate) {
                            let object = root.text(member.obj.span());
                            edits.push(root.replace(
                                member.span,
                                format!("{}.constants.{}", object, mode),
                            ));
                        }
                        continue;
                    }

                    if constants_taken {
                        warn!(
                            binding = %candidate,
                            "`constants` is already declared, leaving destructured access mode"
                        );
                        continue;
                    }
                    for reference in reference_sites(root, &candidate) {
                        let replacement = if reference.shorthand {
                            format!("{}: constants.{}", candidate, mode)
                        } else {
                            format!("constants.{}", mode)
                        };
                        edits.push(root.replace(reference.span, replacement));
                    }
                    named.push((dep.specifier.clone(), candidate));
                }
            }
        }

        if edits.is_empty() && named.is_empty() {
            return Ok(None);
        }

        let mut updated = root.reparse(root.commit(edits)?)?;
        if let Some((specifier, _)) = named.first() {
            if let Some(edit) = ensure_named_import(&updated, specifier, "constants") {
                updated = updated.reparse(updated.commit(vec![edit])?)?;
            }
            let locals: Vec<String> = named.into_iter().map(|(_, local)| local).collect();
            updated = prune_unused_bindings(updated, "fs", &locals)?;
        }

        let source = updated.into_source();
        Ok((source != root.source()).then_some(source))
    }
}

nodemod_recipe! {
    name: "fs-access-mode-constants",
    description: "Move fs.F_OK, fs.R_OK, fs.W_OK and fs.X_OK to fs.constants",
    deprecations: ["DEP0176"],
    factory: || Box::new(FsAccessModeConstants),
}
