//! swc based helpers shared by the recipes
//!
//! # Modules
//!
//! - [`root`] - Parsed file ([`SourceRoot`]) and span to text mapping
//! - [`query`] - Member paths, string literals, call lookup
//! - [`dependencies`] - Imports, requires and dynamic imports of a module
//! - [`binding_path`] - Resolving `$.a.b` paths against how a module was bound
//! - [`bindings`] - Removing, renaming and inserting bindings
//! - [`scope`] - References, declarations, enclosing functions
//!
//! # Example
//!
//! ```rust,ignore
//! use nodemod_ast::{module_dependencies, resolve_binding_paths, SourceRoot};
//!
//! let root = SourceRoot::parse("index.js", source)?;
//! let deps = module_dependencies(&root, "util");
//! for path in resolve_binding_paths(&deps, "$.types.isNativeError") {
//!     for call in nodemod_ast::query::calls_to(&root, &path) {
//!         // rewrite the call
//!     }
//! }
//! ```

pub mod binding_path;
pub mod bindings;
pub mod dependencies;
pub mod query;
pub mod root;
pub mod scope;

pub use binding_path::{resolve_binding_candidates, resolve_binding_path, resolve_binding_paths};
pub use bindings::{
    ensure_named_import, prune_unused_bindings, remove_binding, rename_binding,
    rename_binding_and_uses, used_bindings,
};
pub use dependencies::{
    import_calls, import_statements, matches_module, module_dependencies, require_calls,
    Bindings, DependencyKind, LocalBinding, ModuleDependency, NamedBinding,
};
pub use root::{ModuleKind, SourceRoot};
pub use scope::{declared_names, enclosing_function, is_referenced, reference_sites, references};

/// Whether the file is an ES module or a CommonJS script
pub fn module_kind(root: &SourceRoot) -> ModuleKind {
    root.module_kind()
}
