//! Foundation layer for nodemod
//!
//! - Error taxonomy shared by every crate ([`NodemodError`])
//! - Edit descriptors and their application ([`Edit`], [`commit_edits`])
//! - Text helpers for shebangs, directives, indentation and line endings

pub mod edit;
pub mod error;
pub mod text;

pub use edit::{commit_edits, Edit};
pub use error::{NodemodError, NodemodResult};
pub use text::Indent;
