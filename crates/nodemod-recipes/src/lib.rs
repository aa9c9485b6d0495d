//! Codemod recipes for deprecated Node.js APIs
//!
//! Each recipe is a [`Recipe`] registered at link time with
//! [`nodemod_recipe!`]. [`runner::run_recipe`] applies one recipe to a set
//! of files and directories and cleans up package.json afterwards.
//!
//! ```rust,ignore
//! use nodemod_recipes::{find_recipe, runner::run_recipe};
//!
//! let descriptor = find_recipe("util-is")?;
//! let report = run_recipe(descriptor, &[PathBuf::from("src")], &config).await?;
//! println!("{} files changed", report.changed());
//! ```

pub use inventory;

pub mod recipe;
pub mod recipes;
pub mod runner;

pub use recipe::{find_recipe, iter_recipes, Recipe, RecipeDescriptor};
pub use runner::{discover_files, run_recipe, FileFailure, RunReport};
