//! The recipe trait and its link-time registry.
//!
//! Every recipe registers itself with [`nodemod_recipe!`](crate::nodemod_recipe),
//! which submits a [`RecipeDescriptor`] to `inventory`. The runner and the
//! command line look recipes up by name through [`find_recipe`].

use nodemod_ast::SourceRoot;
use nodemod_foundation::{NodemodError, NodemodResult};

/// A transform over one parsed file
pub trait Recipe: Send + Sync {
    /// Registered name, e.g. `util-is`
    fn name(&self) -> &'static str;

    /// Rewrite the file. `Ok(None)` means there was nothing to change.
    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>>;

    /// npm packages made unnecessary once no file uses them anymore
    fn obsolete_dependencies(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Describes a recipe to the registry.
///
/// Created by the `nodemod_recipe!` macro and collected at link time.
pub struct RecipeDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Node.js deprecation codes (`DEP0044`), empty for userland migrations
    pub deprecations: &'static [&'static str],
    pub factory: fn() -> Box<dyn Recipe>,
}

inventory::collect!(RecipeDescriptor);

/// All registered recipes, sorted by name
pub fn iter_recipes() -> Vec<&'static RecipeDescriptor> {
    let mut recipes: Vec<_> = inventory::iter::<RecipeDescriptor>.into_iter().collect();
    recipes.sort_by_key(|descriptor| descriptor.name);
    recipes
}

/// Look a recipe up by name
pub fn find_recipe(name: &str) -> NodemodResult<&'static RecipeDescriptor> {
    inventory::iter::<RecipeDescriptor>
        .into_iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or_else(|| NodemodError::unknown_recipe(name))
}

/// Registers a recipe.
///
/// ```rust,ignore
/// nodemod_recipe! {
///     name: "util-is",
///     description: "Replace deprecated util.is*() type checks",
///     deprecations: ["DEP0044"],
///     factory: || Box::new(UtilIs),
/// }
/// ```
#[macro_export]
macro_rules! nodemod_recipe {
    (
        name: $name:expr,
        description: $description:expr,
        deprecations: [$($deprecation:expr),* $(,)?],
        factory: $factory:expr $(,)?
    ) => {
        $crate::inventory::submit! {
            $crate::recipe::RecipeDescriptor {
                name: $name,
                description: $description,
                deprecations: &[$($deprecation),*],
                factory: $factory,
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_recipe_is_registered_once() {
        let names: Vec<_> = iter_recipes().iter().map(|d| d.name).collect();
        let mut unique = names.clone();
        unique.dedup();
        assert_eq!(names, unique);
        assert_eq!(names.len(), 17);
    }

    #[test]
    fn test_factory_builds_matching_recipe() {
        for descriptor in iter_recipes() {
            let recipe = (descriptor.factory)();
            assert_eq!(recipe.name(), descriptor.name);
            assert!(!descriptor.description.is_empty());
        }
    }

    #[test]
    fn test_find_recipe() {
        assert_eq!(find_recipe("util-is").unwrap().name, "util-is");
        assert!(matches!(
            find_recipe("nope"),
            Err(NodemodError::UnknownRecipe { .. })
        ));
    }
}
