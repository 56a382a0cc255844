//! Providers — bundles of recipes and definitions registered together.
//!
//! A [`Provider`] groups the recipes of one subsystem so a shop can be
//! assembled from modules instead of one long registration block:
//!
//! ```rust,ignore
//! struct ModelsProvider;
//!
//! impl Provider for ModelsProvider {
//!     fn register(&self, registry: &mut dyn RecipeRegistry) -> Result<()> {
//!         registry.add_recipe(
//!             Recipe::builder("EEM_*")
//!                 .strategy(Strategy::Shared)
//!                 .path("models/*.model.php")
//!                 .build()?,
//!         );
//!         Ok(())
//!     }
//! }
//! ```
//!
//! [`Menu`] is a provider read from configuration data (any serde format).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::TypeDefinition;
use crate::error::Result;
use crate::recipe::Recipe;

/// A module that registers related recipes into a shop.
pub trait Provider: Send + Sync {
    /// Adds this provider's recipes and definitions.
    ///
    /// # Errors
    /// Whatever building the recipes fails with; nothing is applied then.
    fn register(&self, registry: &mut dyn RecipeRegistry) -> Result<()>;

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// What providers register into.
///
/// Registrations are collected first and applied to the shop in order
/// once the provider returns.
pub trait RecipeRegistry {
    fn add_recipe(&mut self, recipe: Recipe);

    fn add_definition(&mut self, definition: TypeDefinition);
}

/// Recipes and definitions waiting to be applied to a shop.
#[derive(Debug, Default)]
pub struct Registrations {
    pub(crate) recipes: Vec<Recipe>,
    pub(crate) definitions: Vec<TypeDefinition>,
}

impl Registrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn definitions(&self) -> &[TypeDefinition] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.definitions.is_empty()
    }
}

impl RecipeRegistry for Registrations {
    fn add_recipe(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    fn add_definition(&mut self, definition: TypeDefinition) {
        self.definitions.push(definition);
    }
}

// ═══════════════════════════════════════════
// Menu
// ═══════════════════════════════════════════

/// One recipe as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSpec {
    pub identifier: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub fqcn: Option<String>,
}

fn default_strategy() -> String {
    "new".to_string()
}

impl RecipeSpec {
    /// Validates the entry and builds the recipe.
    ///
    /// # Errors
    /// `InvalidStrategy` or `InvalidRecipe`, as [`Recipe::builder`] reports them.
    pub fn to_recipe(&self) -> Result<Recipe> {
        let mut builder = Recipe::builder(self.identifier.clone())
            .strategy_name(&self.strategy)
            .aliases(self.aliases.iter().cloned())
            .paths(self.paths.iter().cloned());
        if let Some(ref fqcn) = self.fqcn {
            builder = builder.fqcn(fqcn.clone());
        }
        builder.build()
    }
}

/// A list of recipes loaded from configuration.
///
/// ```rust
/// use coffeeshop_container::provider::Menu;
///
/// let menu: Menu = serde_json::from_str(r#"{
///     "recipes": [
///         { "identifier": "EEI_*", "strategy": "load_only", "paths": ["interfaces/*.interfaces.php"] },
///         { "identifier": "obj1", "strategy": "shared", "aliases": ["filter1"], "type": "ClassName" }
///     ]
/// }"#).unwrap();
/// assert_eq!(menu.recipes.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub recipes: Vec<RecipeSpec>,
}

impl Provider for Menu {
    fn register(&self, registry: &mut dyn RecipeRegistry) -> Result<()> {
        // build everything first so a bad entry registers nothing
        let recipes = self
            .recipes
            .iter()
            .map(RecipeSpec::to_recipe)
            .collect::<Result<Vec<_>>>()?;

        debug!(recipes = recipes.len(), "Registering menu");
        for recipe in recipes {
            registry.add_recipe(recipe);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Menu"
    }
}
