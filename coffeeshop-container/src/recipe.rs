//! Recipes — immutable descriptions of how to brew one identifier.
//!
//! A [`Recipe`] names an identifier, the [`Strategy`] used to brew it,
//! its aliases, the path templates used to locate its definition and,
//! optionally, the type it actually produces.
//!
//! # Examples
//! ```rust
//! use coffeeshop_container::recipe::Recipe;
//! use coffeeshop_container::strategy::Strategy;
//!
//! let recipe = Recipe::builder("EventEspresso\\core\\services\\commands\\CommandBus")
//!     .strategy(Strategy::Shared)
//!     .alias("CommandBus")
//!     .alias("CommandBusInterface")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(recipe.strategy(), Strategy::Shared);
//! assert_eq!(recipe.fqcn(), recipe.identifier());
//!
//! let models = Recipe::builder("EEM_*")
//!     .strategy(Strategy::Shared)
//!     .path("models/*.model.php")
//!     .build()
//!     .unwrap();
//! assert!(models.is_wildcard());
//! ```

use std::any::type_name;
use std::collections::BTreeSet;

use coffeeshop_support::pattern::WildcardPattern;

use crate::error::{CoffeeShopError, Result};
use crate::strategy::Strategy;

/// Identifier of the catch-all recipe used for ordinary types.
pub const DEFAULT_ID: &str = "*";

/// How to brew one identifier. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    identifier: String,
    strategy: Strategy,
    aliases: BTreeSet<String>,
    paths: Vec<String>,
    fqcn: Option<String>,
    pattern: Option<WildcardPattern>,
}

impl Recipe {
    /// A recipe with no aliases, paths or explicit type.
    ///
    /// # Errors
    /// [`CoffeeShopError::InvalidRecipe`] if the identifier is empty or
    /// has a wildcard anywhere but its first or last character.
    pub fn new(identifier: impl Into<String>, strategy: Strategy) -> Result<Self> {
        Self::builder(identifier).strategy(strategy).build()
    }

    /// Like [`Recipe::new`], with the strategy given by name.
    ///
    /// # Errors
    /// [`CoffeeShopError::InvalidStrategy`] for an unrecognized name.
    pub fn parse(identifier: impl Into<String>, strategy: &str) -> Result<Self> {
        Self::builder(identifier).strategy_name(strategy).build()
    }

    /// Starts building a recipe; the strategy defaults to [`Strategy::New`].
    pub fn builder(identifier: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder::new(identifier.into())
    }

    /// A recipe keyed by `T`'s type name.
    pub fn for_type<T: ?Sized + 'static>(strategy: Strategy) -> Result<Self> {
        Self::new(type_name::<T>(), strategy)
    }

    /// The catch-all recipe: any loadable type, brewed new.
    pub fn default_recipe() -> Self {
        Self {
            identifier: DEFAULT_ID.to_string(),
            strategy: Strategy::New,
            aliases: BTreeSet::new(),
            paths: Vec::new(),
            fqcn: None,
            pattern: Some(WildcardPattern::Any),
        }
    }

    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.contains(alias)
    }

    /// Path templates; every `*` stands for the identifier being brewed.
    #[inline]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The type this recipe produces. Defaults to the identifier.
    #[inline]
    pub fn fqcn(&self) -> &str {
        self.fqcn.as_deref().unwrap_or(&self.identifier)
    }

    /// Returns `true` if the recipe declares a type other than its identifier.
    pub fn has_explicit_type(&self) -> bool {
        self.fqcn.as_deref().is_some_and(|fqcn| fqcn != self.identifier)
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.pattern.is_some()
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.identifier == DEFAULT_ID
    }

    #[inline]
    pub fn pattern(&self) -> Option<&WildcardPattern> {
        self.pattern.as_ref()
    }

    /// The concrete recipe a wildcard recipe yields for `identifier`.
    ///
    /// The derived recipe keeps the strategy and path templates, has no
    /// aliases, and produces the type named by `identifier`.
    pub(crate) fn derive_for(&self, identifier: &str) -> Recipe {
        Recipe {
            identifier: identifier.to_string(),
            strategy: self.strategy,
            aliases: BTreeSet::new(),
            paths: self.paths.clone(),
            fqcn: None,
            pattern: None,
        }
    }
}

/// Builder for [`Recipe`]. Validation happens in [`build`](Self::build).
#[derive(Debug)]
pub struct RecipeBuilder {
    identifier: String,
    strategy: std::result::Result<Strategy, String>,
    aliases: Vec<String>,
    paths: Vec<String>,
    fqcn: Option<String>,
}

impl RecipeBuilder {
    fn new(identifier: String) -> Self {
        Self {
            identifier,
            strategy: Ok(Strategy::New),
            aliases: Vec::new(),
            paths: Vec::new(),
            fqcn: None,
        }
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Ok(strategy);
        self
    }

    /// Sets the strategy by configuration name; an unknown name fails at `build()`.
    pub fn strategy_name(mut self, name: &str) -> Self {
        self.strategy = name.parse::<Strategy>().map_err(|_| name.to_string());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// The fully qualified type produced, when it differs from the identifier.
    pub fn fqcn(mut self, fqcn: impl Into<String>) -> Self {
        let fqcn = fqcn.into();
        self.fqcn = (!fqcn.is_empty()).then_some(fqcn);
        self
    }

    /// Validates and builds the recipe.
    ///
    /// # Errors
    /// - [`CoffeeShopError::InvalidStrategy`] — unknown strategy name
    /// - [`CoffeeShopError::InvalidRecipe`] — malformed identifier or alias
    pub fn build(self) -> Result<Recipe> {
        let strategy = self
            .strategy
            .map_err(|given| CoffeeShopError::InvalidStrategy { given })?;

        let invalid = |reason| CoffeeShopError::InvalidRecipe {
            identifier: self.identifier.clone(),
            reason,
        };

        if self.identifier.trim().is_empty() {
            return Err(invalid("identifier is empty"));
        }

        let pattern = if WildcardPattern::is_wildcard(&self.identifier) {
            Some(
                WildcardPattern::parse(&self.identifier)
                    .ok_or_else(|| invalid("a wildcard may only start or end the identifier"))?,
            )
        } else {
            None
        };

        let mut aliases = BTreeSet::new();
        for alias in self.aliases {
            if alias.trim().is_empty() {
                return Err(invalid("alias is empty"));
            }
            if WildcardPattern::is_wildcard(&alias) {
                return Err(invalid("aliases cannot contain wildcards"));
            }
            if alias == self.identifier {
                return Err(invalid("alias repeats the recipe identifier"));
            }
            aliases.insert(alias);
        }

        if pattern.is_some() && !aliases.is_empty() {
            return Err(invalid("wildcard recipes cannot declare aliases"));
        }

        Ok(Recipe {
            identifier: self.identifier,
            strategy,
            aliases,
            paths: self.paths,
            fqcn: self.fqcn,
            pattern,
        })
    }
}
