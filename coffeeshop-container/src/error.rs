//! Error types for CoffeeShop container operations.
//!
//! Every failure is local and synchronous: nothing is retried and nothing
//! is swallowed. The richer variants carry a dedicated struct so the
//! message can show the resolution chain and a hint.

use std::fmt;

use coffeeshop_support::rendering::{render_chain, render_list};

use crate::strategy::Strategy;

/// Main error type for all CoffeeShop operations.
#[derive(Debug, thiserror::Error)]
pub enum CoffeeShopError {
    /// A strategy name did not match any recognized strategy.
    #[error("Invalid brewing strategy {given:?}\n  Hint: expected one of: new, shared, load_only")]
    InvalidStrategy { given: String },

    /// A recipe was malformed (empty identifier, misplaced wildcard, ...).
    #[error("Invalid recipe {identifier:?}: {reason}")]
    InvalidRecipe {
        identifier: String,
        reason: &'static str,
    },

    /// An alias collides with another recipe's alias or identifier.
    #[error("{}", .0)]
    DuplicateAlias(DuplicateAliasError),

    /// A recipe with this identifier exists and overrides are disabled.
    #[error(
        "Recipe already registered: {identifier}\n  Hint: enable allow_override to replace recipes"
    )]
    RecipeAlreadyRegistered { identifier: String },

    /// Nothing knows how to brew the requested identifier.
    #[error("{}", .0)]
    NoRecipeFound(NoRecipeFoundError),

    /// A recipe uses a strategy that has no coffee maker.
    #[error(
        "No coffee maker registered for the {strategy} strategy (needed by {identifier})\n  Hint: call add_coffee_maker() for {strategy}"
    )]
    UnknownStrategy {
        identifier: String,
        strategy: Strategy,
    },

    /// A constructor parameter could not be filled.
    #[error("{}", .0)]
    UnresolvableDependency(UnresolvableDependencyError),

    /// Resolution came back to an identifier that is still being brewed.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// More than one source matched a path pattern for one identifier.
    #[error("{}", .0)]
    AmbiguousDefinition(AmbiguousDefinitionError),

    /// No source declared the requested type.
    #[error("{}", .0)]
    DefinitionNotFound(DefinitionNotFoundError),

    /// The definition has no constructor (interface or definition-only type).
    #[error("Cannot instantiate {type_name} (requested as {identifier}): it has no constructor")]
    NotInstantiable {
        identifier: String,
        type_name: String,
    },

    /// A constructor failed or an argument had the wrong type.
    #[error("Failed to construct {identifier}: {source}")]
    ConstructionFailed {
        identifier: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A path pattern could not be compiled.
    #[error("Invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl CoffeeShopError {
    /// Wraps any constructor error.
    pub fn construction(
        identifier: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CoffeeShopError::ConstructionFailed {
            identifier: identifier.into(),
            source: source.into(),
        }
    }
}

/// Error when an alias cannot be registered.
#[derive(Debug)]
pub struct DuplicateAliasError {
    /// The alias (or identifier) that collided
    pub alias: String,
    /// The recipe being registered
    pub recipe: String,
    /// The identifier the name already belongs to
    pub existing: String,
}

impl fmt::Display for DuplicateAliasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicate alias {:?} in recipe {}: already resolves to {}",
            self.alias, self.recipe, self.existing,
        )?;
        write!(f, "\n  Hint: aliases must be unique across all recipes")
    }
}

/// Error when no recipe matches a requested identifier.
///
/// Includes helpful hints about what went wrong.
#[derive(Debug)]
pub struct NoRecipeFoundError {
    /// The identifier that was requested
    pub requested: String,
    /// What was being brewed when this was requested (if anything)
    pub required_by: Option<String>,
    /// Similar identifiers or aliases that ARE registered
    pub suggestions: Vec<String>,
}

impl fmt::Display for NoRecipeFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No recipe found for {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:{}", render_list(&self.suggestions, 4))?;
        }

        write!(
            f,
            "\n  Hint: Did you forget to add a recipe for {:?}?",
            self.requested
        )
    }
}

/// Error when a constructor parameter has no value.
#[derive(Debug)]
pub struct UnresolvableDependencyError {
    /// The type being constructed
    pub type_name: String,
    /// The parameter that could not be filled
    pub parameter: String,
    /// Its position in the constructor
    pub position: usize,
    /// Its declared type, if any
    pub type_hint: Option<String>,
}

impl fmt::Display for UnresolvableDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot resolve parameter #{} `{}` of {}",
            self.position, self.parameter, self.type_name,
        )?;
        match self.type_hint {
            Some(ref hint) => write!(
                f,
                "\n  Hint: add a recipe for {hint} or pass the argument explicitly"
            ),
            None => write!(f, "\n  Hint: pass the argument explicitly or give it a default"),
        }
    }
}

/// Error when a circular dependency is detected.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The chain of identifiers that forms the cycle.
    /// Example: ["A", "B", "A"]
    pub chain: Vec<String>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: pass one side of the cycle as an explicit argument or restructure the recipes"
        )
    }
}

/// Error when a path pattern matches several sources.
#[derive(Debug)]
pub struct AmbiguousDefinitionError {
    /// The identifier being loaded
    pub identifier: String,
    /// The expanded pattern
    pub pattern: String,
    /// Every source that matched
    pub candidates: Vec<String>,
}

impl fmt::Display for AmbiguousDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous definition for {}: {} sources match {:?}{}",
            self.identifier,
            self.candidates.len(),
            self.pattern,
            render_list(&self.candidates, 4),
        )
    }
}

/// Error when no source provides a definition.
#[derive(Debug)]
pub struct DefinitionNotFoundError {
    /// The identifier being loaded
    pub identifier: String,
    /// The type that was expected to be declared
    pub type_name: String,
    /// Expanded patterns that were searched
    pub searched: Vec<String>,
}

impl fmt::Display for DefinitionNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Definition not found: {} (requested as {})",
            self.type_name, self.identifier,
        )?;
        if self.searched.is_empty() {
            write!(f, "\n  It is not autoloadable and the recipe lists no paths")
        } else {
            write!(f, "\n  Searched:{}", render_list(&self.searched, 4))
        }
    }
}

/// Convenient Result type for CoffeeShop operations.
pub type Result<T> = std::result::Result<T, CoffeeShopError>;
