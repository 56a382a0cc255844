//! Recipe book — every recipe and alias a shop knows about.
//!
//! Exact recipes are keyed by identifier; wildcard recipes are kept in a
//! separate list and only consulted when no exact recipe exists.
//!
//! # Aliases
//! The alias table maps an alias to a canonical identifier and is
//! resolved with a single hop. An alias that names another recipe's
//! identifier is a *delegation*: it stays dormant (the identifier still
//! resolves to its own recipe) until the delegating recipe produces a
//! shared instance. From then on the identifier resolves to the delegate.
//!
//! Every write to the table bumps a version counter; for any alias the
//! most recent write wins.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{CoffeeShopError, DuplicateAliasError, Result};
use crate::recipe::Recipe;

/// One alias table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// The canonical identifier the alias resolves to.
    pub target: String,
    /// Table version at which this entry was written.
    pub version: u64,
}

/// How a recipe was found for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchKind {
    Exact,
    Wildcard,
    Default,
}

/// A recipe ready to brew a specific canonical identifier.
#[derive(Debug, Clone)]
pub(crate) struct RecipeMatch {
    pub recipe: Arc<Recipe>,
    pub kind: MatchKind,
}

/// Versioned alias table.
#[derive(Debug, Default)]
struct AliasTable {
    active: HashMap<String, AliasEntry>,
    /// Delegations waiting for their recipe's first shared production:
    /// alias → delegating recipe identifier.
    dormant: HashMap<String, String>,
    version: u64,
}

impl AliasTable {
    fn owner(&self, alias: &str) -> Option<&str> {
        self.active
            .get(alias)
            .map(|entry| entry.target.as_str())
            .or_else(|| self.dormant.get(alias).map(String::as_str))
    }

    fn point(&mut self, alias: &str, target: &str) -> bool {
        let changed = self
            .active
            .get(alias)
            .is_none_or(|entry| entry.target != target);
        if changed {
            self.version += 1;
            self.active.insert(
                alias.to_string(),
                AliasEntry {
                    target: target.to_string(),
                    version: self.version,
                },
            );
        }
        changed
    }

    fn forget_owner(&mut self, identifier: &str) {
        self.active.retain(|_, entry| entry.target != identifier);
        self.dormant.retain(|_, owner| owner != identifier);
    }
}

/// Stores all recipes and aliases of one shop.
#[derive(Debug, Default)]
pub(crate) struct RecipeBook {
    recipes: HashMap<String, Arc<Recipe>>,
    wildcards: Vec<Arc<Recipe>>,
    aliases: AliasTable,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recipe and its aliases.
    ///
    /// Returns `true` if an earlier recipe with the same identifier was
    /// replaced. All checks run before anything is written, so a failed
    /// call leaves the book untouched.
    ///
    /// # Errors
    /// - [`CoffeeShopError::RecipeAlreadyRegistered`] — identifier taken
    ///   and `allow_override` is false
    /// - [`CoffeeShopError::DuplicateAlias`] — the identifier is already an
    ///   active alias, or an alias already belongs to a different recipe or
    ///   names a wildcard recipe
    pub fn add(&mut self, recipe: Recipe, allow_override: bool) -> Result<bool> {
        let identifier = recipe.identifier().to_string();

        let replaces = if recipe.is_wildcard() {
            self.wildcards.iter().any(|w| w.identifier() == identifier)
        } else {
            self.recipes.contains_key(&identifier)
        };
        if replaces && !allow_override {
            return Err(CoffeeShopError::RecipeAlreadyRegistered { identifier });
        }

        // a dormant delegation only ever names an existing recipe, which is
        // being replaced here
        if let Some(entry) = self.aliases.active.get(&identifier) {
            return Err(duplicate(&identifier, &identifier, &entry.target));
        }

        let mut delegations = Vec::new();
        for alias in recipe.aliases() {
            if let Some(owner) = self.aliases.owner(alias) {
                if owner != identifier {
                    return Err(duplicate(alias, &identifier, owner));
                }
            }
            if self.wildcards.iter().any(|w| w.identifier() == alias) {
                return Err(duplicate(alias, &identifier, alias));
            }
            if self.recipes.contains_key(alias) {
                delegations.push(alias.to_string());
            }
        }

        if replaces {
            debug!(identifier = %identifier, "Replacing recipe");
            self.aliases.forget_owner(&identifier);
        }

        for alias in recipe.aliases() {
            if delegations.iter().any(|d| d == alias) {
                trace!(alias, delegate = %identifier, "Dormant delegation");
                self.aliases.dormant.insert(alias.to_string(), identifier.clone());
            } else {
                self.aliases.point(alias, &identifier);
            }
        }

        debug!(
            identifier = %identifier,
            strategy = %recipe.strategy(),
            aliases = recipe.aliases().count(),
            wildcard = recipe.is_wildcard(),
            "Added recipe"
        );

        let recipe = Arc::new(recipe);
        if recipe.is_wildcard() {
            self.wildcards.retain(|w| w.identifier() != identifier);
            self.wildcards.push(recipe);
        } else {
            self.recipes.insert(identifier, recipe);
        }
        Ok(replaces)
    }

    /// Resolves an identifier through the alias table (one hop).
    pub fn canonical<'a>(&'a self, identifier: &'a str) -> &'a str {
        match self.aliases.active.get(identifier) {
            Some(entry) => {
                trace!(from = identifier, to = %entry.target, "Following alias");
                &entry.target
            }
            None => identifier,
        }
    }

    /// Finds the recipe for a canonical identifier.
    ///
    /// Exact recipes win; otherwise the most specific matching wildcard
    /// recipe is turned into a concrete recipe for `identifier`.
    pub fn find(&self, identifier: &str) -> Option<RecipeMatch> {
        if let Some(recipe) = self.recipes.get(identifier) {
            return Some(RecipeMatch {
                recipe: recipe.clone(),
                kind: MatchKind::Exact,
            });
        }

        let best = self
            .wildcards
            .iter()
            .filter_map(|w| w.pattern().map(|p| (p, w)))
            .filter(|(pattern, _)| pattern.matches(identifier))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, recipe)| recipe)?;

        trace!(identifier, pattern = %best.identifier(), "Matched wildcard recipe");
        Some(RecipeMatch {
            recipe: Arc::new(best.derive_for(identifier)),
            kind: if best.is_default() {
                MatchKind::Default
            } else {
                MatchKind::Wildcard
            },
        })
    }

    /// Points every alias of `recipe` at its identifier.
    ///
    /// Called after a shared instance was produced. Returns the aliases
    /// whose target changed.
    pub fn promote(&mut self, recipe: &Recipe) -> Vec<String> {
        let mut changed = Vec::new();
        for alias in recipe.aliases() {
            self.aliases.dormant.remove(alias);
            if self.aliases.point(alias, recipe.identifier()) {
                changed.push(alias.to_string());
            }
        }
        changed
    }

    /// Returns `true` for identifiers with an exact recipe, a non-default
    /// wildcard match, or an alias.
    pub fn knows(&self, identifier: &str) -> bool {
        self.aliases.owner(identifier).is_some()
            || self.recipes.contains_key(identifier)
            || matches!(self.find(identifier), Some(m) if m.kind == MatchKind::Wildcard)
    }

    pub fn has_exact(&self, identifier: &str) -> bool {
        self.recipes.contains_key(identifier)
    }

    /// Snapshot of the active alias table.
    pub fn aliases(&self) -> BTreeMap<String, AliasEntry> {
        self.aliases
            .active
            .iter()
            .map(|(alias, entry)| (alias.clone(), entry.clone()))
            .collect()
    }

    pub fn alias_version(&self) -> u64 {
        self.aliases.version
    }

    /// All identifiers and aliases, for "did you mean?" suggestions.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.recipes.keys().cloned().collect();
        names.extend(self.aliases.active.keys().cloned());
        names.sort();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.recipes.len() + self.wildcards.len()
    }
}

fn duplicate(alias: &str, recipe: &str, existing: &str) -> CoffeeShopError {
    CoffeeShopError::DuplicateAlias(DuplicateAliasError {
        alias: alias.to_string(),
        recipe: recipe.to_string(),
        existing: existing.to_string(),
    })
}
