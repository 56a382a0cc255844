//! # The CoffeeShop — where everything gets brewed
//!
//! The shop owns the recipe book, one coffee maker per strategy, the
//! shared-instance cache and the set of loaded definitions.
//!
//! # Architecture
//! ```text
//! brew(id) ──> alias table ──> recipe book ──> coffee maker ──> Brewed
//!                 (1 hop)     exact / wildcard    │
//!                                                 ├─ ensure_loaded ──> DefinitionLocator
//!                                                 └─ DependencyInjector ──> brew(dep) ...
//! ```
//!
//! # Examples
//! ```rust
//! use coffeeshop_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Mailer;
//!
//! let locator = SourceIndex::isolated().autoloadable(
//!     TypeDefinition::class("Mailer").constructor(|_| Ok(Arc::new(Mailer) as Instance)),
//! );
//!
//! let shop = CoffeeShop::builder()
//!     .locator(locator)
//!     .recipe(Recipe::builder("Mailer").strategy(Strategy::Shared).alias("mail").build().unwrap())
//!     .build()
//!     .expect("Failed to open shop");
//!
//! let a: Arc<Mailer> = shop.brew_as("mail", Arguments::new()).unwrap();
//! let b: Arc<Mailer> = shop.brew_as("Mailer", Arguments::new()).unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use coffeeshop_support::pattern::{WildcardPattern, expand_template};
use coffeeshop_support::rendering::suggest_similar;
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::definition::{Arguments, Brewable, Instance, TypeDefinition};
use crate::error::{
    AmbiguousDefinitionError, CoffeeShopError, DefinitionNotFoundError, NoRecipeFoundError,
    Result,
};
use crate::injector::{BrewContext, DependencyInjector};
use crate::locator::{DefinitionLocator, SourceIndex};
use crate::maker::{Brewed, CoffeeMaker, LoadOnlyCoffeeMaker, NewCoffeeMaker, SharedCoffeeMaker};
use crate::provider::{Provider, RecipeRegistry, Registrations};
use crate::recipe::Recipe;
use crate::registry::{AliasEntry, MatchKind, RecipeBook};
use crate::strategy::Strategy;

const MAX_SUGGESTIONS: usize = 3;

// ═══════════════════════════════════════════
// CoffeeShopBuilder
// ═══════════════════════════════════════════

/// Builds a [`CoffeeShop`].
///
/// Registration errors are remembered and reported by
/// [`build()`](CoffeeShopBuilder::build); the first one wins.
///
/// # Examples
/// ```rust,ignore
/// let shop = CoffeeShop::builder()
///     .locator(index)
///     .recipe(Recipe::builder("EE_*").strategy(Strategy::Shared).path("core/*.core.php").build()?)
///     .add_provider(&menu)
///     .build()?;
/// ```
pub struct CoffeeShopBuilder {
    locator: Option<Arc<dyn DefinitionLocator>>,
    registrations: Registrations,
    makers: Vec<(Strategy, Arc<dyn CoffeeMaker>)>,
    defaults: bool,
    allow_override: bool,
    error: Option<CoffeeShopError>,
}

impl CoffeeShopBuilder {
    fn new() -> Self {
        Self {
            locator: None,
            registrations: Registrations::new(),
            makers: Vec::new(),
            defaults: true,
            allow_override: false,
            error: None,
        }
    }

    /// The locator definitions are loaded from.
    ///
    /// Defaults to an empty [`SourceIndex`] backed by the autoload inventory.
    pub fn locator(self, locator: impl DefinitionLocator + 'static) -> Self {
        self.shared_locator(Arc::new(locator))
    }

    /// Like [`locator`](Self::locator), keeping a handle on the caller's side.
    pub fn shared_locator(mut self, locator: Arc<dyn DefinitionLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn recipe(mut self, recipe: Recipe) -> Self {
        self.registrations.add_recipe(recipe);
        self
    }

    /// Adds a recipe straight from its builder.
    pub fn try_recipe(mut self, recipe: Result<Recipe>) -> Self {
        match recipe {
            Ok(recipe) => self.registrations.add_recipe(recipe),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Makes a definition available without going through the locator.
    pub fn definition(mut self, definition: TypeDefinition) -> Self {
        self.registrations.add_definition(definition);
        self
    }

    /// Makes a [`Brewable`] type available without going through the locator.
    pub fn brewable<T: Brewable>(self) -> Self {
        self.definition(T::definition())
    }

    /// Installs `maker` for `strategy`, replacing the stock one.
    pub fn coffee_maker(mut self, maker: Arc<dyn CoffeeMaker>, strategy: Strategy) -> Self {
        self.makers.push((strategy, maker));
        self
    }

    /// Add a [`Provider`] module.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        let mut collected = Registrations::new();
        match provider.register(&mut collected) {
            Ok(()) => {
                self.registrations.recipes.extend(collected.recipes);
                self.registrations.definitions.extend(collected.definitions);
            }
            Err(error) => self.fail(error),
        }
        self
    }

    /// Allow re-adding a recipe identifier, replacing the earlier recipe.
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.allow_override = allow;
        self
    }

    /// Skip the stock coffee makers and the catch-all recipe.
    pub fn without_defaults(mut self) -> Self {
        self.defaults = false;
        self
    }

    /// Opens the shop.
    ///
    /// # Errors
    /// The first registration error: `InvalidStrategy`, `InvalidRecipe`,
    /// `DuplicateAlias` or `RecipeAlreadyRegistered`.
    #[instrument(skip(self), name = "coffeeshop_build")]
    pub fn build(self) -> Result<CoffeeShop> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let locator = self
            .locator
            .unwrap_or_else(|| Arc::new(SourceIndex::new()) as Arc<dyn DefinitionLocator>);
        info!(
            locator = locator.name(),
            recipes = self.registrations.recipes.len(),
            definitions = self.registrations.definitions.len(),
            "Opening coffee shop"
        );

        let shop = CoffeeShop::bare(locator, self.allow_override);
        if self.defaults {
            shop.install_defaults()?;
        }
        for (strategy, maker) in self.makers {
            shop.add_coffee_maker(maker, strategy);
        }
        shop.apply(self.registrations)?;

        info!(recipes = shop.recipe_count(), "Coffee shop open ✓");
        Ok(shop)
    }

    fn fail(&mut self, error: CoffeeShopError) {
        debug!(error = %error, "Registration failed");
        self.error.get_or_insert(error);
    }
}

impl fmt::Debug for CoffeeShopBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoffeeShopBuilder")
            .field("recipes", &self.registrations.recipes.len())
            .field("definitions", &self.registrations.definitions.len())
            .field("makers", &self.makers.len())
            .field("defaults", &self.defaults)
            .field("allow_override", &self.allow_override)
            .finish()
    }
}

// ═══════════════════════════════════════════
// CoffeeShop
// ═══════════════════════════════════════════

/// Dependency injection container resolving identifiers through recipes.
///
/// Thread-safe: recipes and makers sit behind `RwLock`s, caches are
/// concurrent maps, and no lock is held while a coffee maker runs.
/// When two threads race to brew the same shared identifier the first
/// stored instance wins and both callers receive it.
pub struct CoffeeShop {
    recipes: RwLock<RecipeBook>,
    makers: RwLock<HashMap<Strategy, Arc<dyn CoffeeMaker>>>,
    shared: DashMap<String, Instance>,
    definitions: DashMap<String, Arc<TypeDefinition>>,
    loaded_sources: DashSet<String>,
    locator: Arc<dyn DefinitionLocator>,
    allow_override: bool,
}

impl CoffeeShop {
    /// Create a new builder.
    pub fn builder() -> CoffeeShopBuilder {
        CoffeeShopBuilder::new()
    }

    /// A shop with the stock coffee makers and the catch-all recipe.
    ///
    /// # Errors
    /// Never in practice; kept fallible to match [`CoffeeShopBuilder::build`].
    pub fn open(locator: impl DefinitionLocator + 'static) -> Result<Self> {
        Self::builder().locator(locator).build()
    }

    fn bare(locator: Arc<dyn DefinitionLocator>, allow_override: bool) -> Self {
        Self {
            recipes: RwLock::new(RecipeBook::new()),
            makers: RwLock::new(HashMap::new()),
            shared: DashMap::new(),
            definitions: DashMap::new(),
            loaded_sources: DashSet::new(),
            locator,
            allow_override,
        }
    }

    fn install_defaults(&self) -> Result<()> {
        let injector = DependencyInjector::new();
        self.add_coffee_maker(Arc::new(NewCoffeeMaker::new(injector)), Strategy::New);
        self.add_coffee_maker(Arc::new(SharedCoffeeMaker::new(injector)), Strategy::Shared);
        self.add_coffee_maker(Arc::new(LoadOnlyCoffeeMaker::new()), Strategy::LoadOnly);
        self.recipes.write().add(Recipe::default_recipe(), true)?;
        Ok(())
    }

    fn apply(&self, registrations: Registrations) -> Result<()> {
        for definition in registrations.definitions {
            self.define(definition);
        }
        for recipe in registrations.recipes {
            self.add_recipe(recipe)?;
        }
        Ok(())
    }

    // ── Registration ──

    /// Adds a recipe.
    ///
    /// Replacing a recipe also drops the shared instances it brewed, so
    /// the next brew goes through the new recipe.
    ///
    /// # Errors
    /// - [`CoffeeShopError::DuplicateAlias`] — an alias is taken
    /// - [`CoffeeShopError::RecipeAlreadyRegistered`] — identifier taken
    ///   and overrides are disabled
    pub fn add_recipe(&self, recipe: Recipe) -> Result<()> {
        let mut book = self.recipes.write();
        let pattern = recipe.pattern().cloned();
        let identifier = recipe.identifier().to_string();
        if !book.add(recipe, self.allow_override)? {
            return Ok(());
        }

        match pattern {
            // instances brewed through the wildcard, not through an exact recipe
            Some(pattern) => self.shared.retain(|cached, _| {
                !pattern.matches(cached) || book.has_exact(cached)
            }),
            None => {
                self.shared.remove(&identifier);
            }
        }
        debug!(identifier = %identifier, "Dropped shared instances of replaced recipe");
        Ok(())
    }

    /// Installs `maker` for `strategy`, replacing any previous maker.
    pub fn add_coffee_maker(&self, maker: Arc<dyn CoffeeMaker>, strategy: Strategy) {
        debug!(maker = maker.name(), strategy = %strategy, "Installing coffee maker");
        if let Some(previous) = self.makers.write().insert(strategy, maker) {
            trace!(replaced = previous.name(), "Replaced coffee maker");
        }
    }

    /// Applies a [`Provider`] to a running shop.
    ///
    /// # Errors
    /// The provider's own error, or the first failing `add_recipe`.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Adding provider");
        let mut collected = Registrations::new();
        provider.register(&mut collected)?;
        self.apply(collected)
    }

    /// Makes a definition available without going through the locator.
    ///
    /// A type is declared once; if one with the same name is already
    /// loaded, that one is kept and returned.
    pub fn define(&self, definition: TypeDefinition) -> Arc<TypeDefinition> {
        let name = definition.name().to_string();
        self.definitions
            .entry(name)
            .or_insert_with(|| {
                trace!(type_name = %definition.name(), "Declared definition");
                Arc::new(definition)
            })
            .value()
            .clone()
    }

    /// Registers an already constructed instance as a shared service.
    ///
    /// Adds a SHARED recipe for `identifier` unless one exists.
    ///
    /// # Errors
    /// [`CoffeeShopError::InvalidRecipe`] if the identifier is a wildcard
    /// or its existing recipe is not SHARED.
    pub fn add_service(&self, identifier: &str, instance: Instance) -> Result<()> {
        if WildcardPattern::is_wildcard(identifier) {
            return Err(CoffeeShopError::InvalidRecipe {
                identifier: identifier.to_string(),
                reason: "services need a concrete identifier",
            });
        }

        let canonical = {
            let mut book = self.recipes.write();
            let canonical = book.canonical(identifier).to_string();
            match book.find(&canonical) {
                Some(found) if found.kind == MatchKind::Exact => {
                    if found.recipe.strategy() != Strategy::Shared {
                        return Err(CoffeeShopError::InvalidRecipe {
                            identifier: canonical,
                            reason: "services can only replace shared recipes",
                        });
                    }
                }
                _ => {
                    book.add(Recipe::new(canonical.clone(), Strategy::Shared)?, false)?;
                }
            }
            canonical
        };

        debug!(identifier, canonical = %canonical, "Added shared service");
        self.shared.insert(canonical, instance);
        Ok(())
    }

    // ── Brewing ──

    /// Brews `identifier`.
    ///
    /// # Errors
    /// - [`CoffeeShopError::NoRecipeFound`] — no recipe, wildcard or loadable type
    /// - [`CoffeeShopError::UnknownStrategy`] — no maker for the recipe's strategy
    /// - [`CoffeeShopError::CircularDependency`] — a dependency leads back here
    /// - [`CoffeeShopError::UnresolvableDependency`] — a parameter has no value
    /// - [`CoffeeShopError::AmbiguousDefinition`] / [`CoffeeShopError::DefinitionNotFound`]
    #[instrument(skip(self, arguments))]
    pub fn brew(&self, identifier: &str, arguments: Arguments) -> Result<Brewed> {
        self.brew_in(identifier, &arguments, &mut BrewContext::new())
    }

    /// Brews `identifier` and downcasts the instance.
    ///
    /// ```rust,ignore
    /// let bus: Arc<CommandBus> = shop.brew_as("CommandBus", Arguments::new())?;
    /// ```
    pub fn brew_as<T: Send + Sync + 'static>(
        &self,
        identifier: &str,
        arguments: Arguments,
    ) -> Result<Arc<T>> {
        self.brew(identifier, arguments)?.downcast::<T>(identifier)
    }

    /// Brews `identifier` as part of an ongoing resolution.
    ///
    /// Coffee makers and the injector call this for nested brews so the
    /// context can catch cycles.
    pub fn brew_in(
        &self,
        identifier: &str,
        arguments: &Arguments,
        ctx: &mut BrewContext,
    ) -> Result<Brewed> {
        let (canonical, found) = {
            let book = self.recipes.read();
            let canonical = book.canonical(identifier).to_string();
            let found = book.find(&canonical);
            (canonical, found)
        };
        let Some(found) = found else {
            return Err(self.no_recipe(identifier, ctx));
        };

        let strategy = found.recipe.strategy();
        if strategy.is_cached() {
            if let Some(instance) = self.shared_instance(&canonical) {
                trace!(identifier, canonical = %canonical, "Serving shared instance");
                if !arguments.is_empty() {
                    debug!(identifier, "Ignoring arguments for an already brewed shared instance");
                }
                return Ok(Brewed::Instance(instance));
            }
        }

        let maker = self.makers.read().get(&strategy).cloned().ok_or_else(|| {
            CoffeeShopError::UnknownStrategy {
                identifier: canonical.clone(),
                strategy,
            }
        })?;

        trace!(identifier, canonical = %canonical, maker = maker.name(), depth = ctx.depth(), "Brewing");
        ctx.enter(&canonical)?;
        let result = maker.brew(self, &found.recipe, arguments, ctx);
        ctx.leave();

        match result {
            // a type nobody registered and nobody can load
            Err(CoffeeShopError::DefinitionNotFound(ref err))
                if found.kind == MatchKind::Default && err.identifier == canonical =>
            {
                Err(self.no_recipe(identifier, ctx))
            }
            other => other,
        }
    }

    // ── Lookup ──

    /// Returns `true` if `identifier` has a recipe, alias, wildcard match
    /// or an already brewed service.
    ///
    /// The catch-all recipe does not count.
    pub fn has(&self, identifier: &str) -> bool {
        let book = self.recipes.read();
        book.knows(identifier) || self.shared.contains_key(book.canonical(identifier))
    }

    /// The shared instance for `identifier`, without brewing.
    pub fn get(&self, identifier: &str) -> Option<Instance> {
        let canonical = self.canonical(identifier);
        self.shared_instance(&canonical)
    }

    /// Resolves an alias (one hop); other identifiers come back unchanged.
    pub fn canonical(&self, identifier: &str) -> String {
        self.recipes.read().canonical(identifier).to_string()
    }

    /// Returns `true` if the injector may brew `identifier` for a parameter.
    ///
    /// Beyond [`has`](Self::has), a type the catch-all recipe would serve
    /// counts when its definition can actually be loaded.
    pub fn recognizes(&self, identifier: &str) -> bool {
        let by_default = {
            let book = self.recipes.read();
            if book.knows(identifier) {
                return true;
            }
            matches!(book.find(identifier), Some(found) if found.kind == MatchKind::Default)
        };
        by_default && self.is_loadable(identifier)
    }

    /// Snapshot of the alias table.
    pub fn aliases(&self) -> BTreeMap<String, AliasEntry> {
        self.recipes.read().aliases()
    }

    /// Bumped on every alias table change.
    pub fn alias_version(&self) -> u64 {
        self.recipes.read().alias_version()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.read().len()
    }

    // ── Maker support ──

    /// The cached instance for a canonical identifier.
    pub fn shared_instance(&self, canonical: &str) -> Option<Instance> {
        self.shared.get(canonical).map(|entry| entry.value().clone())
    }

    /// Caches `instance` for `recipe` and points the recipe's aliases at it.
    ///
    /// If another instance was stored first, that one is kept and returned.
    pub fn store_shared(&self, recipe: &Recipe, instance: Instance) -> Instance {
        let stored = self
            .shared
            .entry(recipe.identifier().to_string())
            .or_insert(instance)
            .value()
            .clone();

        let redirected = self.recipes.write().promote(recipe);
        for alias in &redirected {
            debug!(alias = %alias, target = recipe.identifier(), "Alias redirected");
        }
        stored
    }

    /// Loads the definition `recipe` produces.
    ///
    /// Order: already loaded, then autoload by type name, then each path
    /// template with `*` replaced by the identifier, glob metacharacters
    /// escaped. A template matching no source moves on to the next one.
    ///
    /// # Errors
    /// - [`CoffeeShopError::AmbiguousDefinition`] — a template matches several sources
    /// - [`CoffeeShopError::DefinitionNotFound`] — nothing provides the type
    pub fn ensure_loaded(&self, recipe: &Recipe) -> Result<Arc<TypeDefinition>> {
        let type_name = recipe.fqcn();
        if let Some(definition) = self.definitions.get(type_name) {
            return Ok(definition.value().clone());
        }

        if let Some(definition) = self.locator.autoload(type_name) {
            trace!(type_name, "Autoloaded definition");
            return Ok(self.define(definition));
        }

        // identifiers are literal text inside the glob
        let literal = glob::Pattern::escape(recipe.identifier());
        let mut searched = Vec::new();
        for template in recipe.paths() {
            let pattern = expand_template(template, &literal);
            let candidates = self.locator.locate(&pattern)?;

            match candidates.as_slice() {
                [] => trace!(pattern = %pattern, "No source matches"),
                [source] => {
                    self.load_source(source)?;
                    if let Some(definition) = self.definitions.get(type_name) {
                        return Ok(definition.value().clone());
                    }
                    trace!(source = %source, type_name, "Source does not declare type");
                }
                _ => {
                    warn!(
                        identifier = recipe.identifier(),
                        pattern = %pattern,
                        matches = candidates.len(),
                        "Ambiguous definition"
                    );
                    return Err(CoffeeShopError::AmbiguousDefinition(
                        AmbiguousDefinitionError {
                            identifier: recipe.identifier().to_string(),
                            pattern,
                            candidates,
                        },
                    ));
                }
            }
            searched.push(pattern);
        }

        Err(CoffeeShopError::DefinitionNotFound(DefinitionNotFoundError {
            identifier: recipe.identifier().to_string(),
            type_name: type_name.to_string(),
            searched,
        }))
    }

    // ── Internal ──

    fn load_source(&self, source: &str) -> Result<()> {
        if self.loaded_sources.contains(source) {
            trace!(source, "Source already loaded");
            return Ok(());
        }

        let definitions = self.locator.load(source)?;
        debug!(source, declares = definitions.len(), locator = self.locator.name(), "Loaded source");
        for definition in definitions {
            self.define(definition);
        }
        self.loaded_sources.insert(source.to_string());
        Ok(())
    }

    fn is_loadable(&self, type_name: &str) -> bool {
        if self.definitions.contains_key(type_name) {
            return true;
        }
        match self.locator.autoload(type_name) {
            Some(definition) => {
                self.define(definition);
                true
            }
            None => false,
        }
    }

    fn no_recipe(&self, identifier: &str, ctx: &BrewContext) -> CoffeeShopError {
        let names = self.recipes.read().names();
        let available: Vec<&str> = names.iter().map(String::as_str).collect();
        CoffeeShopError::NoRecipeFound(NoRecipeFoundError {
            requested: identifier.to_string(),
            required_by: ctx.current().map(str::to_string),
            suggestions: suggest_similar(identifier, &available, MAX_SUGGESTIONS),
        })
    }
}

impl fmt::Debug for CoffeeShop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoffeeShop")
            .field("recipes", &self.recipe_count())
            .field("makers", &self.makers.read().len())
            .field("shared", &self.shared.len())
            .field("definitions", &self.definitions.len())
            .field("locator", &self.locator.name())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{CoffeeShop, CoffeeShopBuilder};
    pub use crate::definition::{Arguments, Brewable, Instance, Parameter, TypeDefinition};
    pub use crate::error::{CoffeeShopError, Result};
    pub use crate::injector::BrewContext;
    pub use crate::locator::{DefinitionLocator, SourceIndex};
    pub use crate::maker::{Brewed, CoffeeMaker};
    pub use crate::provider::{Menu, Provider, RecipeRegistry};
    pub use crate::recipe::Recipe;
    pub use crate::strategy::Strategy;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Parameter;

    struct Config;

    fn config_definition() -> TypeDefinition {
        TypeDefinition::class("EE_Config").constructor(|_| Ok(Arc::new(Config) as Instance))
    }

    #[test]
    fn open_installs_stock_makers_and_default_recipe() {
        let shop = CoffeeShop::open(SourceIndex::isolated()).unwrap();
        assert_eq!(shop.makers.read().len(), 3);
        assert_eq!(shop.recipe_count(), 1);
    }

    #[test]
    fn default_recipe_brews_loadable_types() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated().autoloadable(config_definition()))
            .build()
            .unwrap();

        let a = shop.brew("EE_Config", Arguments::new()).unwrap();
        let b = shop.brew("EE_Config", Arguments::new()).unwrap();
        let (a, b) = (a.into_instance().unwrap(), b.into_instance().unwrap());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_type_is_no_recipe_found() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated())
            .recipe(Recipe::new("EE_Registry", Strategy::Shared).unwrap())
            .build()
            .unwrap();

        match shop.brew("EE_Regisrty", Arguments::new()) {
            Err(CoffeeShopError::NoRecipeFound(err)) => {
                assert_eq!(err.requested, "EE_Regisrty");
                assert!(err.required_by.is_none());
                assert_eq!(err.suggestions, vec!["EE_Registry".to_string()]);
            }
            other => panic!("Expected NoRecipeFound, got: {other:?}"),
        }
    }

    #[test]
    fn without_defaults_nothing_is_brewable() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated().autoloadable(config_definition()))
            .without_defaults()
            .build()
            .unwrap();

        assert!(matches!(
            shop.brew("EE_Config", Arguments::new()),
            Err(CoffeeShopError::NoRecipeFound(_))
        ));
    }

    #[test]
    fn missing_maker_is_unknown_strategy() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated().autoloadable(config_definition()))
            .without_defaults()
            .recipe(Recipe::new("EE_Config", Strategy::Shared).unwrap())
            .build()
            .unwrap();

        match shop.brew("EE_Config", Arguments::new()) {
            Err(CoffeeShopError::UnknownStrategy { identifier, strategy }) => {
                assert_eq!(identifier, "EE_Config");
                assert_eq!(strategy, Strategy::Shared);
            }
            other => panic!("Expected UnknownStrategy, got: {other:?}"),
        }
    }

    #[test]
    fn builder_reports_first_error() {
        let result = CoffeeShop::builder()
            .locator(SourceIndex::isolated())
            .try_recipe(Recipe::parse("A", "espresso"))
            .try_recipe(Recipe::parse("", "new"))
            .build();

        assert!(matches!(result, Err(CoffeeShopError::InvalidStrategy { .. })));
    }

    #[test]
    fn add_service_is_shared() {
        let shop = CoffeeShop::open(SourceIndex::isolated()).unwrap();
        let config: Instance = Arc::new(Config);
        shop.add_service("EE_Config", config.clone()).unwrap();

        assert!(shop.has("EE_Config"));
        let brewed = shop.brew("EE_Config", Arguments::new()).unwrap();
        assert!(Arc::ptr_eq(&brewed.into_instance().unwrap(), &config));
    }

    #[test]
    fn add_service_rejects_non_shared_recipe() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated())
            .recipe(Recipe::new("EE_Config", Strategy::New).unwrap())
            .build()
            .unwrap();

        assert!(matches!(
            shop.add_service("EE_Config", Arc::new(Config)),
            Err(CoffeeShopError::InvalidRecipe { .. })
        ));
        assert!(matches!(
            shop.add_service("EE_*", Arc::new(Config)),
            Err(CoffeeShopError::InvalidRecipe { .. })
        ));
    }

    #[test]
    fn recognizes_loadable_types_only() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated().autoloadable(config_definition()))
            .recipe(Recipe::new("obj1", Strategy::Shared).unwrap())
            .build()
            .unwrap();

        assert!(shop.recognizes("obj1"));
        assert!(shop.recognizes("EE_Config"));
        assert!(!shop.recognizes("Missing"));
        assert!(!shop.has("EE_Config"));
    }

    #[test]
    fn nested_definition_not_found_passes_through() {
        let shop = CoffeeShop::builder()
            .locator(SourceIndex::isolated())
            .definition(
                TypeDefinition::class("EE_Front_Controller")
                    .param(Parameter::new("registry").typed("EE_Registry"))
                    .constructor(|_| Ok(Arc::new(()) as Instance)),
            )
            .recipe(Recipe::new("EE_Registry", Strategy::Shared).unwrap())
            .build()
            .unwrap();

        match shop.brew("EE_Front_Controller", Arguments::new()) {
            // EE_Registry has a recipe but no definition anywhere
            Err(CoffeeShopError::DefinitionNotFound(err)) => {
                assert_eq!(err.identifier, "EE_Registry");
            }
            other => panic!("Expected DefinitionNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn identifier_is_not_glob_syntax() {
        let index = Arc::new(
            SourceIndex::isolated().source("core/EE_A.core.php", [TypeDefinition::class("EE_A")]),
        );
        let shop = CoffeeShop::builder()
            .shared_locator(index.clone())
            .recipe(Recipe::builder("EE_?").path("core/*.core.php").build().unwrap())
            .recipe(Recipe::builder("EE_[").path("core/*.core.php").build().unwrap())
            .build()
            .unwrap();

        match shop.brew("EE_?", Arguments::new()) {
            Err(CoffeeShopError::DefinitionNotFound(err)) => {
                assert_eq!(err.searched, vec!["core/EE_[?].core.php".to_string()]);
            }
            other => panic!("Expected DefinitionNotFound, got: {other:?}"),
        }
        assert!(matches!(
            shop.brew("EE_[", Arguments::new()),
            Err(CoffeeShopError::DefinitionNotFound(_))
        ));
        assert_eq!(index.load_count(), 0);
    }

    #[test]
    fn debug_output() {
        let shop = CoffeeShop::open(SourceIndex::isolated()).unwrap();
        let debug = format!("{shop:?}");
        assert!(debug.contains("CoffeeShop"));
        assert!(debug.contains("SourceIndex"));
    }
}
