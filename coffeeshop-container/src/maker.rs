//! Coffee makers — one brewing routine per [`Strategy`].
//!
//! A shop dispatches every brew to the maker registered for the recipe's
//! strategy. The three stock makers are installed by
//! [`CoffeeShop::open`](crate::container::CoffeeShop::open); any of them
//! can be replaced with [`CoffeeShop::add_coffee_maker`].
//!
//! [`Strategy`]: crate::strategy::Strategy

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::container::CoffeeShop;
use crate::definition::{Arguments, Instance};
use crate::error::{CoffeeShopError, Result};
use crate::injector::{BrewContext, DependencyInjector};
use crate::recipe::Recipe;

/// What a brew hands back.
#[derive(Clone)]
pub enum Brewed {
    /// A constructed (or cached) instance.
    Instance(Instance),
    /// The definition is loaded; nothing was constructed.
    Loaded { type_name: String },
}

impl Brewed {
    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Brewed::Instance(instance) => Some(instance),
            Brewed::Loaded { .. } => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Brewed::Instance(instance) => Some(instance),
            Brewed::Loaded { .. } => None,
        }
    }

    #[inline]
    pub fn is_loaded_only(&self) -> bool {
        matches!(self, Brewed::Loaded { .. })
    }

    /// Downcasts the instance to `T`.
    ///
    /// # Errors
    /// [`CoffeeShopError::ConstructionFailed`] if nothing was constructed
    /// or the instance is not a `T`.
    pub fn downcast<T: Any + Send + Sync>(self, identifier: &str) -> Result<Arc<T>> {
        match self {
            Brewed::Instance(instance) => instance.downcast::<T>().map_err(|_| {
                CoffeeShopError::construction(
                    identifier,
                    format!("Type mismatch: expected {}", type_name::<T>()),
                )
            }),
            Brewed::Loaded { type_name: loaded } => Err(CoffeeShopError::construction(
                identifier,
                format!("{loaded} is load-only and has no instance"),
            )),
        }
    }
}

impl fmt::Debug for Brewed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brewed::Instance(_) => f.write_str("Brewed::Instance(..)"),
            Brewed::Loaded { type_name } => f
                .debug_struct("Brewed::Loaded")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

/// A brewing routine for one strategy.
///
/// Makers receive the concrete recipe (wildcards already expanded and
/// aliases already followed) and the resolution context of the current
/// call, which they pass on to any nested brew.
pub trait CoffeeMaker: Send + Sync {
    fn brew(
        &self,
        shop: &CoffeeShop,
        recipe: &Recipe,
        arguments: &Arguments,
        ctx: &mut BrewContext,
    ) -> Result<Brewed>;

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// Loads the definition, injects its parameters and runs the constructor.
fn construct(
    injector: &DependencyInjector,
    shop: &CoffeeShop,
    recipe: &Recipe,
    arguments: &Arguments,
    ctx: &mut BrewContext,
) -> Result<Instance> {
    let definition = shop.ensure_loaded(recipe)?;
    if !definition.is_instantiable() {
        return Err(CoffeeShopError::NotInstantiable {
            identifier: recipe.identifier().to_string(),
            type_name: definition.name().to_string(),
        });
    }
    let resolved = injector.resolve(shop, &definition, arguments, ctx)?;
    definition.instantiate(recipe.identifier(), resolved)
}

// ═══════════════════════════════════════════
// NEW
// ═══════════════════════════════════════════

/// Constructs a fresh instance on every brew.
#[derive(Debug, Default, Clone)]
pub struct NewCoffeeMaker {
    injector: DependencyInjector,
}

impl NewCoffeeMaker {
    pub fn new(injector: DependencyInjector) -> Self {
        Self { injector }
    }
}

impl CoffeeMaker for NewCoffeeMaker {
    fn brew(
        &self,
        shop: &CoffeeShop,
        recipe: &Recipe,
        arguments: &Arguments,
        ctx: &mut BrewContext,
    ) -> Result<Brewed> {
        trace!(identifier = recipe.identifier(), "Brewing new instance");
        construct(&self.injector, shop, recipe, arguments, ctx).map(Brewed::Instance)
    }

    fn name(&self) -> &str {
        "NewCoffeeMaker"
    }
}

// ═══════════════════════════════════════════
// SHARED
// ═══════════════════════════════════════════

/// Constructs once per canonical identifier and caches the result.
///
/// Producing an instance also points every alias of the recipe at it,
/// which is how a recipe listing another recipe's identifier as an alias
/// takes that identifier over.
#[derive(Debug, Default, Clone)]
pub struct SharedCoffeeMaker {
    injector: DependencyInjector,
}

impl SharedCoffeeMaker {
    pub fn new(injector: DependencyInjector) -> Self {
        Self { injector }
    }
}

impl CoffeeMaker for SharedCoffeeMaker {
    fn brew(
        &self,
        shop: &CoffeeShop,
        recipe: &Recipe,
        arguments: &Arguments,
        ctx: &mut BrewContext,
    ) -> Result<Brewed> {
        if let Some(instance) = shop.shared_instance(recipe.identifier()) {
            trace!(identifier = recipe.identifier(), "Shared instance already brewed");
            return Ok(Brewed::Instance(instance));
        }

        let instance = construct(&self.injector, shop, recipe, arguments, ctx)?;
        debug!(identifier = recipe.identifier(), "Brewed shared instance");
        Ok(Brewed::Instance(shop.store_shared(recipe, instance)))
    }

    fn name(&self) -> &str {
        "SharedCoffeeMaker"
    }
}

// ═══════════════════════════════════════════
// LOAD_ONLY
// ═══════════════════════════════════════════

/// Makes sure the definition is loaded and never constructs anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadOnlyCoffeeMaker;

impl LoadOnlyCoffeeMaker {
    pub fn new() -> Self {
        Self
    }
}

impl CoffeeMaker for LoadOnlyCoffeeMaker {
    fn brew(
        &self,
        shop: &CoffeeShop,
        recipe: &Recipe,
        _arguments: &Arguments,
        _ctx: &mut BrewContext,
    ) -> Result<Brewed> {
        let definition = shop.ensure_loaded(recipe)?;
        trace!(identifier = recipe.identifier(), type_name = %definition.name(), "Definition available");
        Ok(Brewed::Loaded {
            type_name: definition.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "LoadOnlyCoffeeMaker"
    }
}
