//! Dependency injection — filling constructor parameter lists.
//!
//! For each parameter of a [`TypeDefinition`], in order:
//! 1. a caller-supplied argument (named first, then positional) is used as is
//! 2. a type hint the shop recognizes is brewed recursively
//! 3. the parameter's default value is used
//! 4. otherwise resolution fails with `UnresolvableDependency`
//!
//! Recursion is guarded by a [`BrewContext`] holding the identifiers
//! currently being brewed on this call stack.

use tracing::{debug, instrument, trace, warn};

use crate::container::CoffeeShop;
use crate::definition::{Arguments, Instance, Parameter, ResolvedArguments, TypeDefinition};
use crate::error::{
    CircularDependencyError, CoffeeShopError, Result, UnresolvableDependencyError,
};
use crate::maker::Brewed;

/// The identifiers in progress for one top-level `brew()` call.
///
/// Created fresh by [`CoffeeShop::brew`] and threaded through every
/// nested brew, so no resolution state lives in the shop itself.
#[derive(Debug, Default, Clone)]
pub struct BrewContext {
    path: Vec<String>,
}

impl BrewContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `identifier`, failing if it is already in progress.
    ///
    /// # Errors
    /// [`CoffeeShopError::CircularDependency`] with the chain from the
    /// first occurrence back to `identifier`.
    pub fn enter(&mut self, identifier: &str) -> Result<()> {
        if let Some(start) = self.path.iter().position(|p| p == identifier) {
            let mut chain = self.path[start..].to_vec();
            chain.push(identifier.to_string());

            warn!(cycle = ?chain, "Circular dependency detected!");
            return Err(CoffeeShopError::CircularDependency(
                CircularDependencyError { chain },
            ));
        }
        self.path.push(identifier.to_string());
        Ok(())
    }

    /// Pops the innermost identifier.
    pub fn leave(&mut self) {
        self.path.pop();
    }

    /// The identifier currently being brewed, if any.
    pub fn current(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }
}

/// Resolves constructor arguments against a [`CoffeeShop`].
///
/// Stateless; one injector is shared by the shop's coffee makers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyInjector;

impl DependencyInjector {
    pub fn new() -> Self {
        Self
    }

    /// Produces the full, ordered argument list for `definition`.
    ///
    /// # Errors
    /// - [`CoffeeShopError::UnresolvableDependency`] — a parameter has no value
    /// - anything a recursive brew fails with (including `CircularDependency`)
    #[instrument(level = "trace", skip_all, fields(type_name = %definition.name()))]
    pub fn resolve(
        &self,
        shop: &CoffeeShop,
        definition: &TypeDefinition,
        arguments: &Arguments,
        ctx: &mut BrewContext,
    ) -> Result<ResolvedArguments> {
        let parameters = definition.parameters();
        if arguments.positional_len() > parameters.len() {
            debug!(
                type_name = %definition.name(),
                supplied = arguments.positional_len(),
                accepted = parameters.len(),
                "Ignoring surplus positional arguments"
            );
        }

        let values = parameters
            .iter()
            .enumerate()
            .map(|(position, parameter)| {
                self.resolve_parameter(shop, definition, position, parameter, arguments, ctx)
            })
            .collect::<Result<Vec<Instance>>>()?;

        Ok(ResolvedArguments::new(definition.name(), values))
    }

    fn resolve_parameter(
        &self,
        shop: &CoffeeShop,
        definition: &TypeDefinition,
        position: usize,
        parameter: &Parameter,
        arguments: &Arguments,
        ctx: &mut BrewContext,
    ) -> Result<Instance> {
        if let Some(value) = arguments.for_parameter(position, parameter.name()) {
            trace!(parameter = parameter.name(), "Using supplied argument");
            return Ok(value.clone());
        }

        if let Some(hint) = parameter.type_hint() {
            if shop.recognizes(hint) {
                trace!(parameter = parameter.name(), dependency = hint, "Brewing dependency");
                match shop.brew_in(hint, &Arguments::new(), ctx)? {
                    Brewed::Instance(instance) => return Ok(instance),
                    Brewed::Loaded { .. } => {
                        trace!(dependency = hint, "Dependency is load-only; trying the default")
                    }
                }
            }
        }

        if let Some(default) = parameter.default_arg() {
            trace!(parameter = parameter.name(), "Using default value");
            return Ok(default.clone());
        }

        Err(CoffeeShopError::UnresolvableDependency(
            UnresolvableDependencyError {
                type_name: definition.name().to_string(),
                parameter: parameter.name().to_string(),
                position,
                type_hint: parameter.type_hint().map(str::to_string),
            },
        ))
    }
}
