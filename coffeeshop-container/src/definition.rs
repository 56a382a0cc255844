//! Type definitions — what a brewable type looks like to the container.
//!
//! Rust has no constructor reflection, so each brewable type describes
//! itself with a [`TypeDefinition`]: its name, its ordered constructor
//! [`Parameter`]s and a constructor closure. `#[derive(Brewable)]`
//! generates one from a struct.
//!
//! # Examples
//! ```rust
//! use coffeeshop_container::definition::{Instance, Parameter, TypeDefinition};
//! use std::sync::Arc;
//!
//! struct Greeter { greeting: String }
//!
//! let definition = TypeDefinition::class("Greeter")
//!     .param(Parameter::new("greeting").default_value(String::from("hello")))
//!     .constructor(|args| {
//!         let greeting: String = args.cloned(0)?;
//!         Ok(Arc::new(Greeter { greeting }) as Instance)
//!     });
//!
//! assert!(definition.is_instantiable());
//! assert_eq!(definition.parameters().len(), 1);
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CoffeeShopError, Result};

/// A type-erased, shareable instance produced by the container.
///
/// Two brews return "the same instance" when [`Arc::ptr_eq`] holds.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Constructor closure stored in a [`TypeDefinition`].
///
/// `Arc` so definitions can be cloned and shared between threads.
pub type ConstructorFn = Arc<dyn Fn(ResolvedArguments) -> Result<Instance> + Send + Sync>;

/// Implemented by types that can describe their own constructor.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Brewable)]
/// struct CommandBus {
///     manager: Arc<CommandHandlerManager>,
/// }
/// ```
pub trait Brewable: Any + Send + Sync {
    /// The definition the container uses to construct `Self`.
    fn definition() -> TypeDefinition;
}

// ═══════════════════════════════════════════
// Parameter
// ═══════════════════════════════════════════

/// One constructor parameter.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    type_hint: Option<String>,
    default: Option<Instance>,
}

impl Parameter {
    /// An untyped parameter without a default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            default: None,
        }
    }

    /// Declares the identifier this parameter's type is registered under.
    ///
    /// A typed parameter is brewed from the container when the
    /// identifier is recognized there.
    pub fn typed(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Declares a default value.
    pub fn default_value<T: Any + Send + Sync>(self, value: T) -> Self {
        self.default_instance(Arc::new(value))
    }

    /// Declares a default from an already type-erased instance.
    pub fn default_instance(mut self, value: Instance) -> Self {
        self.default = Some(value);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    #[inline]
    pub fn default_arg(&self) -> Option<&Instance> {
        self.default.as_ref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type_hint", &self.type_hint)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════
// TypeDefinition
// ═══════════════════════════════════════════

/// Describes a type the container can load and possibly construct.
#[derive(Clone)]
pub struct TypeDefinition {
    name: String,
    parameters: Vec<Parameter>,
    constructor: Option<ConstructorFn>,
}

impl TypeDefinition {
    /// Starts a definition for a concrete type.
    ///
    /// Until [`constructor`](Self::constructor) is called the
    /// definition is not instantiable.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            constructor: None,
        }
    }

    /// A definition-only type (an interface): loadable, never constructed.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::class(name)
    }

    /// A parameterless definition for any `Default` type.
    ///
    /// ```
    /// use coffeeshop_container::definition::TypeDefinition;
    ///
    /// #[derive(Default)]
    /// struct Settings;
    ///
    /// let definition = TypeDefinition::defaulted::<Settings>("Settings");
    /// assert!(definition.parameters().is_empty());
    /// ```
    pub fn defaulted<T: Default + Any + Send + Sync>(name: impl Into<String>) -> Self {
        Self::class(name).constructor(|_| Ok(Arc::new(T::default()) as Instance))
    }

    /// The definition of a [`Brewable`] type.
    pub fn of<T: Brewable>() -> Self {
        T::definition()
    }

    /// Appends a constructor parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the constructor.
    pub fn constructor(
        mut self,
        constructor: impl Fn(ResolvedArguments) -> Result<Instance> + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns `true` if the definition has a constructor.
    #[inline]
    pub fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }

    /// Runs the constructor with fully resolved arguments.
    ///
    /// # Errors
    /// - [`CoffeeShopError::NotInstantiable`] — no constructor
    /// - whatever the constructor itself returns
    pub fn instantiate(&self, identifier: &str, arguments: ResolvedArguments) -> Result<Instance> {
        let constructor =
            self.constructor
                .as_ref()
                .ok_or_else(|| CoffeeShopError::NotInstantiable {
                    identifier: identifier.to_string(),
                    type_name: self.name.clone(),
                })?;
        constructor(arguments)
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("instantiable", &self.is_instantiable())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════

/// Caller-supplied constructor arguments.
///
/// Positional arguments cover parameters by index; named arguments cover
/// them by name and win over a positional argument for the same
/// parameter. Everything not covered is resolved by the injector.
///
/// ```
/// use coffeeshop_container::definition::Arguments;
///
/// let args = Arguments::new().push(42u32).with("label", String::from("x"));
/// assert!(args.positional(0).is_some());
/// assert!(args.named("label").is_some());
/// assert!(args.positional(1).is_none());
/// ```
#[derive(Clone, Default)]
pub struct Arguments {
    positional: Vec<Instance>,
    named: HashMap<String, Instance>,
}

impl Arguments {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn push<T: Any + Send + Sync>(self, value: T) -> Self {
        self.push_instance(Arc::new(value))
    }

    /// Appends an already type-erased positional argument.
    pub fn push_instance(mut self, value: Instance) -> Self {
        self.positional.push(value);
        self
    }

    /// Adds a named argument.
    pub fn with<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
        self.with_instance(name, Arc::new(value))
    }

    /// Adds an already type-erased named argument.
    pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
        self.named.insert(name.into(), value);
        self
    }

    #[inline]
    pub fn positional(&self, index: usize) -> Option<&Instance> {
        self.positional.get(index)
    }

    #[inline]
    pub fn named(&self, name: &str) -> Option<&Instance> {
        self.named.get(name)
    }

    /// The override for a parameter, named first.
    pub fn for_parameter(&self, index: usize, name: &str) -> Option<&Instance> {
        self.named(name).or_else(|| self.positional(index))
    }

    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<Vec<Instance>> for Arguments {
    fn from(positional: Vec<Instance>) -> Self {
        Self {
            positional,
            named: HashMap::new(),
        }
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.named.keys().collect();
        names.sort();
        f.debug_struct("Arguments")
            .field("positional", &self.positional.len())
            .field("named", &names)
            .finish()
    }
}

/// The complete, ordered argument list handed to a constructor.
pub struct ResolvedArguments {
    type_name: String,
    values: Vec<Instance>,
}

impl ResolvedArguments {
    pub(crate) fn new(type_name: impl Into<String>, values: Vec<Instance>) -> Self {
        Self {
            type_name: type_name.into(),
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw instance at `index`.
    pub fn get(&self, index: usize) -> Result<&Instance> {
        self.values.get(index).ok_or_else(|| {
            CoffeeShopError::construction(
                self.type_name.clone(),
                format!("Missing argument #{index}"),
            )
        })
    }

    /// The argument at `index` as a shared `Arc<T>`.
    pub fn arc<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        self.get(index)?
            .clone()
            .downcast::<T>()
            .map_err(|_| self.mismatch::<T>(index))
    }

    /// The argument at `index`, cloned out as `T`.
    pub fn cloned<T: Any + Send + Sync + Clone>(&self, index: usize) -> Result<T> {
        self.get(index)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| self.mismatch::<T>(index))
    }

    fn mismatch<T>(&self, index: usize) -> CoffeeShopError {
        CoffeeShopError::construction(
            self.type_name.clone(),
            format!("Type mismatch for argument #{index}: expected {}", type_name::<T>()),
        )
    }
}

impl fmt::Debug for ResolvedArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedArguments")
            .field("type_name", &self.type_name)
            .field("len", &self.values.len())
            .finish()
    }
}
