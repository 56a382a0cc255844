//! Definition locators — where type definitions come from.
//!
//! The container never reaches for a file system on its own. Everything
//! it knows about types arrives through a [`DefinitionLocator`]:
//! - **autoload**: definitions reachable by type name alone
//! - **locate**: source names matching a path pattern
//! - **load**: the definitions a source declares
//!
//! [`SourceIndex`] is an in-memory locator keyed by virtual source paths
//! and matched with `glob` patterns. Definitions can also be submitted at
//! compile time through [`Autoload`] entries (see `#[brewable(autoload)]`).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::{MatchOptions, Pattern};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::definition::{Brewable, TypeDefinition};
use crate::error::{CoffeeShopError, Result};

/// The loader collaborator used by the container.
///
/// Implementations must be cheap to call repeatedly; the container
/// remembers what it already loaded and does not ask twice.
pub trait DefinitionLocator: Send + Sync {
    /// A definition that can be loaded by name alone, if any.
    fn autoload(&self, type_name: &str) -> Option<TypeDefinition>;

    /// Every source whose path matches `pattern`, in a stable order.
    ///
    /// # Errors
    /// [`CoffeeShopError::InvalidPattern`] if the pattern cannot be compiled.
    fn locate(&self, pattern: &str) -> Result<Vec<String>>;

    /// The definitions declared by `source`.
    fn load(&self, source: &str) -> Result<Vec<TypeDefinition>>;

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ═══════════════════════════════════════════
// Autoload inventory
// ═══════════════════════════════════════════

/// A definition submitted at compile time.
///
/// ```rust,ignore
/// inventory::submit! { Autoload::new(<CommandBus as Brewable>::definition) }
/// ```
pub struct Autoload {
    build: fn() -> TypeDefinition,
}

impl Autoload {
    pub const fn new(build: fn() -> TypeDefinition) -> Self {
        Self { build }
    }

    pub fn definition(&self) -> TypeDefinition {
        (self.build)()
    }
}

inventory::collect!(Autoload);

/// Looks a type up among all [`Autoload`] submissions.
pub fn find_autoload(type_name: &str) -> Option<TypeDefinition> {
    inventory::iter::<Autoload>
        .into_iter()
        .map(Autoload::definition)
        .find(|definition| definition.name() == type_name)
}

// ═══════════════════════════════════════════
// SourceIndex
// ═══════════════════════════════════════════

/// In-memory [`DefinitionLocator`].
///
/// Sources are virtual paths (`"core/EE_Config.core.php"`) mapped to the
/// definitions they declare. Patterns use `glob` syntax, so `*` does not
/// cross `/` while `**` does.
///
/// # Examples
/// ```rust
/// use coffeeshop_container::definition::TypeDefinition;
/// use coffeeshop_container::locator::{DefinitionLocator, SourceIndex};
///
/// let index = SourceIndex::new()
///     .source("interfaces/EEI_Base.interfaces.php", [TypeDefinition::interface("EEI_Base")]);
///
/// let found = index.locate("interfaces/EEI_Base*.php").unwrap();
/// assert_eq!(found, vec!["interfaces/EEI_Base.interfaces.php".to_string()]);
/// ```
#[derive(Default)]
pub struct SourceIndex {
    sources: RwLock<BTreeMap<String, Vec<TypeDefinition>>>,
    autoloadable: RwLock<HashMap<String, TypeDefinition>>,
    use_inventory: bool,
    loads: AtomicUsize,
}

impl SourceIndex {
    /// An empty index that also consults the [`Autoload`] inventory.
    pub fn new() -> Self {
        Self {
            use_inventory: true,
            ..Self::default()
        }
    }

    /// An empty index that ignores the [`Autoload`] inventory.
    pub fn isolated() -> Self {
        Self::default()
    }

    /// Adds a source declaring `definitions`.
    pub fn source<I>(self, path: impl Into<String>, definitions: I) -> Self
    where
        I: IntoIterator<Item = TypeDefinition>,
    {
        self.add_source(path, definitions);
        self
    }

    /// Makes a definition loadable by name.
    pub fn autoloadable(self, definition: TypeDefinition) -> Self {
        self.add_autoloadable(definition);
        self
    }

    /// Makes a [`Brewable`] type loadable by name.
    pub fn brewable<T: Brewable>(self) -> Self {
        self.autoloadable(T::definition())
    }

    /// Adds a source after construction.
    pub fn add_source<I>(&self, path: impl Into<String>, definitions: I)
    where
        I: IntoIterator<Item = TypeDefinition>,
    {
        let path = path.into();
        let definitions: Vec<TypeDefinition> = definitions.into_iter().collect();
        debug!(source = %path, declares = definitions.len(), "Indexed source");
        self.sources.write().entry(path).or_default().extend(definitions);
    }

    /// Adds an autoloadable definition after construction.
    pub fn add_autoloadable(&self, definition: TypeDefinition) {
        debug!(type_name = %definition.name(), "Indexed autoloadable definition");
        self.autoloadable
            .write()
            .insert(definition.name().to_string(), definition);
    }

    /// How many times [`load`](DefinitionLocator::load) has been called.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl DefinitionLocator for SourceIndex {
    fn autoload(&self, type_name: &str) -> Option<TypeDefinition> {
        if let Some(definition) = self.autoloadable.read().get(type_name) {
            return Some(definition.clone());
        }
        if self.use_inventory {
            return find_autoload(type_name);
        }
        None
    }

    fn locate(&self, pattern: &str) -> Result<Vec<String>> {
        let compiled = Pattern::new(pattern).map_err(|e| CoffeeShopError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let found: Vec<String> = self
            .sources
            .read()
            .keys()
            .filter(|path| compiled.matches_with(path, options))
            .cloned()
            .collect();

        trace!(pattern, matches = found.len(), "Located sources");
        Ok(found)
    }

    fn load(&self, source: &str) -> Result<Vec<TypeDefinition>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .sources
            .read()
            .get(source)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "SourceIndex"
    }
}

impl std::fmt::Debug for SourceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceIndex")
            .field("sources", &self.sources.read().len())
            .field("autoloadable", &self.autoloadable.read().len())
            .field("use_inventory", &self.use_inventory)
            .finish()
    }
}
