//! Brewing strategies.
//!
//! A strategy determines what `brew()` hands back for a recipe:
//! - [`Strategy::New`] — a freshly constructed instance every time
//! - [`Strategy::Shared`] — one instance per canonical identifier
//! - [`Strategy::LoadOnly`] — the definition is made available, nothing is built
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoffeeShopError;

/// Defines how a recipe is brewed.
///
/// # Examples
/// ```
/// use coffeeshop_container::strategy::Strategy;
///
/// let strategy: Strategy = "shared".parse().unwrap();
/// assert_eq!(strategy, Strategy::Shared);
/// assert!("espresso".parse::<Strategy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Construct a fresh instance on every brew. Never cached.
    #[default]
    New,

    /// Construct once per canonical identifier and hand the same
    /// instance back on every subsequent brew.
    ///
    /// Caller-supplied arguments only matter on the first brew.
    Shared,

    /// Make sure the type definition is loaded, but never instantiate it.
    ///
    /// Used for interfaces and other definition-only registrations.
    LoadOnly,
}

impl Strategy {
    /// Every recognized strategy, in declaration order.
    pub const ALL: [Strategy; 3] = [Strategy::New, Strategy::Shared, Strategy::LoadOnly];

    /// Returns `true` if instances brewed with this strategy are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Strategy::Shared)
    }

    /// Returns `true` if this strategy produces an instance at all.
    #[inline]
    pub fn instantiates(&self) -> bool {
        !matches!(self, Strategy::LoadOnly)
    }

    /// The configuration name of this strategy.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::New => "new",
            Strategy::Shared => "shared",
            Strategy::LoadOnly => "load_only",
        }
    }
}

impl FromStr for Strategy {
    type Err = CoffeeShopError;

    /// Accepts the configuration names case-insensitively, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| CoffeeShopError::InvalidStrategy {
                given: s.to_string(),
            })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::New => write!(f, "New"),
            Strategy::Shared => write!(f, "Shared"),
            Strategy::LoadOnly => write!(f, "LoadOnly"),
        }
    }
}
