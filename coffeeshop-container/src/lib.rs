//! Core container implementation for CoffeeShop DI.

pub mod container;
pub mod definition;
pub mod error;
pub mod injector;
pub mod locator;
pub mod maker;
pub mod provider;
pub mod recipe;
pub mod registry;
pub mod strategy;

// used by `#[brewable(autoload)]` expansions
#[doc(hidden)]
pub use inventory;

pub use container::{CoffeeShop, CoffeeShopBuilder, prelude};
pub use definition::{Arguments, Brewable, Instance, Parameter, TypeDefinition};
pub use error::{CoffeeShopError, Result};
pub use maker::Brewed;
pub use recipe::Recipe;
pub use strategy::Strategy;
