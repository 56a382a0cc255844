//! # CoffeeShop
//!
//! A recipe-driven dependency injection container.
//!
//! Identifiers are brewed through recipes. A recipe picks a strategy
//! (`New`, `Shared` or `LoadOnly`), may declare aliases, and may list path
//! templates used to locate its type definition. Wildcard recipes such as
//! `EE_*` serve every identifier sharing their literal prefix.
//!
//! ```rust
//! use coffeeshop::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Brewable, Default)]
//! struct Registry;
//!
//! #[derive(Brewable)]
//! struct FrontController {
//!     registry: Arc<Registry>,
//! }
//!
//! let shop = CoffeeShop::builder()
//!     .locator(SourceIndex::isolated().brewable::<Registry>().brewable::<FrontController>())
//!     .recipe(Recipe::for_type::<Registry>(Strategy::Shared).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let a: Arc<FrontController> = shop
//!     .brew_as(std::any::type_name::<FrontController>(), Arguments::new())
//!     .unwrap();
//! let b: Arc<FrontController> = shop
//!     .brew_as(std::any::type_name::<FrontController>(), Arguments::new())
//!     .unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert!(Arc::ptr_eq(&a.registry, &b.registry));
//! ```

pub use coffeeshop_container::*;
pub use coffeeshop_derive::*;
pub use coffeeshop_support::*;

pub mod prelude {
    pub use coffeeshop_container::prelude::*;
    pub use coffeeshop_derive::Brewable;
}
