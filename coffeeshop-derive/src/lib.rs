//! Derive macros for CoffeeShop.
//!
//! Re-exports [`Brewable`] from `coffeeshop-macros`; use it through the
//! `coffeeshop` crate so the generated `::coffeeshop::...` paths resolve.

pub use coffeeshop_macros::Brewable;
