//! # CoffeeShop Support
//!
//! Shared utilities for the CoffeeShop DI framework.
//!
//! This crate provides:
//! - Wildcard identifier patterns and path templates
//! - Text rendering for error messages

pub mod pattern;
pub mod rendering;
