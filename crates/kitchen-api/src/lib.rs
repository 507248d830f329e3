//! # Kitchen API
//!
//! HTTP client for the kitchen inventory service, plus the [`Kitchen`] SDK
//! that combines server data with the local cost calculator.

pub mod client;
pub mod errors;
pub mod sdk;

// Re-export common types for convenience
pub use client::*;
pub use errors::*;
pub use sdk::*;

// Re-export core types that API consumers will need
pub use kitchen_core::{Ingredient, RecipeInfo, Result as CoreResult};
