//! # Kitchen Utils
//!
//! Presentation helpers for the kitchen client: money, quantities,
//! percentages and stock bars rendered as plain strings.

pub mod errors;
pub mod formatters;

// Re-export common types for convenience
pub use errors::*;
pub use formatters::*;
