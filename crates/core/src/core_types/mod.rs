//! Core types and utilities

pub mod traits;
pub mod units;

// Re-export
pub use traits::{TraitKind, TraitMap};
pub use units::{DayOfYear, Hectares};
