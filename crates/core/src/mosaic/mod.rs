//! Invisible-mosaic trait surfaces
//!
//! Fires affecting a landscape are ranked by recency, weighted by `r^rank`,
//! and overlaid cell by cell into four trait rasters.

pub mod builder;
pub mod decay;
pub mod kernel;
pub mod layer;
pub mod patches;

// Re-exports
pub use builder::{SurfaceBuilder, TraitSurface};
pub use decay::{decay_weight, recency_ranks, DecayRate};
pub use kernel::{
    FrequencyKernel, Moments, PatchSizeKernel, SeasonalityKernel, SeverityKernel, TraitKernel,
};
pub use layer::FireLayer;
pub use patches::{Patch, PatchMap};
