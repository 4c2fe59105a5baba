//! Pyrodiversity Core Library
//!
//! Quantifies pyrodiversity, the variety of fire regimes a landscape has
//! experienced, from a history of mapped fires.
//!
//! ## Invisible Mosaic
//!
//! Each fire leaves a severity map and a perimeter. Recent fires dominate the
//! "invisible mosaic": the most recent fire on a landscape gets weight 1 and
//! each older recency rank is discounted by a factor `r`. Four trait surfaces
//! are built per landscape:
//! - Frequency: decay-weighted fire count
//! - Seasonality: weighted circular mean ignition day of year
//! - Severity: weighted mean burn severity
//! - Patch size: weighted mean log area of the same-severity patch
//!
//! ## Functional Dispersion
//!
//! The surfaces are quantized, pixels with identical trait tuples are grouped
//! into classes, and the landscape's pyrodiversity is the abundance-weighted
//! functional dispersion (FDis) of those classes in Gower trait space.

// Core types and utilities
pub mod core_types;
pub mod config;
pub mod error;

// Raster substrate and inputs
pub mod grid;
pub mod history;

// Trait surfaces and diversity
pub mod mosaic;
pub mod diversity;

// Orchestration and output
pub mod output;
pub mod pipeline;

// Re-export core types
pub use config::{AreaTransform, Connectivity, OutputConfig, PatchConfig, PyroConfig, RecencyBasis};
pub use core_types::{DayOfYear, Hectares, TraitKind, TraitMap};
pub use error::{AlignmentError, ConfigError, PyroError, SinkError, SourceError};

// Re-export inputs
pub use grid::{GridSpec, MemoryStore, Polygon, Raster, RasterRef, RasterStore};
pub use history::{FireHistory, FireRecord, Landscape};

// Re-export results
pub use diversity::PyrodiversityResult;
pub use mosaic::TraitSurface;
pub use output::{surface_name, AsciiGridSink, SurfaceSink};
pub use pipeline::{Diagnostic, LandscapeReport, Pipeline};
