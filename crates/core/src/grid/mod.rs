//! Grid, raster and geometry primitives shared by every stage

pub mod geometry;
pub mod raster;
pub mod source;

// Re-export main types
pub use geometry::{BoundingBox, Polygon};
pub use raster::{CellOffset, GridSpec, Raster};
pub use source::{MemoryStore, RasterRef, RasterStore};
