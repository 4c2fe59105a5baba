//! Raster references and the store that resolves them
//!
//! Fire records and masks point at their rasters rather than owning them.
//! A reference is opened inside the task that needs it and the handle is
//! dropped as soon as that task has sampled what it needs.

use crate::error::SourceError;
use crate::grid::Raster;
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves external raster paths
///
/// Implemented by the ingestion layer (GeoTIFF readers, tile caches). The
/// crate ships [`MemoryStore`] for callers that already hold rasters.
pub trait RasterStore: Send + Sync {
    /// Open the raster at `path`
    ///
    /// # Errors
    /// Returns `SourceError` if the raster is missing or unreadable.
    fn open(&self, path: &Path) -> Result<Arc<Raster>, SourceError>;
}

/// Where a raster comes from
#[derive(Debug, Clone)]
pub enum RasterRef {
    /// Already loaded
    InMemory(Arc<Raster>),
    /// Resolved through a [`RasterStore`]
    External(PathBuf),
}

impl RasterRef {
    /// Open the referenced raster
    ///
    /// # Errors
    /// Returns `SourceError::NoStore` for an external reference without a
    /// store, or whatever the store reports.
    pub fn open(&self, store: Option<&dyn RasterStore>) -> Result<Arc<Raster>, SourceError> {
        match self {
            RasterRef::InMemory(raster) => Ok(Arc::clone(raster)),
            RasterRef::External(path) => match store {
                Some(store) => store.open(path),
                None => Err(SourceError::NoStore(path.clone())),
            },
        }
    }
}

impl From<Raster> for RasterRef {
    fn from(raster: Raster) -> Self {
        RasterRef::InMemory(Arc::new(raster))
    }
}

impl fmt::Display for RasterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterRef::InMemory(raster) => write!(
                f,
                "<in-memory {}x{}>",
                raster.grid().ncols,
                raster.grid().nrows
            ),
            RasterRef::External(path) => write!(f, "{}", path.display()),
        }
    }
}

/// In-memory [`RasterStore`] keyed by path
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rasters: FxHashMap<PathBuf, Arc<Raster>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raster under `path`
    pub fn insert(&mut self, path: impl Into<PathBuf>, raster: Raster) {
        self.rasters.insert(path.into(), Arc::new(raster));
    }

    /// Number of registered rasters
    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

impl RasterStore for MemoryStore {
    fn open(&self, path: &Path) -> Result<Arc<Raster>, SourceError> {
        self.rasters
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::Missing(path.to_path_buf()))
    }
}
