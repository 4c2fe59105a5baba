//! Trait surface output
//!
//! Surfaces are named `{trait_prefix}_{landscape_id}`. [`AsciiGridSink`]
//! writes them as ESRI ASCII grids; other formats plug in through
//! [`SurfaceSink`].

use crate::config::OutputConfig;
use crate::core_types::TraitMap;
use crate::error::SinkError;
use crate::grid::Raster;
use crate::mosaic::TraitSurface;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// NoData marker in written grids
pub const NODATA_VALUE: f64 = -9999.0;

/// Output name of one trait surface
pub fn surface_name(prefix: &str, landscape_id: &str) -> String {
    format!("{prefix}_{landscape_id}")
}

/// Destination for named trait surfaces
pub trait SurfaceSink: Sync {
    /// Store `raster` under `name`
    ///
    /// # Errors
    /// Returns `SinkError` if the surface cannot be written.
    fn write(&self, name: &str, raster: &Raster) -> Result<(), SinkError>;
}

/// Write all four surfaces of one landscape under their trait prefixes
///
/// # Errors
/// Stops at the first surface that fails to write.
pub fn write_surfaces(
    sink: &dyn SurfaceSink,
    prefixes: &TraitMap<String>,
    surfaces: &TraitMap<TraitSurface>,
) -> Result<(), SinkError> {
    for (kind, surface) in surfaces.iter() {
        let name = surface_name(&prefixes[kind], &surface.landscape_id);
        sink.write(&name, &surface.raster)?;
    }
    Ok(())
}

/// ESRI ASCII grid files in one directory
#[derive(Debug, Clone)]
pub struct AsciiGridSink {
    directory: PathBuf,
}

impl AsciiGridSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        AsciiGridSink {
            directory: directory.into(),
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        AsciiGridSink::new(output.directory.clone())
    }

    /// File written for `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.asc"))
    }

    fn write_grid(path: &Path, raster: &Raster) -> std::io::Result<()> {
        let grid = raster.grid();
        let mut out = BufWriter::new(File::create(path)?);

        writeln!(out, "ncols {}", grid.ncols)?;
        writeln!(out, "nrows {}", grid.nrows)?;
        writeln!(out, "xllcorner {}", grid.xmin)?;
        writeln!(out, "yllcorner {}", grid.ymin())?;
        writeln!(out, "cellsize {}", grid.resolution)?;
        writeln!(out, "NODATA_value {NODATA_VALUE}")?;

        for row in raster.values().chunks(grid.ncols.max(1)) {
            let line: Vec<String> = row
                .iter()
                .map(|&v| {
                    if v.is_nan() {
                        NODATA_VALUE.to_string()
                    } else {
                        v.to_string()
                    }
                })
                .collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        out.flush()
    }
}

impl SurfaceSink for AsciiGridSink {
    fn write(&self, name: &str, raster: &Raster) -> Result<(), SinkError> {
        let path = self.path_for(name);
        fs::create_dir_all(&self.directory)
            .and_then(|()| Self::write_grid(&path, raster))
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Wrote {} ({} valid cells)", path.display(), raster.valid_count());
        Ok(())
    }
}
