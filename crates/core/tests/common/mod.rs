//! Shared fixtures for integration tests

#![allow(dead_code)]
// `ctor` registers the constructor through a link section
#![allow(unsafe_code)]

use pyrodiversity_core::{
    DayOfYear, FireRecord, GridSpec, Landscape, Polygon, PyroConfig, Raster,
};

/// Route `tracing` output through the test harness (`RUST_LOG` to tune)
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub const CELL: f64 = 100.0;
pub const CRS: &str = "EPSG:5070";

/// 4x4 grid of 1 ha cells with its top-left corner at (0, 400)
pub fn grid() -> GridSpec {
    GridSpec::new(0.0, 400.0, CELL, 4, 4, CRS)
}

/// Reference configuration: r = 0.5, 2000-2010, id field "huc12"
pub fn config() -> PyroConfig {
    PyroConfig::new(0.5, 2000, 2010, "huc12")
}

/// Landscape covering `cols` of the 4x4 grid (all rows)
pub fn watershed(id: &str, cols: std::ops::Range<usize>) -> Landscape {
    Landscape::with_id(
        "huc12",
        id,
        Polygon::rectangle(cols.start as f64 * CELL, 0.0, cols.end as f64 * CELL, 400.0),
    )
}

/// Fire burning `cols` at a uniform severity; NoData elsewhere
pub fn strip_fire(
    id: &str,
    year: i32,
    day: u16,
    cols: std::ops::Range<usize>,
    severity: f64,
) -> FireRecord {
    let grid = grid();
    let mut raster = Raster::nodata(grid.clone());
    for row in 0..grid.nrows {
        for col in cols.clone() {
            raster.set(row, col, Some(severity));
        }
    }
    FireRecord::new(
        id,
        year,
        DayOfYear::new(day).unwrap(),
        raster,
        Polygon::rectangle(cols.start as f64 * CELL, 0.0, cols.end as f64 * CELL, 400.0),
    )
}
