//! Landscape units (watersheds, management units)
//!
//! A landscape owns nothing. It selects the fire records that matter and
//! fixes the extent of every surface produced for it.

use crate::error::ConfigError;
use crate::grid::{GridSpec, Polygon};
use std::collections::BTreeMap;

/// An area of interest with its attribute table
#[derive(Debug, Clone)]
pub struct Landscape {
    /// Attribute fields, one of which holds the identifier
    pub attributes: BTreeMap<String, String>,
    /// Boundary in the grid's CRS
    pub boundary: Polygon,
}

impl Landscape {
    /// Create a landscape from its attributes
    pub fn new(attributes: BTreeMap<String, String>, boundary: Polygon) -> Self {
        Landscape {
            attributes,
            boundary,
        }
    }

    /// Landscape with a single identifier attribute
    pub fn with_id(field: &str, id: &str, boundary: Polygon) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(field.to_string(), id.to_string());
        Landscape::new(attributes, boundary)
    }

    /// Identifier stored under `field`
    pub fn id(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }

    /// Identifier stored under `field`, as a configuration error when absent
    ///
    /// # Errors
    /// Returns `ConfigError::MissingIdField` naming the landscape's position.
    pub fn require_id(&self, field: &str, index: usize) -> Result<&str, ConfigError> {
        self.id(field)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::MissingIdField {
                field: field.to_string(),
                index,
            })
    }
}

/// A landscape projected onto the common grid
#[derive(Debug, Clone)]
pub struct LandscapeWindow {
    /// Landscape identifier
    pub id: String,
    /// Whole-cell window covering the boundary (empty if disjoint)
    pub grid: GridSpec,
    /// Cells whose centre lies inside the boundary (row-major)
    pub inside: Vec<bool>,
}

impl LandscapeWindow {
    /// Snap `landscape` onto `region`
    pub fn new(id: &str, landscape: &Landscape, region: &GridSpec) -> Self {
        let grid = landscape
            .boundary
            .bbox()
            .and_then(|bbox| region.window(&bbox))
            .unwrap_or_else(|| GridSpec {
                ncols: 0,
                nrows: 0,
                ..region.clone()
            });
        let inside = landscape.boundary.rasterize(&grid);

        LandscapeWindow {
            id: id.to_string(),
            grid,
            inside,
        }
    }

    /// Number of cells inside the boundary
    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&c| c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        let landscape = Landscape::with_id(
            "huc12",
            "180102040302",
            Polygon::rectangle(0.0, 0.0, 1.0, 1.0),
        );
        assert_eq!(landscape.require_id("huc12", 0), Ok("180102040302"));
        assert_eq!(
            landscape.require_id("name", 4),
            Err(ConfigError::MissingIdField {
                field: "name".to_string(),
                index: 4
            })
        );
    }

    #[test]
    fn test_window_and_inside_mask() {
        let region = GridSpec::new(0.0, 100.0, 10.0, 10, 10, "EPSG:5070");
        // Triangle in the south-west corner
        let boundary = Polygon::new(vec![vec![[0.0, 0.0], [40.0, 0.0], [0.0, 40.0]]]);
        let landscape = Landscape::with_id("id", "w1", boundary);
        let window = LandscapeWindow::new("w1", &landscape, &region);

        assert_eq!(window.grid.ncols, 4);
        assert_eq!(window.grid.nrows, 4);
        assert_eq!(window.grid.ymax, 40.0);
        // South-west cell inside, north-east cell outside the hypotenuse
        assert!(window.inside[window.grid.index(3, 0)]);
        assert!(!window.inside[window.grid.index(0, 3)]);
        assert!(window.inside_count() < 16);
    }

    #[test]
    fn test_disjoint_landscape_has_empty_window() {
        let region = GridSpec::new(0.0, 100.0, 10.0, 10, 10, "EPSG:5070");
        let landscape =
            Landscape::with_id("id", "far", Polygon::rectangle(500.0, 500.0, 600.0, 600.0));
        let window = LandscapeWindow::new("far", &landscape, &region);
        assert!(window.grid.is_empty());
        assert_eq!(window.inside_count(), 0);
    }
}
