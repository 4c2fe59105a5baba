//! Planar polygons for fire perimeters and landscape boundaries
//!
//! Geometries arrive already parsed and projected into the grid's CRS. Rings
//! are evaluated with the even-odd rule, so interior rings (holes, unburned
//! islands) need no special orientation.

use crate::grid::GridSpec;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// True when the two boxes share any area or edge
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }
}

/// Polygon made of one or more closed rings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Rings of `[x, y]` vertices; the closing vertex may be repeated or not
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    /// Create a polygon from rings
    pub fn new(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Polygon { rings }
    }

    /// Axis-aligned rectangle
    pub fn rectangle(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Polygon {
            rings: vec![vec![
                [xmin, ymin],
                [xmax, ymin],
                [xmax, ymax],
                [xmin, ymax],
            ]],
        }
    }

    /// Extent of all vertices, `None` for an empty polygon
    pub fn bbox(&self) -> Option<BoundingBox> {
        let mut vertices = self.rings.iter().flatten();
        let first = vertices.next()?;
        let init = BoundingBox {
            xmin: first[0],
            ymin: first[1],
            xmax: first[0],
            ymax: first[1],
        };
        Some(vertices.fold(init, |b, v| BoundingBox {
            xmin: b.xmin.min(v[0]),
            ymin: b.ymin.min(v[1]),
            xmax: b.xmax.max(v[0]),
            ymax: b.ymax.max(v[1]),
        }))
    }

    /// Even-odd point-in-polygon test (crossing number)
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let [x, y] = point;
        let mut inside = false;

        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let [xi, yi] = ring[i];
                let [xj, yj] = ring[j];
                if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }

        inside
    }

    /// Cells of `grid` whose centre lies inside the polygon (row-major)
    pub fn rasterize(&self, grid: &GridSpec) -> Vec<bool> {
        let mut covered = vec![false; grid.len()];
        let Some(bbox) = self.bbox() else {
            return covered;
        };
        if !bbox.intersects(&grid.bbox()) || grid.ncols == 0 {
            return covered;
        }

        covered
            .par_chunks_mut(grid.ncols)
            .enumerate()
            .for_each(|(row, cells)| {
                let y = grid.cell_center(row, 0)[1];
                if y < bbox.ymin || y > bbox.ymax {
                    return;
                }
                for (col, cell) in cells.iter_mut().enumerate() {
                    let center = grid.cell_center(row, col);
                    if center[0] >= bbox.xmin && center[0] <= bbox.xmax {
                        *cell = self.contains(center);
                    }
                }
            });

        covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_contains() {
        let rect = Polygon::rectangle(0.0, 0.0, 10.0, 5.0);
        assert!(rect.contains([5.0, 2.5]));
        assert!(!rect.contains([11.0, 2.5]));
        assert!(!rect.contains([5.0, -0.1]));
    }

    #[test]
    fn test_hole_excluded_by_even_odd() {
        let mut donut = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        donut.rings.push(vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]]);
        assert!(donut.contains([1.0, 1.0]));
        assert!(!donut.contains([5.0, 5.0]));
    }

    #[test]
    fn test_bbox() {
        let tri = Polygon::new(vec![vec![[1.0, 2.0], [5.0, -1.0], [3.0, 7.0]]]);
        let bbox = tri.bbox().unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                xmin: 1.0,
                ymin: -1.0,
                xmax: 5.0,
                ymax: 7.0
            }
        );
        assert!(Polygon::new(vec![]).bbox().is_none());
    }

    #[test]
    fn test_rasterize_cell_centres() {
        // 4x4 grid of 10 m cells, origin at (0, 40)
        let grid = GridSpec::new(0.0, 40.0, 10.0, 4, 4, "EPSG:5070");
        // Covers the two western columns
        let poly = Polygon::rectangle(0.0, 0.0, 20.0, 40.0);
        let covered = poly.rasterize(&grid);
        for row in 0..4 {
            assert!(covered[grid.index(row, 0)]);
            assert!(covered[grid.index(row, 1)]);
            assert!(!covered[grid.index(row, 2)]);
            assert!(!covered[grid.index(row, 3)]);
        }
    }

    #[test]
    fn test_rasterize_disjoint_polygon() {
        let grid = GridSpec::new(0.0, 40.0, 10.0, 4, 4, "EPSG:5070");
        let far = Polygon::rectangle(100.0, 100.0, 200.0, 200.0);
        assert!(far.rasterize(&grid).iter().all(|&c| !c));
    }
}
