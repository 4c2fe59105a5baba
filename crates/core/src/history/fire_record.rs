//! Fire event records
//!
//! Records are immutable once ingested and may overlap freely. Their severity
//! rasters sit on the region's common grid but may cover any extent of it.

use crate::config::PyroConfig;
use crate::core_types::DayOfYear;
use crate::grid::{BoundingBox, GridSpec, Polygon, RasterRef};

/// One historical fire
#[derive(Debug, Clone)]
pub struct FireRecord {
    /// Unique event identifier (e.g. an MTBS event id)
    pub id: String,
    /// Ignition year
    pub year: i32,
    /// Ignition day-of-year
    pub day_of_year: DayOfYear,
    /// CBI severity raster on the common grid
    pub severity: RasterRef,
    /// Burned-area perimeter in the grid's CRS
    pub perimeter: Polygon,
}

impl FireRecord {
    /// Create a record
    pub fn new(
        id: impl Into<String>,
        year: i32,
        day_of_year: DayOfYear,
        severity: impl Into<RasterRef>,
        perimeter: Polygon,
    ) -> Self {
        FireRecord {
            id: id.into(),
            year,
            day_of_year,
            severity: severity.into(),
            perimeter,
        }
    }
}

/// All fire records for a region and the grid they share
#[derive(Debug, Clone)]
pub struct FireHistory {
    grid: GridSpec,
    records: Vec<FireRecord>,
}

impl FireHistory {
    /// Empty history on `grid`
    pub fn new(grid: GridSpec) -> Self {
        FireHistory {
            grid,
            records: Vec::new(),
        }
    }

    /// History with records
    pub fn with_records(grid: GridSpec, records: Vec<FireRecord>) -> Self {
        FireHistory { grid, records }
    }

    /// Add a record
    pub fn push(&mut self, record: FireRecord) {
        self.records.push(record);
    }

    /// Common grid
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// All records in ingestion order
    pub fn records(&self) -> &[FireRecord] {
        &self.records
    }

    /// Records inside the year window whose perimeter extent touches `bbox`
    pub fn candidates<'a>(
        &'a self,
        bbox: &'a BoundingBox,
        config: &'a PyroConfig,
    ) -> impl Iterator<Item = &'a FireRecord> + 'a {
        self.records.iter().filter(move |record| {
            config.in_window(record.year)
                && record
                    .perimeter
                    .bbox()
                    .is_some_and(|extent| extent.intersects(bbox))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Raster;

    fn record(id: &str, year: i32, perimeter: Polygon) -> FireRecord {
        let grid = GridSpec::new(0.0, 100.0, 10.0, 10, 10, "EPSG:5070");
        FireRecord::new(
            id,
            year,
            DayOfYear::new(180).unwrap(),
            Raster::filled(grid, 1.0),
            perimeter,
        )
    }

    #[test]
    fn test_candidates_filter_window_and_extent() {
        let grid = GridSpec::new(0.0, 100.0, 10.0, 10, 10, "EPSG:5070");
        let history = FireHistory::with_records(
            grid,
            vec![
                record("in", 2005, Polygon::rectangle(0.0, 0.0, 50.0, 50.0)),
                record("too-old", 1970, Polygon::rectangle(0.0, 0.0, 50.0, 50.0)),
                record("elsewhere", 2005, Polygon::rectangle(60.0, 60.0, 90.0, 90.0)),
            ],
        );
        let config = PyroConfig::new(0.5, 1984, 2020, "huc12");
        let bbox = BoundingBox {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 40.0,
            ymax: 40.0,
        };

        let ids: Vec<_> = history
            .candidates(&bbox, &config)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["in"]);
    }
}
