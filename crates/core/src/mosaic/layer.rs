//! Per-fire layers sampled onto a landscape window
//!
//! Preparing a layer is where the expensive, fallible work happens: the
//! severity raster is opened, checked against the common grid, segmented into
//! patches over its full extent, then clipped to the window. The raster handle
//! is dropped before `prepare` returns.

use crate::config::PatchConfig;
use crate::core_types::DayOfYear;
use crate::error::SourceError;
use crate::grid::{GridSpec, RasterStore};
use crate::history::{FireRecord, LandscapeWindow};
use crate::mosaic::{DecayRate, PatchMap};
use tracing::debug;

/// One fire's contribution to a landscape, on the landscape's window
#[derive(Debug, Clone)]
pub struct FireLayer {
    pub record_id: String,
    pub year: i32,
    pub day_of_year: DayOfYear,
    /// Recency rank among the landscape's fires (0 = most recent)
    pub rank: u32,
    /// Decay weight `r^rank`
    pub weight: f64,
    /// Window cells inside both the perimeter and the landscape boundary
    pub covered: Vec<bool>,
    /// Severity per window cell (`NaN` where NoData)
    pub severity: Vec<f64>,
    /// Transformed patch area per window cell (`NaN` where NoData)
    pub patch: Vec<f64>,
}

impl FireLayer {
    /// Sample `record` onto `window`
    ///
    /// Returns `Ok(None)` when the perimeter covers no cell of the landscape;
    /// the severity raster is not opened in that case. The layer starts at
    /// rank 0 with weight 1 until [`FireLayer::assign_rank`] is called.
    ///
    /// # Errors
    /// Returns `SourceError` if the severity raster cannot be opened, or
    /// `SourceError::Alignment` if it is not on `region`'s lattice.
    pub fn prepare(
        record: &FireRecord,
        window: &LandscapeWindow,
        region: &GridSpec,
        patches: &PatchConfig,
        store: Option<&dyn RasterStore>,
    ) -> Result<Option<FireLayer>, SourceError> {
        let mut covered = record.perimeter.rasterize(&window.grid);
        for (cell, &inside) in covered.iter_mut().zip(&window.inside) {
            *cell &= inside;
        }
        if !covered.contains(&true) {
            debug!("Fire {} does not reach landscape {}", record.id, window.id);
            return Ok(None);
        }

        let severity = record.severity.open(store)?;
        region.offset_of(severity.grid())?;

        // Segment before clipping so patches keep their full extent
        let patch_map = PatchMap::segment(&severity, patches);
        let areas = patch_map.area_raster(patches);
        debug!(
            "Fire {} ({}): {} patches over {} cells",
            record.id,
            record.year,
            patch_map.patches().len(),
            severity.valid_count()
        );

        let severity_window = severity.clip_to(&window.grid)?;
        let patch_window = areas.clip_to(&window.grid)?;

        Ok(Some(FireLayer {
            record_id: record.id.clone(),
            year: record.year,
            day_of_year: record.day_of_year,
            rank: 0,
            weight: 1.0,
            covered,
            severity: severity_window.data,
            patch: patch_window.data,
        }))
    }

    /// Set the recency rank and the matching decay weight
    pub fn assign_rank(&mut self, rank: u32, decay: DecayRate) {
        self.rank = rank;
        self.weight = decay.weight(rank);
    }

    /// Number of covered window cells
    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }
}
