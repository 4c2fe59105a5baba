//! Trait surface construction
//!
//! One generic builder serves all four traits. Fire layers are folded into
//! per-thread moment buffers and the buffers are reduced pairwise, so the
//! result does not depend on record order beyond floating-point rounding.

use crate::core_types::{TraitKind, TraitMap};
use crate::grid::{GridSpec, Raster};
use crate::mosaic::{
    FireLayer, FrequencyKernel, Moments, PatchSizeKernel, SeasonalityKernel, SeverityKernel,
    TraitKernel,
};
use rayon::prelude::*;

/// One trait raster for one landscape
#[derive(Debug, Clone)]
pub struct TraitSurface {
    pub kind: TraitKind,
    pub landscape_id: String,
    pub raster: Raster,
}

impl TraitSurface {
    /// Same surface with its values replaced
    pub fn with_raster(&self, raster: Raster) -> Self {
        TraitSurface {
            kind: self.kind,
            landscape_id: self.landscape_id.clone(),
            raster,
        }
    }
}

/// Overlays a landscape's fire layers into trait surfaces
#[derive(Debug, Clone, Copy)]
pub struct SurfaceBuilder<'a> {
    grid: &'a GridSpec,
    layers: &'a [FireLayer],
}

impl<'a> SurfaceBuilder<'a> {
    /// Builder over `layers`, all sampled on `grid`
    pub fn new(grid: &'a GridSpec, layers: &'a [FireLayer]) -> Self {
        SurfaceBuilder { grid, layers }
    }

    /// Per-cell moments for kernel `K`
    pub fn accumulate<K: TraitKernel>(&self) -> Vec<Moments> {
        let n = self.grid.len();
        self.layers
            .par_iter()
            .fold(
                || vec![Moments::default(); n],
                |mut acc, layer| {
                    for (index, cell) in acc.iter_mut().enumerate() {
                        if let Some(contribution) = K::contribution(layer, index) {
                            *cell += contribution;
                        }
                    }
                    acc
                },
            )
            .reduce(
                || vec![Moments::default(); n],
                |mut left, right| {
                    for (l, r) in left.iter_mut().zip(right) {
                        *l += r;
                    }
                    left
                },
            )
    }

    /// Surface for kernel `K`
    pub fn build<K: TraitKernel>(&self, landscape_id: &str) -> TraitSurface {
        let data = self
            .accumulate::<K>()
            .into_iter()
            .map(|m| K::finish(m).unwrap_or(f64::NAN))
            .collect();

        TraitSurface {
            kind: K::KIND,
            landscape_id: landscape_id.to_string(),
            raster: Raster {
                grid: self.grid.clone(),
                data,
            },
        }
    }

    /// All four surfaces, built concurrently
    pub fn build_all(&self, landscape_id: &str) -> TraitMap<TraitSurface> {
        let ((frequency, seasonality), (severity, patch_size)) = rayon::join(
            || {
                rayon::join(
                    || self.build::<FrequencyKernel>(landscape_id),
                    || self.build::<SeasonalityKernel>(landscape_id),
                )
            },
            || {
                rayon::join(
                    || self.build::<SeverityKernel>(landscape_id),
                    || self.build::<PatchSizeKernel>(landscape_id),
                )
            },
        );

        TraitMap {
            frequency,
            seasonality,
            severity,
            patch_size,
        }
    }
}
