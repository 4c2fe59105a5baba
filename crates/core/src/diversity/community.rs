//! Trait classes as an ecological community
//!
//! Every valid pixel is an individual; pixels sharing an exact quantized
//! trait tuple belong to the same "species" (trait class). Classes are kept
//! in sorted tuple order so downstream metrics never depend on the order in
//! which pixels were visited.

use crate::core_types::{TraitKind, TraitMap};
use crate::error::AlignmentError;
use crate::grid::Raster;
use crate::mosaic::TraitSurface;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Bit pattern of a trait value, with `-0.0` folded into `0.0`
#[inline]
fn value_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// A distinct (frequency, seasonality, severity, patch size) combination
#[derive(Debug, Clone, PartialEq)]
pub struct TraitClass {
    /// Trait values in `TraitKind::ALL` order
    pub values: [f64; 4],
    /// Number of pixels with this combination
    pub abundance: usize,
}

impl TraitClass {
    /// Value of one trait
    #[inline]
    pub fn value(&self, kind: TraitKind) -> f64 {
        self.values[kind.index()]
    }
}

/// The trait classes of one landscape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitCommunity {
    classes: Vec<TraitClass>,
    valid_pixels: usize,
}

impl TraitCommunity {
    /// Group valid pixels of four co-registered surfaces into trait classes
    ///
    /// A pixel is valid when all four surfaces hold a value and, if a mask is
    /// given, the mask cell is non-NoData and non-zero.
    ///
    /// # Errors
    /// Returns `AlignmentError` if the surfaces (or the mask) do not share
    /// one grid.
    pub fn from_surfaces(
        surfaces: &TraitMap<TraitSurface>,
        mask: Option<&Raster>,
    ) -> Result<Self, AlignmentError> {
        let grid = surfaces.frequency.raster.grid();
        for (_, surface) in surfaces.iter() {
            ensure_same_grid(&surface.raster, &surfaces.frequency.raster)?;
        }
        if let Some(mask) = mask {
            ensure_same_grid(mask, &surfaces.frequency.raster)?;
        }

        let layers = [
            surfaces.frequency.raster.values(),
            surfaces.seasonality.raster.values(),
            surfaces.severity.raster.values(),
            surfaces.patch_size.raster.values(),
        ];
        let flammable = |index: usize| {
            mask.is_none_or(|m| m.get_index(index).is_some_and(|v| v != 0.0))
        };

        let counts = (0..grid.len())
            .into_par_iter()
            .fold(FxHashMap::default, |mut counts, index| {
                let values = layers.map(|layer| layer[index]);
                if values.iter().all(|v| !v.is_nan()) && flammable(index) {
                    *counts.entry(values.map(value_key)).or_insert(0usize) += 1;
                }
                counts
            })
            .reduce(FxHashMap::default, |mut left, right| {
                for (key, count) in right {
                    *left.entry(key).or_insert(0) += count;
                }
                left
            });

        Ok(Self::from_classes(
            counts
                .into_iter()
                .map(|(key, abundance)| TraitClass {
                    values: key.map(f64::from_bits),
                    abundance,
                })
                .collect(),
        ))
    }

    /// Community from already-grouped classes
    ///
    /// Classes with zero abundance are dropped; duplicates are merged.
    pub fn from_classes(classes: Vec<TraitClass>) -> Self {
        let mut merged: FxHashMap<[u64; 4], usize> = FxHashMap::default();
        for class in classes.into_iter().filter(|c| c.abundance > 0) {
            *merged.entry(class.values.map(value_key)).or_insert(0) += class.abundance;
        }

        let mut classes: Vec<TraitClass> = merged
            .into_iter()
            .map(|(key, abundance)| TraitClass {
                values: key.map(f64::from_bits),
                abundance,
            })
            .collect();
        classes.sort_by(|a, b| {
            a.values
                .iter()
                .zip(&b.values)
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let valid_pixels = classes.iter().map(|c| c.abundance).sum();
        TraitCommunity {
            classes,
            valid_pixels,
        }
    }

    /// Classes in sorted tuple order
    pub fn classes(&self) -> &[TraitClass] {
        &self.classes
    }

    /// Number of distinct trait classes
    pub fn richness(&self) -> usize {
        self.classes.len()
    }

    /// Number of valid pixels (sum of abundances)
    pub fn valid_pixels(&self) -> usize {
        self.valid_pixels
    }

    /// True when no pixel was valid
    pub fn is_empty(&self) -> bool {
        self.valid_pixels == 0
    }

    /// Abundances as fractions of the valid pixel count
    pub fn relative_abundances(&self) -> Vec<f64> {
        let total = self.valid_pixels as f64;
        self.classes
            .iter()
            .map(|c| c.abundance as f64 / total)
            .collect()
    }
}

fn ensure_same_grid(raster: &Raster, reference: &Raster) -> Result<(), AlignmentError> {
    let offset = reference.grid().offset_of(raster.grid())?;
    let same_shape = raster.grid().ncols == reference.grid().ncols
        && raster.grid().nrows == reference.grid().nrows;
    if offset.row != 0 || offset.col != 0 || !same_shape {
        return Err(AlignmentError::Origin {
            dx: offset.col as f64,
            dy: offset.row as f64,
        });
    }
    Ok(())
}
