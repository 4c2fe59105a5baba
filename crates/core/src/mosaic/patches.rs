//! Severity patch segmentation
//!
//! A patch is a maximal connected run of cells in one fire's severity raster
//! that share a severity class. Segmentation always runs over the fire's full
//! raster; clipping to a landscape happens afterwards, so a patch that
//! straddles a watershed boundary keeps its true area.

use crate::config::PatchConfig;
use crate::core_types::Hectares;
use crate::grid::{GridSpec, Raster};

/// Label for cells that belong to no patch (NoData severity)
const NO_PATCH: u32 = u32::MAX;

/// One connected severity patch
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Index into `PatchMap::patches`
    pub label: u32,
    /// Ordinal severity class
    pub class: u8,
    /// Number of member cells
    pub cells: usize,
    /// Patch area
    pub area: Hectares,
}

/// Connected-component labelling of one severity raster
#[derive(Debug, Clone)]
pub struct PatchMap {
    grid: GridSpec,
    /// Patch label per cell (row-major), `NO_PATCH` where severity is NoData
    labels: Vec<u32>,
    patches: Vec<Patch>,
}

impl PatchMap {
    /// Label connected same-class regions of `severity`
    pub fn segment(severity: &Raster, config: &PatchConfig) -> Self {
        let grid = severity.grid().clone();
        let (ncols, nrows) = (grid.ncols, grid.nrows);

        let classes: Vec<Option<u8>> = severity
            .values()
            .iter()
            .map(|&v| (!v.is_nan()).then(|| config.classify(v)))
            .collect();

        let mut labels = vec![NO_PATCH; grid.len()];
        let mut patches = Vec::new();
        let mut stack = Vec::new();
        let offsets = config.connectivity.offsets();

        for seed in 0..grid.len() {
            let Some(class) = classes[seed] else {
                continue;
            };
            if labels[seed] != NO_PATCH {
                continue;
            }

            let label = patches.len() as u32;
            let mut cells = 0usize;
            labels[seed] = label;
            stack.push(seed);

            // Iterative flood fill
            while let Some(idx) = stack.pop() {
                cells += 1;
                let row = (idx / ncols) as i64;
                let col = (idx % ncols) as i64;

                for &(dr, dc) in offsets {
                    let nr = row + dr;
                    let nc = col + dc;
                    if nr < 0 || nc < 0 || nr >= nrows as i64 || nc >= ncols as i64 {
                        continue;
                    }
                    let nidx = nr as usize * ncols + nc as usize;
                    if labels[nidx] == NO_PATCH && classes[nidx] == Some(class) {
                        labels[nidx] = label;
                        stack.push(nidx);
                    }
                }
            }

            patches.push(Patch {
                label,
                class,
                cells,
                area: Hectares::from_cells(cells, grid.resolution),
            });
        }

        PatchMap {
            grid,
            labels,
            patches,
        }
    }

    /// Grid the labels live on
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// All patches, indexed by label
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Patch containing a cell, `None` for NoData cells
    pub fn patch_at(&self, row: usize, col: usize) -> Option<&Patch> {
        let label = *self.labels.get(self.grid.index(row, col))?;
        self.patches.get(label as usize)
    }

    /// Raster of transformed patch area per cell (NoData outside patches)
    pub fn area_raster(&self, config: &PatchConfig) -> Raster {
        let transformed: Vec<f64> = self
            .patches
            .iter()
            .map(|p| config.area_transform.apply(*p.area))
            .collect();

        let data = self
            .labels
            .iter()
            .map(|&label| {
                if label == NO_PATCH {
                    f64::NAN
                } else {
                    transformed[label as usize]
                }
            })
            .collect();

        Raster {
            grid: self.grid.clone(),
            data,
        }
    }
}
