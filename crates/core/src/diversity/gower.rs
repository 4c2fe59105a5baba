//! Gower dissimilarity between trait classes
//!
//! Each trait's absolute difference is scaled by that trait's observed range
//! across the community, then the four scaled differences are averaged. A
//! trait with zero range contributes nothing but still counts toward the mean.

use crate::diversity::TraitClass;
use rayon::prelude::*;

/// Dense symmetric distance matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    /// Row-major `n * n` entries
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Wrap row-major entries
    ///
    /// # Panics
    ///
    /// Panics if `data` is not `n * n` long
    pub fn from_vec(n: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n * n, "Distance matrix must be square");
        DistanceMatrix { n, data }
    }

    /// Number of objects
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// True for a matrix over no objects
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between objects `i` and `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }
}

/// Gower distances among `classes`
pub fn gower_distances(classes: &[TraitClass]) -> DistanceMatrix {
    let n = classes.len();
    let dims = classes.first().map_or(0, |c| c.values.len());

    let mut ranges = vec![0.0; dims];
    for (t, range) in ranges.iter_mut().enumerate() {
        let (lo, hi) = classes
            .iter()
            .map(|c| c.values[t])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        *range = hi - lo;
    }

    let mut data = vec![0.0; n * n];
    if n > 0 {
        data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            for (j, cell) in row.iter_mut().enumerate() {
                if i == j {
                    continue;
                }
                let sum: f64 = ranges
                    .iter()
                    .enumerate()
                    .filter(|(_, &range)| range > 0.0)
                    .map(|(t, &range)| (classes[i].values[t] - classes[j].values[t]).abs() / range)
                    .sum();
                *cell = sum / dims as f64;
            }
        });
    }

    DistanceMatrix { n, data }
}
