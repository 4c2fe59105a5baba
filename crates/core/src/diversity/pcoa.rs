//! Principal coordinates analysis
//!
//! Embeds a distance matrix in Euclidean axes by eigendecomposition of the
//! double-centred matrix `-½d²`. Non-Euclidean distances produce negative
//! eigenvalues; their axes are kept (scaled by `√|λ|`) so that dispersion can
//! subtract them back out.

use crate::diversity::DistanceMatrix;
use nalgebra::DMatrix;

/// Relative eigenvalue tolerance
const EIGEN_TOLERANCE: f64 = 1e-7;

/// Coordinates of each object on the retained axes
#[derive(Debug, Clone)]
pub struct Ordination {
    /// `n x axes` coordinates
    pub coordinates: DMatrix<f64>,
    /// Eigenvalue of each retained axis, descending
    pub eigenvalues: Vec<f64>,
}

impl Ordination {
    /// Number of retained axes
    pub fn axes(&self) -> usize {
        self.eigenvalues.len()
    }
}

/// Principal coordinates of `distances`
pub fn principal_coordinates(distances: &DistanceMatrix) -> Ordination {
    let n = distances.len();
    if n == 0 {
        return Ordination {
            coordinates: DMatrix::zeros(0, 0),
            eigenvalues: Vec::new(),
        };
    }

    let half_squared = DMatrix::from_fn(n, n, |i, j| {
        let d = distances.get(i, j);
        -0.5 * d * d
    });

    // Double centring
    let row_means: Vec<f64> = (0..n).map(|i| half_squared.row(i).mean()).collect();
    let col_means: Vec<f64> = (0..n).map(|j| half_squared.column(j).mean()).collect();
    let grand_mean = half_squared.mean();
    let centred = DMatrix::from_fn(n, n, |i, j| {
        half_squared[(i, j)] - row_means[i] - col_means[j] + grand_mean
    });

    let eigen = centred.symmetric_eigen();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&lhs, &rhs| eigen.eigenvalues[rhs].total_cmp(&eigen.eigenvalues[lhs]));

    let largest = eigen.eigenvalues[order[0]];
    if largest <= 0.0 {
        // Every object coincides
        return Ordination {
            coordinates: DMatrix::zeros(n, 0),
            eigenvalues: Vec::new(),
        };
    }

    let smallest = eigen.eigenvalues[order[n - 1]];
    let keep = if smallest / largest > -EIGEN_TOLERANCE {
        order
            .iter()
            .filter(|&&k| eigen.eigenvalues[k] > largest * EIGEN_TOLERANCE)
            .count()
    } else {
        n
    };

    let retained = &order[..keep];
    let eigenvalues: Vec<f64> = retained.iter().map(|&k| eigen.eigenvalues[k]).collect();
    let coordinates = DMatrix::from_fn(n, keep, |i, axis| {
        let k = retained[axis];
        eigen.eigenvectors[(i, k)] * eigen.eigenvalues[k].abs().sqrt()
    });

    Ordination {
        coordinates,
        eigenvalues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn embedded_distance(ord: &Ordination, i: usize, j: usize) -> f64 {
        let diff = ord.coordinates.row(i) - ord.coordinates.row(j);
        diff.norm()
    }

    #[test]
    fn test_reproduces_euclidean_distances() {
        // Right triangle with legs 3 and 4
        let d = DistanceMatrix::from_vec(3, vec![0.0, 3.0, 4.0, 3.0, 0.0, 5.0, 4.0, 5.0, 0.0]);
        let ord = principal_coordinates(&d);
        assert_eq!(ord.axes(), 2);
        assert!(ord.eigenvalues[0] >= ord.eigenvalues[1]);
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(embedded_distance(&ord, i, j), d.get(i, j), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_collinear_points_use_one_axis() {
        let d = DistanceMatrix::from_vec(3, vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
        let ord = principal_coordinates(&d);
        assert_eq!(ord.axes(), 1);
        assert_abs_diff_eq!(embedded_distance(&ord, 0, 2), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_euclidean_keeps_negative_axes() {
        // Violates the triangle inequality: d(0,2) > d(0,1) + d(1,2)
        let d = DistanceMatrix::from_vec(3, vec![0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0]);
        let ord = principal_coordinates(&d);
        assert_eq!(ord.axes(), 3);
        assert!(ord.eigenvalues.iter().any(|&l| l < 0.0));
    }

    #[test]
    fn test_coincident_objects() {
        let d = DistanceMatrix::from_vec(2, vec![0.0; 4]);
        let ord = principal_coordinates(&d);
        assert_eq!(ord.axes(), 0);
        assert_eq!(ord.coordinates.nrows(), 2);
    }
}
