//! Functional dispersion and evenness
//!
//! Dispersion (FDis, Laliberté & Legendre 2010) is the abundance-weighted mean
//! distance of trait classes to their abundance-weighted centroid in
//! principal-coordinate space. Evenness (FEve, Villéger et al. 2008) measures
//! how regularly abundance is spread along the minimum spanning tree of the
//! classes.

use crate::diversity::{DistanceMatrix, Ordination};

/// Abundance-weighted mean distance to the weighted centroid
///
/// Axes with negative eigenvalues subtract from the squared distance, which
/// corrects for non-Euclidean input distances. Fewer than two objects give 0.
///
/// # Panics
///
/// Panics if `abundances` does not have one entry per ordinated object
pub fn functional_dispersion(ordination: &Ordination, abundances: &[f64]) -> f64 {
    let coords = &ordination.coordinates;
    let n = coords.nrows();
    assert_eq!(abundances.len(), n, "One abundance per trait class");

    let total: f64 = abundances.iter().sum();
    if n < 2 || ordination.axes() == 0 || total <= 0.0 {
        return 0.0;
    }

    let centroid: Vec<f64> = (0..ordination.axes())
        .map(|axis| {
            (0..n)
                .map(|i| abundances[i] * coords[(i, axis)])
                .sum::<f64>()
                / total
        })
        .collect();

    let weighted: f64 = (0..n)
        .map(|i| {
            let (pos, neg) = ordination.eigenvalues.iter().enumerate().fold(
                (0.0, 0.0),
                |(pos, neg), (axis, &eigenvalue)| {
                    let delta = coords[(i, axis)] - centroid[axis];
                    if eigenvalue > 0.0 {
                        (pos + delta * delta, neg)
                    } else {
                        (pos, neg + delta * delta)
                    }
                },
            );
            abundances[i] * (pos - neg).abs().sqrt()
        })
        .sum();

    weighted / total
}

/// Minimum spanning tree edges `(i, j)` of a distance matrix (Prim)
fn minimum_spanning_tree(distances: &DistanceMatrix) -> Vec<(usize, usize)> {
    let n = distances.len();
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    if n < 2 {
        return edges;
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut parent = vec![0usize; n];
    in_tree[0] = true;
    for j in 1..n {
        best[j] = distances.get(0, j);
    }

    for _ in 1..n {
        let Some(next) = (0..n)
            .filter(|&j| !in_tree[j])
            .min_by(|&x, &y| best[x].total_cmp(&best[y]))
        else {
            break;
        };
        in_tree[next] = true;
        edges.push((parent[next], next));

        for j in 0..n {
            if !in_tree[j] && distances.get(next, j) < best[j] {
                best[j] = distances.get(next, j);
                parent[j] = next;
            }
        }
    }

    edges
}

/// Functional evenness over the minimum spanning tree
///
/// `None` for fewer than three classes, where FEve is undefined.
///
/// # Panics
///
/// Panics if `abundances` does not have one entry per object
pub fn functional_evenness(distances: &DistanceMatrix, abundances: &[f64]) -> Option<f64> {
    let n = distances.len();
    assert_eq!(abundances.len(), n, "One abundance per trait class");
    if n < 3 {
        return None;
    }

    let total: f64 = abundances.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let relative: Vec<f64> = abundances.iter().map(|a| a / total).collect();

    let weighted_edges: Vec<f64> = minimum_spanning_tree(distances)
        .into_iter()
        .map(|(i, j)| distances.get(i, j) / (relative[i] + relative[j]))
        .collect();
    let edge_total: f64 = weighted_edges.iter().sum();
    if edge_total <= 0.0 {
        return None;
    }

    let even_share = 1.0 / (n - 1) as f64;
    let clipped: f64 = weighted_edges
        .iter()
        .map(|ew| (ew / edge_total).min(even_share))
        .sum();

    Some((clipped - even_share) / (1.0 - even_share))
}
