//! Pyrodiversity aggregation
//!
//! Quantized trait surfaces -> trait-class community -> Gower distances ->
//! principal coordinates -> functional dispersion.

use crate::core_types::TraitMap;
use crate::diversity::{
    functional_dispersion, functional_evenness, gower_distances, principal_coordinates,
    TraitCommunity,
};
use crate::error::AlignmentError;
use crate::grid::Raster;
use crate::mosaic::TraitSurface;
use serde::{Deserialize, Serialize};

/// Diversity of one non-empty trait-class community
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunityMetrics {
    /// Functional dispersion (FDis)
    pub dispersion: f64,
    /// Number of trait classes
    pub richness: usize,
    /// Functional evenness (FEve), defined for three or more classes
    pub evenness: Option<f64>,
}

/// Community and its metrics for one landscape
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub community: TraitCommunity,
    /// `None` when the landscape has no valid pixel
    pub metrics: Option<CommunityMetrics>,
}

/// Diversity metrics of a community, `None` if it has no pixels
pub fn community_metrics(community: &TraitCommunity) -> Option<CommunityMetrics> {
    if community.is_empty() {
        return None;
    }

    let richness = community.richness();
    if richness == 1 {
        return Some(CommunityMetrics {
            dispersion: 0.0,
            richness,
            evenness: None,
        });
    }

    let abundances: Vec<f64> = community
        .classes()
        .iter()
        .map(|c| c.abundance as f64)
        .collect();
    let distances = gower_distances(community.classes());
    let ordination = principal_coordinates(&distances);

    Some(CommunityMetrics {
        dispersion: functional_dispersion(&ordination, &abundances),
        richness,
        evenness: functional_evenness(&distances, &abundances),
    })
}

/// Aggregate four quantized surfaces (plus optional flammability mask)
///
/// # Errors
/// Returns `AlignmentError` if the surfaces or mask are not co-registered.
pub fn aggregate(
    surfaces: &TraitMap<TraitSurface>,
    mask: Option<&Raster>,
) -> Result<Aggregation, AlignmentError> {
    let community = TraitCommunity::from_surfaces(surfaces, mask)?;
    let metrics = community_metrics(&community);
    Ok(Aggregation { community, metrics })
}

/// One row of output per landscape
///
/// `dispersion` is `None` (undefined) when the landscape has no valid pixel,
/// which is distinct from a legitimate dispersion of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyrodiversityResult {
    pub landscape_id: String,
    pub dispersion: Option<f64>,
    pub richness: Option<usize>,
    pub evenness: Option<f64>,
    /// Pixels that entered the community
    pub valid_pixels: usize,
    /// Fire records that contributed to the surfaces
    pub fire_count: usize,
}

impl PyrodiversityResult {
    /// Result for a landscape with no valid pixels
    pub fn undefined(landscape_id: &str, fire_count: usize) -> Self {
        PyrodiversityResult {
            landscape_id: landscape_id.to_string(),
            dispersion: None,
            richness: None,
            evenness: None,
            valid_pixels: 0,
            fire_count,
        }
    }

    /// Result from an aggregation
    pub fn from_aggregation(
        landscape_id: &str,
        fire_count: usize,
        aggregation: &Aggregation,
    ) -> Self {
        match aggregation.metrics {
            Some(metrics) => PyrodiversityResult {
                landscape_id: landscape_id.to_string(),
                dispersion: Some(metrics.dispersion),
                richness: Some(metrics.richness),
                evenness: metrics.evenness,
                valid_pixels: aggregation.community.valid_pixels(),
                fire_count,
            },
            None => PyrodiversityResult::undefined(landscape_id, fire_count),
        }
    }

    /// True when a dispersion value exists
    pub fn is_defined(&self) -> bool {
        self.dispersion.is_some()
    }
}
