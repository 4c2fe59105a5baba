//! Pyrodiversity as functional diversity of fire-trait classes

pub mod aggregate;
pub mod community;
pub mod dispersion;
pub mod gower;
pub mod pcoa;
pub mod quantize;

// Re-exports
pub use aggregate::{
    aggregate, community_metrics, Aggregation, CommunityMetrics, PyrodiversityResult,
};
pub use community::{TraitClass, TraitCommunity};
pub use dispersion::{functional_dispersion, functional_evenness};
pub use gower::{gower_distances, DistanceMatrix};
pub use pcoa::{principal_coordinates, Ordination};
pub use quantize::{quantize, Quantizer};
