//! Fire history and landscape units supplied by the ingestion layer

pub mod fire_record;
pub mod landscape;

// Re-export main types
pub use fire_record::{FireHistory, FireRecord};
pub use landscape::{Landscape, LandscapeWindow};
