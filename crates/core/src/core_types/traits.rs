//! Fire-history trait axes
//!
//! Every landscape is described by the same four traits. `TraitMap` keeps one
//! value per trait so configuration, surfaces and quantization increments can
//! be addressed by `TraitKind` without stringly-typed lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// One of the four fire-history traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    /// Weighted count of fire exposures
    Frequency,
    /// Weighted circular mean ignition day-of-year
    Seasonality,
    /// Weighted mean burn severity (CBI scale)
    Severity,
    /// Weighted mean transformed patch area
    PatchSize,
}

impl TraitKind {
    /// All traits, in tuple order used by trait classes
    pub const ALL: [TraitKind; 4] = [
        TraitKind::Frequency,
        TraitKind::Seasonality,
        TraitKind::Severity,
        TraitKind::PatchSize,
    ];

    /// Position of this trait in `ALL`
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            TraitKind::Frequency => 0,
            TraitKind::Seasonality => 1,
            TraitKind::Severity => 2,
            TraitKind::PatchSize => 3,
        }
    }

    /// Stable lowercase name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TraitKind::Frequency => "frequency",
            TraitKind::Seasonality => "seasonality",
            TraitKind::Severity => "severity",
            TraitKind::PatchSize => "patch_size",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per trait
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitMap<T> {
    pub frequency: T,
    pub seasonality: T,
    pub severity: T,
    pub patch_size: T,
}

impl<T> TraitMap<T> {
    /// Build a map by evaluating `f` for every trait
    pub fn from_fn(mut f: impl FnMut(TraitKind) -> T) -> Self {
        TraitMap {
            frequency: f(TraitKind::Frequency),
            seasonality: f(TraitKind::Seasonality),
            severity: f(TraitKind::Severity),
            patch_size: f(TraitKind::PatchSize),
        }
    }

    /// Transform every value, keeping the trait association
    pub fn map<U>(self, mut f: impl FnMut(TraitKind, T) -> U) -> TraitMap<U> {
        TraitMap {
            frequency: f(TraitKind::Frequency, self.frequency),
            seasonality: f(TraitKind::Seasonality, self.seasonality),
            severity: f(TraitKind::Severity, self.severity),
            patch_size: f(TraitKind::PatchSize, self.patch_size),
        }
    }

    /// Borrow every value
    pub fn by_ref(&self) -> TraitMap<&T> {
        TraitMap {
            frequency: &self.frequency,
            seasonality: &self.seasonality,
            severity: &self.severity,
            patch_size: &self.patch_size,
        }
    }

    /// Iterate `(kind, value)` pairs in `TraitKind::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (TraitKind, &T)> {
        TraitKind::ALL.into_iter().map(move |kind| (kind, &self[kind]))
    }
}

impl<T> Index<TraitKind> for TraitMap<T> {
    type Output = T;

    fn index(&self, kind: TraitKind) -> &T {
        match kind {
            TraitKind::Frequency => &self.frequency,
            TraitKind::Seasonality => &self.seasonality,
            TraitKind::Severity => &self.severity,
            TraitKind::PatchSize => &self.patch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in TraitKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_map_and_index() {
        let names = TraitMap::from_fn(TraitKind::name);
        assert_eq!(names[TraitKind::PatchSize], "patch_size");

        let lengths = names.map(|_, name| name.len());
        assert_eq!(lengths.seasonality, 11);

        let collected: Vec<_> = lengths.iter().map(|(kind, _)| kind).collect();
        assert_eq!(collected, TraitKind::ALL.to_vec());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TraitKind::PatchSize).unwrap();
        assert_eq!(json, "\"patch_size\"");
    }
}
