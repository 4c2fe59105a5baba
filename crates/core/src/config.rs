//! Run configuration
//!
//! Everything that changes the numbers is explicit here. The only values a
//! caller may omit are the quantization increments, which default to the
//! reference workflow's `{frequency: 1, seasonality: 0.1, severity: 0.5,
//! patch_size: 1}`.

use crate::core_types::{TraitKind, TraitMap};
use crate::error::ConfigError;
use crate::mosaic::DecayRate;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// How fire records are put in recency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyBasis {
    /// Fires of the same ignition year share a rank
    Year,
    /// Order by (year, day-of-year); identical dates share a rank
    IgnitionDate,
}

/// Neighbourhood used to join cells into patches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Rook adjacency
    Four,
    /// Queen adjacency
    Eight,
}

impl Connectivity {
    /// Neighbour offsets `(d_row, d_col)`
    pub fn offsets(self) -> &'static [(i64, i64)] {
        const ROOK: [(i64, i64); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        const QUEEN: [(i64, i64); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &ROOK,
            Connectivity::Eight => &QUEEN,
        }
    }
}

/// Transform applied to patch area (hectares) before it becomes a trait value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaTransform {
    /// Natural log of hectares
    Ln,
    /// Base-10 log of hectares
    Log10,
    /// Hectares unchanged
    Identity,
}

impl AreaTransform {
    /// Apply the transform to an area in hectares
    #[inline]
    pub fn apply(self, hectares: f64) -> f64 {
        match self {
            AreaTransform::Ln => hectares.ln(),
            AreaTransform::Log10 => hectares.log10(),
            AreaTransform::Identity => hectares,
        }
    }
}

/// Patch segmentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConfig {
    pub connectivity: Connectivity,
    /// Ascending CBI thresholds; class = number of breaks <= value
    pub class_breaks: Vec<f64>,
    pub area_transform: AreaTransform,
}

impl PatchConfig {
    /// Standard CBI classes (unburned < 0.1 <= low < 1.25 <= moderate < 2.25 <= high),
    /// queen adjacency, natural-log hectares
    pub fn cbi_reference() -> Self {
        PatchConfig {
            connectivity: Connectivity::Eight,
            class_breaks: vec![0.1, 1.25, 2.25],
            area_transform: AreaTransform::Ln,
        }
    }

    /// Ordinal severity class of a CBI value
    #[inline]
    pub fn classify(&self, severity: f64) -> u8 {
        self.class_breaks.iter().filter(|&&b| severity >= b).count() as u8
    }
}

/// Where and how trait surfaces are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// File prefix per trait; files are named `{prefix}_{landscape_id}`
    pub prefixes: TraitMap<String>,
}

impl OutputConfig {
    /// Prefixes equal to the trait names
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        OutputConfig {
            directory: directory.into(),
            prefixes: TraitMap::from_fn(|kind| kind.name().to_string()),
        }
    }
}

/// Complete configuration for a pyrodiversity run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyroConfig {
    /// Per-rank discount `r` in [0, 1)
    pub decay_rate: f64,
    /// First ignition year included
    pub start_year: i32,
    /// Last ignition year included; the recency reference
    pub end_year: i32,
    pub recency: RecencyBasis,
    /// Quantization increment per trait
    #[serde(default = "PyroConfig::default_increments")]
    pub increments: TraitMap<f64>,
    /// Landscape attribute holding the identifier (e.g. "huc12")
    pub id_field: String,
    pub patches: PatchConfig,
    pub output: OutputConfig,
    /// Optional flammability mask per landscape id
    #[serde(default)]
    pub flammability_masks: BTreeMap<String, PathBuf>,
}

impl PyroConfig {
    /// Configuration with the reference workflow's increments and patch scheme
    pub fn new(decay_rate: f64, start_year: i32, end_year: i32, id_field: &str) -> Self {
        PyroConfig {
            decay_rate,
            start_year,
            end_year,
            recency: RecencyBasis::Year,
            increments: Self::default_increments(),
            id_field: id_field.to_string(),
            patches: PatchConfig::cbi_reference(),
            output: OutputConfig::in_directory("."),
            flammability_masks: BTreeMap::new(),
        }
    }

    /// `{frequency: 1, seasonality: 0.1, severity: 0.5, patch_size: 1}`
    pub fn default_increments() -> TraitMap<f64> {
        TraitMap {
            frequency: 1.0,
            seasonality: 0.1,
            severity: 0.5,
            patch_size: 1.0,
        }
    }

    /// Parse and validate JSON
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed JSON and any validation error.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    ///
    /// # Errors
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise as
    /// [`PyroConfig::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Check every configuration rule
    ///
    /// # Errors
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        DecayRate::new(self.decay_rate)?;

        if self.start_year > self.end_year {
            return Err(ConfigError::YearWindow {
                start: self.start_year,
                end: self.end_year,
            });
        }

        for (kind, &value) in self.increments.iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Increment { kind, value });
            }
        }

        let breaks = &self.patches.class_breaks;
        let ascending = breaks.windows(2).all(|w| w[0] < w[1]);
        if !ascending || breaks.iter().any(|b| !b.is_finite()) {
            return Err(ConfigError::ClassBreaks(breaks.clone()));
        }

        if self.id_field.trim().is_empty() {
            return Err(ConfigError::EmptyIdField);
        }

        let mut seen = FxHashSet::default();
        for (kind, prefix) in self.output.prefixes.iter() {
            if prefix.is_empty() {
                return Err(ConfigError::EmptyPrefix(kind));
            }
            if !seen.insert(prefix.as_str()) {
                return Err(ConfigError::DuplicatePrefix(prefix.clone()));
            }
        }

        Ok(())
    }

    /// Validated decay rate
    ///
    /// # Errors
    /// Returns `ConfigError::DecayRate` if the rate is outside [0, 1).
    pub fn decay(&self) -> Result<DecayRate, ConfigError> {
        DecayRate::new(self.decay_rate)
    }

    /// True when `year` falls inside the configured window
    #[inline]
    pub fn in_window(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}
