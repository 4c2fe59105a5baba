//! Precision quantizer
//!
//! Rounds trait surfaces to per-trait increments so that ecologically
//! identical pixels land on exactly the same trait tuple. Ties round to even,
//! matching the reference workflow's `round()`.

use crate::config::PyroConfig;
use crate::core_types::{TraitKind, TraitMap};
use crate::error::ConfigError;
use crate::mosaic::TraitSurface;

/// Round `value` to the nearest multiple of `increment` (ties to even)
#[inline]
pub fn quantize(value: f64, increment: f64) -> f64 {
    (value / increment).round_ties_even() * increment
}

/// Per-trait quantization increments
#[derive(Debug, Clone, PartialEq)]
pub struct Quantizer {
    increments: TraitMap<f64>,
}

impl Quantizer {
    /// Validate increments
    ///
    /// # Errors
    /// Returns `ConfigError::Increment` for any increment that is not
    /// positive and finite.
    pub fn new(increments: TraitMap<f64>) -> Result<Self, ConfigError> {
        for (kind, &value) in increments.iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Increment { kind, value });
            }
        }
        Ok(Quantizer { increments })
    }

    /// Increments from a configuration
    ///
    /// # Errors
    /// As [`Quantizer::new`].
    pub fn from_config(config: &PyroConfig) -> Result<Self, ConfigError> {
        Quantizer::new(config.increments.clone())
    }

    /// Increment for one trait
    pub fn increment(&self, kind: TraitKind) -> f64 {
        self.increments[kind]
    }

    /// Quantize one surface; NoData stays NoData
    pub fn quantize(&self, surface: &TraitSurface) -> TraitSurface {
        let increment = self.increment(surface.kind);
        surface.with_raster(surface.raster.map_valid(|v| quantize(v, increment)))
    }

    /// Quantize all four surfaces
    pub fn quantize_all(&self, surfaces: &TraitMap<TraitSurface>) -> TraitMap<TraitSurface> {
        surfaces.by_ref().map(|_, surface| self.quantize(surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridSpec, Raster};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_increments() {
        // Severity to the nearest half CBI unit
        assert_eq!(quantize(2.6667, 0.5), 2.5);
        assert_eq!(quantize(2.8, 0.5), 3.0);
        // Frequency to whole units, ties to even
        assert_eq!(quantize(0.5, 1.0), 0.0);
        assert_eq!(quantize(1.5, 1.0), 2.0);
        assert_eq!(quantize(1.25, 1.0), 1.0);
        // Seasonality to a tenth of a day
        assert_abs_diff_eq!(quantize(200.04, 0.1), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_near_duplicates_collapse() {
        let a = quantize(2.000_000_1, 0.5);
        let b = quantize(1.999_999_9, 0.5);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_invalid_increment_rejected() {
        let mut increments = PyroConfig::default_increments();
        increments.patch_size = -1.0;
        assert_eq!(
            Quantizer::new(increments),
            Err(ConfigError::Increment {
                kind: TraitKind::PatchSize,
                value: -1.0
            })
        );
    }

    #[test]
    fn test_quantize_surface_keeps_nodata() {
        let quantizer = Quantizer::new(PyroConfig::default_increments()).unwrap();
        let raster = Raster::new(
            GridSpec::new(0.0, 30.0, 30.0, 3, 1, "EPSG:5070"),
            vec![2.6, f64::NAN, 0.2],
        )
        .unwrap();
        let surface = TraitSurface {
            kind: TraitKind::Severity,
            landscape_id: "w".to_string(),
            raster,
        };
        let q = quantizer.quantize(&surface);
        assert_eq!(q.kind, TraitKind::Severity);
        assert_eq!(q.raster.get(0, 0), Some(2.5));
        assert_eq!(q.raster.get(0, 1), None);
        assert_eq!(q.raster.get(0, 2), Some(0.0));
    }
}
