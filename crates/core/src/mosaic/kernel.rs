//! Per-pixel trait kernels
//!
//! Each trait reduces the fires covering a pixel with the same additive
//! accumulator, [`Moments`]. A kernel only decides what one fire contributes
//! and how the final sums turn into a trait value. Because moments add
//! component-wise, fires can be folded in any order or in parallel chunks.

use crate::core_types::{DayOfYear, TraitKind};
use crate::mosaic::FireLayer;
use std::ops::{Add, AddAssign};

/// Resultant lengths below this fraction of the total weight count as cancelled
const CIRCULAR_CANCEL_TOLERANCE: f64 = 1e-12;

/// Additive per-pixel accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    /// Fires that touched the pixel
    pub hits: u32,
    /// Σw
    pub weight: f64,
    /// First weighted component (Σw·x, or Σw·cos θ)
    pub a: f64,
    /// Second weighted component (Σw·sin θ)
    pub b: f64,
}

impl Moments {
    /// Single-fire contribution
    #[inline]
    pub fn single(weight: f64, a: f64, b: f64) -> Self {
        Moments {
            hits: 1,
            weight,
            a,
            b,
        }
    }
}

impl Add for Moments {
    type Output = Moments;

    #[inline]
    fn add(self, rhs: Moments) -> Moments {
        Moments {
            hits: self.hits + rhs.hits,
            weight: self.weight + rhs.weight,
            a: self.a + rhs.a,
            b: self.b + rhs.b,
        }
    }
}

impl AddAssign for Moments {
    #[inline]
    fn add_assign(&mut self, rhs: Moments) {
        *self = *self + rhs;
    }
}

/// Trait-specific combine rule
pub trait TraitKernel: Sync {
    /// Trait this kernel produces
    const KIND: TraitKind;

    /// What one fire adds at window cell `index`, `None` if it adds nothing
    fn contribution(layer: &FireLayer, index: usize) -> Option<Moments>;

    /// Trait value from the accumulated moments, `None` for NoData
    fn finish(moments: Moments) -> Option<f64>;
}

/// Weighted exposure count `Σw`
#[derive(Debug, Clone, Copy)]
pub struct FrequencyKernel;

/// Weighted circular mean of ignition day-of-year
#[derive(Debug, Clone, Copy)]
pub struct SeasonalityKernel;

/// Weighted mean severity `Σw·s / Σw`
#[derive(Debug, Clone, Copy)]
pub struct SeverityKernel;

/// Weighted mean transformed patch area `Σw·p / Σw`
#[derive(Debug, Clone, Copy)]
pub struct PatchSizeKernel;

/// Weighted mean of a per-cell value where the fire has one
#[inline]
fn weighted_value(layer: &FireLayer, values: &[f64], index: usize) -> Option<Moments> {
    if !layer.covered[index] {
        return None;
    }
    let value = values[index];
    (!value.is_nan()).then(|| Moments::single(layer.weight, layer.weight * value, 0.0))
}

#[inline]
fn weighted_mean(moments: Moments) -> Option<f64> {
    (moments.hits > 0 && moments.weight > 0.0).then(|| moments.a / moments.weight)
}

impl TraitKernel for FrequencyKernel {
    const KIND: TraitKind = TraitKind::Frequency;

    #[inline]
    fn contribution(layer: &FireLayer, index: usize) -> Option<Moments> {
        layer.covered[index].then(|| Moments::single(layer.weight, 0.0, 0.0))
    }

    #[inline]
    fn finish(moments: Moments) -> Option<f64> {
        // Zero is a real value here (every fire decayed to nothing), unlike NoData
        (moments.hits > 0).then_some(moments.weight)
    }
}

impl TraitKernel for SeasonalityKernel {
    const KIND: TraitKind = TraitKind::Seasonality;

    #[inline]
    fn contribution(layer: &FireLayer, index: usize) -> Option<Moments> {
        if !layer.covered[index] {
            return None;
        }
        let angle = layer.day_of_year.angle();
        Some(Moments::single(
            layer.weight,
            layer.weight * angle.cos(),
            layer.weight * angle.sin(),
        ))
    }

    fn finish(moments: Moments) -> Option<f64> {
        if moments.hits == 0 || moments.weight <= 0.0 {
            return None;
        }
        let resultant = moments.a.hypot(moments.b);
        if resultant <= CIRCULAR_CANCEL_TOLERANCE * moments.weight {
            return None;
        }
        Some(DayOfYear::from_angle(moments.b.atan2(moments.a)))
    }
}

impl TraitKernel for SeverityKernel {
    const KIND: TraitKind = TraitKind::Severity;

    #[inline]
    fn contribution(layer: &FireLayer, index: usize) -> Option<Moments> {
        weighted_value(layer, &layer.severity, index)
    }

    #[inline]
    fn finish(moments: Moments) -> Option<f64> {
        weighted_mean(moments)
    }
}

impl TraitKernel for PatchSizeKernel {
    const KIND: TraitKind = TraitKind::PatchSize;

    #[inline]
    fn contribution(layer: &FireLayer, index: usize) -> Option<Moments> {
        weighted_value(layer, &layer.patch, index)
    }

    #[inline]
    fn finish(moments: Moments) -> Option<f64> {
        weighted_mean(moments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn layer(weight: f64, day: u16, severity: f64) -> FireLayer {
        FireLayer {
            record_id: "f".to_string(),
            year: 2000,
            day_of_year: DayOfYear::new(day).unwrap(),
            rank: 0,
            weight,
            covered: vec![true, false],
            severity: vec![severity, severity],
            patch: vec![1.5, 1.5],
        }
    }

    fn fold<K: TraitKernel>(layers: &[FireLayer], index: usize) -> Option<f64> {
        let moments = layers
            .iter()
            .filter_map(|l| K::contribution(l, index))
            .fold(Moments::default(), |acc, m| acc + m);
        K::finish(moments)
    }

    #[test]
    fn test_uncovered_cell_is_nodata() {
        let layers = [layer(1.0, 100, 2.0)];
        assert_eq!(fold::<FrequencyKernel>(&layers, 1), None);
        assert_eq!(fold::<SeasonalityKernel>(&layers, 1), None);
        assert_eq!(fold::<SeverityKernel>(&layers, 1), None);
        assert_eq!(fold::<PatchSizeKernel>(&layers, 1), None);
    }

    #[test]
    fn test_frequency_sums_weights() {
        let layers = [layer(1.0, 100, 2.0), layer(0.5, 100, 2.0), layer(0.25, 100, 2.0)];
        assert_abs_diff_eq!(fold::<FrequencyKernel>(&layers, 0).unwrap(), 1.75);
    }

    #[test]
    fn test_frequency_zero_weight_is_not_nodata() {
        let layers = [layer(0.0, 100, 2.0)];
        assert_eq!(fold::<FrequencyKernel>(&layers, 0), Some(0.0));
        // ...but a weighted mean over zero weight is undefined
        assert_eq!(fold::<SeverityKernel>(&layers, 0), None);
    }

    #[test]
    fn test_severity_weighted_mean() {
        let layers = [layer(1.0, 100, 2.0), layer(0.5, 100, 4.0)];
        assert_abs_diff_eq!(
            fold::<SeverityKernel>(&layers, 0).unwrap(),
            8.0 / 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_severity_nodata_skips_fire() {
        let layers = [layer(1.0, 100, 2.0), layer(0.5, 100, f64::NAN)];
        assert_abs_diff_eq!(fold::<SeverityKernel>(&layers, 0).unwrap(), 2.0);
        // The NoData fire still counts as an exposure
        assert_abs_diff_eq!(fold::<FrequencyKernel>(&layers, 0).unwrap(), 1.5);
    }

    #[test]
    fn test_seasonality_wraps_year_end() {
        let layers = [layer(1.0, 360, 2.0), layer(1.0, 5, 2.0)];
        let day = fold::<SeasonalityKernel>(&layers, 0).unwrap();
        // Midpoint through the new year, not mid-year
        assert_abs_diff_eq!(day, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_seasonality_weighting_pulls_toward_heavier_fire() {
        let layers = [layer(1.0, 100, 2.0), layer(0.25, 200, 2.0)];
        let day = fold::<SeasonalityKernel>(&layers, 0).unwrap();
        assert!(day > 100.0 && day < 150.0, "mean day was {day}");
    }

    #[test]
    fn test_seasonality_cancelled_resultant_is_nodata() {
        // Equal weights at opposite points of the year leave no mean direction
        let cancel = Moments {
            hits: 2,
            weight: 2.0,
            a: 0.0,
            b: 0.0,
        };
        assert_eq!(SeasonalityKernel::finish(cancel), None);
    }

    #[test]
    fn test_moments_add_is_commutative() {
        let x = Moments::single(1.0, 2.0, 3.0);
        let y = Moments::single(0.5, -1.0, 0.25);
        assert_eq!(x + y, y + x);
        let mut z = x;
        z += y;
        assert_eq!(z.hits, 2);
    }
}
