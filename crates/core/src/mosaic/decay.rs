//! Recency decay weighting
//!
//! The invisible mosaic: the most recent fire affecting a landscape gets
//! weight 1 and each older rank is discounted by a further factor `r`.

use crate::config::RecencyBasis;
use crate::core_types::DayOfYear;
use crate::error::ConfigError;

/// Validated per-rank decay rate `r` in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayRate(f64);

impl DecayRate {
    /// Validate a decay rate
    ///
    /// # Errors
    /// Returns `ConfigError::DecayRate` if `rate` is outside [0, 1) or NaN.
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        if (0.0..1.0).contains(&rate) {
            Ok(DecayRate(rate))
        } else {
            Err(ConfigError::DecayRate(rate))
        }
    }

    /// Raw rate
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Weight `r^k` of a record at recency rank `k` (0 = most recent)
    ///
    /// With `r = 0` only rank 0 counts.
    #[inline]
    pub fn weight(self, rank: u32) -> f64 {
        if rank == 0 {
            return 1.0;
        }
        self.0.powi(rank.min(i32::MAX as u32) as i32)
    }
}

/// Weight `r^k` for a raw rate
///
/// # Errors
/// Returns `ConfigError::DecayRate` if `rate` is outside [0, 1).
pub fn decay_weight(rate: f64, rank: u32) -> Result<f64, ConfigError> {
    Ok(DecayRate::new(rate)?.weight(rank))
}

/// Dense recency ranks for a set of ignition dates
///
/// Rank 0 is the most recent; records that tie under `basis` share a rank and
/// the next distinct date takes the next rank.
pub fn recency_ranks(dates: &[(i32, DayOfYear)], basis: RecencyBasis) -> Vec<u32> {
    let key = |&(year, day): &(i32, DayOfYear)| match basis {
        RecencyBasis::Year => (year, 0),
        RecencyBasis::IgnitionDate => (year, day.get()),
    };

    let mut distinct: Vec<(i32, u16)> = dates.iter().map(key).collect();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();

    dates
        .iter()
        .map(|date| {
            let k = key(date);
            // Descending order, so search with reversed comparison
            distinct
                .binary_search_by(|probe| k.cmp(probe))
                .unwrap_or_default() as u32
        })
        .collect()
}
