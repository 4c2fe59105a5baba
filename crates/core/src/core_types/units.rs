//! Semantic unit types for fire-history quantities
//!
//! Newtype wrappers keep patch areas and ignition days from being mixed with
//! the raw `f64` trait values they eventually become.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::TAU;
use std::fmt;
use std::ops::Deref;

/// Square metres per hectare
const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Period of the seasonality circle; one day-of-year unit is one degree
pub const SEASON_PERIOD: f64 = 360.0;

// ============================================================================
// AREA
// ============================================================================

/// Area in hectares
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hectares(f64);

impl Eq for Hectares {}

impl PartialOrd for Hectares {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hectares {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Hectares {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Hectares {
    /// Area covered by `cells` square cells of side `resolution` metres
    #[inline]
    #[must_use]
    pub fn from_cells(cells: usize, resolution: f64) -> Self {
        Hectares(cells as f64 * resolution * resolution / SQUARE_METERS_PER_HECTARE)
    }
}

impl fmt::Display for Hectares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ha", self.0)
    }
}

// ============================================================================
// TIME OF YEAR
// ============================================================================

/// Ignition day-of-year, 1-366
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct DayOfYear(u16);

impl DayOfYear {
    /// Validate a day-of-year; `None` outside 1-366
    #[must_use]
    pub const fn new(day: u16) -> Option<Self> {
        if matches!(day, 1..=366) {
            Some(DayOfYear(day))
        } else {
            None
        }
    }

    /// Raw day number
    #[inline]
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Position on the seasonality circle (radians). Day 360 and day 0
    /// coincide, so days 360 and 5 sit five units apart.
    #[inline]
    #[must_use]
    pub fn angle(self) -> f64 {
        f64::from(self.0) * TAU / SEASON_PERIOD
    }

    /// Map an angle back onto the day axis, in [0, 360)
    #[must_use]
    pub fn from_angle(angle: f64) -> f64 {
        let day = (angle * SEASON_PERIOD / TAU).rem_euclid(SEASON_PERIOD);
        // rem_euclid of a tiny negative rounds up to the period itself
        if day >= SEASON_PERIOD {
            0.0
        } else {
            day
        }
    }
}

impl TryFrom<u16> for DayOfYear {
    type Error = String;

    fn try_from(day: u16) -> Result<Self, Self::Error> {
        DayOfYear::new(day).ok_or_else(|| format!("day-of-year {day} is outside 1-366"))
    }
}

impl From<DayOfYear> for u16 {
    fn from(day: DayOfYear) -> u16 {
        day.0
    }
}

impl fmt::Display for DayOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}", self.0)
    }
}
