//! Elf energy level.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An elf's energy, always within `0..=100`.
///
/// Construction clamps out-of-range input instead of rejecting it; rejection
/// of out-of-range form input is the validator's job, the clamp is what the
/// store guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Energy(u8);

impl Energy {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 100;
    /// Energy given to a new elf when none is supplied.
    pub const DEFAULT: Self = Self(50);
    /// Amount added by a single boost.
    pub const BOOST_STEP: i64 = 10;

    /// Clamp any integer into the valid range.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        // Clamped into 0..=100, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(value.clamp(Self::MIN, Self::MAX) as u8)
    }

    /// Whether `value` is already inside the valid range.
    #[must_use]
    pub const fn in_range(value: i64) -> bool {
        value >= Self::MIN && value <= Self::MAX
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Energy after one boost, capped at the maximum.
    #[must_use]
    pub fn boosted(self) -> Self {
        Self::clamped(i64::from(self.0) + Self::BOOST_STEP)
    }

    #[must_use]
    pub const fn is_full(self) -> bool {
        self.0 >= 100
    }

    /// Display band for the energy bar.
    #[must_use]
    pub const fn band(self) -> EnergyBand {
        match self.0 {
            80.. => EnergyBand::High,
            50..=79 => EnergyBand::Medium,
            20..=49 => EnergyBand::Low,
            _ => EnergyBand::Critical,
        }
    }
}

impl Default for Energy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Energy {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Energy> for i64 {
    fn from(energy: Energy) -> Self {
        Self::from(energy.0)
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/100", self.0)
    }
}

/// Coarse energy bucket used by list and profile views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBand {
    High,
    Medium,
    Low,
    Critical,
}
