//! Unit types for physical quantities.
//!
//! Provides type-safe representations of stage positions and optical
//! lengths to prevent nanometer/micrometer confusion at compile time.

use core::ops::{Add, Mul, Neg, Sub};

use serde::Deserialize;

/// Stage position or displacement in nanometers.
///
/// Stage adapters speak nanometers; uses i64 for unlimited range in either
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Nanometers(pub i64);

impl Nanometers {
    /// Create a new Nanometers value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Absolute distance as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl Add for Nanometers {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Nanometers {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Nanometers {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Nanometers {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Optical or stage length in micrometers.
///
/// Used for configuration (field of view, axial step).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Micrometers(pub f64);

impl Micrometers {
    /// Create a new Micrometers value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Convert to whole nanometers, rounding to nearest.
    #[inline]
    pub fn to_nanometers(self) -> Nanometers {
        Nanometers(libm::round(self.0 * 1000.0) as i64)
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Micrometers.
    fn um(self) -> Micrometers;
}

impl UnitExt for f64 {
    #[inline]
    fn um(self) -> Micrometers {
        Micrometers(self)
    }
}

/// Extension trait for creating nanometer positions from integers.
pub trait NanometerExt {
    /// Convert to Nanometers.
    fn nm(self) -> Nanometers;
}

impl NanometerExt for i64 {
    #[inline]
    fn nm(self) -> Nanometers {
        Nanometers(self)
    }
}
