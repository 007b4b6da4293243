// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discrete fan speed range.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::ValueError;

/// Inclusive range of discrete fan speed steps (e.g. 1-6).
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::types::SpeedRange;
///
/// let range = SpeedRange::new(1, 6).unwrap();
/// assert_eq!(range.step_count(), 6);
/// assert_eq!(range.clamp(9), 6);
///
/// assert!(SpeedRange::new(6, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeedRange {
    min: u8,
    max: u8,
}

impl SpeedRange {
    /// Creates a speed range.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidSpeedRange` if `min > max`.
    pub fn new(min: u8, max: u8) -> Result<Self, ValueError> {
        if min > max {
            return Err(ValueError::InvalidSpeedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lowest step.
    #[must_use]
    pub const fn min(&self) -> u8 {
        self.min
    }

    /// Highest step.
    #[must_use]
    pub const fn max(&self) -> u8 {
        self.max
    }

    /// Number of distinct steps in the range.
    #[must_use]
    pub fn step_count(&self) -> u16 {
        u16::from(self.max - self.min) + 1
    }

    /// Returns `true` if `step` lies inside the range.
    #[must_use]
    pub const fn contains(&self, step: u8) -> bool {
        step >= self.min && step <= self.max
    }

    /// Clamps `step` into the range.
    #[must_use]
    pub fn clamp(&self, step: u8) -> u8 {
        step.clamp(self.min, self.max)
    }

    /// Iterates every step from `min` to `max`.
    #[must_use]
    pub fn steps(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self { min: 1, max: 6 }
    }
}

impl fmt::Display for SpeedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
