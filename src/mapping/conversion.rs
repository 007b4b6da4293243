// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pure conversions between device values and host-facing values.

use crate::types::SpeedRange;

/// Converts a host percentage (0-100) to a discrete device step.
///
/// Floor based: `0` maps to `min`, otherwise
/// `min + floor(percent * (max - min) / 100)`, clamped to the range.
/// Several percentages share one step, so only the step -> percent -> step
/// direction round-trips.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::mapping::percent_to_step;
/// use ceilfan_bridge::types::SpeedRange;
///
/// let range = SpeedRange::new(1, 6).unwrap();
/// assert_eq!(percent_to_step(0, range), 1);
/// assert_eq!(percent_to_step(50, range), 3);
/// assert_eq!(percent_to_step(100, range), 6);
/// ```
#[must_use]
pub fn percent_to_step(percent: u8, range: SpeedRange) -> u8 {
    if percent == 0 {
        return range.min();
    }
    let span = u32::from(range.max() - range.min());
    let offset = (u32::from(percent) * span / 100).min(span);
    let step = range
        .min()
        .saturating_add(u8::try_from(offset).unwrap_or(u8::MAX));
    range.clamp(step)
}

/// Converts a discrete device step to a host percentage (0-100).
///
/// Step `0` means "off" and maps to `0`. Other steps are clamped to the
/// range, then `round((step - min + 1) / (max - min + 1) * 100)`.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::mapping::step_to_percent;
/// use ceilfan_bridge::types::SpeedRange;
///
/// let range = SpeedRange::new(1, 6).unwrap();
/// assert_eq!(step_to_percent(0, range), 0);
/// assert_eq!(step_to_percent(1, range), 17);
/// assert_eq!(step_to_percent(6, range), 100);
/// ```
#[must_use]
pub fn step_to_percent(step: u8, range: SpeedRange) -> u8 {
    if step == 0 {
        return 0;
    }
    let clamped = u32::from(range.clamp(step));
    let numerator = (clamped - u32::from(range.min()) + 1) * 100;
    let steps = u32::from(range.step_count());
    // Half-up rounding of numerator / steps.
    let percent = (2 * numerator + steps) / (2 * steps);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Finds the position of a raw colour-temperature value in the configured list.
///
/// Returns `None` when the value is not configured; callers keep their
/// previous index in that case.
#[must_use]
pub fn resolve_temp_index(raw: i64, values: &[i64]) -> Option<usize> {
    values.iter().position(|v| *v == raw)
}
