// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State cache with a debounce gate on outward propagation.

use std::time::Duration;

use tokio::time::Instant;

use crate::types::SpeedRange;

use super::{DeviceState, DpsUpdate, StateChange};

/// Default debounce window for inbound data.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Result of applying one inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Whether this application should be propagated to the host.
    pub authoritative: bool,
    /// Changes that actually modified the cache.
    pub changed: Vec<StateChange>,
}

/// Authoritative in-process snapshot of device state.
///
/// Every inbound update is applied to the cache. Only updates arriving at
/// least one debounce window after the previous authoritative one are
/// marked authoritative; the others update the cache silently.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use ceilfan_bridge::state::{DpsUpdate, StateCache};
/// use ceilfan_bridge::types::SpeedRange;
///
/// let mut cache = StateCache::new(Duration::from_millis(200), SpeedRange::default());
/// let now = Instant::now();
///
/// let first = DpsUpdate { light_on: Some(true), ..DpsUpdate::default() };
/// assert!(cache.apply(&first, now).authoritative);
///
/// let second = DpsUpdate { light_on: Some(false), ..DpsUpdate::default() };
/// let outcome = cache.apply(&second, now + Duration::from_millis(50));
/// assert!(!outcome.authoritative);
/// assert!(!cache.state().light_on());
/// ```
#[derive(Debug, Clone)]
pub struct StateCache {
    state: DeviceState,
    debounce_window: Duration,
    last_authoritative: Option<Instant>,
}

impl StateCache {
    /// Creates a cache holding the initial state for a fan stepping
    /// through `speed_range`.
    #[must_use]
    pub fn new(debounce_window: Duration, speed_range: SpeedRange) -> Self {
        Self {
            state: DeviceState::for_range(speed_range),
            debounce_window,
            last_authoritative: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Applies an inbound update received at `now`.
    pub fn apply(&mut self, update: &DpsUpdate, now: Instant) -> ApplyOutcome {
        let authoritative = self
            .last_authoritative
            .is_none_or(|last| now.duration_since(last) >= self.debounce_window);
        if authoritative {
            self.last_authoritative = Some(now);
        }

        let changed = update
            .to_state_changes()
            .into_iter()
            .filter(|change| self.state.apply(change))
            .collect();

        ApplyOutcome {
            authoritative,
            changed,
        }
    }

    /// Applies a local (optimistic) change.
    ///
    /// Local changes never touch the debounce clock.
    pub fn apply_local(&mut self, change: &StateChange) -> bool {
        self.state.apply(change)
    }
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW, SpeedRange::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed(step: u8) -> DpsUpdate {
        DpsUpdate {
            fan_speed: Some(step),
            ..DpsUpdate::default()
        }
    }

    #[test]
    fn first_update_is_authoritative() {
        let mut cache = StateCache::default();
        let outcome = cache.apply(&speed(3), Instant::now());

        assert!(outcome.authoritative);
        assert_eq!(outcome.changed, vec![StateChange::FanSpeed(3)]);
    }

    #[test]
    fn updates_inside_window_are_silent_but_cached() {
        let mut cache = StateCache::default();
        let t0 = Instant::now();

        assert!(cache.apply(&speed(2), t0).authoritative);
        let outcome = cache.apply(&speed(5), t0 + Duration::from_millis(199));

        assert!(!outcome.authoritative);
        assert_eq!(cache.state().fan_speed(), 5);
    }

    #[test]
    fn suppressed_updates_do_not_extend_window() {
        let mut cache = StateCache::default();
        let t0 = Instant::now();

        cache.apply(&speed(2), t0);
        cache.apply(&speed(3), t0 + Duration::from_millis(150));
        let outcome = cache.apply(&speed(4), t0 + Duration::from_millis(200));

        assert!(outcome.authoritative);
    }

    #[test]
    fn unchanged_values_are_not_reported() {
        let mut cache = StateCache::default();
        let t0 = Instant::now();

        cache.apply(&speed(2), t0);
        let outcome = cache.apply(&speed(2), t0 + Duration::from_secs(1));

        assert!(outcome.authoritative);
        assert!(outcome.changed.is_empty());
    }

    #[test]
    fn local_changes_bypass_debounce() {
        let mut cache = StateCache::default();
        let t0 = Instant::now();

        assert!(cache.apply_local(&StateChange::LightOn(true)));
        assert!(cache.apply(&speed(2), t0).authoritative);
    }
}
