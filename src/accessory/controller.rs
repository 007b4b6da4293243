// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronous core of an accessory.
//!
//! [`FanController`] owns the cache, the connection manager and the host
//! bindings of one fan. It never awaits: transport calls that take time are
//! spawned onto a [`JoinSet`] and their outcomes are fed back by the actor.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::ResolvedDevice;
use crate::connection::{ConnectionAction, ConnectionManager, ConnectionState};
use crate::error::TransportError;
use crate::event::{AccessoryId, DeviceEvent, EventBus};
use crate::host::{ControlId, ControlValue, HostControl};
use crate::mapping::percent_to_step;
use crate::preset::{PresetEffect, PresetFamily, PresetId};
use crate::scheduler::{Scheduler, TimerId};
use crate::state::{DeviceState, DpsUpdate, StateCache, StateChange};
use crate::transport::{DpsCommand, Transport, TransportEvent};
use crate::types::{DpsBag, FanDirection};

use super::{AccessoryOptions, Controls};

/// Completion of a spawned transport operation.
#[derive(Debug)]
pub(crate) enum OpOutcome {
    /// A find + connect attempt finished.
    Connect(Result<(), TransportError>),
    /// A refresh request finished.
    Refresh(Result<(), TransportError>),
}

/// Host controls to push after a batch of changes.
#[derive(Debug, Clone, Default)]
struct Pending {
    controls: BTreeSet<ControlId>,
    families: BTreeSet<PresetFamily>,
}

impl Pending {
    fn control(&mut self, id: ControlId) {
        self.controls.insert(id);
    }

    fn family(&mut self, family: PresetFamily) {
        self.families.insert(family);
    }

    /// Records what a change affects on the host side.
    fn change(&mut self, change: &StateChange) {
        match change {
            StateChange::FanActive(_) => {
                self.control(ControlId::FanActive);
                self.control(ControlId::RotationSpeed);
                self.family(PresetFamily::Speed);
            }
            StateChange::FanSpeed(_) => {
                self.control(ControlId::RotationSpeed);
                self.family(PresetFamily::Speed);
            }
            StateChange::FanDirection(_) => self.control(ControlId::RotationDirection),
            StateChange::LightOn(_) => {
                self.control(ControlId::LightOn);
                self.family(PresetFamily::Temp);
            }
            StateChange::TempIndex(_) => self.family(PresetFamily::Temp),
            StateChange::TimerMinutes(_) => self.family(PresetFamily::Timer),
        }
    }
}

/// Drives one fan: cache, connection lifecycle and host bindings.
pub(crate) struct FanController<T: Transport, H: HostControl> {
    id: AccessoryId,
    name: String,
    transport: Arc<T>,
    host: H,
    controls: Controls,
    cache: StateCache,
    connection: ConnectionManager,
    events: EventBus,
    state_tx: watch::Sender<DeviceState>,
    connection_tx: watch::Sender<ConnectionState>,
    ops: JoinSet<OpOutcome>,
}

impl<T: Transport, H: HostControl> FanController<T, H> {
    pub(crate) fn new(
        id: AccessoryId,
        device: &ResolvedDevice,
        transport: Arc<T>,
        host: H,
        events: EventBus,
        options: &AccessoryOptions,
        timer_tx: mpsc::UnboundedSender<TimerId>,
    ) -> Self {
        let cache = StateCache::new(options.debounce_window, device.mapping.speed_range);
        let connection = ConnectionManager::new(
            device.name.clone(),
            Scheduler::new(timer_tx),
            options.reconnection.clone(),
            options.connect_grace,
            options.polling_interval,
        );
        let (state_tx, _) = watch::channel(cache.state().clone());
        let (connection_tx, _) = watch::channel(connection.state());

        Self {
            id,
            name: device.name.clone(),
            transport,
            host,
            controls: Controls::new(&device.name, &device.mapping, &device.features),
            cache,
            connection,
            events,
            state_tx,
            connection_tx,
            ops: JoinSet::new(),
        }
    }

    pub(crate) fn controls(&self) -> &Controls {
        &self.controls
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<DeviceState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection_tx.subscribe()
    }

    pub(crate) fn ops(&mut self) -> &mut JoinSet<OpOutcome> {
        &mut self.ops
    }

    /// Registers exposed controls and removes the ones no longer exposed.
    pub(crate) fn setup_controls(&self) {
        for id in self.controls.stale() {
            self.host.remove_control(id);
        }
        for descriptor in self.controls.descriptors() {
            self.host.register_control(&descriptor);
        }
        tracing::debug!(device = %self.name, "Controls registered");
    }

    /// Starts the first connection attempt.
    pub(crate) fn start(&mut self) {
        if self.connection.request_connect() {
            self.sync_connection();
            self.perform(ConnectionAction::Connect);
        }
    }

    pub(crate) fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.connection.on_connected(),
            TransportEvent::Disconnected => self.connection.on_disconnected(),
            TransportEvent::Error(message) => self.connection.on_error(&message),
            TransportEvent::Data(bag) => {
                self.apply_dps(&bag);
                return;
            }
        }
        self.sync_connection();
    }

    pub(crate) fn handle_timer(&mut self, id: TimerId) {
        if let Some(action) = self.connection.on_timer(id) {
            self.sync_connection();
            self.perform(action);
        }
    }

    pub(crate) fn handle_op(&mut self, outcome: OpOutcome) {
        match outcome {
            OpOutcome::Connect(Ok(())) => {}
            OpOutcome::Connect(Err(e)) => {
                self.connection.on_connect_failed(&e);
                self.sync_connection();
            }
            OpOutcome::Refresh(Ok(())) => {}
            OpOutcome::Refresh(Err(e)) => {
                tracing::debug!(device = %self.name, error = %e, "Refresh failed");
            }
        }
    }

    fn perform(&mut self, action: ConnectionAction) {
        let transport = Arc::clone(&self.transport);
        match action {
            ConnectionAction::Connect => {
                self.ops.spawn(async move {
                    let result = async {
                        transport.find().await?;
                        transport.connect().await
                    }
                    .await;
                    OpOutcome::Connect(result)
                });
            }
            ConnectionAction::Refresh => {
                tracing::trace!(device = %self.name, "Refreshing");
                self.ops
                    .spawn(async move { OpOutcome::Refresh(transport.refresh().await) });
            }
        }
    }

    /// Publishes a connection event if the link state moved.
    fn sync_connection(&self) {
        let state = self.connection.state();
        let moved = self.connection_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        if moved {
            self.events
                .publish(DeviceEvent::connection_changed(self.id, state));
        }
    }

    /// Applies an inbound data-point bag.
    pub(crate) fn apply_dps(&mut self, bag: &DpsBag) {
        tracing::debug!(device = %self.name, dps = ?bag, "Received data points");

        let update = DpsUpdate::decode(bag, self.controls.mapping());
        if update.is_empty() {
            return;
        }
        if let Some(temp) = update.light_temp.filter(|t| t.index.is_none()) {
            tracing::debug!(device = %self.name, value = temp.raw, "Unlisted colour temperature");
        }

        let outcome = self.cache.apply(&update, Instant::now());
        for change in &outcome.changed {
            self.publish_change(change);
        }
        if !outcome.changed.is_empty() {
            self.state_tx.send_replace(self.cache.state().clone());
        }

        if outcome.authoritative {
            // Every field present in the bag is pushed, changed or not.
            let mut pending = Pending::default();
            for change in update.to_state_changes() {
                pending.change(&change);
            }
            if update.light_temp.is_some() {
                pending.family(PresetFamily::Temp);
            }
            self.flush(&pending);
        }

        tracing::debug!(device = %self.name, state = %self.cache.state(), "State updated");
    }

    /// Handles a host write.
    pub(crate) fn handle_set(&mut self, id: ControlId, value: ControlValue) {
        if !self.controls.is_exposed(id) {
            tracing::warn!(device = %self.name, control = %id, "Write to unexposed control ignored");
            return;
        }

        match (id, value) {
            (ControlId::FanActive, value) => self.set_fan_active(value.as_bool()),
            (ControlId::RotationDirection, ControlValue::Direction(direction)) => {
                self.set_direction(direction);
            }
            (ControlId::RotationDirection, value) => self.set_direction(if value.as_bool() {
                FanDirection::CounterClockwise
            } else {
                FanDirection::Clockwise
            }),
            (ControlId::RotationSpeed, ControlValue::Percent(percent)) => {
                self.set_rotation_speed(percent);
            }
            (ControlId::LightOn, value) => self.set_light(value.as_bool()),
            (ControlId::Preset(preset), value) => self.toggle_preset(preset, value.as_bool()),
            (id, value) => {
                tracing::warn!(device = %self.name, control = %id, value = ?value, "Unsupported value");
            }
        }
    }

    fn set_fan_active(&mut self, on: bool) {
        tracing::debug!(device = %self.name, on, "Set fan power");
        let mut pending = Pending::default();
        self.apply_local(StateChange::FanActive(on), &mut pending);
        self.send(DpsCommand::new(self.controls.mapping().fan_power, on));
        self.flush_except(&pending, ControlId::FanActive);
    }

    fn set_direction(&mut self, direction: FanDirection) {
        tracing::debug!(device = %self.name, direction = %direction, "Set fan direction");
        let Some(dps) = self.controls.mapping().fan_direction else {
            return;
        };
        let mut pending = Pending::default();
        self.apply_local(StateChange::FanDirection(direction), &mut pending);
        self.send(DpsCommand::new(dps, direction.as_dps_str()));
    }

    fn set_light(&mut self, on: bool) {
        tracing::debug!(device = %self.name, on, "Set light power");
        let mut pending = Pending::default();
        self.apply_local(StateChange::LightOn(on), &mut pending);
        self.send(DpsCommand::new(self.controls.mapping().light_power, on));
        self.flush_except(&pending, ControlId::LightOn);
    }

    fn set_rotation_speed(&mut self, percent: u8) {
        if percent == 0 {
            self.set_fan_active(false);
            return;
        }
        let step = percent_to_step(percent, self.controls.mapping().speed_range);
        tracing::debug!(device = %self.name, percent, step, "Set rotation speed");
        let effect = self
            .controls
            .presets()
            .toggle(PresetId::Speed(step), true, self.cache.state());
        if let Some(effect) = effect {
            let pending = self.apply_effect(effect);
            self.flush(&pending);
        }
    }

    fn toggle_preset(&mut self, preset: PresetId, on: bool) {
        let Some(effect) = self.controls.presets().toggle(preset, on, self.cache.state()) else {
            return;
        };
        if let PresetId::Timer(minutes) = preset {
            if on {
                tracing::info!(device = %self.name, minutes, "Timer set");
            } else if !effect.changes.is_empty() {
                tracing::info!(device = %self.name, "Timer cancelled");
            }
        } else {
            tracing::debug!(device = %self.name, preset = %preset, on, "Preset toggled");
        }

        let mut pending = self.apply_effect(effect);
        // The toggled family is resynchronized even when nothing changed,
        // so a refused "off" flips the host toggle back.
        pending.family(preset.family());
        self.flush(&pending);
    }

    fn apply_effect(&mut self, effect: PresetEffect) -> Pending {
        let mut pending = Pending::default();
        for change in effect.changes {
            self.apply_local(change, &mut pending);
        }
        for command in effect.commands {
            self.send(command);
        }
        pending
    }

    fn apply_local(&mut self, change: StateChange, pending: &mut Pending) {
        if self.cache.apply_local(&change) {
            self.publish_change(&change);
            self.state_tx.send_replace(self.cache.state().clone());
        }
        pending.change(&change);
    }

    fn publish_change(&self, change: &StateChange) {
        self.events.publish(DeviceEvent::state_changed(
            self.id,
            change.clone(),
            self.cache.state().clone(),
        ));
    }

    fn send(&self, command: DpsCommand) {
        if !self.connection.is_connected() {
            tracing::warn!(
                device = %self.name,
                dps = %command.dps,
                "Not connected, command dropped"
            );
            return;
        }
        tracing::debug!(device = %self.name, dps = %command.dps, value = ?command.value, "Sending");
        if let Err(e) = self.transport.send(command) {
            tracing::warn!(device = %self.name, error = %e, "Send failed");
        }
    }

    fn flush(&self, pending: &Pending) {
        let state = self.cache.state();
        for &id in &pending.controls {
            self.notify(id, state);
        }
        for &family in &pending.families {
            for (preset, on) in self.controls.presets().states(family, state) {
                self.host
                    .notify_value_changed(ControlId::Preset(preset), ControlValue::Bool(on));
            }
        }
    }

    /// Flushes everything but the control the host itself just wrote.
    fn flush_except(&self, pending: &Pending, written: ControlId) {
        let mut pending = pending.clone();
        pending.controls.remove(&written);
        self.flush(&pending);
    }

    fn notify(&self, id: ControlId, state: &DeviceState) {
        if let Some(value) = self.controls.read(id, state) {
            self.host.notify_value_changed(id, value);
        }
    }

    /// Cancels timers and pending operations, then closes the link.
    pub(crate) async fn shutdown(&mut self) {
        self.connection.shutdown();
        self.ops.abort_all();
        self.sync_connection();
        if let Err(e) = self.transport.disconnect().await {
            tracing::debug!(device = %self.name, error = %e, "Disconnect failed");
        }
        tracing::info!(device = %self.name, "Accessory stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_collects_controls_and_families() {
        let mut pending = Pending::default();
        pending.change(&StateChange::FanActive(true));
        pending.change(&StateChange::TimerMinutes(60));

        assert!(pending.controls.contains(&ControlId::FanActive));
        assert!(pending.controls.contains(&ControlId::RotationSpeed));
        assert!(pending.families.contains(&PresetFamily::Speed));
        assert!(pending.families.contains(&PresetFamily::Timer));
        assert!(!pending.families.contains(&PresetFamily::Temp));
    }

    #[test]
    fn temperature_only_touches_its_family() {
        let mut pending = Pending::default();
        pending.change(&StateChange::TempIndex(1));

        assert!(pending.controls.is_empty());
        assert_eq!(pending.families.len(), 1);
    }
}
