// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport and host used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use ceilfan_bridge::config::ResolvedDevice;
use ceilfan_bridge::error::TransportError;
use ceilfan_bridge::host::{ControlDescriptor, ControlId, ControlValue, HostControl};
use ceilfan_bridge::mapping::{DpsMapping, FeatureFlags, FeatureOverrides};
use ceilfan_bridge::transport::{DpsCommand, Transport, TransportEvent};
use ceilfan_bridge::types::{DpsBag, DpsValue, SpeedRange};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

// ============================================================================
// Transport
// ============================================================================

/// A transport call with the (paused) time it was made at.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find,
    Connect,
    Disconnect,
    Refresh,
    Send(DpsCommand),
}

#[derive(Debug)]
struct TransportInner {
    events_tx: mpsc::Sender<TransportEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
    calls: Mutex<Vec<(Instant, Call)>>,
    connect_results: Mutex<VecDeque<Result<(), TransportError>>>,
    fail_all_connects: Mutex<bool>,
}

/// Transport whose connect outcomes are scripted by the test.
///
/// A successful `connect` emits [`TransportEvent::Connected`], the way a
/// real link reports itself open.
#[derive(Debug, Clone)]
pub struct FakeTransport {
    inner: Arc<TransportInner>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        Self {
            inner: Arc::new(TransportInner {
                events_tx,
                events_rx: Mutex::new(Some(events_rx)),
                calls: Mutex::new(Vec::new()),
                connect_results: Mutex::new(VecDeque::new()),
                fail_all_connects: Mutex::new(false),
            }),
        }
    }

    /// Queues outcomes for the next connect attempts; later attempts succeed.
    pub fn script_connects(&self, results: impl IntoIterator<Item = Result<(), TransportError>>) {
        self.inner.connect_results.lock().extend(results);
    }

    /// Makes every connect attempt fail.
    pub fn fail_all_connects(&self) {
        *self.inner.fail_all_connects.lock() = true;
    }

    pub async fn emit(&self, event: TransportEvent) {
        self.inner.events_tx.send(event).await.unwrap();
    }

    /// Emits a data event parsed from a JSON object.
    pub async fn emit_data(&self, json: &str) {
        let bag: DpsBag = serde_json::from_str(json).unwrap();
        self.emit(TransportEvent::Data(bag)).await;
    }

    pub fn calls(&self) -> Vec<(Instant, Call)> {
        self.inner.calls.lock().clone()
    }

    /// Times of the calls matching `pred`.
    pub fn times_of(&self, pred: impl Fn(&Call) -> bool) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter(|(_, call)| pred(call))
            .map(|(at, _)| at)
            .collect()
    }

    pub fn connect_times(&self) -> Vec<Instant> {
        self.times_of(|c| matches!(c, Call::Connect))
    }

    pub fn refresh_times(&self) -> Vec<Instant> {
        self.times_of(|c| matches!(c, Call::Refresh))
    }

    /// Commands written so far, in order.
    pub fn sent(&self) -> Vec<(u16, DpsValue)> {
        self.calls()
            .into_iter()
            .filter_map(|(_, call)| match call {
                Call::Send(cmd) => Some((cmd.dps.value(), cmd.value)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().clear();
    }

    fn record(&self, call: Call) {
        self.inner.calls.lock().push((Instant::now(), call));
    }
}

impl Transport for FakeTransport {
    async fn find(&self) -> Result<(), TransportError> {
        self.record(Call::Find);
        Ok(())
    }

    async fn connect(&self) -> Result<(), TransportError> {
        self.record(Call::Connect);
        let result = if *self.inner.fail_all_connects.lock() {
            Err(TransportError::ConnectionFailed("unreachable".to_string()))
        } else {
            self.inner.connect_results.lock().pop_front().unwrap_or(Ok(()))
        };
        if result.is_ok() {
            let _ = self.inner.events_tx.send(TransportEvent::Connected).await;
        }
        result
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.record(Call::Disconnect);
        Ok(())
    }

    async fn refresh(&self) -> Result<(), TransportError> {
        self.record(Call::Refresh);
        Ok(())
    }

    fn send(&self, command: DpsCommand) -> Result<(), TransportError> {
        self.record(Call::Send(command));
        Ok(())
    }

    fn take_event_receiver(&self) -> Option<mpsc::Receiver<TransportEvent>> {
        self.inner.events_rx.lock().take()
    }
}

pub fn connect_failure() -> Result<(), TransportError> {
    Err(TransportError::ConnectionFailed("timeout".to_string()))
}

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Default)]
struct HostLog {
    registered: Vec<ControlDescriptor>,
    removed: Vec<ControlId>,
    notifications: Vec<(ControlId, ControlValue)>,
}

/// Host that records every call.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    log: Arc<Mutex<HostLog>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> Vec<ControlId> {
        self.log.lock().registered.iter().map(|d| d.id).collect()
    }

    pub fn removed(&self) -> Vec<ControlId> {
        self.log.lock().removed.clone()
    }

    pub fn notifications(&self) -> Vec<(ControlId, ControlValue)> {
        self.log.lock().notifications.clone()
    }

    /// Values pushed for one control, in order.
    pub fn values_of(&self, id: ControlId) -> Vec<ControlValue> {
        self.notifications()
            .into_iter()
            .filter(|(c, _)| *c == id)
            .map(|(_, v)| v)
            .collect()
    }

    /// Last value pushed for one control.
    pub fn last_value(&self, id: ControlId) -> Option<ControlValue> {
        self.values_of(id).pop()
    }

    pub fn clear(&self) {
        self.log.lock().notifications.clear();
    }
}

impl HostControl for FakeHost {
    fn register_control(&self, descriptor: &ControlDescriptor) {
        self.log.lock().registered.push(descriptor.clone());
    }

    fn remove_control(&self, id: ControlId) {
        self.log.lock().removed.push(id);
    }

    fn notify_value_changed(&self, id: ControlId, value: ControlValue) {
        self.log.lock().notifications.push((id, value));
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// A resolved device with the default mapping.
pub fn device(name: &str, id: &str) -> ResolvedDevice {
    device_with_features(name, id, None)
}

pub fn device_with_features(
    name: &str,
    id: &str,
    overrides: Option<FeatureOverrides>,
) -> ResolvedDevice {
    let mapping = DpsMapping::default();
    let features = FeatureFlags::resolve(&mapping, overrides.as_ref());
    ResolvedDevice {
        name: name.to_string(),
        id: id.to_string(),
        key: "0123456789abcdef".to_string(),
        model: "CREATE Ceiling Fan".to_string(),
        mapping,
        features,
    }
}

/// A resolved device whose fan steps through `min..=max`.
pub fn device_with_speed_range(name: &str, id: &str, min: u8, max: u8) -> ResolvedDevice {
    let mut device = device(name, id);
    device.mapping.speed_range = SpeedRange::new(min, max).unwrap();
    device
}

/// Lets every ready task run before the paused clock moves on.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
