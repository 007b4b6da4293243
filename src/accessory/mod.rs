// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One fan accessory: transport, cache, presets and host bindings.
//!
//! [`spawn`] starts an accessory task that owns every piece of mutable
//! state. The returned [`AccessoryHandle`] answers host reads from a
//! `watch` snapshot without a round trip and forwards host writes to the
//! task.
//!
//! # Examples
//!
//! ```ignore
//! use ceilfan_bridge::accessory::{self, AccessoryOptions};
//! use ceilfan_bridge::event::EventBus;
//! use ceilfan_bridge::host::{ControlId, ControlValue};
//!
//! let options = AccessoryOptions::default();
//! let handle = accessory::spawn(&device, transport, host, EventBus::new(), &options)?;
//!
//! handle.set(ControlId::LightOn, ControlValue::Bool(true))?;
//! assert_eq!(handle.get(ControlId::FanActive), Some(ControlValue::Bool(false)));
//!
//! handle.shutdown().await;
//! ```

mod controller;
mod controls;
mod options;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::ResolvedDevice;
use crate::connection::ConnectionState;
use crate::error::{Error, Result, TransportError};
use crate::event::{AccessoryId, EventBus};
use crate::host::{ControlId, ControlValue, HostControl};
use crate::scheduler::TimerId;
use crate::state::DeviceState;
use crate::transport::{Transport, TransportEvent};

use controller::FanController;

pub use controls::Controls;
pub use options::AccessoryOptions;

/// Messages from handles to the accessory task.
#[derive(Debug)]
enum Command {
    Set {
        id: ControlId,
        value: ControlValue,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running accessory.
#[derive(Debug)]
pub struct AccessoryHandle {
    id: AccessoryId,
    name: String,
    controls: Controls,
    state_rx: watch::Receiver<DeviceState>,
    connection_rx: watch::Receiver<ConnectionState>,
    command_tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl AccessoryHandle {
    /// Accessory identifier.
    #[must_use]
    pub fn id(&self) -> AccessoryId {
        self.id
    }

    /// Configured device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exposed controls.
    #[must_use]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Reads a control from the cached state.
    ///
    /// Never touches the network. Returns `None` if the control is not
    /// exposed.
    #[must_use]
    pub fn get(&self, id: ControlId) -> Option<ControlValue> {
        self.controls.read(id, &self.state_rx.borrow())
    }

    /// Forwards a host write to the accessory task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessoryStopped`] if the accessory task has ended.
    pub fn set(&self, id: ControlId, value: ControlValue) -> Result<()> {
        self.command_tx
            .send(Command::Set { id, value })
            .map_err(|_| Error::AccessoryStopped)
    }

    /// Current cached state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state_rx.borrow().clone()
    }

    /// Watches the cached state.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<DeviceState> {
        self.state_rx.clone()
    }

    /// Current link state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.connection_rx.borrow()
    }

    /// Returns `true` while the accessory task runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the accessory.
    ///
    /// Cancels every timer, closes the transport and waits for the task to
    /// end. No transport call is made afterwards.
    pub async fn shutdown(self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.command_tx.send(Command::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
        if let Err(e) = self.task.await {
            tracing::warn!(device = %self.name, error = %e, "Accessory task failed");
        }
    }
}

/// Starts an accessory for `device`.
///
/// Registers the exposed controls with `host`, removes the ones a previous
/// configuration may have left, then starts connecting. Must be called
/// from within a Tokio runtime.
///
/// # Errors
///
/// Returns `TransportError::ChannelClosed` if `transport`'s event receiver
/// was already taken.
pub fn spawn<T, H>(
    device: &ResolvedDevice,
    transport: T,
    host: H,
    events: EventBus,
    options: &AccessoryOptions,
) -> Result<AccessoryHandle>
where
    T: Transport,
    H: HostControl,
{
    let id = AccessoryId::for_device(&device.id);
    let transport = Arc::new(transport);
    let transport_rx = transport.take_event_receiver().ok_or_else(|| {
        TransportError::ChannelClosed(format!("{}: event receiver already taken", device.name))
    })?;

    let (timer_tx, timer_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let controller = FanController::new(id, device, transport, host, events, options, timer_tx);
    controller.setup_controls();

    let controls = controller.controls().clone();
    let state_rx = controller.subscribe_state();
    let connection_rx = controller.subscribe_connection();

    let task = tokio::spawn(run(controller, Some(transport_rx), timer_rx, command_rx));

    Ok(AccessoryHandle {
        id,
        name: device.name.clone(),
        controls,
        state_rx,
        connection_rx,
        command_tx,
        task,
    })
}

async fn run<T: Transport, H: HostControl>(
    mut controller: FanController<T, H>,
    mut transport_rx: Option<mpsc::Receiver<TransportEvent>>,
    mut timer_rx: mpsc::UnboundedReceiver<TimerId>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
) {
    controller.start();

    let ack = loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                Some(Command::Set { id, value }) => controller.handle_set(id, value),
                Some(Command::Shutdown(ack)) => break Some(ack),
                // Every handle is gone.
                None => break None,
            },
            event = next_transport_event(&mut transport_rx) => {
                controller.handle_transport_event(event);
            }
            Some(id) = timer_rx.recv() => controller.handle_timer(id),
            Some(joined) = controller.ops().join_next() => match joined {
                Ok(outcome) => controller.handle_op(outcome),
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::error!(error = %e, "Transport operation panicked"),
            },
        }
    };

    controller.shutdown().await;
    if let Some(ack) = ack {
        let _ = ack.send(());
    }
}

/// Next transport event; pends forever once the stream has closed.
async fn next_transport_event(
    rx: &mut Option<mpsc::Receiver<TransportEvent>>,
) -> TransportEvent {
    if let Some(receiver) = rx {
        if let Some(event) = receiver.recv().await {
            return event;
        }
        tracing::warn!("Transport event stream closed");
        *rx = None;
    }
    std::future::pending().await
}
