// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-device platform.
//!
//! The [`Platform`] turns a [`PlatformConfig`] into running accessories. It
//! remembers the accessories the host has cached from a previous run so it
//! can restore them under the same identifier and report the ones that are
//! no longer configured.
//!
//! # Examples
//!
//! ```ignore
//! use ceilfan_bridge::platform::Platform;
//!
//! let platform = Platform::new(config, "/var/lib/bridge");
//! platform.configure_cached_accessory(cached_id, "Bedroom Fan");
//!
//! let report = platform
//!     .discover_devices(|device| MyTransport::new(device), |device, id| MyHost::new(device, id))
//!     .await;
//! for id in &report.stale {
//!     host.unregister(*id);
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};

use crate::accessory::{self, AccessoryHandle, AccessoryOptions};
use crate::config::{PlatformConfig, ResolvedDevice, resolve_secret};
use crate::event::{AccessoryId, DeviceEvent, EventBus};
use crate::host::{ControlId, ControlValue, HostControl};
use crate::state::DeviceState;
use crate::transport::Transport;

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Accessories created for the first time.
    pub added: Vec<AccessoryId>,
    /// Accessories the host already knew.
    pub restored: Vec<AccessoryId>,
    /// Names of configured devices that could not be started.
    pub skipped: Vec<String>,
    /// Cached accessories that are no longer configured.
    pub stale: Vec<AccessoryId>,
}

/// Owns every accessory of one bridge.
#[derive(Debug)]
pub struct Platform {
    config: PlatformConfig,
    storage_dir: PathBuf,
    options: AccessoryOptions,
    event_bus: EventBus,
    /// Accessories the host restored from its cache, with display names.
    cached: RwLock<HashMap<AccessoryId, String>>,
    /// Running accessories.
    accessories: tokio::sync::RwLock<HashMap<AccessoryId, AccessoryHandle>>,
}

impl Platform {
    /// Creates a platform; `storage_dir` holds the secrets file in storage
    /// mode.
    #[must_use]
    pub fn new(config: PlatformConfig, storage_dir: impl Into<PathBuf>) -> Self {
        let options = AccessoryOptions::from_config(&config);
        Self {
            config,
            storage_dir: storage_dir.into(),
            options,
            event_bus: EventBus::new(),
            cached: RwLock::new(HashMap::new()),
            accessories: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Overrides the accessory timing options.
    #[must_use]
    pub fn with_options(mut self, options: AccessoryOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses an existing event bus.
    #[must_use]
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Platform configuration.
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to events of every accessory.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Shared event bus.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Records an accessory the host restored from its cache.
    pub fn configure_cached_accessory(&self, id: AccessoryId, name: impl Into<String>) {
        let name = name.into();
        tracing::info!(accessory = %id, name = %name, "Loading accessory from cache");
        self.cached.write().insert(id, name);
    }

    /// Ids of the accessories the host is expected to keep.
    #[must_use]
    pub fn cached_accessory_ids(&self) -> Vec<AccessoryId> {
        self.cached.read().keys().copied().collect()
    }

    /// Starts an accessory for every configured device.
    ///
    /// Devices whose credentials or mapping cannot be resolved are logged
    /// and skipped. An accessory already running under the same id is shut
    /// down before its replacement starts. Cached accessories that no
    /// longer match a configured device are forgotten and reported as
    /// stale.
    pub async fn discover_devices<T, H, FT, FH>(
        &self,
        mut transport_for: FT,
        mut host_for: FH,
    ) -> DiscoveryReport
    where
        T: Transport,
        H: HostControl,
        FT: FnMut(&ResolvedDevice) -> T,
        FH: FnMut(&ResolvedDevice, AccessoryId) -> H,
    {
        let mut report = DiscoveryReport::default();
        if self.config.devices.is_empty() {
            tracing::warn!("No fans specified in the configuration");
            return report;
        }

        let mut discovered = HashSet::new();
        for device_config in &self.config.devices {
            let secret =
                match resolve_secret(device_config, &self.config.secrets, &self.storage_dir) {
                    Ok(secret) => secret,
                    Err(e) => {
                        tracing::error!(
                            device = %device_config.name,
                            error = %e,
                            "Skipping device, secret resolution failed"
                        );
                        report.skipped.push(device_config.name.clone());
                        continue;
                    }
                };

            let device = match ResolvedDevice::resolve(device_config, secret) {
                Ok(device) => device,
                Err(e) => {
                    tracing::error!(device = %device_config.name, error = %e, "Skipping device");
                    report.skipped.push(device_config.name.clone());
                    continue;
                }
            };

            let id = AccessoryId::for_device(&device.id);
            if !discovered.insert(id) {
                tracing::warn!(device = %device.name, accessory = %id, "Duplicate device id, skipping");
                report.skipped.push(device.name.clone());
                continue;
            }

            let previous = self.accessories.write().await.remove(&id);
            let restored = previous.is_some() || self.cached.read().contains_key(&id);
            if let Some(previous) = previous {
                previous.shutdown().await;
            }

            let transport = transport_for(&device);
            let host = host_for(&device, id);
            let handle =
                match accessory::spawn(&device, transport, host, self.event_bus.clone(), &self.options)
                {
                    Ok(handle) => handle,
                    Err(e) => {
                        tracing::error!(device = %device.name, error = %e, "Failed to start accessory");
                        report.skipped.push(device.name.clone());
                        continue;
                    }
                };

            let name = device.name.clone();
            if restored {
                tracing::info!(device = %name, accessory = %id, "Restoring existing accessory from cache");
                self.event_bus.publish(DeviceEvent::AccessoryRestored {
                    accessory_id: id,
                    name: name.clone(),
                });
                report.restored.push(id);
            } else {
                tracing::info!(device = %name, accessory = %id, "Adding new accessory");
                self.event_bus.publish(DeviceEvent::AccessoryAdded {
                    accessory_id: id,
                    name: name.clone(),
                });
                report.added.push(id);
            }

            self.cached.write().insert(id, name);
            self.accessories.write().await.insert(id, handle);
        }

        report.stale = self.remove_stale(&discovered).await;
        report
    }

    async fn remove_stale(&self, discovered: &HashSet<AccessoryId>) -> Vec<AccessoryId> {
        let stale: Vec<(AccessoryId, String)> = {
            let mut cached = self.cached.write();
            let ids: Vec<AccessoryId> = cached
                .keys()
                .filter(|id| !discovered.contains(id))
                .copied()
                .collect();
            ids.into_iter()
                .filter_map(|id| cached.remove(&id).map(|name| (id, name)))
                .collect()
        };

        for (id, name) in &stale {
            tracing::info!(accessory = %id, name = %name, "Removing stale accessory from cache");
            let handle = self.accessories.write().await.remove(id);
            if let Some(handle) = handle {
                handle.shutdown().await;
            }
            self.event_bus
                .publish(DeviceEvent::AccessoryRemoved { accessory_id: *id });
        }
        stale.into_iter().map(|(id, _)| id).collect()
    }

    // =========================================================================
    // Accessory Access
    // =========================================================================

    /// Ids of running accessories.
    pub async fn accessory_ids(&self) -> Vec<AccessoryId> {
        self.accessories.read().await.keys().copied().collect()
    }

    /// Number of running accessories.
    pub async fn accessory_count(&self) -> usize {
        self.accessories.read().await.len()
    }

    /// Reads a control of an accessory.
    pub async fn get(&self, id: AccessoryId, control: ControlId) -> Option<ControlValue> {
        self.accessories.read().await.get(&id)?.get(control)
    }

    /// Writes a control of an accessory.
    ///
    /// # Errors
    ///
    /// Returns `Error::AccessoryStopped` if the accessory is unknown or no
    /// longer running.
    pub async fn set(
        &self,
        id: AccessoryId,
        control: ControlId,
        value: ControlValue,
    ) -> crate::Result<()> {
        self.accessories
            .read()
            .await
            .get(&id)
            .ok_or(crate::Error::AccessoryStopped)?
            .set(control, value)
    }

    /// Cached state of an accessory.
    pub async fn state(&self, id: AccessoryId) -> Option<DeviceState> {
        self.accessories.read().await.get(&id).map(AccessoryHandle::state)
    }

    /// Watches the state of an accessory.
    pub async fn watch_state(&self, id: AccessoryId) -> Option<watch::Receiver<DeviceState>> {
        self.accessories
            .read()
            .await
            .get(&id)
            .map(AccessoryHandle::watch_state)
    }

    /// Stops every accessory.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.accessories.write().await.drain().map(|(_, h)| h).collect();
        for handle in handles {
            handle.shutdown().await;
        }
    }
}
