// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ceilfan_bridge` - bridges Wi-Fi ceiling fans with a light to a home
//! automation host.
//!
//! The fan speaks a data-point (DPS) protocol: every signal (fan power,
//! speed step, direction, light, colour temperature, timer) lives under a
//! numeric data-point id. This crate keeps an authoritative cache of those
//! signals, maps them onto host controls and keeps the device link alive.
//!
//! # Features
//!
//! - **Configurable mapping**: data-point ids, speed range, colour
//!   temperature values and timer presets per device
//! - **Reconnects**: exponential backoff, post-connect grace period and
//!   periodic refreshes
//! - **Debounced updates**: bursts of device reports reach the host once
//! - **Presets**: mutually exclusive speed, colour temperature and timer
//!   toggles kept in sync with the device
//! - **Secrets**: credentials inline, from environment variables or from a
//!   storage file
//!
//! # Architecture
//!
//! The network protocol and the host API stay outside the crate, behind the
//! [`Transport`] and [`HostControl`] traits. Each configured fan runs as an
//! accessory task (see [`accessory`]); the [`Platform`] starts accessories
//! for a [`PlatformConfig`] and broadcasts their events on an
//! [`EventBus`](event::EventBus).
//!
//! # Quick Start
//!
//! ```no_run
//! use ceilfan_bridge::{Platform, PlatformConfig};
//!
//! # struct MyTransport;
//! # impl MyTransport { fn new(_: &ceilfan_bridge::config::ResolvedDevice) -> Self { Self } }
//! # struct MyHost;
//! # impl ceilfan_bridge::HostControl for MyHost {
//! #     fn register_control(&self, _: &ceilfan_bridge::host::ControlDescriptor) {}
//! #     fn remove_control(&self, _: ceilfan_bridge::host::ControlId) {}
//! #     fn notify_value_changed(&self, _: ceilfan_bridge::host::ControlId, _: ceilfan_bridge::host::ControlValue) {}
//! # }
//! # impl ceilfan_bridge::Transport for MyTransport {
//! #     async fn find(&self) -> Result<(), ceilfan_bridge::error::TransportError> { Ok(()) }
//! #     async fn connect(&self) -> Result<(), ceilfan_bridge::error::TransportError> { Ok(()) }
//! #     async fn disconnect(&self) -> Result<(), ceilfan_bridge::error::TransportError> { Ok(()) }
//! #     async fn refresh(&self) -> Result<(), ceilfan_bridge::error::TransportError> { Ok(()) }
//! #     fn send(&self, _: ceilfan_bridge::transport::DpsCommand) -> Result<(), ceilfan_bridge::error::TransportError> { Ok(()) }
//! #     fn take_event_receiver(&self) -> Option<tokio::sync::mpsc::Receiver<ceilfan_bridge::transport::TransportEvent>> { None }
//! # }
//! #[tokio::main]
//! async fn main() -> ceilfan_bridge::Result<()> {
//!     let config = PlatformConfig::load("config.json")?;
//!     let platform = Platform::new(config, "/var/lib/ceilfan");
//!
//!     let report = platform
//!         .discover_devices(|device| MyTransport::new(device), |_, _| MyHost)
//!         .await;
//!     println!("{} fans started", report.added.len() + report.restored.len());
//!
//!     platform.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod accessory;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod host;
pub mod mapping;
pub mod platform;
pub mod preset;
pub mod scheduler;
pub mod state;
pub mod transport;
pub mod types;

pub use accessory::{AccessoryHandle, AccessoryOptions};
pub use config::{DeviceConfig, PlatformConfig, ResolvedDevice};
pub use error::{ConfigError, Error, Result, SecretError, TransportError, ValueError};
pub use host::{ControlId, ControlValue, HostControl};
pub use mapping::{DpsMapping, FeatureFlags};
pub use platform::{DiscoveryReport, Platform};
pub use preset::PresetId;
pub use state::DeviceState;
pub use transport::{DpsCommand, Transport, TransportEvent};
pub use types::{DpsBag, DpsId, DpsValue, FanDirection, SpeedRange};
