// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for accessory lifecycle, connection and state changes.
//!
//! Accessories publish on a shared [`EventBus`] independently of the host
//! notifications, so observers see every cache change even when host
//! updates are debounced.
//!
//! # Examples
//!
//! ```
//! use ceilfan_bridge::event::{AccessoryId, DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let accessory_id = AccessoryId::for_device("bf0123456789");
//! bus.publish(DeviceEvent::AccessoryRemoved { accessory_id });
//! assert_eq!(rx.try_recv().unwrap().accessory_id(), accessory_id);
//! ```

mod accessory_id;
mod device_event;
mod event_bus;

pub use accessory_id::AccessoryId;
pub use device_event::DeviceEvent;
pub use event_bus::EventBus;
