// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus shared by the platform and its accessories.

use tokio::sync::broadcast;

use super::{AccessoryId, DeviceEvent};

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts [`DeviceEvent`]s to any number of subscribers.
///
/// Cloning the bus shares the channel. A subscriber that falls more than
/// the channel capacity behind loses the oldest events
/// (`RecvError::Lagged`); publishers never block.
///
/// # Examples
///
/// ```
/// use ceilfan_bridge::event::{AccessoryId, DeviceEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DeviceEvent::AccessoryRemoved {
///     accessory_id: AccessoryId::for_device("abc"),
/// });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; dropped silently when nobody listens.
    pub fn publish(&self, event: DeviceEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(device: &str) -> DeviceEvent {
        DeviceEvent::AccessoryRemoved {
            accessory_id: AccessoryId::for_device(device),
        }
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx = bus.subscribe();
        let _rx2 = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = EventBus::with_capacity(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(removed("abc"));

        let id = AccessoryId::for_device("abc");
        assert_eq!(rx1.recv().await.unwrap().accessory_id(), id);
        assert_eq!(rx2.recv().await.unwrap().accessory_id(), id);
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        EventBus::new().publish(removed("abc"));
    }
}
