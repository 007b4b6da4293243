// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable delayed tasks.
//!
//! Every timer an accessory runs (reconnect backoff, post-connect grace,
//! polling) is a [`ScheduledTask`]. When it fires it sends its [`TimerId`]
//! to the owner's channel; the owner matches the id against the tasks it
//! still holds, so a firing that raced with a cancellation is ignored.
//! Dropping a task aborts it.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Identifier delivered when a scheduled task fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Creates scheduled tasks that report to one channel.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio::sync::mpsc;
/// use ceilfan_bridge::scheduler::Scheduler;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let mut scheduler = Scheduler::new(tx);
///
/// let task = scheduler.once(Duration::from_millis(10));
/// assert_eq!(rx.recv().await, Some(task.id()));
/// # }
/// ```
#[derive(Debug)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<TimerId>,
    next_id: u64,
}

impl Scheduler {
    /// Creates a scheduler delivering firings to `tx`.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<TimerId>) -> Self {
        Self { tx, next_id: 0 }
    }

    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    /// Fires once after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn once(&mut self, delay: Duration) -> ScheduledTask {
        let id = self.allocate();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(id);
        });
        ScheduledTask { id, handle }
    }

    /// Fires every `period`, first after one full period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn repeating(&mut self, period: Duration) -> ScheduledTask {
        let id = self.allocate();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(id).is_err() {
                    break;
                }
            }
        });
        ScheduledTask { id, handle }
    }
}

/// A pending timer. Aborted when cancelled or dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    id: TimerId,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Identifier this task delivers when it fires.
    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Returns `true` if `id` belongs to this task.
    #[must_use]
    pub fn is(&self, id: TimerId) -> bool {
        self.id == id
    }

    /// Cancels the task. A firing already queued is left for the owner to
    /// discard as stale.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn once_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);
        let start = Instant::now();

        let task = scheduler.once(Duration::from_secs(5));
        let fired = rx.recv().await.unwrap();

        assert_eq!(fired, task.id());
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_fires_each_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);
        let start = Instant::now();

        let task = scheduler.repeating(Duration::from_secs(15));
        for n in 1..=3 {
            assert_eq!(rx.recv().await, Some(task.id()));
            assert_eq!(start.elapsed(), Duration::from_secs(15 * n));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);

        let cancelled = scheduler.once(Duration::from_secs(1));
        cancelled.cancel();
        let kept = scheduler.once(Duration::from_secs(2));

        assert_eq!(rx.recv().await, Some(kept.id()));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_task_aborts_it() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);

        drop(scheduler.repeating(Duration::from_millis(100)));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn ids_are_unique() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tx);
        assert_ne!(scheduler.allocate(), scheduler.allocate());
    }
}
