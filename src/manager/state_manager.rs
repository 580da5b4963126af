// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-device state manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::DeviceClient;
use crate::error::{Error, Result};
use crate::event::DeviceId;
use crate::queue::{CommandQueue, CommandTicket};
use crate::state::{DeviceState, StatusSnapshot, TrackedState};

use super::ManagerConfig;

/// Orchestrator for one physical device.
///
/// Owns the device's one shared [`TrackedState`] and one [`CommandQueue`],
/// runs the polling loop against the device client, and turns
/// caller-supplied desired states into minimal command batches.
///
/// Writes are optimistic: [`apply_state`](Self::apply_state) commits the
/// diff into the shared state before the device has confirmed anything, so
/// every adapter sees the change immediately; a failed transmission is
/// surfaced to the caller but not rolled back, and the next successful poll
/// corrects any drift.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use climsync::manager::{ManagerConfig, StateManager};
/// use climsync::types::{FanSpeed, PowerState};
/// # async fn example(client: Arc<dyn climsync::DeviceClient>) -> climsync::Result<()> {
/// let config = ManagerConfig::new("192.168.1.40");
/// let manager = Arc::new(StateManager::new(config, client));
/// manager.start_polling();
///
/// // An adapter proposes a change by mutating a clone of the state
/// let mut desired = manager.state().snapshot();
/// desired.set_power(PowerState::On);
/// desired.set_fan_speed(FanSpeed::High);
///
/// if let Some(ticket) = manager.apply_state(&desired)? {
///     ticket.wait().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct StateManager {
    id: DeviceId,
    config: ManagerConfig,
    client: Arc<dyn DeviceClient>,
    state: Arc<TrackedState>,
    queue: CommandQueue,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    fetch_in_flight: AtomicBool,
    status_valid: AtomicBool,
    stopped: AtomicBool,
}

impl StateManager {
    /// Creates a manager for the device described by `config`.
    ///
    /// The state starts at defaults until the first poll; call
    /// [`start_polling`](Self::start_polling) to begin refreshing it.
    #[must_use]
    pub fn new(config: ManagerConfig, client: Arc<dyn DeviceClient>) -> Self {
        let queue = CommandQueue::new(Arc::clone(&client), config.debounce_window());
        Self {
            id: config.device_id().clone(),
            config,
            client,
            state: Arc::new(TrackedState::new(DeviceState::default())),
            queue,
            poll_task: Mutex::new(None),
            fetch_in_flight: AtomicBool::new(false),
            status_valid: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Returns the device identity.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the manager configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Returns the live shared state instance (not a copy).
    #[must_use]
    pub fn state(&self) -> &Arc<TrackedState> {
        &self.state
    }

    /// Returns the command queue, for adapters that need direct low-level
    /// submission.
    #[must_use]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Returns `true` once [`stop_polling`](Self::stop_polling) has run.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Applies a desired state to the device.
    ///
    /// Diffs `desired` against the current shared state using canonical
    /// comparison. With no difference, nothing is submitted and `Ok(None)`
    /// is returned. Otherwise the diff is committed into the shared state
    /// synchronously (all listeners are notified before this returns) and
    /// submitted to the command queue; the returned ticket resolves when
    /// the device acknowledged or rejected the batch.
    ///
    /// A rejected transmission does **not** roll back the optimistic
    /// commit; the next successful poll is the correction mechanism.
    ///
    /// # Errors
    ///
    /// Returns `Error::ManagerStopped` after teardown, or
    /// `Error::QueueDisposed` if the queue refused the submission.
    pub fn apply_state(&self, desired: &DeviceState) -> Result<Option<CommandTicket>> {
        if self.is_stopped() {
            return Err(Error::ManagerStopped);
        }

        let delta = self.state.diff(desired);
        if delta.is_empty() {
            tracing::debug!(device_id = %self.id, "no changes to apply");
            return Ok(None);
        }

        tracing::info!(
            device_id = %self.id,
            changes = delta.len(),
            "changes detected"
        );
        self.state.apply_delta(&delta);
        let ticket = self.queue.enqueue(delta)?;
        Ok(Some(ticket))
    }

    /// Returns the current status without forcing a device round-trip.
    ///
    /// The record is derived from the shared state (last successful poll or
    /// last optimistic commit, whichever is newer). After
    /// [`clear`](Self::clear), one fresh fetch is performed first.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if a forced fresh fetch fails.
    pub async fn status(&self) -> Result<StatusSnapshot> {
        if self.is_stopped() {
            return Err(Error::ManagerStopped);
        }
        if !self.status_valid.load(Ordering::SeqCst) {
            self.refresh().await?;
        }
        Ok(self.state.to_status())
    }

    /// Invalidates the cached-status shortcut; the next
    /// [`status`](Self::status) call performs a fresh device fetch.
    pub fn clear(&self) {
        self.status_valid.store(false, Ordering::SeqCst);
    }

    /// Fetches the device status once and reconciles it into the shared
    /// state.
    ///
    /// Guarded: if a fetch is already in flight the call is skipped and
    /// returns `Ok(false)`. Reconciliation is last-writer-wins through the
    /// shared state; a snapshot that cannot be parsed changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` on a failed fetch, `Error::Parse` on an
    /// unusable snapshot, `Error::ManagerStopped` after teardown.
    pub async fn refresh(&self) -> Result<bool> {
        if self.is_stopped() {
            return Err(Error::ManagerStopped);
        }
        if self.fetch_in_flight.swap(true, Ordering::SeqCst) {
            tracing::trace!(device_id = %self.id, "status fetch already in flight, skipping");
            return Ok(false);
        }

        let result = self.client.fetch_status().await;
        self.fetch_in_flight.store(false, Ordering::SeqCst);

        // Teardown may have raced the fetch; its result is discarded
        if self.is_stopped() {
            return Err(Error::ManagerStopped);
        }

        let snapshot = result.map_err(Error::Transport)?;
        let changed = self.state.apply_status(&snapshot)?;
        self.status_valid.store(true, Ordering::SeqCst);
        if changed {
            tracing::debug!(device_id = %self.id, "polled status merged into state");
        }
        Ok(changed)
    }

    /// Starts the polling loop.
    ///
    /// An initial fetch happens immediately, followed by one warm-up fetch
    /// at a randomized delay (avoiding synchronized bursts when many
    /// devices start together), then the regular interval applies. A tick
    /// that is due while a fetch is still in progress is skipped, not
    /// queued. Failed ticks are logged and leave the state untouched.
    ///
    /// Calling this on an already-polling or stopped manager does nothing.
    pub fn start_polling(self: &Arc<Self>) {
        if self.is_stopped() {
            return;
        }
        let mut guard = self.poll_task.lock();
        if guard.is_some() {
            return;
        }

        let weak = Arc::downgrade(self);
        let interval = self.config.poll_interval();
        let warmup = warmup_delay(self.config.warmup_jitter());
        tracing::debug!(
            device_id = %self.id,
            interval_secs = interval.as_secs(),
            warmup_ms = warmup.as_millis(),
            "starting polling"
        );

        let handle = tokio::spawn(async move {
            if !poll_tick(&weak).await {
                return;
            }

            tokio::time::sleep(warmup).await;
            if !poll_tick(&weak).await {
                return;
            }

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !poll_tick(&weak).await {
                    return;
                }
            }
        });
        *guard = Some(handle);
    }

    /// Stops the manager. Terminal and idempotent.
    ///
    /// Cancels the polling timer and any pending debounce timer, disposes
    /// the command queue, and releases the device client. In-flight network
    /// calls are left to resolve on their own; their results are discarded.
    pub async fn stop_polling(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.poll_task.lock().take() {
            handle.abort();
        }
        self.queue.dispose();
        self.client.release().await;
        tracing::debug!(device_id = %self.id, "state manager stopped");
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("id", &self.id)
            .field("display_name", &self.config.display_name())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

/// Runs one poll tick; returns `false` when the manager is gone or stopped
/// and the loop should exit.
async fn poll_tick(weak: &Weak<StateManager>) -> bool {
    let Some(manager) = weak.upgrade() else {
        return false;
    };
    match manager.refresh().await {
        Ok(_) => true,
        Err(Error::ManagerStopped) => false,
        Err(e) => {
            tracing::warn!(device_id = %manager.id, error = %e, "status poll failed");
            true
        }
    }
}

/// Picks a random warm-up delay in `[0, bound]`.
fn warmup_delay(bound: Duration) -> Duration {
    use rand::Rng;

    if bound.is_zero() {
        return Duration::ZERO;
    }
    let bound_ms = u64::try_from(bound.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rand::thread_rng().gen_range(0..=bound_ms))
}
