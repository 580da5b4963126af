// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The shared, observable state instance.

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::error::ParseError;
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};

use super::{DeviceState, StateDelta, StatusSnapshot};

/// The one shared, observable [`DeviceState`] per device.
///
/// Exactly one instance exists for the lifetime of a device's
/// [`StateManager`](crate::manager::StateManager); every adapter reads
/// through it and never holds a second independent copy. Mutation goes
/// exclusively through [`apply_delta`](Self::apply_delta) (or the typed
/// setters built on it), which keeps every change observable and diffable.
///
/// Committed batches notify listeners synchronously: the per-field typed
/// callbacks fire for each applied change, then the batch-level "changed"
/// callback fires exactly once with the full new state, then the watch
/// channel is updated. No internal lock is held during dispatch.
#[derive(Debug)]
pub struct TrackedState {
    state: RwLock<DeviceState>,
    callbacks: CallbackRegistry,
    watch_tx: watch::Sender<DeviceState>,
}

impl TrackedState {
    /// Creates a tracked state starting from `initial`.
    #[must_use]
    pub fn new(initial: DeviceState) -> Self {
        let (watch_tx, _) = watch::channel(initial.clone());
        Self {
            state: RwLock::new(initial),
            callbacks: CallbackRegistry::new(),
            watch_tx,
        }
    }

    /// Returns a detached copy of the current state.
    ///
    /// This is the clone adapters mutate into a desired state; mutating it
    /// never affects the live instance.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Returns the externally-shaped status record for the current state.
    #[must_use]
    pub fn to_status(&self) -> StatusSnapshot {
        self.state.read().to_snapshot()
    }

    /// Computes the minimal delta from the current state to `desired`.
    #[must_use]
    pub fn diff(&self, desired: &DeviceState) -> StateDelta {
        self.state.read().diff(desired)
    }

    /// Applies a delta atomically and notifies listeners.
    ///
    /// Returns `true` if any field actually changed. Listeners are called
    /// after the write lock is released, with the state the batch produced;
    /// the batch-level "changed" callback fires exactly once per call.
    pub fn apply_delta(&self, delta: &StateDelta) -> bool {
        let (applied, new_state) = {
            let mut state = self.state.write();
            let applied = state.apply(delta);
            (applied, state.clone())
        };

        if applied.is_empty() {
            return false;
        }

        for change in &applied {
            self.callbacks.dispatch(change);
        }
        self.callbacks.dispatch_changed(&new_state);
        // Ignore send errors (no watch receivers)
        let _ = self.watch_tx.send(new_state);
        true
    }

    /// Reconciles a polled status record into the state.
    ///
    /// The whole snapshot is canonicalized before anything is applied, so a
    /// record with an unparseable field changes nothing. Returns `true` if
    /// any field changed.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a snapshot field cannot be canonicalized.
    pub fn apply_status(&self, snapshot: &StatusSnapshot) -> Result<bool, ParseError> {
        let delta = snapshot.to_delta(&self.snapshot())?;
        if delta.is_empty() {
            return Ok(false);
        }
        Ok(self.apply_delta(&delta))
    }

    // =========================================================================
    // Typed setters
    // =========================================================================

    /// Sets the power state, notifying listeners on change.
    pub fn set_power(&self, state: PowerState) -> bool {
        self.apply_delta(&StateDelta {
            power: Some(state),
            ..StateDelta::default()
        })
    }

    /// Sets the operation mode, notifying listeners on change.
    pub fn set_mode(&self, mode: OperationMode) -> bool {
        self.apply_delta(&StateDelta {
            mode: Some(mode),
            ..StateDelta::default()
        })
    }

    /// Sets the fan speed, notifying listeners on change.
    pub fn set_fan_speed(&self, speed: FanSpeed) -> bool {
        self.apply_delta(&StateDelta::fan_speed(speed))
    }

    /// Sets the swing mode, notifying listeners on change.
    pub fn set_swing(&self, swing: SwingMode) -> bool {
        self.apply_delta(&StateDelta {
            swing: Some(swing),
            ..StateDelta::default()
        })
    }

    /// Sets a feature toggle, notifying listeners on change.
    pub fn set_feature(&self, feature: Feature, state: Toggle) -> bool {
        self.apply_delta(&StateDelta::feature(feature, state))
    }

    /// Sets the target temperature, notifying listeners on change.
    pub fn set_target_temperature(&self, value: Celsius) -> bool {
        self.apply_delta(&StateDelta {
            target_temperature: Some(value),
            ..StateDelta::default()
        })
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Returns the callback registry for typed subscriptions.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Registers a batch-level "changed" callback.
    ///
    /// Shorthand for `callbacks().on_changed(..)`.
    pub fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        self.callbacks.on_changed(callback)
    }

    /// Unregisters a callback. Unknown IDs are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }

    /// Creates a watch receiver that observes every committed batch.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DeviceState> {
        self.watch_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn snapshot_is_detached() {
        let tracked = TrackedState::new(DeviceState::default());
        let mut copy = tracked.snapshot();
        copy.set_power(PowerState::On);

        assert_eq!(tracked.snapshot().power(), PowerState::Off);
    }

    #[test]
    fn apply_delta_notifies_each_listener_once() {
        let tracked = TrackedState::new(DeviceState::default());
        let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicU32::new(0))).collect();

        for counter in &counters {
            let counter = counter.clone();
            tracked.on_changed(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        let delta = StateDelta {
            power: Some(PowerState::On),
            fan_speed: Some(FanSpeed::High),
            ..StateDelta::default()
        };
        assert!(tracked.apply_delta(&delta));

        // One batch, one call per listener, even though two fields changed
        for counter in &counters {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn listeners_see_the_full_new_state() {
        let tracked = TrackedState::new(DeviceState::default());
        let seen = Arc::new(parking_lot::Mutex::new(None::<DeviceState>));
        let seen_clone = seen.clone();

        tracked.on_changed(move |state| {
            *seen_clone.lock() = Some(state.clone());
        });

        let delta = StateDelta {
            power: Some(PowerState::On),
            swing: Some(SwingMode::Both),
            ..StateDelta::default()
        };
        tracked.apply_delta(&delta);

        let observed = seen.lock().clone().unwrap();
        assert_eq!(observed.power(), PowerState::On);
        assert_eq!(observed.swing(), SwingMode::Both);
        assert_eq!(observed, tracked.snapshot());
    }

    #[test]
    fn no_op_delta_does_not_notify() {
        let tracked = TrackedState::new(DeviceState::default());
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        tracked.on_changed(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Power is already off
        assert!(!tracked.set_power(PowerState::Off));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn typed_callbacks_fire_per_change() {
        let tracked = TrackedState::new(DeviceState::default());
        let fan_counter = Arc::new(AtomicU32::new(0));
        let fan_clone = fan_counter.clone();

        tracked.callbacks().on_fan_speed_changed(move |_| {
            fan_clone.fetch_add(1, Ordering::SeqCst);
        });

        tracked.set_fan_speed(FanSpeed::Medium);
        tracked.set_power(PowerState::On); // unrelated, no fan callback

        assert_eq!(fan_counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let tracked = TrackedState::new(DeviceState::default());
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = tracked.on_changed(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(tracked.unsubscribe(id));
        // Unsubscribing again is a no-op
        assert!(!tracked.unsubscribe(id));

        tracked.set_power(PowerState::On);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn watch_receives_updates() {
        let tracked = TrackedState::new(DeviceState::default());
        let rx = tracked.watch();

        tracked.set_power(PowerState::On);

        assert_eq!(rx.borrow().power(), PowerState::On);
    }

    #[test]
    fn apply_status_reconciles_raw_forms() {
        let tracked = TrackedState::new(DeviceState::default());
        let mut snapshot = tracked.to_status();
        snapshot.power = "ON".to_string();

        assert!(tracked.apply_status(&snapshot).unwrap());
        assert_eq!(tracked.snapshot().power(), PowerState::On);

        // The same snapshot again is a no-op
        assert!(!tracked.apply_status(&snapshot).unwrap());
    }

    #[test]
    fn apply_status_rejects_bad_snapshot_without_side_effects() {
        let tracked = TrackedState::new(DeviceState::default());
        let before = tracked.snapshot();

        let mut snapshot = tracked.to_status();
        snapshot.power = "on".to_string();
        snapshot.fan_speed = "ludicrous".to_string();

        assert!(tracked.apply_status(&snapshot).is_err());
        assert_eq!(tracked.snapshot(), before);
    }
}
