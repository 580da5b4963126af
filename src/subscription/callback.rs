// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for state subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{DeviceState, StateChange};
use crate::types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};

/// Unique identifier for a subscription.
///
/// This ID is returned when registering a callback and can be used to
/// unsubscribe later. IDs are unique within one registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for the batch-level "changed" callbacks.
type ChangedCallback = Arc<dyn Fn(&DeviceState) + Send + Sync>;

/// Type alias for power state callbacks.
type PowerCallback = Arc<dyn Fn(PowerState) + Send + Sync>;

/// Type alias for operation mode callbacks.
type ModeCallback = Arc<dyn Fn(OperationMode) + Send + Sync>;

/// Type alias for fan speed callbacks.
type FanSpeedCallback = Arc<dyn Fn(FanSpeed) + Send + Sync>;

/// Type alias for swing mode callbacks.
type SwingCallback = Arc<dyn Fn(SwingMode) + Send + Sync>;

/// Type alias for feature toggle callbacks.
type FeatureCallback = Arc<dyn Fn(Feature, Toggle) + Send + Sync>;

/// Type alias for current temperature callbacks.
type TemperatureCallback = Arc<dyn Fn(Celsius) + Send + Sync>;

/// Type alias for target temperature callbacks.
type TargetTemperatureCallback = Arc<dyn Fn(Celsius) + Send + Sync>;

/// Registry for managing state subscription callbacks.
///
/// Callbacks are dispatched synchronously, in registration-independent but
/// deterministic per-category order, while no state lock is held. The
/// registry is thread-safe via `parking_lot::RwLock`; callbacks are wrapped
/// in `Arc` so they can be cloned cheaply for dispatch.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Batch-level "changed" callbacks (one call per committed batch).
    changed_callbacks: RwLock<HashMap<SubscriptionId, ChangedCallback>>,
    /// Power state change callbacks.
    power_callbacks: RwLock<HashMap<SubscriptionId, PowerCallback>>,
    /// Operation mode change callbacks.
    mode_callbacks: RwLock<HashMap<SubscriptionId, ModeCallback>>,
    /// Fan speed change callbacks.
    fan_speed_callbacks: RwLock<HashMap<SubscriptionId, FanSpeedCallback>>,
    /// Swing mode change callbacks.
    swing_callbacks: RwLock<HashMap<SubscriptionId, SwingCallback>>,
    /// Feature toggle change callbacks.
    feature_callbacks: RwLock<HashMap<SubscriptionId, FeatureCallback>>,
    /// Current temperature change callbacks.
    temperature_callbacks: RwLock<HashMap<SubscriptionId, TemperatureCallback>>,
    /// Target temperature change callbacks.
    target_temperature_callbacks: RwLock<HashMap<SubscriptionId, TargetTemperatureCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            changed_callbacks: RwLock::new(HashMap::new()),
            power_callbacks: RwLock::new(HashMap::new()),
            mode_callbacks: RwLock::new(HashMap::new()),
            fan_speed_callbacks: RwLock::new(HashMap::new()),
            swing_callbacks: RwLock::new(HashMap::new()),
            feature_callbacks: RwLock::new(HashMap::new()),
            temperature_callbacks: RwLock::new(HashMap::new()),
            target_temperature_callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback fired once per committed batch of changes.
    ///
    /// The callback receives the full updated state. This is the "changed"
    /// signal adapters use to refresh themselves.
    pub fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.changed_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for power state changes.
    pub fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.power_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for operation mode changes.
    pub fn on_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(OperationMode) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.mode_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for fan speed changes.
    pub fn on_fan_speed_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(FanSpeed) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.fan_speed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for swing mode changes.
    pub fn on_swing_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SwingMode) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.swing_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for feature toggle changes.
    ///
    /// The callback receives the feature and its new toggle value.
    pub fn on_feature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Feature, Toggle) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.feature_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for current temperature changes.
    pub fn on_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Celsius) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.temperature_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for target temperature changes.
    pub fn on_target_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Celsius) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.target_temperature_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed. Unsubscribing an
    /// unknown ID is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.changed_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.power_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.mode_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.fan_speed_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.swing_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.feature_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.temperature_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self
            .target_temperature_callbacks
            .write()
            .remove(&id)
            .is_some()
        {
            return true;
        }
        false
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.changed_callbacks.write().clear();
        self.power_callbacks.write().clear();
        self.mode_callbacks.write().clear();
        self.fan_speed_callbacks.write().clear();
        self.swing_callbacks.write().clear();
        self.feature_callbacks.write().clear();
        self.temperature_callbacks.write().clear();
        self.target_temperature_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches one applied change to the matching typed callbacks.
    ///
    /// Outdoor temperature changes have no typed callback; they are visible
    /// through the batch-level "changed" signal only.
    pub fn dispatch(&self, change: &StateChange) {
        match change {
            StateChange::Power(state) => {
                let callbacks = self.power_callbacks.read();
                for callback in callbacks.values() {
                    callback(*state);
                }
            }
            StateChange::Mode(mode) => {
                let callbacks = self.mode_callbacks.read();
                for callback in callbacks.values() {
                    callback(*mode);
                }
            }
            StateChange::FanSpeed(speed) => {
                let callbacks = self.fan_speed_callbacks.read();
                for callback in callbacks.values() {
                    callback(*speed);
                }
            }
            StateChange::Swing(swing) => {
                let callbacks = self.swing_callbacks.read();
                for callback in callbacks.values() {
                    callback(*swing);
                }
            }
            StateChange::Feature { feature, state } => {
                let callbacks = self.feature_callbacks.read();
                for callback in callbacks.values() {
                    callback(*feature, *state);
                }
            }
            StateChange::TargetTemperature(value) => {
                let callbacks = self.target_temperature_callbacks.read();
                for callback in callbacks.values() {
                    callback(*value);
                }
            }
            StateChange::CurrentTemperature(value) => {
                let callbacks = self.temperature_callbacks.read();
                for callback in callbacks.values() {
                    callback(*value);
                }
            }
            StateChange::OutdoorTemperature(_) => {}
        }
    }

    /// Dispatches the batch-level "changed" signal with the full new state.
    pub fn dispatch_changed(&self, state: &DeviceState) {
        let callbacks = self.changed_callbacks.read();
        for callback in callbacks.values() {
            callback(state);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.changed_callbacks.read().len()
            + self.power_callbacks.read().len()
            + self.mode_callbacks.read().len()
            + self.fan_speed_callbacks.read().len()
            + self.swing_callbacks.read().len()
            + self.feature_callbacks.read().len()
            + self.temperature_callbacks.read().len()
            + self.target_temperature_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
