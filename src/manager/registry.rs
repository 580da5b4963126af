// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of state managers, one per device identity.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::client::DeviceClient;
use crate::event::{DeviceEvent, DeviceId, EventBus};

use super::{ManagerConfig, StateManager};

/// One [`StateManager`] per device identity.
///
/// The registry is the explicit owner of the "one instance per device"
/// invariant: repeated [`acquire`](Self::acquire) calls for the same
/// identity return the same manager, so every adapter for one physical
/// device observes one shared state. It is owned by the top-level platform
/// and passed by reference to every adapter; there is no hidden global.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use climsync::manager::{ManagerConfig, ManagerRegistry};
/// # async fn example(client: Arc<dyn climsync::DeviceClient>) {
/// let registry = ManagerRegistry::new();
///
/// let config = ManagerConfig::new("192.168.1.40");
/// let manager = registry.acquire(config, move || client).await;
///
/// // A second acquire for the same identity returns the same instance
/// let again = registry
///     .acquire(ManagerConfig::new("192.168.1.40"), || unreachable!())
///     .await;
/// assert!(Arc::ptr_eq(&manager, &again));
/// # }
/// ```
#[derive(Debug)]
pub struct ManagerRegistry {
    managers: RwLock<HashMap<DeviceId, Arc<StateManager>>>,
    event_bus: EventBus,
}

impl ManagerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            managers: RwLock::new(HashMap::new()),
            event_bus: EventBus::new(),
        }
    }

    /// Subscribes to lifecycle and state-changed events for all devices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the manager for a device, creating and starting it on first
    /// request.
    ///
    /// `make_client` is only invoked when no manager exists yet for the
    /// identity in `config`; likewise the rest of `config` is ignored for
    /// an already-known device.
    pub async fn acquire<F>(&self, config: ManagerConfig, make_client: F) -> Arc<StateManager>
    where
        F: FnOnce() -> Arc<dyn DeviceClient>,
    {
        let id = config.device_id().clone();

        {
            let managers = self.managers.read().await;
            if let Some(manager) = managers.get(&id) {
                return Arc::clone(manager);
            }
        }

        let mut managers = self.managers.write().await;
        // Re-check; another task may have won the race for the write lock
        if let Some(manager) = managers.get(&id) {
            return Arc::clone(manager);
        }

        tracing::info!(device_id = %id, name = config.display_name(), "creating state manager");
        let manager = Arc::new(StateManager::new(config, make_client()));
        manager.start_polling();

        // Forward every committed batch onto the bus
        let bus = self.event_bus.clone();
        let event_id = id.clone();
        manager.state().on_changed(move |state| {
            bus.publish(DeviceEvent::state_changed(event_id.clone(), state.clone()));
        });

        managers.insert(id.clone(), Arc::clone(&manager));
        drop(managers);

        self.event_bus.publish(DeviceEvent::manager_added(id));
        manager
    }

    /// Returns the manager for a device, if one exists.
    pub async fn get(&self, id: &DeviceId) -> Option<Arc<StateManager>> {
        self.managers.read().await.get(id).map(Arc::clone)
    }

    /// Removes a device: stops polling, disposes its queue, releases its
    /// client.
    ///
    /// Returns `true` if the device was known.
    pub async fn remove(&self, id: &DeviceId) -> bool {
        let removed = self.managers.write().await.remove(id);
        let Some(manager) = removed else {
            return false;
        };

        manager.stop_polling().await;
        self.event_bus
            .publish(DeviceEvent::manager_removed(id.clone()));
        true
    }

    /// Returns all registered device identities.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.managers.read().await.keys().cloned().collect()
    }

    /// Returns the number of registered devices.
    pub async fn count(&self) -> usize {
        self.managers.read().await.len()
    }

    /// Tears down every manager. The registry is empty afterwards.
    pub async fn shutdown(&self) {
        let managers: Vec<_> = self.managers.write().await.drain().collect();
        for (id, manager) in managers {
            manager.stop_polling().await;
            self.event_bus.publish(DeviceEvent::manager_removed(id));
        }
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DeviceOption;
    use crate::error::TransportError;
    use crate::state::{DeviceState, StatusSnapshot};
    use async_trait::async_trait;
    use std::time::Duration;

    struct IdleClient;

    fn idle_client() -> Arc<dyn DeviceClient> {
        Arc::new(IdleClient)
    }

    #[async_trait]
    impl DeviceClient for IdleClient {
        async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
            Ok(StatusSnapshot::from_state(&DeviceState::default()))
        }

        async fn power_on(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn power_off(&self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn set_option(&self, _option: DeviceOption) -> Result<(), TransportError> {
            Ok(())
        }

        async fn release(&self) {}
    }

    fn test_config(id: &str) -> ManagerConfig {
        ManagerConfig::new(id)
            .with_warmup_jitter(Duration::ZERO)
            .with_poll_interval(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn acquire_is_idempotent_per_identity() {
        let registry = ManagerRegistry::new();

        let first = registry
            .acquire(test_config("192.168.1.40"), idle_client)
            .await;
        let second = registry
            .acquire(test_config("192.168.1.40"), || {
                panic!("client factory must not run for a known device")
            })
            .await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.count().await, 1);

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn distinct_identities_get_distinct_managers() {
        let registry = ManagerRegistry::new();

        let a = registry
            .acquire(test_config("192.168.1.40"), idle_client)
            .await;
        let b = registry
            .acquire(test_config("192.168.1.41"), idle_client)
            .await;

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.count().await, 2);

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn acquire_publishes_added_event() {
        let registry = ManagerRegistry::new();
        let mut events = registry.subscribe();

        registry
            .acquire(test_config("192.168.1.40"), idle_client)
            .await;

        // Skip any state-changed events from the initial poll
        loop {
            let event = events.recv().await.unwrap();
            if let DeviceEvent::ManagerAdded { device_id } = event {
                assert_eq!(device_id, DeviceId::new("192.168.1.40"));
                break;
            }
        }

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn remove_stops_the_manager() {
        let registry = ManagerRegistry::new();
        let id = DeviceId::new("192.168.1.40");

        let manager = registry
            .acquire(test_config("192.168.1.40"), idle_client)
            .await;

        assert!(registry.remove(&id).await);
        assert!(manager.is_stopped());
        assert_eq!(registry.count().await, 0);

        // Removing an unknown device returns false
        assert!(!registry.remove(&id).await);
    }

    #[tokio::test]
    async fn get_returns_known_manager() {
        let registry = ManagerRegistry::new();
        let id = DeviceId::new("192.168.1.40");

        assert!(registry.get(&id).await.is_none());

        let manager = registry
            .acquire(test_config("192.168.1.40"), idle_client)
            .await;
        let fetched = registry.get(&id).await.unwrap();
        assert!(Arc::ptr_eq(&manager, &fetched));

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_empties_the_registry() {
        let registry = ManagerRegistry::new();

        let a = registry
            .acquire(test_config("a"), idle_client)
            .await;
        let b = registry
            .acquire(test_config("b"), idle_client)
            .await;

        registry.shutdown().await;

        assert_eq!(registry.count().await, 0);
        assert!(a.is_stopped());
        assert!(b.is_stopped());
    }
}
