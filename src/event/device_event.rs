// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use crate::state::DeviceState;

use super::DeviceId;

/// Events published by the manager registry.
///
/// Lifecycle events track managers being created and removed; state events
/// carry the full new state after every committed batch, so a subscriber
/// that only watches the bus still sees a consistent picture.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum DeviceEvent {
    /// A state manager was created for a device.
    ManagerAdded {
        /// The device the manager serves.
        device_id: DeviceId,
    },

    /// A device was removed and its manager torn down.
    ManagerRemoved {
        /// The device that was removed.
        device_id: DeviceId,
    },

    /// The device's state changed (poll reconciliation or optimistic
    /// commit alike).
    StateChanged {
        /// The device whose state changed.
        device_id: DeviceId,
        /// The complete new state.
        state: DeviceState,
    },
}

impl DeviceEvent {
    /// Creates a manager-added event.
    #[must_use]
    pub fn manager_added(device_id: DeviceId) -> Self {
        Self::ManagerAdded { device_id }
    }

    /// Creates a manager-removed event.
    #[must_use]
    pub fn manager_removed(device_id: DeviceId) -> Self {
        Self::ManagerRemoved { device_id }
    }

    /// Creates a state-changed event.
    #[must_use]
    pub fn state_changed(device_id: DeviceId, state: DeviceState) -> Self {
        Self::StateChanged { device_id, state }
    }

    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::ManagerAdded { device_id }
            | Self::ManagerRemoved { device_id }
            | Self::StateChanged { device_id, .. } => device_id,
        }
    }

    /// Returns `true` if this is a lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::ManagerAdded { .. } | Self::ManagerRemoved { .. })
    }
}
