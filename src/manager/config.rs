// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for a managed device.

use std::time::Duration;

use crate::event::DeviceId;

/// Default interval between status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default upper bound for the randomized warm-up fetch delay.
const DEFAULT_WARMUP_JITTER: Duration = Duration::from_secs(15);

/// Default debounce window for rapid fan-speed changes.
const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Configuration for one device's state manager.
///
/// The device identity typically comes from discovery or static
/// configuration; everything else has sensible defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use climsync::manager::ManagerConfig;
///
/// let config = ManagerConfig::new("192.168.1.40")
///     .with_friendly_name("Bedroom AC")
///     .with_poll_interval(Duration::from_secs(60));
///
/// assert_eq!(config.display_name(), "Bedroom AC");
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    device_id: DeviceId,
    friendly_name: Option<String>,
    poll_interval: Duration,
    warmup_jitter: Duration,
    debounce_window: Duration,
}

impl ManagerConfig {
    /// Creates a configuration for the given device identity.
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
            friendly_name: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            warmup_jitter: DEFAULT_WARMUP_JITTER,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }

    /// Sets a friendly name for the device.
    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Sets the polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the upper bound for the randomized warm-up fetch delay.
    ///
    /// Pass `Duration::ZERO` to disable the warm-up jitter entirely.
    #[must_use]
    pub fn with_warmup_jitter(mut self, bound: Duration) -> Self {
        self.warmup_jitter = bound;
        self
    }

    /// Sets the debounce window for rapid fan-speed changes.
    #[must_use]
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Returns the device identity.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the friendly name if set, otherwise the device identity.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .unwrap_or_else(|| self.device_id.as_str())
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the warm-up jitter bound.
    #[must_use]
    pub fn warmup_jitter(&self) -> Duration {
        self.warmup_jitter
    }

    /// Returns the debounce window.
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }
}
