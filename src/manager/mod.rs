// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device orchestration.
//!
//! A [`StateManager`] owns one device's shared state and command queue,
//! polls the device client on an interval, and turns desired states into
//! minimal command batches. The [`ManagerRegistry`] keys managers by device
//! identity so every adapter for one physical device shares one manager.
//!
//! # Overview
//!
//! Adapters read through the manager's [`TrackedState`](crate::state::TrackedState)
//! and write by cloning it, mutating the clone, and calling
//! [`StateManager::apply_state`]. The manager diffs, commits the change
//! optimistically (all listeners are notified synchronously), and submits
//! the minimal delta to the single-flight [`CommandQueue`](crate::queue::CommandQueue).
//! The polling loop independently refreshes the state from the device and
//! reconciles, last writer wins.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use climsync::manager::{ManagerConfig, ManagerRegistry};
//! use climsync::types::PowerState;
//!
//! # async fn example(client: Arc<dyn climsync::DeviceClient>) -> climsync::Result<()> {
//! let registry = ManagerRegistry::new();
//! let manager = registry
//!     .acquire(ManagerConfig::new("192.168.1.40"), move || client)
//!     .await;
//!
//! let mut desired = manager.state().snapshot();
//! desired.set_power(PowerState::On);
//! manager.apply_state(&desired)?;
//! # Ok(())
//! # }
//! ```

mod config;
mod registry;
mod state_manager;

pub use config::ManagerConfig;
pub use registry::ManagerRegistry;
pub use state_manager::StateManager;
