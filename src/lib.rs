// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! climsync - state synchronization for networked air conditioners.
//!
//! This library keeps many independent front-end adapters (one per
//! controllable feature: power, fan, swing, eco, turbo, sleep, display,
//! beeper, temperature) in sync with one physical climate-control unit. It
//! maintains a single authoritative, eventually-consistent model of the
//! device's state, kept fresh by periodic polling, updated optimistically on
//! local writes, and funneled through a single serialized command channel to
//! the device.
//!
//! # Architecture
//!
//! - [`state::TrackedState`] - the one shared, observable state per device.
//!   Adapters subscribe for synchronous change notifications and clone the
//!   state to propose changes.
//! - [`queue::CommandQueue`] - single-flight, debounced transmission: at most
//!   one change request is ever in flight per device; concurrent requests
//!   merge, and rapid fan-speed bursts collapse to the final value.
//! - [`manager::StateManager`] - the per-device orchestrator wiring polling,
//!   diffing, optimistic commits and fan-out notification together, obtained
//!   through a [`manager::ManagerRegistry`] keyed by device identity.
//!
//! The wire-level client is not part of this crate; implement
//! [`DeviceClient`] for whatever transport your units speak.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use climsync::manager::{ManagerConfig, ManagerRegistry};
//! use climsync::types::{FanSpeed, PowerState};
//!
//! # async fn example(client: Arc<dyn climsync::DeviceClient>) -> climsync::Result<()> {
//! let registry = ManagerRegistry::new();
//!
//! // One manager per device identity; polling starts on first acquire
//! let manager = registry
//!     .acquire(
//!         ManagerConfig::new("192.168.1.40").with_friendly_name("Bedroom AC"),
//!         move || client,
//!     )
//!     .await;
//!
//! // Observe changes (delivered synchronously, before the write returns)
//! manager.state().on_changed(|state| {
//!     println!("power is now {}", state.power());
//! });
//!
//! // Propose a change: clone, mutate, apply
//! let mut desired = manager.state().snapshot();
//! desired.set_power(PowerState::On);
//! desired.set_fan_speed(FanSpeed::from_percent(60)?);
//!
//! if let Some(ticket) = manager.apply_state(&desired)? {
//!     ticket.wait().await?; // await device acknowledgement if you care
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
pub mod event;
pub mod manager;
pub mod queue;
pub mod state;
pub mod subscription;
pub mod types;

pub use client::{DeviceClient, DeviceCommand, DeviceOption};
pub use error::{Error, ParseError, Result, TransportError, ValueError};
pub use event::{DeviceEvent, DeviceId, EventBus};
pub use manager::{ManagerConfig, ManagerRegistry, StateManager};
pub use queue::{BatchId, CommandQueue, CommandTicket};
pub use state::{DeviceState, StateChange, StateDelta, StatusSnapshot, TrackedState};
pub use subscription::{CallbackRegistry, SubscriptionId};
pub use types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};
