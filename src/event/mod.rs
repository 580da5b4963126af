// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity and lifecycle events.
//!
//! [`DeviceId`] names one physical unit; the
//! [`ManagerRegistry`](crate::manager::ManagerRegistry) keys state managers
//! by it. [`EventBus`] broadcasts [`DeviceEvent`]s to any number of
//! subscribers.

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;
