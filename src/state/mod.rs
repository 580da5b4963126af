// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state model.
//!
//! [`DeviceState`] is the plain value object holding every controllable and
//! observable attribute of one unit. [`StateDelta`] is a sparse partial
//! change; [`StateChange`] is a single applied field change, the unit of
//! callback dispatch. [`StatusSnapshot`] is the externally-shaped status
//! record exchanged with the device client. [`TrackedState`] wraps one
//! `DeviceState` as the shared, observable instance all adapters read.

mod device_state;
mod snapshot;
mod state_change;
mod tracked;

pub use device_state::DeviceState;
pub use snapshot::StatusSnapshot;
pub use state_change::{StateChange, StateDelta};
pub use tracked::TrackedState;
