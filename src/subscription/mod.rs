// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriptions to state changes.
//!
//! Adapters observe the shared [`TrackedState`](crate::state::TrackedState)
//! by registering callbacks. Delivery is synchronous: every listener has
//! seen the new state before the mutating call returns.

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
