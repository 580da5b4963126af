// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain value types for air-conditioner attributes.
//!
//! Every categorical attribute has exactly one canonical representation (its
//! enum value) and exactly one canonicalization path (its `FromStr` impl).
//! All equality comparisons in the crate are made on canonical values, so a
//! raw textual form such as `"OFF"` or `"0"` always compares equal to its
//! symbolic equivalent.

mod fan_speed;
mod mode;
mod power;
mod swing;
mod temperature;
mod toggle;

pub use fan_speed::FanSpeed;
pub use mode::OperationMode;
pub use power::PowerState;
pub use swing::SwingMode;
pub use temperature::Celsius;
pub use toggle::{Feature, Toggle};
