// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! [`StateDelta`] is the sparse partial-change record that flows through the
//! whole engine: callers describe what they want changed, the diff produces
//! one, the command queue merges them, and [`DeviceState`](super::DeviceState)
//! applies them atomically. [`StateChange`] is a single applied field change,
//! used to dispatch typed callbacks.
//!
//! # Examples
//!
//! ```
//! use climsync::state::StateDelta;
//! use climsync::types::{FanSpeed, SwingMode};
//!
//! let delta = StateDelta {
//!     fan_speed: Some(FanSpeed::High),
//!     swing: Some(SwingMode::Vertical),
//!     ..StateDelta::default()
//! };
//! assert_eq!(delta.len(), 2);
//! assert!(!delta.is_empty());
//! ```

use crate::types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};

/// A single applied change to one attribute.
///
/// Emitted by [`DeviceState::apply`](super::DeviceState::apply) for every
/// field that actually changed, and dispatched to typed subscription
/// callbacks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Power state changed.
    Power(PowerState),
    /// Operation mode changed.
    Mode(OperationMode),
    /// Fan speed changed.
    FanSpeed(FanSpeed),
    /// Swing mode changed.
    Swing(SwingMode),
    /// One of the feature toggles changed.
    Feature {
        /// The feature that changed.
        feature: Feature,
        /// The new toggle value.
        state: Toggle,
    },
    /// Target temperature changed.
    TargetTemperature(Celsius),
    /// Current temperature reading changed.
    CurrentTemperature(Celsius),
    /// Outdoor temperature reading changed (`None` means no sensor reading).
    OutdoorTemperature(Option<Celsius>),
}

/// A sparse set of attribute changes.
///
/// Every field is optional; unset fields are left untouched when the delta
/// is applied. Merging two deltas is last-value-wins per field.
///
/// The temperature readings (`current_temperature`, `outdoor_temperature`)
/// are carried so polled snapshots can be reconciled through the same path;
/// they never translate into device commands.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateDelta {
    /// New power state.
    pub power: Option<PowerState>,
    /// New operation mode.
    pub mode: Option<OperationMode>,
    /// New fan speed.
    pub fan_speed: Option<FanSpeed>,
    /// New swing mode.
    pub swing: Option<SwingMode>,
    /// New turbo toggle.
    pub turbo: Option<Toggle>,
    /// New sleep toggle.
    pub sleep: Option<Toggle>,
    /// New eco toggle.
    pub eco: Option<Toggle>,
    /// New display toggle.
    pub display: Option<Toggle>,
    /// New beeper toggle.
    pub beeper: Option<Toggle>,
    /// New target temperature.
    pub target_temperature: Option<Celsius>,
    /// New current temperature reading.
    pub current_temperature: Option<Celsius>,
    /// New outdoor temperature reading; the inner `None` clears the reading.
    pub outdoor_temperature: Option<Option<Celsius>>,
}

impl StateDelta {
    /// Creates an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a delta changing only the power state.
    #[must_use]
    pub fn power(state: PowerState) -> Self {
        Self {
            power: Some(state),
            ..Self::default()
        }
    }

    /// Creates a delta changing only the fan speed.
    #[must_use]
    pub fn fan_speed(speed: FanSpeed) -> Self {
        Self {
            fan_speed: Some(speed),
            ..Self::default()
        }
    }

    /// Creates a delta changing only one feature toggle.
    #[must_use]
    pub fn feature(feature: Feature, state: Toggle) -> Self {
        let mut delta = Self::default();
        delta.set_feature(feature, state);
        delta
    }

    /// Returns the toggle for a feature, if set.
    #[must_use]
    pub fn feature_toggle(&self, feature: Feature) -> Option<Toggle> {
        match feature {
            Feature::Turbo => self.turbo,
            Feature::Sleep => self.sleep,
            Feature::Eco => self.eco,
            Feature::Display => self.display,
            Feature::Beeper => self.beeper,
        }
    }

    /// Sets the toggle for a feature.
    pub fn set_feature(&mut self, feature: Feature, state: Toggle) {
        let slot = match feature {
            Feature::Turbo => &mut self.turbo,
            Feature::Sleep => &mut self.sleep,
            Feature::Eco => &mut self.eco,
            Feature::Display => &mut self.display,
            Feature::Beeper => &mut self.beeper,
        };
        *slot = Some(state);
    }

    /// Merges `other` into `self`, last value wins per field.
    pub fn merge(&mut self, other: Self) {
        macro_rules! take_if_some {
            ($($field:ident),+) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })+
            };
        }
        take_if_some!(
            power,
            mode,
            fan_speed,
            swing,
            turbo,
            sleep,
            eco,
            display,
            beeper,
            target_temperature,
            current_temperature,
            outdoor_temperature
        );
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        macro_rules! count_some {
            ($($field:ident),+) => {
                $(if self.$field.is_some() { count += 1; })+
            };
        }
        count_some!(
            power,
            mode,
            fan_speed,
            swing,
            turbo,
            sleep,
            eco,
            display,
            beeper,
            target_temperature,
            current_temperature,
            outdoor_temperature
        );
        count
    }

    /// Returns `true` if the delta touches only the fan speed.
    ///
    /// Fan speed is the one rapidly-adjustable control (a slider in most
    /// front ends); such deltas go through the command queue's debounce
    /// window.
    #[must_use]
    pub fn is_fan_speed_only(&self) -> bool {
        self.fan_speed.is_some() && self.len() == 1
    }

    /// Enumerates the set fields as [`StateChange`]s, in the fixed order
    /// changes are applied and dispatched.
    #[must_use]
    pub fn changes(&self) -> Vec<StateChange> {
        let mut changes = Vec::with_capacity(self.len());
        if let Some(v) = self.power {
            changes.push(StateChange::Power(v));
        }
        if let Some(v) = self.mode {
            changes.push(StateChange::Mode(v));
        }
        if let Some(v) = self.target_temperature {
            changes.push(StateChange::TargetTemperature(v));
        }
        if let Some(v) = self.fan_speed {
            changes.push(StateChange::FanSpeed(v));
        }
        if let Some(v) = self.swing {
            changes.push(StateChange::Swing(v));
        }
        for feature in Feature::ALL {
            if let Some(state) = self.feature_toggle(feature) {
                changes.push(StateChange::Feature { feature, state });
            }
        }
        if let Some(v) = self.current_temperature {
            changes.push(StateChange::CurrentTemperature(v));
        }
        if let Some(v) = self.outdoor_temperature {
            changes.push(StateChange::OutdoorTemperature(v));
        }
        changes
    }
}
