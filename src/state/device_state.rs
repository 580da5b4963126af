// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device state value object.

use crate::types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};

use super::{StateChange, StateDelta, StatusSnapshot};

/// All controllable and observable attributes of one unit.
///
/// This is a plain value object: `clone()` produces a fully detached copy,
/// and mutating a clone never affects the original. Adapters clone the
/// current state, mutate the clone, and hand it to
/// [`StateManager::apply_state`](crate::manager::StateManager::apply_state);
/// the shared live instance is only ever mutated through
/// [`TrackedState`](super::TrackedState).
///
/// # Examples
///
/// ```
/// use climsync::state::DeviceState;
/// use climsync::types::{FanSpeed, PowerState};
///
/// let mut desired = DeviceState::default();
/// desired.set_power(PowerState::On);
/// desired.set_fan_speed(FanSpeed::High);
///
/// assert_eq!(desired.power(), PowerState::On);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceState {
    power: PowerState,
    mode: OperationMode,
    fan_speed: FanSpeed,
    swing: SwingMode,
    turbo: Toggle,
    sleep: Toggle,
    eco: Toggle,
    display: Toggle,
    beeper: Toggle,
    target_temperature: Celsius,
    current_temperature: Celsius,
    outdoor_temperature: Option<Celsius>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            power: PowerState::Off,
            mode: OperationMode::Auto,
            fan_speed: FanSpeed::Auto,
            swing: SwingMode::Off,
            turbo: Toggle::Off,
            sleep: Toggle::Off,
            eco: Toggle::Off,
            display: Toggle::Off,
            beeper: Toggle::Off,
            // Mid-range placeholders until the first poll replaces them
            target_temperature: Celsius::MID_RANGE,
            current_temperature: Celsius::MID_RANGE,
            outdoor_temperature: None,
        }
    }
}

impl DeviceState {
    /// Creates a state with default values (everything off, 24.0°C).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the power state.
    #[must_use]
    pub const fn power(&self) -> PowerState {
        self.power
    }

    /// Sets the power state.
    pub fn set_power(&mut self, state: PowerState) {
        self.power = state;
    }

    /// Gets the operation mode.
    #[must_use]
    pub const fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Sets the operation mode.
    pub fn set_mode(&mut self, mode: OperationMode) {
        self.mode = mode;
    }

    /// Gets the fan speed.
    #[must_use]
    pub const fn fan_speed(&self) -> FanSpeed {
        self.fan_speed
    }

    /// Sets the fan speed.
    pub fn set_fan_speed(&mut self, speed: FanSpeed) {
        self.fan_speed = speed;
    }

    /// Gets the swing mode.
    #[must_use]
    pub const fn swing(&self) -> SwingMode {
        self.swing
    }

    /// Sets the swing mode.
    pub fn set_swing(&mut self, swing: SwingMode) {
        self.swing = swing;
    }

    /// Gets the toggle value for a feature.
    #[must_use]
    pub const fn feature(&self, feature: Feature) -> Toggle {
        match feature {
            Feature::Turbo => self.turbo,
            Feature::Sleep => self.sleep,
            Feature::Eco => self.eco,
            Feature::Display => self.display,
            Feature::Beeper => self.beeper,
        }
    }

    /// Sets the toggle value for a feature.
    pub fn set_feature(&mut self, feature: Feature, state: Toggle) {
        let slot = match feature {
            Feature::Turbo => &mut self.turbo,
            Feature::Sleep => &mut self.sleep,
            Feature::Eco => &mut self.eco,
            Feature::Display => &mut self.display,
            Feature::Beeper => &mut self.beeper,
        };
        *slot = state;
    }

    /// Gets the target temperature.
    #[must_use]
    pub const fn target_temperature(&self) -> Celsius {
        self.target_temperature
    }

    /// Sets the target temperature.
    pub fn set_target_temperature(&mut self, value: Celsius) {
        self.target_temperature = value;
    }

    /// Gets the current temperature reading.
    #[must_use]
    pub const fn current_temperature(&self) -> Celsius {
        self.current_temperature
    }

    /// Sets the current temperature reading.
    pub fn set_current_temperature(&mut self, value: Celsius) {
        self.current_temperature = value;
    }

    /// Gets the outdoor temperature reading, if the unit has the sensor.
    #[must_use]
    pub const fn outdoor_temperature(&self) -> Option<Celsius> {
        self.outdoor_temperature
    }

    /// Sets or clears the outdoor temperature reading.
    pub fn set_outdoor_temperature(&mut self, value: Option<Celsius>) {
        self.outdoor_temperature = value;
    }

    /// Applies a delta and returns the changes that actually took effect.
    ///
    /// Fields already at the requested canonical value are skipped, so the
    /// returned list is empty when the state already matched. All set fields
    /// are applied together; callers treating this as one atomic batch get
    /// no observable intermediate state.
    pub fn apply(&mut self, delta: &StateDelta) -> Vec<StateChange> {
        let mut applied = Vec::new();

        if let Some(v) = delta.power
            && self.power != v
        {
            self.power = v;
            applied.push(StateChange::Power(v));
        }
        if let Some(v) = delta.mode
            && self.mode != v
        {
            self.mode = v;
            applied.push(StateChange::Mode(v));
        }
        if let Some(v) = delta.target_temperature
            && self.target_temperature != v
        {
            self.target_temperature = v;
            applied.push(StateChange::TargetTemperature(v));
        }
        if let Some(v) = delta.fan_speed
            && self.fan_speed != v
        {
            self.fan_speed = v;
            applied.push(StateChange::FanSpeed(v));
        }
        if let Some(v) = delta.swing
            && self.swing != v
        {
            self.swing = v;
            applied.push(StateChange::Swing(v));
        }
        for feature in Feature::ALL {
            if let Some(state) = delta.feature_toggle(feature)
                && self.feature(feature) != state
            {
                self.set_feature(feature, state);
                applied.push(StateChange::Feature { feature, state });
            }
        }
        if let Some(v) = delta.current_temperature
            && self.current_temperature != v
        {
            self.current_temperature = v;
            applied.push(StateChange::CurrentTemperature(v));
        }
        if let Some(v) = delta.outdoor_temperature
            && self.outdoor_temperature != v
        {
            self.outdoor_temperature = v;
            applied.push(StateChange::OutdoorTemperature(v));
        }

        applied
    }

    /// Computes the minimal delta that would turn `self` into `desired`.
    ///
    /// Only the settable attributes are compared; the sensor readings
    /// (current and outdoor temperature) change exclusively through polled
    /// status, never through a caller-supplied desired state.
    #[must_use]
    pub fn diff(&self, desired: &Self) -> StateDelta {
        let mut delta = StateDelta::new();

        if self.power != desired.power {
            delta.power = Some(desired.power);
        }
        if self.mode != desired.mode {
            delta.mode = Some(desired.mode);
        }
        if self.fan_speed != desired.fan_speed {
            delta.fan_speed = Some(desired.fan_speed);
        }
        if self.swing != desired.swing {
            delta.swing = Some(desired.swing);
        }
        for feature in Feature::ALL {
            if self.feature(feature) != desired.feature(feature) {
                delta.set_feature(feature, desired.feature(feature));
            }
        }
        if self.target_temperature != desired.target_temperature {
            delta.target_temperature = Some(desired.target_temperature);
        }

        delta
    }

    /// Produces the externally-shaped status record for this state.
    #[must_use]
    pub fn to_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::from_state(self)
    }
}
