// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device client seam.
//!
//! The wire-level client that actually talks to a unit lives outside this
//! crate; the engine consumes it only through the [`DeviceClient`] trait.
//! Implementations translate [`DeviceOption`]s into whatever the transport
//! speaks and report failures through
//! [`TransportError`](crate::error::TransportError).

use async_trait::async_trait;

use crate::error::TransportError;
use crate::state::{StateDelta, StatusSnapshot};
use crate::types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};

/// One settable device option.
///
/// Power is not an option: it has dedicated `power_on`/`power_off` calls on
/// the client, matching the way these units are addressed on the wire.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DeviceOption {
    /// Operation mode.
    Mode(OperationMode),
    /// Fan speed.
    FanSpeed(FanSpeed),
    /// Swing mode.
    Swing(SwingMode),
    /// One of the feature toggles.
    Feature {
        /// The feature being set.
        feature: Feature,
        /// The new toggle value.
        state: Toggle,
    },
    /// Target temperature.
    TargetTemperature(Celsius),
}

impl DeviceOption {
    /// Returns the option key used when addressing the device.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Mode(_) => "mode",
            Self::FanSpeed(_) => "fan_speed",
            Self::Swing(_) => "swing",
            Self::Feature { feature, .. } => feature.key(),
            Self::TargetTemperature(_) => "target_temperature",
        }
    }

    /// Returns the canonical value string sent for this option.
    #[must_use]
    pub fn value_string(&self) -> String {
        match self {
            Self::Mode(mode) => mode.as_str().to_string(),
            Self::FanSpeed(speed) => speed.as_str().to_string(),
            Self::Swing(swing) => swing.as_str().to_string(),
            Self::Feature { state, .. } => state.as_str().to_string(),
            Self::TargetTemperature(value) => value.value().to_string(),
        }
    }
}

impl std::fmt::Display for DeviceOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key(), self.value_string())
    }
}

/// One call to make against the device client.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Turn the unit on.
    PowerOn,
    /// Turn the unit off.
    PowerOff,
    /// Set one option.
    Set(DeviceOption),
}

impl StateDelta {
    /// Translates this delta into the ordered list of client calls.
    ///
    /// Power is emitted first so a unit that is being turned on accepts the
    /// option changes that follow. Sensor readings in the delta produce no
    /// commands.
    #[must_use]
    pub fn to_commands(&self) -> Vec<DeviceCommand> {
        let mut commands = Vec::new();
        if let Some(power) = self.power {
            commands.push(match power {
                PowerState::On => DeviceCommand::PowerOn,
                PowerState::Off => DeviceCommand::PowerOff,
            });
        }
        if let Some(mode) = self.mode {
            commands.push(DeviceCommand::Set(DeviceOption::Mode(mode)));
        }
        if let Some(value) = self.target_temperature {
            commands.push(DeviceCommand::Set(DeviceOption::TargetTemperature(value)));
        }
        if let Some(speed) = self.fan_speed {
            commands.push(DeviceCommand::Set(DeviceOption::FanSpeed(speed)));
        }
        if let Some(swing) = self.swing {
            commands.push(DeviceCommand::Set(DeviceOption::Swing(swing)));
        }
        for feature in Feature::ALL {
            if let Some(state) = self.feature_toggle(feature) {
                commands.push(DeviceCommand::Set(DeviceOption::Feature { feature, state }));
            }
        }
        commands
    }
}

/// Abstract contract for the wire-level device client.
///
/// One implementation exists per transport; the engine holds one client per
/// device and guarantees it never sees two concurrent change requests
/// (single-flight). All calls may suspend on network I/O. Timeout policy, if
/// any, belongs to the implementation.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Fetches the current status of the unit.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on network or device failure.
    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError>;

    /// Turns the unit on.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on network or device failure.
    async fn power_on(&self) -> Result<(), TransportError>;

    /// Turns the unit off.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on network or device failure.
    async fn power_off(&self) -> Result<(), TransportError>;

    /// Sets one option on the unit.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on network or device failure.
    async fn set_option(&self, option: DeviceOption) -> Result<(), TransportError>;

    /// Releases any held transport resources.
    async fn release(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_keys() {
        assert_eq!(DeviceOption::Mode(OperationMode::Cool).key(), "mode");
        assert_eq!(
            DeviceOption::Feature {
                feature: Feature::Beeper,
                state: Toggle::Off
            }
            .key(),
            "beeper"
        );
    }

    #[test]
    fn option_display() {
        let option = DeviceOption::FanSpeed(FanSpeed::MediumHigh);
        assert_eq!(option.to_string(), "fan_speed=medium_high");
    }

    #[test]
    fn delta_to_commands_power_first() {
        let mut delta = StateDelta::new();
        delta.swing = Some(SwingMode::Vertical);
        delta.power = Some(PowerState::On);

        let commands = delta.to_commands();
        assert_eq!(
            commands,
            vec![
                DeviceCommand::PowerOn,
                DeviceCommand::Set(DeviceOption::Swing(SwingMode::Vertical)),
            ]
        );
    }

    #[test]
    fn delta_to_commands_skips_readings() {
        let mut delta = StateDelta::new();
        delta.current_temperature = Some(Celsius::reading(25.0).unwrap());
        delta.outdoor_temperature = Some(None);

        assert!(delta.to_commands().is_empty());
    }

    #[test]
    fn power_off_command() {
        let delta = StateDelta::power(PowerState::Off);
        assert_eq!(delta.to_commands(), vec![DeviceCommand::PowerOff]);
    }
}
