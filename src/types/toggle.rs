// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toggleable feature modes of the unit.
//!
//! Turbo, sleep, eco, display and beeper are plain on/off controls. [`Toggle`]
//! is their value type and [`Feature`] names the control, so state changes,
//! callbacks and device commands can address all five uniformly.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// An on/off value for a feature mode.
///
/// # Examples
///
/// ```
/// use climsync::types::Toggle;
///
/// assert_eq!(Toggle::from(true), Toggle::On);
/// assert_eq!("OFF".parse::<Toggle>().unwrap(), Toggle::Off);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    /// The feature is disabled.
    #[default]
    Off,
    /// The feature is enabled.
    On,
}

impl Toggle {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` if the feature is enabled.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Toggle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidToggle(s.to_string())),
        }
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Names one of the five toggleable feature modes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Maximum-output boost.
    Turbo,
    /// Quiet night operation.
    Sleep,
    /// Energy-saving operation.
    Eco,
    /// Front-panel display light.
    Display,
    /// Confirmation beeper.
    Beeper,
}

impl Feature {
    /// All feature modes, in the order commands are emitted.
    pub const ALL: [Self; 5] = [
        Self::Turbo,
        Self::Sleep,
        Self::Eco,
        Self::Display,
        Self::Beeper,
    ];

    /// Returns the option key used when addressing the device.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Turbo => "turbo",
            Self::Sleep => "sleep",
            Self::Eco => "eco",
            Self::Display => "display",
            Self::Beeper => "beeper",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_from_str() {
        assert_eq!("on".parse::<Toggle>().unwrap(), Toggle::On);
        assert_eq!("FALSE".parse::<Toggle>().unwrap(), Toggle::Off);
        assert_eq!("1".parse::<Toggle>().unwrap(), Toggle::On);
    }

    #[test]
    fn toggle_from_str_invalid() {
        assert!(matches!(
            "sometimes".parse::<Toggle>(),
            Err(ValueError::InvalidToggle(_))
        ));
    }

    #[test]
    fn toggle_from_bool() {
        assert_eq!(Toggle::from(true), Toggle::On);
        assert_eq!(Toggle::from(false), Toggle::Off);
    }

    #[test]
    fn feature_keys_are_unique() {
        use std::collections::HashSet;

        let keys: HashSet<_> = Feature::ALL.iter().map(Feature::key).collect();
        assert_eq!(keys.len(), Feature::ALL.len());
    }

    #[test]
    fn feature_display() {
        assert_eq!(Feature::Eco.to_string(), "eco");
        assert_eq!(Feature::Beeper.to_string(), "beeper");
    }
}
