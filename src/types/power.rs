// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of the unit.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Represents the power state of the unit.
///
/// # Examples
///
/// ```
/// use climsync::types::PowerState;
///
/// let on = PowerState::On;
/// assert_eq!(on.as_str(), "on");
///
/// // Raw textual forms canonicalize to the same value
/// assert_eq!("ON".parse::<PowerState>().unwrap(), PowerState::On);
/// assert_eq!("1".parse::<PowerState>().unwrap(), PowerState::On);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// Power is off.
    #[default]
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` if the power is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str() {
        assert_eq!(PowerState::Off.as_str(), "off");
        assert_eq!(PowerState::On.as_str(), "on");
    }

    #[test]
    fn from_str_textual_forms() {
        assert_eq!("on".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("ON".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("Off".parse::<PowerState>().unwrap(), PowerState::Off);
        assert_eq!("1".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("0".parse::<PowerState>().unwrap(), PowerState::Off);
        assert_eq!("true".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("false".parse::<PowerState>().unwrap(), PowerState::Off);
        assert_eq!(" on ".parse::<PowerState>().unwrap(), PowerState::On);
    }

    #[test]
    fn from_str_invalid() {
        let result = "maybe".parse::<PowerState>();
        assert!(matches!(result, Err(ValueError::InvalidPowerState(_))));
    }

    #[test]
    fn from_bool() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert_eq!(PowerState::from(false), PowerState::Off);
    }

    #[test]
    fn default_is_off() {
        assert_eq!(PowerState::default(), PowerState::Off);
    }
}
