// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operation mode of the unit.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// The operation mode of the unit.
///
/// # Examples
///
/// ```
/// use climsync::types::OperationMode;
///
/// let mode: OperationMode = "cool".parse().unwrap();
/// assert_eq!(mode, OperationMode::Cool);
///
/// // "fan", "fanonly" and "fan_only" all canonicalize to FanOnly
/// assert_eq!("fan".parse::<OperationMode>().unwrap(), OperationMode::FanOnly);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// The unit chooses between cooling and heating automatically.
    #[default]
    Auto,
    /// Cooling.
    Cool,
    /// Heating.
    Heat,
    /// Dehumidify without a target temperature.
    Dry,
    /// Circulate air only.
    FanOnly,
}

impl OperationMode {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cool => "cool",
            Self::Heat => "heat",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "0" => Ok(Self::Auto),
            "cool" | "cooling" | "1" => Ok(Self::Cool),
            "heat" | "heating" | "2" => Ok(Self::Heat),
            "dry" | "dehumidify" | "3" => Ok(Self::Dry),
            "fan_only" | "fanonly" | "fan" | "4" => Ok(Self::FanOnly),
            _ => Err(ValueError::InvalidOperationMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str() {
        assert_eq!(OperationMode::Auto.as_str(), "auto");
        assert_eq!(OperationMode::FanOnly.as_str(), "fan_only");
    }

    #[test]
    fn from_str_aliases() {
        assert_eq!("COOL".parse::<OperationMode>().unwrap(), OperationMode::Cool);
        assert_eq!(
            "heating".parse::<OperationMode>().unwrap(),
            OperationMode::Heat
        );
        assert_eq!(
            "fanonly".parse::<OperationMode>().unwrap(),
            OperationMode::FanOnly
        );
        assert_eq!(
            "fan_only".parse::<OperationMode>().unwrap(),
            OperationMode::FanOnly
        );
        assert_eq!("3".parse::<OperationMode>().unwrap(), OperationMode::Dry);
    }

    #[test]
    fn from_str_invalid() {
        let result = "freeze".parse::<OperationMode>();
        assert!(matches!(result, Err(ValueError::InvalidOperationMode(_))));
    }

    #[test]
    fn canonical_round_trip() {
        for mode in [
            OperationMode::Auto,
            OperationMode::Cool,
            OperationMode::Heat,
            OperationMode::Dry,
            OperationMode::FanOnly,
        ] {
            assert_eq!(mode.as_str().parse::<OperationMode>().unwrap(), mode);
        }
    }
}
