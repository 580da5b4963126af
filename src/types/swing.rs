// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Louver swing mode of the unit.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// The louver swing mode of the unit.
///
/// # Examples
///
/// ```
/// use climsync::types::SwingMode;
///
/// assert_eq!("vertical".parse::<SwingMode>().unwrap(), SwingMode::Vertical);
/// assert_eq!("BOTH".parse::<SwingMode>().unwrap(), SwingMode::Both);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SwingMode {
    /// Louvers are fixed.
    #[default]
    Off,
    /// Vertical oscillation.
    Vertical,
    /// Horizontal oscillation.
    Horizontal,
    /// Both axes oscillate.
    Both,
}

impl SwingMode {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Both => "both",
        }
    }

    /// Returns `true` if any axis is oscillating.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for SwingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SwingMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" => Ok(Self::Off),
            "vertical" | "v" | "1" => Ok(Self::Vertical),
            "horizontal" | "h" | "2" => Ok(Self::Horizontal),
            "both" | "all" | "3" => Ok(Self::Both),
            _ => Err(ValueError::InvalidSwingMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str() {
        assert_eq!(SwingMode::Off.as_str(), "off");
        assert_eq!(SwingMode::Both.as_str(), "both");
    }

    #[test]
    fn from_str_aliases() {
        assert_eq!("v".parse::<SwingMode>().unwrap(), SwingMode::Vertical);
        assert_eq!("H".parse::<SwingMode>().unwrap(), SwingMode::Horizontal);
        assert_eq!("all".parse::<SwingMode>().unwrap(), SwingMode::Both);
        assert_eq!("none".parse::<SwingMode>().unwrap(), SwingMode::Off);
    }

    #[test]
    fn from_str_invalid() {
        assert!(matches!(
            "diagonal".parse::<SwingMode>(),
            Err(ValueError::InvalidSwingMode(_))
        ));
    }

    #[test]
    fn is_active() {
        assert!(!SwingMode::Off.is_active());
        assert!(SwingMode::Vertical.is_active());
        assert!(SwingMode::Both.is_active());
    }
}
