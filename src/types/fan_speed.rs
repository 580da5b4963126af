// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed of the unit.
//!
//! The unit accepts eight symbolic speeds. Front-end adapters typically
//! present a continuous 0-100 "rotation speed" slider, so each symbolic speed
//! maps to a fixed percentage through a static lookup table, and
//! [`FanSpeed::from_percent`] converts a slider position back to the nearest
//! symbolic step.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Symbolic fan speed steps and their fixed rotation-speed percentages.
const PERCENT_TABLE: [(FanSpeed, u8); 8] = [
    (FanSpeed::Auto, 0),
    (FanSpeed::Silent, 15),
    (FanSpeed::Low, 30),
    (FanSpeed::MediumLow, 45),
    (FanSpeed::Medium, 60),
    (FanSpeed::MediumHigh, 75),
    (FanSpeed::High, 90),
    (FanSpeed::Turbo, 100),
];

/// The fan speed of the unit.
///
/// # Examples
///
/// ```
/// use climsync::types::FanSpeed;
///
/// assert_eq!(FanSpeed::Medium.percent(), 60);
/// assert_eq!(FanSpeed::from_percent(60).unwrap(), FanSpeed::Medium);
///
/// // Slider positions snap to the nearest step
/// assert_eq!(FanSpeed::from_percent(33).unwrap(), FanSpeed::Low);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FanSpeed {
    /// The unit chooses the speed.
    #[default]
    Auto,
    /// Quietest setting.
    Silent,
    /// Low speed.
    Low,
    /// Between low and medium.
    MediumLow,
    /// Medium speed.
    Medium,
    /// Between medium and high.
    MediumHigh,
    /// High speed.
    High,
    /// Maximum airflow.
    Turbo,
}

impl FanSpeed {
    /// Maximum rotation-speed percentage.
    pub const MAX_PERCENT: u8 = 100;

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Silent => "silent",
            Self::Low => "low",
            Self::MediumLow => "medium_low",
            Self::Medium => "medium",
            Self::MediumHigh => "medium_high",
            Self::High => "high",
            Self::Turbo => "turbo",
        }
    }

    /// Returns the fixed rotation-speed percentage for this step.
    #[must_use]
    pub fn percent(&self) -> u8 {
        PERCENT_TABLE
            .iter()
            .find(|(speed, _)| speed == self)
            .map_or(0, |(_, percent)| *percent)
    }

    /// Converts a rotation-speed percentage to the nearest symbolic step.
    ///
    /// `0` maps to [`FanSpeed::Auto`]; any other value snaps to the nearest
    /// non-auto step, with ties resolved toward the faster step.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percent` is greater than 100.
    pub fn from_percent(percent: u8) -> Result<Self, ValueError> {
        if percent > Self::MAX_PERCENT {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(Self::MAX_PERCENT),
                actual: u16::from(percent),
            });
        }
        if percent == 0 {
            return Ok(Self::Auto);
        }

        let mut best = Self::Silent;
        let mut best_distance = u8::MAX;
        for (speed, step) in PERCENT_TABLE.iter().skip(1) {
            let distance = step.abs_diff(percent);
            // <= keeps the later (faster) step on a tie
            if distance <= best_distance {
                best = *speed;
                best_distance = distance;
            }
        }
        Ok(best)
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FanSpeed {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "0" => Ok(Self::Auto),
            "silent" | "quiet" | "1" => Ok(Self::Silent),
            "low" | "2" => Ok(Self::Low),
            "medium_low" | "mediumlow" | "medlow" | "3" => Ok(Self::MediumLow),
            "medium" | "mid" | "4" => Ok(Self::Medium),
            "medium_high" | "mediumhigh" | "medhigh" | "5" => Ok(Self::MediumHigh),
            "high" | "6" => Ok(Self::High),
            "turbo" | "max" | "7" => Ok(Self::Turbo),
            _ => Err(ValueError::InvalidFanSpeed(s.to_string())),
        }
    }
}
