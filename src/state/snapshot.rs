// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Externally-shaped status records.
//!
//! A [`StatusSnapshot`] carries the device's attributes the way the wire
//! level reports them: categorical values as raw strings, temperatures as
//! plain numbers. Everything crossing back into the engine is canonicalized
//! through the domain types' `FromStr` impls, so `"OFF"`, `"off"` and `"0"`
//! all reconcile to the same symbolic value and never produce a spurious
//! change.

use chrono::{DateTime, Utc};

use crate::error::{ParseError, ValueError};
use crate::types::{Celsius, FanSpeed, Feature, OperationMode, PowerState, SwingMode, Toggle};

use super::{DeviceState, StateDelta};

/// A status record as exchanged with the device client.
///
/// # Examples
///
/// ```
/// use climsync::state::{DeviceState, StatusSnapshot};
///
/// let json = r#"{
///     "power": "ON",
///     "mode": "cool",
///     "fan_speed": "medium",
///     "swing": "off",
///     "turbo": "off",
///     "sleep": "off",
///     "eco": "off",
///     "display": "on",
///     "beeper": "on",
///     "target_temperature": 22.0,
///     "current_temperature": 25.5,
///     "outdoor_temperature": 31.0
/// }"#;
///
/// let snapshot = StatusSnapshot::from_json(json).unwrap();
/// let delta = snapshot.to_delta(&DeviceState::default()).unwrap();
/// assert!(!delta.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatusSnapshot {
    /// Raw power state.
    pub power: String,
    /// Raw operation mode.
    pub mode: String,
    /// Raw fan speed.
    pub fan_speed: String,
    /// Raw swing mode.
    pub swing: String,
    /// Raw turbo toggle.
    pub turbo: String,
    /// Raw sleep toggle.
    pub sleep: String,
    /// Raw eco toggle.
    pub eco: String,
    /// Raw display toggle.
    pub display: String,
    /// Raw beeper toggle.
    pub beeper: String,
    /// Target temperature in Celsius.
    pub target_temperature: f32,
    /// Current temperature in Celsius.
    pub current_temperature: f32,
    /// Outdoor temperature in Celsius. Absent, zero or NaN all mean the
    /// unit has no outdoor sensor reading.
    #[serde(default)]
    pub outdoor_temperature: Option<f32>,
    /// When this record was produced.
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl StatusSnapshot {
    /// Builds the snapshot for a canonical device state.
    #[must_use]
    pub fn from_state(state: &DeviceState) -> Self {
        Self {
            power: state.power().as_str().to_string(),
            mode: state.mode().as_str().to_string(),
            fan_speed: state.fan_speed().as_str().to_string(),
            swing: state.swing().as_str().to_string(),
            turbo: state.feature(Feature::Turbo).as_str().to_string(),
            sleep: state.feature(Feature::Sleep).as_str().to_string(),
            eco: state.feature(Feature::Eco).as_str().to_string(),
            display: state.feature(Feature::Display).as_str().to_string(),
            beeper: state.feature(Feature::Beeper).as_str().to_string(),
            target_temperature: state.target_temperature().value(),
            current_temperature: state.current_temperature().value(),
            outdoor_temperature: state.outdoor_temperature().map(|c| c.value()),
            fetched_at: Utc::now(),
        }
    }

    /// Parses a JSON status payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the payload is not a valid status
    /// record.
    pub fn from_json(payload: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Canonicalizes every field and returns the delta against `current`.
    ///
    /// The whole snapshot is parsed before anything is compared: a record
    /// with any unparseable field is rejected as a unit, so a bad poll can
    /// never merge a torn mix of fields into the state.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidField` naming the first field that could
    /// not be canonicalized.
    pub fn to_delta(&self, current: &DeviceState) -> Result<StateDelta, ParseError> {
        let power = parse_field::<PowerState>(&self.power, "power")?;
        let mode = parse_field::<OperationMode>(&self.mode, "mode")?;
        let fan_speed = parse_field::<FanSpeed>(&self.fan_speed, "fan_speed")?;
        let swing = parse_field::<SwingMode>(&self.swing, "swing")?;
        let turbo = parse_field::<Toggle>(&self.turbo, "turbo")?;
        let sleep = parse_field::<Toggle>(&self.sleep, "sleep")?;
        let eco = parse_field::<Toggle>(&self.eco, "eco")?;
        let display = parse_field::<Toggle>(&self.display, "display")?;
        let beeper = parse_field::<Toggle>(&self.beeper, "beeper")?;
        let target = Celsius::reading(self.target_temperature).map_err(|source| {
            ParseError::InvalidField {
                field: "target_temperature",
                source,
            }
        })?;
        let current_temp = Celsius::reading(self.current_temperature).map_err(|source| {
            ParseError::InvalidField {
                field: "current_temperature",
                source,
            }
        })?;
        let outdoor = self.outdoor_reading();

        let mut delta = StateDelta::new();
        if current.power() != power {
            delta.power = Some(power);
        }
        if current.mode() != mode {
            delta.mode = Some(mode);
        }
        if current.fan_speed() != fan_speed {
            delta.fan_speed = Some(fan_speed);
        }
        if current.swing() != swing {
            delta.swing = Some(swing);
        }
        for (feature, toggle) in [
            (Feature::Turbo, turbo),
            (Feature::Sleep, sleep),
            (Feature::Eco, eco),
            (Feature::Display, display),
            (Feature::Beeper, beeper),
        ] {
            if current.feature(feature) != toggle {
                delta.set_feature(feature, toggle);
            }
        }
        if current.target_temperature() != target {
            delta.target_temperature = Some(target);
        }
        if current.current_temperature() != current_temp {
            delta.current_temperature = Some(current_temp);
        }
        if current.outdoor_temperature() != outdoor {
            delta.outdoor_temperature = Some(outdoor);
        }

        Ok(delta)
    }

    /// Interprets the outdoor field: absent, zero or NaN mean "no reading".
    fn outdoor_reading(&self) -> Option<Celsius> {
        let raw = self.outdoor_temperature?;
        if raw == 0.0 {
            return None;
        }
        Celsius::reading(raw).ok()
    }
}

fn parse_field<T>(raw: &str, field: &'static str) -> Result<T, ParseError>
where
    T: std::str::FromStr<Err = ValueError>,
{
    raw.parse()
        .map_err(|source| ParseError::InvalidField { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_for(state: &DeviceState) -> StatusSnapshot {
        StatusSnapshot::from_state(state)
    }

    #[test]
    fn round_trip_is_a_no_op() {
        let state = DeviceState::default();
        let snapshot = snapshot_for(&state);

        let delta = snapshot.to_delta(&state).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn textual_forms_compare_canonically() {
        let state = DeviceState::default(); // power off, swing off
        let mut snapshot = snapshot_for(&state);
        snapshot.power = "OFF".to_string();
        snapshot.swing = "0".to_string();
        snapshot.eco = "false".to_string();

        let delta = snapshot.to_delta(&state).unwrap();
        assert!(delta.is_empty(), "raw forms of the same value must not diff");
    }

    #[test]
    fn changed_field_is_detected() {
        let state = DeviceState::default();
        let mut snapshot = snapshot_for(&state);
        snapshot.power = "on".to_string();
        snapshot.current_temperature = 26.5;

        let delta = snapshot.to_delta(&state).unwrap();
        assert_eq!(delta.power, Some(PowerState::On));
        assert_eq!(
            delta.current_temperature,
            Some(Celsius::reading(26.5).unwrap())
        );
        assert_eq!(delta.len(), 2);
    }

    #[test]
    fn invalid_field_rejects_whole_snapshot() {
        let state = DeviceState::default();
        let mut snapshot = snapshot_for(&state);
        snapshot.power = "on".to_string();
        snapshot.mode = "defrost".to_string();

        let err = snapshot.to_delta(&state).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidField { field: "mode", .. }
        ));
    }

    #[test]
    fn outdoor_zero_means_no_reading() {
        let state = DeviceState::default();
        let mut snapshot = snapshot_for(&state);
        snapshot.outdoor_temperature = Some(0.0);

        let delta = snapshot.to_delta(&state).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn outdoor_nan_means_no_reading() {
        let state = DeviceState::default();
        let mut snapshot = snapshot_for(&state);
        snapshot.outdoor_temperature = Some(f32::NAN);

        let delta = snapshot.to_delta(&state).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn outdoor_reading_is_picked_up() {
        let state = DeviceState::default();
        let mut snapshot = snapshot_for(&state);
        snapshot.outdoor_temperature = Some(31.5);

        let delta = snapshot.to_delta(&state).unwrap();
        assert_eq!(
            delta.outdoor_temperature,
            Some(Some(Celsius::reading(31.5).unwrap()))
        );
    }

    #[test]
    fn from_json_parses_device_payload() {
        let json = r#"{
            "power": "1",
            "mode": "COOL",
            "fan_speed": "quiet",
            "swing": "v",
            "turbo": "off",
            "sleep": "off",
            "eco": "on",
            "display": "on",
            "beeper": "off",
            "target_temperature": 21.0,
            "current_temperature": 24.0
        }"#;

        let snapshot = StatusSnapshot::from_json(json).unwrap();
        let delta = snapshot.to_delta(&DeviceState::default()).unwrap();

        assert_eq!(delta.power, Some(PowerState::On));
        assert_eq!(delta.mode, Some(OperationMode::Cool));
        assert_eq!(delta.fan_speed, Some(FanSpeed::Silent));
        assert_eq!(delta.swing, Some(SwingMode::Vertical));
        assert_eq!(delta.eco, Some(Toggle::On));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            StatusSnapshot::from_json("not json"),
            Err(ParseError::Json(_))
        ));
    }
}
