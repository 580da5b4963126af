// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the climsync engine.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, transport failures reported by the device client, status
//! snapshot parsing, and lifecycle errors from the queue and manager.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error reported by the device client transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while parsing a status snapshot.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The command queue has been disposed and refuses new work.
    #[error("command queue is disposed")]
    QueueDisposed,

    /// The state manager has been stopped.
    #[error("state manager is stopped")]
    ManagerStopped,

    /// No state manager is registered for the requested device.
    #[error("no state manager registered for device")]
    DeviceNotFound,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types with
/// invalid values, or when canonicalizing a raw textual value fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A target temperature is outside the settable range.
    #[error("target temperature {actual}\u{b0}C is out of range [{min}, {max}]")]
    TemperatureOutOfRange {
        /// Minimum settable temperature.
        min: f32,
        /// Maximum settable temperature.
        max: f32,
        /// The actual value that was provided.
        actual: f32,
    },

    /// A temperature reading is NaN or infinite.
    #[error("temperature reading is not a finite number")]
    NonFiniteReading,

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// An invalid operation mode string was provided.
    #[error("invalid operation mode: {0}")]
    InvalidOperationMode(String),

    /// An invalid fan speed string was provided.
    #[error("invalid fan speed: {0}")]
    InvalidFanSpeed(String),

    /// An invalid swing mode string was provided.
    #[error("invalid swing mode: {0}")]
    InvalidSwingMode(String),

    /// An invalid toggle string was provided.
    #[error("invalid toggle value: {0}")]
    InvalidToggle(String),
}

/// Failures reported by the device client transport.
///
/// The wire-level client is outside this crate; this is the failure
/// vocabulary it reports through the [`DeviceClient`](crate::DeviceClient)
/// trait. Variants are cloneable so one failed batch can reject every
/// caller that was merged into it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The network route to the device is unavailable.
    #[error("network unreachable: {0}")]
    Unreachable(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The device acknowledged the request but rejected it.
    #[error("device rejected the request: {0}")]
    Rejected(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing status snapshots.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the status record.
    #[error("missing field in status: {0}")]
    MissingField(String),

    /// A field could not be canonicalized.
    #[error("invalid value for {field}: {source}")]
    InvalidField {
        /// The snapshot field that failed to parse.
        field: &'static str,
        /// The underlying validation failure.
        source: ValueError,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
