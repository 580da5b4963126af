// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

/// Identity of one physical unit.
///
/// The identity comes from configuration (typically the host address that
/// discovery produced, or a serial number) and is stable across the process
/// lifetime: asking the registry for the same identity twice returns the
/// same state manager, which is what keeps every adapter on one shared
/// state instance.
///
/// # Examples
///
/// ```
/// use climsync::event::DeviceId;
///
/// let id = DeviceId::new("192.168.1.40");
/// assert_eq!(id.as_str(), "192.168.1.40");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Returns the identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(identity: &str) -> Self {
        Self::new(identity)
    }
}

impl From<String> for DeviceId {
    fn from(identity: String) -> Self {
        Self(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_identity_compares_equal() {
        let id1 = DeviceId::new("192.168.1.40");
        let id2 = DeviceId::from("192.168.1.40");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_identities_differ() {
        assert_ne!(DeviceId::new("192.168.1.40"), DeviceId::new("192.168.1.41"));
    }

    #[test]
    fn display_format() {
        let id = DeviceId::new("ac-bedroom");
        assert_eq!(id.to_string(), "ac-bedroom");
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(DeviceId::new("a"));
        set.insert(DeviceId::new("b"));
        set.insert(DeviceId::new("a"));

        assert_eq!(set.len(), 2);
    }
}
