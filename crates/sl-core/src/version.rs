//! Semantic schema version (`major.minor.patch`).

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// A dotted-triple schema version.
///
/// Ordering is component-wise numeric, so `1.10.0` sorts after `1.9.0`.
/// Field order matters: the derived `Ord` compares `major`, then `minor`,
/// then `patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// The version reported when nothing has been installed yet.
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `MAJOR`, `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`.
    ///
    /// Missing components default to 0 and a single leading `v` is accepted,
    /// so `"v1.2"` parses as `1.2.0`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(invalid("version is empty"));
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for component in body.split('.') {
            if count == parts.len() {
                return Err(invalid("expected at most three components"));
            }
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("components must be non-negative integers"));
            }
            parts[count] = component
                .parse()
                .map_err(|_| invalid("component is too large"))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Returns `true` for `0.0.0`.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl serde::Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // YAML reads a bare `1` as an integer. A bare `1.10` is a float and
        // would lose its trailing zero, so floats are refused.
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        let text = match raw {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) if n.is_u64() => n.to_string(),
            serde_yaml::Value::Number(n) => {
                return Err(serde::de::Error::custom(format!(
                    "version {n} must be quoted (e.g. \"{n}\") or written as MAJOR.MINOR.PATCH"
                )))
            }
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a version string, found {other:?}"
                )))
            }
        };
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
