//! Schema versions of persisted shapes

use crate::error::ModelError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Latest chart config schema
pub const CHART_CONFIG_VERSION: SchemaVersion = SchemaVersion::new(4, 0, 0);

/// Latest configurator state schema
pub const CONFIGURATOR_STATE_VERSION: SchemaVersion = SchemaVersion::new(3, 2, 0);

/// `major.minor.patch` version tag, ordered numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Patch component
    pub patch: u32,
}

impl SchemaVersion {
    /// Construct a version
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version assumed for documents that predate the version tag
    pub const UNVERSIONED: SchemaVersion = SchemaVersion::new(1, 0, 0);
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u32, ModelError> {
            parts
                .next()
                .ok_or_else(|| ModelError::InvalidVersion(s.to_string()))?
                .parse::<u32>()
                .map_err(|_| ModelError::InvalidVersion(s.to_string()))
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(ModelError::InvalidVersion(s.to_string()));
        }
        Ok(version)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_and_displays() {
        let v: SchemaVersion = "3.10.2".parse().unwrap();
        assert_eq!(v, SchemaVersion::new(3, 10, 2));
        assert_eq!(v.to_string(), "3.10.2");
    }

    #[test]
    fn orders_numerically() {
        let a: SchemaVersion = "2.9.0".parse().unwrap();
        let b: SchemaVersion = "2.10.0".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn rejects_malformed() {
        assert!("3.0".parse::<SchemaVersion>().is_err());
        assert!("3.0.0.1".parse::<SchemaVersion>().is_err());
        assert!("v3.0.0".parse::<SchemaVersion>().is_err());
    }

    proptest! {
        #[test]
        fn parsed_versions_order_by_their_numbers(
            a in (0u32..20, 0u32..20, 0u32..20),
            b in (0u32..20, 0u32..20, 0u32..20),
        ) {
            let va: SchemaVersion = format!("{}.{}.{}", a.0, a.1, a.2).parse().unwrap();
            let vb: SchemaVersion = format!(" {}.{}.{} ", b.0, b.1, b.2).parse().unwrap();
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        }

        #[test]
        fn non_numeric_parts_are_rejected(part in "[a-z]{1,4}") {
            let version = format!("1.{part}.0");
            prop_assert!(version.parse::<SchemaVersion>().is_err());
        }
    }
}
