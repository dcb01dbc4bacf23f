use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UpgradeError;

/// Upstream kernel release identifier in `major.minor.revision` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelVersion {
    inner: Version,
}

impl KernelVersion {
    pub fn new(major: u64, minor: u64, revision: u64) -> Self {
        Self {
            inner: Version::new(major, minor, revision),
        }
    }

    pub fn parse(input: &str) -> Result<Self, UpgradeError> {
        let raw = input.trim();
        let tokens = raw.split('.').collect::<Vec<_>>();
        if tokens.len() != 3 {
            return Err(UpgradeError::VersionParse(format!(
                "expected three dot-separated components, found {} in '{raw}'",
                tokens.len()
            )));
        }
        if let Some(bad) = tokens
            .iter()
            .find(|token| token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(UpgradeError::VersionParse(format!(
                "component '{bad}' of '{raw}' is not a non-negative integer"
            )));
        }

        let inner = Version::parse(raw)
            .map_err(|err| UpgradeError::VersionParse(format!("'{raw}': {err}")))?;
        Ok(Self { inner })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn revision(&self) -> u64 {
        self.inner.patch
    }

    /// Directory name used by the mainline archive, e.g. `v6.2.1`.
    pub fn mainline_tag(&self) -> String {
        format!("v{self}")
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.inner.major, self.inner.minor, self.inner.patch
        )
    }
}

impl FromStr for KernelVersion {
    type Err = UpgradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for KernelVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KernelVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
