use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use kernup_core::UpgradeError;

pub const DEFAULT_SECRET_KEY: &str = "SUDO_PASS";

/// Password handed to the privilege escalation command on stdin.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Reads `key` from a dotenv-style file. A missing file is not an error.
    pub fn from_secret_file(path: &Path, key: &str) -> Result<Option<Self>, UpgradeError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(UpgradeError::io("failed to read secret file", path, err)),
        };
        Ok(parse_secret(&raw, key).map(Self))
    }

    /// Secret file first, then the process environment.
    pub fn load(path: &Path, key: &str) -> Result<Option<Self>, UpgradeError> {
        if let Some(credential) = Self::from_secret_file(path, key)? {
            return Ok(Some(credential));
        }
        Ok(std::env::var(key)
            .ok()
            .filter(|value| !value.is_empty())
            .map(Self))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

pub(crate) fn parse_secret(raw: &str, key: &str) -> Option<String> {
    let mut found = None;
    for line in raw.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim() == key {
            found = Some(unquote(v.trim()).to_string());
        }
    }
    found.filter(|value| !value.is_empty())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
