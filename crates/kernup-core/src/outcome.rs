use serde::Serialize;

use crate::plan::PackageRole;
use crate::version::KernelVersion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationOutcome {
    pub role: PackageRole,
    pub filename: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl InstallationOutcome {
    pub fn from_exit_code(role: PackageRole, filename: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            role,
            filename: filename.into(),
            success: code == Some(0),
            exit_code: code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    pub version: KernelVersion,
    pub outcomes: Vec<InstallationOutcome>,
    pub success: bool,
}

impl UpgradeReport {
    pub fn new(version: KernelVersion, outcomes: Vec<InstallationOutcome>) -> Self {
        let success = outcomes.len() == PackageRole::ALL.len()
            && outcomes.iter().all(|outcome| outcome.success);
        Self {
            version,
            outcomes,
            success,
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &InstallationOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.success)
    }
}
