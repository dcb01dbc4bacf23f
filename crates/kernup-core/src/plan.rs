use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::UpgradeError;

/// Installation roles in the order the package manager requires them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PackageRole {
    HeadersCommon,
    HeadersArch,
    Modules,
    Image,
}

impl PackageRole {
    pub const ALL: [PackageRole; 4] = [
        Self::HeadersCommon,
        Self::HeadersArch,
        Self::Modules,
        Self::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeadersCommon => "headers-common",
            Self::HeadersArch => "headers-arch",
            Self::Modules => "modules",
            Self::Image => "image",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::HeadersCommon => 0,
            Self::HeadersArch => 1,
            Self::Modules => 2,
            Self::Image => 3,
        }
    }
}

impl fmt::Display for PackageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four role slots, each either resolved to a filename or still open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationPlan {
    slots: [Option<String>; 4],
}

impl InstallationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the slot for `role`, returning the filename it replaced.
    pub fn assign(&mut self, role: PackageRole, filename: impl Into<String>) -> Option<String> {
        self.slots[role.index()].replace(filename.into())
    }

    pub fn get(&self, role: PackageRole) -> Option<&str> {
        self.slots[role.index()].as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn missing_roles(&self) -> Vec<PackageRole> {
        PackageRole::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    pub fn slots(&self) -> impl Iterator<Item = (PackageRole, Option<&str>)> + '_ {
        PackageRole::ALL
            .into_iter()
            .map(|role| (role, self.get(role)))
    }

    pub fn into_resolved(self) -> Result<ResolvedPlan, UpgradeError> {
        let missing = self.missing_roles();
        match self.slots {
            [Some(headers_common), Some(headers_arch), Some(modules), Some(image)] => {
                Ok(ResolvedPlan {
                    filenames: [headers_common, headers_arch, modules, image],
                })
            }
            _ => Err(UpgradeError::IncompletePlan {
                missing,
                ambiguous: Vec::new(),
            }),
        }
    }
}

/// A plan with every role filled; the only shape the installer accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPlan {
    filenames: [String; 4],
}

impl ResolvedPlan {
    pub fn filename(&self, role: PackageRole) -> &str {
        &self.filenames[role.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = (PackageRole, &str)> + '_ {
        PackageRole::ALL
            .into_iter()
            .map(|role| (role, self.filename(role)))
    }
}
