use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::plan::PackageRole;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("failed to determine kernel version: {0}")]
    VersionParse(String),

    #[error("{}", describe_incomplete_plan(.missing, .ambiguous))]
    IncompletePlan {
        missing: Vec<PackageRole>,
        ambiguous: Vec<String>,
    },

    #[error("request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("failed to fetch artifact '{filename}': {message}")]
    Fetch { filename: String, message: String },

    #[error("failed to launch installer for '{filename}': {source}")]
    LaunchFailure {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("installer exited with {} for '{filename}'", describe_exit_code(.code))]
    NonZeroExit { filename: String, code: Option<i32> },

    #[error("upgrade interrupted after {completed} of 4 artifacts")]
    Cancelled { completed: usize },

    #[error("{context}: {}", .path.display())]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UpgradeError {
    pub fn io(context: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.into(),
            source,
        }
    }

    /// Errors after which the remaining plan steps are still attempted.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonZeroExit { .. })
    }
}

fn describe_incomplete_plan(missing: &[PackageRole], ambiguous: &[String]) -> String {
    let roles = missing
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if ambiguous.is_empty() {
        format!("installation plan is incomplete; unresolved roles: {roles}")
    } else {
        format!(
            "installation plan is incomplete; unresolved roles: {roles} (ambiguous candidates: {})",
            ambiguous.join(", ")
        )
    }
}

fn describe_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
