use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use kernup_installer::DEFAULT_INSTALL_COMMAND;
use kernup_resolver::DEFAULT_FLAVOR;
use kernup_source::{MainlineSite, DEFAULT_INDEX_URL, DEFAULT_MAINLINE_URL};
use serde::Deserialize;

use crate::cli::GlobalArgs;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "kernup.toml";
pub(crate) const DEFAULT_ARCH: &str = "amd64";
pub(crate) const DEFAULT_LOG_FILE: &str = "kern_upgrade.log";
pub(crate) const DEFAULT_SECRET_FILE: &str = ".env";
pub(crate) const DEFAULT_DELAY_SECS: u64 = 15;
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// On-disk `kernup.toml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) arch: Option<String>,
    pub(crate) flavor: Option<String>,
    pub(crate) index_url: Option<String>,
    pub(crate) mainline_url: Option<String>,
    pub(crate) work_dir: Option<PathBuf>,
    pub(crate) installer: Option<Vec<String>>,
    pub(crate) secret_file: Option<PathBuf>,
    pub(crate) delay_secs: Option<u64>,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) log_level: Option<String>,
    pub(crate) http_timeout_secs: Option<u64>,
    pub(crate) halt_on_failure: Option<bool>,
}

impl FileConfig {
    pub(crate) fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse kernup config")
    }

    /// An explicit path must exist; the default file is optional.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config file: {}", path.display()))
    }
}

/// Effective settings after layering CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) arch: String,
    pub(crate) flavor: String,
    pub(crate) site: MainlineSite,
    pub(crate) work_dir: PathBuf,
    pub(crate) installer: Vec<String>,
    pub(crate) secret_file: PathBuf,
    pub(crate) delay: Duration,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) log_level: String,
    pub(crate) http_timeout: Option<Duration>,
    pub(crate) halt_on_failure: bool,
}

impl Settings {
    pub(crate) fn resolve(file: FileConfig, args: &GlobalArgs) -> Self {
        let log_level = match args.verbose {
            0 => file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
        let log_file = if args.no_log_file {
            None
        } else {
            Some(
                args.log_file
                    .clone()
                    .or(file.log_file)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            )
        };

        Self {
            arch: args
                .arch
                .clone()
                .or(file.arch)
                .unwrap_or_else(|| DEFAULT_ARCH.to_string()),
            flavor: args
                .flavor
                .clone()
                .or(file.flavor)
                .unwrap_or_else(|| DEFAULT_FLAVOR.to_string()),
            site: MainlineSite::new(
                file.index_url
                    .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
                file.mainline_url
                    .unwrap_or_else(|| DEFAULT_MAINLINE_URL.to_string()),
            ),
            work_dir: args
                .work_dir
                .clone()
                .or(file.work_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            installer: file
                .installer
                .filter(|argv| !argv.is_empty())
                .unwrap_or_else(|| {
                    DEFAULT_INSTALL_COMMAND
                        .iter()
                        .map(|arg| arg.to_string())
                        .collect()
                }),
            secret_file: file
                .secret_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_FILE)),
            delay: Duration::from_secs(file.delay_secs.unwrap_or(DEFAULT_DELAY_SECS)),
            log_file,
            log_level,
            http_timeout: file.http_timeout_secs.map(Duration::from_secs),
            halt_on_failure: file.halt_on_failure.unwrap_or(false),
        }
    }

    pub(crate) fn installer_uses_sudo(&self) -> bool {
        self.installer
            .first()
            .and_then(|program| Path::new(program).file_name())
            .is_some_and(|name| name == "sudo")
    }
}
