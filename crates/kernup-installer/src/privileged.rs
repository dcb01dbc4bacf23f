use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

use kernup_core::UpgradeError;
use tracing::{debug, warn};

use crate::credential::Credential;

pub const DEFAULT_INSTALL_COMMAND: [&str; 4] = ["sudo", "-S", "dpkg", "-i"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallExit {
    pub code: Option<i32>,
    pub stderr: String,
}

impl InstallExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait PackageInstall {
    fn install(&self, artifact: &Path) -> Result<InstallExit, UpgradeError>;
}

impl<T: PackageInstall + ?Sized> PackageInstall for &T {
    fn install(&self, artifact: &Path) -> Result<InstallExit, UpgradeError> {
        (**self).install(artifact)
    }
}

/// Runs the package install command once per artifact, feeding the
/// credential on stdin.
#[derive(Debug, Clone)]
pub struct PrivilegedInstaller {
    argv: Vec<String>,
    credential: Option<Credential>,
}

impl PrivilegedInstaller {
    pub fn new(argv: Vec<String>, credential: Option<Credential>) -> Self {
        Self { argv, credential }
    }
}

pub(crate) fn build_install_command(argv: &[String], artifact: &Path) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let mut command = Command::new(program);
    command.args(args).arg(artifact);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    Some(command)
}

impl PackageInstall for PrivilegedInstaller {
    fn install(&self, artifact: &Path) -> Result<InstallExit, UpgradeError> {
        let filename = artifact.display().to_string();
        let mut command =
            build_install_command(&self.argv, artifact).ok_or_else(|| {
                UpgradeError::LaunchFailure {
                    filename: filename.clone(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "install command is empty"),
                }
            })?;
        command
            .stdin(if self.credential.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("installation start: {filename}");
        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| UpgradeError::LaunchFailure {
            filename: filename.clone(),
            source,
        })?;

        if let (Some(credential), Some(mut stdin)) = (&self.credential, child.stdin.take()) {
            if let Err(err) = writeln!(stdin, "{}", credential.expose()) {
                if err.kind() != io::ErrorKind::BrokenPipe {
                    warn!("failed to pass credential to installer: {err}");
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|err| UpgradeError::io("failed to wait for installer", artifact, err))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            code = ?output.status.code(),
            "installation end: {filename} in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        if !stdout.trim().is_empty() {
            debug!("installer stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("installer stderr: {}", stderr.trim());
        }

        Ok(InstallExit {
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        })
    }
}
