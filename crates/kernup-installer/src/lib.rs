mod credential;
mod fetch;
mod fs_utils;
mod privileged;
mod upgrade;

pub use credential::{Credential, DEFAULT_SECRET_KEY};
pub use fetch::{ArtifactFetch, ArtifactFetcher, FetchedArtifact};
pub use fs_utils::remove_file_if_exists;
pub use privileged::{InstallExit, PackageInstall, PrivilegedInstaller, DEFAULT_INSTALL_COMMAND};
pub use upgrade::{FailurePolicy, UpgradeOrchestrator};
