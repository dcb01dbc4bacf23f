mod cancel;
mod error;
mod naming;
mod outcome;
mod plan;
mod version;

pub use cancel::CancellationToken;
pub use error::UpgradeError;
pub use naming::display_name;
pub use outcome::{InstallationOutcome, UpgradeReport};
pub use plan::{InstallationPlan, PackageRole, ResolvedPlan};
pub use version::KernelVersion;
