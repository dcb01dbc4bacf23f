use kernup_core::{
    display_name, CancellationToken, InstallationOutcome, KernelVersion, PackageRole,
    ResolvedPlan, UpgradeError, UpgradeReport,
};
use kernup_resolver::{PlanLookup, VersionLookup};
use tracing::{info, warn};

use crate::fetch::ArtifactFetch;
use crate::privileged::{InstallExit, PackageInstall};

/// What to do with the remaining plan steps after an install reports failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Attempt every remaining step; later roles may install against a
    /// missing dependency.
    #[default]
    Continue,
    HaltOnFailure,
}

pub struct UpgradeOrchestrator<V, P, F, I> {
    versions: V,
    plans: P,
    fetcher: F,
    installer: I,
    policy: FailurePolicy,
    cancel: CancellationToken,
}

impl<V, P, F, I> UpgradeOrchestrator<V, P, F, I>
where
    V: VersionLookup,
    P: PlanLookup,
    F: ArtifactFetch,
    I: PackageInstall,
{
    pub fn new(versions: V, plans: P, fetcher: F, installer: I) -> Self {
        Self {
            versions,
            plans,
            fetcher,
            installer,
            policy: FailurePolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolves the version and a complete plan without touching the system.
    pub fn plan(&self, arch: &str) -> Result<(KernelVersion, ResolvedPlan), UpgradeError> {
        let version = self.versions.latest()?;
        let plan = self.plans.resolve(&version, arch)?.into_resolved()?;
        Ok((version, plan))
    }

    pub fn run(&self, arch: &str) -> Result<UpgradeReport, UpgradeError> {
        let (version, plan) = self.plan(arch)?;
        let mut outcomes = Vec::with_capacity(PackageRole::ALL.len());
        let mut first_failure: Option<PackageRole> = None;

        for (role, filename) in plan.entries() {
            if self.cancel.is_cancelled() {
                return Err(UpgradeError::Cancelled {
                    completed: outcomes.len(),
                });
            }
            if let Some(failed) = first_failure {
                warn!(
                    "installing {} although {failed} failed to install",
                    display_name(filename)
                );
            }

            let fetched = self.fetcher.fetch(&version, filename)?;
            if self.cancel.is_cancelled() {
                return Err(UpgradeError::Cancelled {
                    completed: outcomes.len(),
                });
            }
            let exit = self.installer.install(&fetched.path)?;
            let outcome = InstallationOutcome::from_exit_code(role, filename, exit.code);

            match check_exit(filename, &exit) {
                Ok(()) => info!("installation success for {}", display_name(filename)),
                Err(err) if err.is_recoverable() => {
                    warn!("installation may have failed: {err}");
                    if !exit.stderr.is_empty() {
                        warn!("installer output: {}", exit.stderr);
                    }
                    first_failure.get_or_insert(role);
                }
                Err(err) => return Err(err),
            }
            outcomes.push(outcome);

            if first_failure.is_some()
                && self.policy == FailurePolicy::HaltOnFailure
                && outcomes.len() < PackageRole::ALL.len()
            {
                warn!("halting upgrade after failed {role} install");
                break;
            }
        }

        Ok(UpgradeReport::new(version, outcomes))
    }
}

fn check_exit(filename: &str, exit: &InstallExit) -> Result<(), UpgradeError> {
    if exit.success() {
        Ok(())
    } else {
        Err(UpgradeError::NonZeroExit {
            filename: filename.to_string(),
            code: exit.code,
        })
    }
}
