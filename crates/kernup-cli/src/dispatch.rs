use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::CommandFactory;
use kernup_core::{KernelVersion, PackageRole, ResolvedPlan, UpgradeError};
use kernup_installer::{
    ArtifactFetcher, Credential, FailurePolicy, PrivilegedInstaller, UpgradeOrchestrator,
    DEFAULT_SECRET_KEY,
};
use kernup_resolver::{PackageSetResolver, PinnedVersion, VersionLookup, VersionResolver};
use kernup_source::HttpSource;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cli::{Cli, Commands};
use crate::config::{FileConfig, Settings};
use crate::interrupt::install_interrupt_handler;
use crate::logging::init_logging;
use crate::render::{
    current_output_style, format_plan_lines, outcome_statuses, print_lines, print_status,
    safety_delay, summary_statuses,
};

const INTERRUPTED_EXIT: u8 = 130;

type Orchestrator<'a> = UpgradeOrchestrator<
    Box<dyn VersionLookup + 'a>,
    PackageSetResolver<&'a HttpSource>,
    ArtifactFetcher<&'a HttpSource>,
    PrivilegedInstaller,
>;

#[derive(Debug, Serialize)]
pub(crate) struct PlanView<'a> {
    pub(crate) version: &'a KernelVersion,
    pub(crate) arch: &'a str,
    pub(crate) packages: Vec<PlanEntryView<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlanEntryView<'a> {
    pub(crate) role: PackageRole,
    pub(crate) filename: &'a str,
}

impl<'a> PlanView<'a> {
    pub(crate) fn new(version: &'a KernelVersion, arch: &'a str, plan: &'a ResolvedPlan) -> Self {
        Self {
            version,
            arch,
            packages: plan
                .entries()
                .map(|(role, filename)| PlanEntryView { role, filename })
                .collect(),
        }
    }
}

pub(crate) fn run_cli(cli: Cli) -> Result<ExitCode> {
    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "kernup", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = FileConfig::load(cli.global.config.as_deref())?;
    let settings = Settings::resolve(file_config, &cli.global);
    let log_file = match cli.command {
        Commands::Upgrade { .. } => settings.log_file.as_deref(),
        _ => None,
    };
    init_logging(&settings.log_level, log_file)?;

    let http = HttpSource::new(settings.http_timeout)?;

    match cli.command {
        Commands::Latest => {
            let version = VersionResolver::new(&http, settings.site.clone()).latest()?;
            println!("{version}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Plan {
            kernel_version,
            json,
        } => {
            let orchestrator = build_orchestrator(&settings, &http, kernel_version, None);
            let (version, plan) = orchestrator.plan(&settings.arch)?;
            if json {
                let view = PlanView::new(&version, &settings.arch, &plan);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&view).context("failed to encode plan")?
                );
            } else {
                print_lines(&format_plan_lines(&version, &settings.arch, &plan));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Upgrade {
            kernel_version,
            yes,
            delay,
            dry_run,
            halt_on_failure,
            secret_file,
        } => {
            let secret_file = secret_file.unwrap_or_else(|| settings.secret_file.clone());
            let credential = Credential::load(&secret_file, DEFAULT_SECRET_KEY)?;
            if credential.is_none() && settings.installer_uses_sudo() {
                warn!(
                    "no {DEFAULT_SECRET_KEY} found in {} or the environment; sudo may refuse to run",
                    secret_file.display()
                );
            }

            let policy = if halt_on_failure || settings.halt_on_failure {
                FailurePolicy::HaltOnFailure
            } else {
                FailurePolicy::Continue
            };
            let cancel = install_interrupt_handler();
            let orchestrator = build_orchestrator(&settings, &http, kernel_version, credential)
                .with_policy(policy)
                .with_cancellation(cancel.clone());

            let style = current_output_style();
            if dry_run {
                let (version, plan) = orchestrator.plan(&settings.arch)?;
                print_lines(&format_plan_lines(&version, &settings.arch, &plan));
                return Ok(ExitCode::SUCCESS);
            }

            let delay = delay.map(Duration::from_secs).unwrap_or(settings.delay);
            if !yes && !delay.is_zero() {
                warn!("if you do not want to upgrade your kernel, press Ctrl+C now");
                warn!("waiting {} seconds before starting", delay.as_secs());
                if !safety_delay(delay, &cancel, style) {
                    warn!("upgrade cancelled before any changes were made");
                    return Ok(ExitCode::from(INTERRUPTED_EXIT));
                }
            }

            info!("beginning kernel upgrade for {}", settings.arch);
            let started = Instant::now();
            let report = match orchestrator.run(&settings.arch) {
                Ok(report) => report,
                Err(UpgradeError::Cancelled { completed }) => {
                    warn!("upgrade interrupted after {completed} of 4 packages; the system may be partially upgraded");
                    return Ok(ExitCode::from(INTERRUPTED_EXIT));
                }
                Err(err) => {
                    error!("{err}");
                    return Err(err.into());
                }
            };

            for (status, message) in outcome_statuses(&report)
                .into_iter()
                .chain(summary_statuses(&report, log_file))
            {
                print_status(style, status, &message);
            }
            info!(
                "total time elapsed: {:.2} seconds",
                started.elapsed().as_secs_f64()
            );

            Ok(if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn build_orchestrator<'a>(
    settings: &Settings,
    http: &'a HttpSource,
    kernel_version: Option<KernelVersion>,
    credential: Option<Credential>,
) -> Orchestrator<'a> {
    let versions: Box<dyn VersionLookup + 'a> = match kernel_version {
        Some(version) => Box::new(PinnedVersion(version)),
        None => Box::new(VersionResolver::new(http, settings.site.clone())),
    };
    let plans =
        PackageSetResolver::new(http, settings.site.clone()).with_flavor(settings.flavor.clone());
    let fetcher = ArtifactFetcher::new(http, settings.site.clone(), settings.work_dir.clone());
    let installer = PrivilegedInstaller::new(settings.installer.clone(), credential);
    UpgradeOrchestrator::new(versions, plans, fetcher, installer)
}
