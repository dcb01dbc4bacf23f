use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use kernup_core::KernelVersion;

#[derive(Parser, Debug)]
#[command(name = "kernup", version)]
#[command(
    about = "Install the latest mainline Linux kernel on Debian-family systems",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct GlobalArgs {
    /// Configuration file (defaults to ./kernup.toml when present).
    #[arg(long, global = true, env = "KERNUP_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// Debian architecture to install, e.g. amd64 or arm64.
    #[arg(long, global = true)]
    pub(crate) arch: Option<String>,
    /// Kernel flavor to match in package names.
    #[arg(long, global = true)]
    pub(crate) flavor: Option<String>,
    /// Directory that downloaded packages are written to.
    #[arg(long, global = true)]
    pub(crate) work_dir: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,
    #[arg(long, global = true)]
    pub(crate) log_file: Option<PathBuf>,
    #[arg(long, global = true, conflicts_with = "log_file")]
    pub(crate) no_log_file: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Print the latest stable kernel version.
    Latest,
    /// Resolve and print the packages that would be installed.
    Plan {
        #[arg(long, value_parser = parse_kernel_version)]
        kernel_version: Option<KernelVersion>,
        #[arg(long)]
        json: bool,
    },
    /// Download and install the kernel packages.
    Upgrade {
        #[arg(long, value_parser = parse_kernel_version)]
        kernel_version: Option<KernelVersion>,
        /// Skip the safety delay before installing.
        #[arg(short, long)]
        yes: bool,
        /// Seconds to wait before installing.
        #[arg(long)]
        delay: Option<u64>,
        #[arg(long)]
        dry_run: bool,
        /// Stop after the first package that fails to install.
        #[arg(long)]
        halt_on_failure: bool,
        /// Dotenv-style file holding SUDO_PASS.
        #[arg(long)]
        secret_file: Option<PathBuf>,
    },
    /// Print a shell completion script.
    Completions { shell: Shell },
}

fn parse_kernel_version(value: &str) -> Result<KernelVersion, String> {
    KernelVersion::parse(value).map_err(|err| err.to_string())
}
