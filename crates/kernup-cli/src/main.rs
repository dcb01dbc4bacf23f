use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod dispatch;
mod interrupt;
mod logging;
mod render;

use crate::cli::Cli;
use crate::dispatch::run_cli;

fn main() -> Result<ExitCode> {
    run_cli(Cli::parse())
}
