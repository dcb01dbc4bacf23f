use std::io::IsTerminal;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use kernup_core::{display_name, CancellationToken, KernelVersion, ResolvedPlan, UpgradeReport};

const DELAY_POLL: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "fail" => "[FAIL]",
        _ => "[INFO]",
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "fail" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

pub(crate) fn print_status(style: OutputStyle, status: &str, message: &str) {
    match style {
        OutputStyle::Plain => println!("{}", render_status_line(style, status, message)),
        OutputStyle::Rich => println!(
            "{} {message}",
            colorize(status_style(status), status_badge(status))
        ),
    }
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub(crate) fn format_plan_lines(version: &KernelVersion, arch: &str, plan: &ResolvedPlan) -> Vec<String> {
    let mut lines = vec![format!("kernel: v{version} ({arch})")];
    for (position, (role, filename)) in plan.entries().enumerate() {
        lines.push(format!("{}. {role}: {filename}", position + 1));
    }
    lines
}

/// One `(status, message)` pair per recorded outcome, in install order.
pub(crate) fn outcome_statuses(report: &UpgradeReport) -> Vec<(&'static str, String)> {
    report
        .outcomes
        .iter()
        .map(|outcome| {
            let name = display_name(&outcome.filename);
            if outcome.success {
                ("ok", format!("installed {name}"))
            } else {
                let code = outcome
                    .exit_code
                    .map_or_else(|| "signal".to_string(), |code| code.to_string());
                ("fail", format!("failed to install {name} (exit code {code})"))
            }
        })
        .collect()
}

pub(crate) fn summary_statuses(
    report: &UpgradeReport,
    log_file: Option<&Path>,
) -> Vec<(&'static str, String)> {
    let log_hint = log_file
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "the log output".to_string());
    if report.success {
        vec![
            (
                "ok",
                format!("kernel v{} installed successfully", report.version),
            ),
            ("info", format!("review {log_hint} to be sure, then reboot")),
        ]
    } else {
        vec![
            (
                "fail",
                format!(
                    "package installations failed: {}",
                    report
                        .failed()
                        .map(|outcome| outcome.role.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ),
            ("warn", format!("check {log_hint} for details")),
        ]
    }
}

/// Waits out `delay`, returning `false` if interrupted first.
pub(crate) fn safety_delay(delay: Duration, cancel: &CancellationToken, style: OutputStyle) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    let total = delay.as_secs().max(1);
    let progress_bar = (style == OutputStyle::Rich).then(|| {
        let progress_bar = ProgressBar::new(total);
        if let Ok(template) =
            ProgressStyle::with_template("{spinner:.yellow.bold} {msg} [{bar:20.yellow}] {pos}/{len}s")
        {
            progress_bar.set_style(template.progress_chars("=>-"));
        }
        progress_bar.set_message("starting upgrade in");
        progress_bar.enable_steady_tick(DELAY_POLL);
        progress_bar
    });

    let started = Instant::now();
    let interrupted = loop {
        if cancel.is_cancelled() {
            break true;
        }
        let elapsed = started.elapsed();
        if elapsed >= delay {
            break false;
        }
        if let Some(progress_bar) = &progress_bar {
            progress_bar.set_position(elapsed.as_secs());
        }
        thread::sleep(DELAY_POLL.min(delay - elapsed));
    };

    if let Some(progress_bar) = progress_bar {
        progress_bar.finish_and_clear();
    }
    !interrupted
}
