//! X input driver test harness: entry point.
//!
//! Runs the registered driver tests against a freshly started Xorg per case
//! and optionally writes the outcomes to a TOML results file that the
//! `xit-registry` tool can verify.
//!
//! # Usage
//!
//! ```text
//! xit-input [OPTIONS]
//!
//! Options:
//!   --filter <EXPR>       gtest-style filter, e.g. "EvdevDriverXKBTest.*:-*/de"
//!   --list                Print the selected case names and exit
//!   --results <PATH>      Write the run report to PATH
//!   --config <PATH>       Settings file [env: XIT_CONFIG]
//!   --display <N>         Display number of the server under test
//!   --recordings <DIR>    Root of the evemu recordings
//! ```
//!
//! The process exits with status 0 only when every selected case passed.
//!
//! Creating uinput devices and starting Xorg usually needs root.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xit_core::{LayoutTable, TestFilter};
use xit_harness::application::suites::registered_cases;
use xit_harness::infrastructure::settings::{resolve_settings, HarnessSettings, CONFIG_ENV};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Replays recorded input devices through Xorg input drivers and checks the
/// events the server reports.
#[derive(Debug, Parser)]
#[command(name = "xit-input", version)]
struct Cli {
    /// Cases to run: `:`-separated globs, with an optional `-` section of
    /// exclusions.
    #[arg(long, default_value = "*", env = "XIT_FILTER")]
    filter: String,

    /// Print the selected case names instead of running them.
    #[arg(long)]
    list: bool,

    /// Where to write the run report.
    #[arg(long, env = "XIT_RESULTS")]
    results: Option<PathBuf>,

    /// Settings file; missing fields fall back to defaults.
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Display number for the server under test (overrides the settings).
    #[arg(long, env = "XIT_DISPLAY")]
    display: Option<u32>,

    /// Root of the `keyboards/` and `mice/` recordings (overrides the settings).
    #[arg(long, env = "XIT_RECORDINGS")]
    recordings: Option<PathBuf>,
}

impl Cli {
    /// Loads the settings file and applies the command-line overrides.
    fn into_settings(self) -> anyhow::Result<(HarnessSettings, Options)> {
        let mut settings = resolve_settings(self.config.as_deref())
            .context("failed to load harness settings")?;
        if let Some(display) = self.display {
            settings.server.display = display;
        }
        if let Some(recordings) = self.recordings {
            settings.paths.recordings_dir = recordings;
        }
        let options = Options {
            filter: TestFilter::parse(&self.filter),
            list: self.list,
            results: self.results,
        };
        Ok((settings, options))
    }
}

/// What to do with the selected cases.
struct Options {
    filter: TestFilter,
    list: bool,
    results: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let (settings, options) = cli.into_settings()?;

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    let table = LayoutTable::builtin();
    let cases = registered_cases(&table);

    if options.list {
        for case in cases.iter().filter(|c| options.filter.matches(&c.full_name())) {
            println!("{}", case.full_name());
        }
        return Ok(ExitCode::SUCCESS);
    }

    run(settings, table, &cases, options)
}

#[cfg(target_os = "linux")]
fn run(
    settings: HarnessSettings,
    table: LayoutTable,
    cases: &[xit_harness::application::suites::TestCase],
    options: Options,
) -> anyhow::Result<ExitCode> {
    use xit_harness::application::runner::TestRunner;
    use xit_harness::infrastructure::environment::XorgEnvironment;

    info!(
        binary = %settings.server.binary,
        display = %settings.server.display_name(),
        recordings = %settings.paths.recordings_dir.display(),
        "xit-input starting"
    );

    let work_dir = settings.paths.work_dir.clone();
    let video_driver = settings.server.video_driver.clone();
    let mut runner = TestRunner::new(
        XorgEnvironment::new(settings),
        table,
        work_dir,
        video_driver,
    );
    let report = runner.run(cases, &options.filter);

    for outcome in &report.outcomes {
        let status = if outcome.success { "PASS" } else { "FAIL" };
        println!("[{status}] {}", outcome.full_name());
        if let Some(message) = &outcome.message {
            println!("       {message}");
        }
    }
    println!("{} passed, {} failed", report.passed(), report.failed());

    if let Some(path) = &options.results {
        report
            .save(path)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        info!(path = %path.display(), "results written");
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(not(target_os = "linux"))]
fn run(
    _settings: HarnessSettings,
    _table: LayoutTable,
    _cases: &[xit_harness::application::suites::TestCase],
    _options: Options,
) -> anyhow::Result<ExitCode> {
    anyhow::bail!("running the driver tests needs Linux (uinput and Xorg)")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    /// Parses `args` as given, ignoring any `XIT_*` variables in the
    /// environment running the tests.
    fn parse(args: &[&str]) -> Cli {
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .get_matches_from(args);
        Cli::from_arg_matches(&matches).expect("matches come from the same command")
    }

    #[test]
    fn test_cli_defaults_select_every_case() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = parse(&["xit-input"]);

        // Assert
        assert_eq!(cli.filter, "*");
        assert!(!cli.list);
        assert!(cli.results.is_none());
        assert!(cli.config.is_none());
        assert!(cli.display.is_none());
    }

    #[test]
    fn test_parse_helper_detaches_every_env_override() {
        // Arrange
        let reads_env = |command: &clap::Command| {
            command
                .get_arguments()
                .filter_map(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
        };

        // Act
        let real = reads_env(&Cli::command());
        let detached = reads_env(&Cli::command().mut_args(|arg| arg.env(None::<&'static str>)));

        // Assert
        assert!(real.iter().any(|name| name == "XIT_FILTER"));
        assert!(real.iter().any(|name| name == CONFIG_ENV));
        assert!(detached.is_empty());
    }

    #[test]
    fn test_overrides_replace_settings_values() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("xit.toml");
        std::fs::write(&config, "[server]\ndisplay = 99\n").expect("write");
        let cli = parse(&[
            "xit-input",
            "--config",
            config.to_str().expect("utf-8 path"),
            "--display",
            "42",
            "--recordings",
            "/srv/recordings",
        ]);

        // Act
        let (settings, _) = cli.into_settings().expect("settings");

        // Assert
        assert_eq!(settings.server.display, 42);
        assert_eq!(settings.paths.recordings_dir, PathBuf::from("/srv/recordings"));
    }

    #[test]
    fn test_filter_flag_is_parsed() {
        let cli = parse(&["xit-input", "--filter", "EvdevDriverMouseTest.*"]);
        let (_, options) = cli.into_settings().expect("settings");

        assert!(options.filter.matches("EvdevDriverMouseTest.ScrollWheel"));
        assert!(!options.filter.matches("EvdevDriverXKBTest.KeyboardLayout/de"));
    }
}
