//! X input test registry: entry point.
//!
//! Tracks known test outcomes and flags runs that deviate from them.
//!
//! # Usage
//!
//! ```text
//! xit-registry [-f registry.toml] [-r NAME] <COMMAND>
//!
//! Commands:
//!   list                              List every test and its expected status
//!   info SUITE CASE                   Show what is known about one test
//!   verify results.toml [--all]       Compare a harness run with the registry
//!   compare reg1.toml reg2.toml       Compare two registry files
//!   create results.toml... [--name]   Create a registry from harness runs
//!   merge reg1.toml reg2.toml         Add tests from reg2 missing in reg1
//!   edit SUITE CASE <ACTION>          add-bug, rm-bug, add-commit, rm-commit,
//!                                     add-rpm, rm-rpm, set-status
//!   meta <ACTION>                     set-date, set-module-version
//! ```
//!
//! Without `-f` the registry is read from stdin and any modified registry is
//! written to stdout; with `-f` the file is updated in place.  Logs go to
//! stderr so they never mix with a registry written to stdout.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xit_core::RunReport;
use xit_registry::application::{
    commands,
    table::{Color, Table},
};
use xit_registry::domain::{parse_date, EditAction, MetaAction, NotRun, StatusCode};
use xit_registry::infrastructure::{
    printer::TextPrinter,
    store::{load_registry_file, RegistryStore},
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Compare X input driver test results against the registry of known
/// successes and failures.
#[derive(Debug, Parser)]
#[command(name = "xit-registry", version)]
struct Cli {
    /// Registry file, modified in place (default: stdin/stdout).
    #[arg(short = 'f', long, global = true, env = "XIT_REGISTRY")]
    file: Option<PathBuf>,

    /// Work on the named registry (default: the first, or all for `list`).
    #[arg(short = 'r', long, global = true)]
    regname: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all test cases.
    List,
    /// Print everything known about one test case.
    Info { suite: String, case: String },
    /// Compare harness results against the registry.
    ///
    /// Only tests present in the results are listed, so a run limited with
    /// `xit-input --filter` is not flooded with `??` rows.
    Verify {
        /// Results file written by `xit-input --results`.
        results: PathBuf,
        /// Also list registered tests missing from the results as `??`.
        #[arg(long)]
        all: bool,
    },
    /// Compare two registry files.
    Compare { reg1: PathBuf, reg2: PathBuf },
    /// Create a registry file from harness results.
    Create {
        #[arg(required = true)]
        results: Vec<PathBuf>,
        /// Registry name (default: the results file name).
        #[arg(long)]
        name: Option<String>,
    },
    /// Add test cases from reg2 to reg1, leaving existing ones untouched.
    Merge { reg1: PathBuf, reg2: PathBuf },
    /// Modify one test case.
    Edit {
        suite: String,
        case: String,
        #[command(subcommand)]
        action: EditCommand,
    },
    /// Modify the registry metadata.
    Meta {
        #[command(subcommand)]
        action: MetaCommand,
    },
}

#[derive(Debug, Subcommand)]
enum EditCommand {
    /// Add a link to a bug report.
    AddBug { url: String },
    /// Remove a link to a bug report.
    RmBug { url: String },
    /// Add a commit that alters the outcome.
    AddCommit {
        sha1: String,
        #[arg(long)]
        repo: Option<String>,
    },
    /// Remove a commit.
    RmCommit { sha1: String },
    /// Add a package NVR that alters the outcome.
    AddRpm { rpm: String },
    /// Remove a package NVR.
    RmRpm { rpm: String },
    /// Change the expected status (true/false).
    SetStatus { status: String },
}

impl From<EditCommand> for EditAction {
    fn from(command: EditCommand) -> Self {
        match command {
            EditCommand::AddBug { url } => Self::AddBug { url },
            EditCommand::RmBug { url } => Self::RemoveBug { url },
            EditCommand::AddCommit { sha1, repo } => Self::AddCommit { sha1, repo },
            EditCommand::RmCommit { sha1 } => Self::RemoveCommit { sha1 },
            EditCommand::AddRpm { rpm } => Self::AddRpm { nvr: rpm },
            EditCommand::RmRpm { rpm } => Self::RemoveRpm { nvr: rpm },
            EditCommand::SetStatus { status } => Self::SetStatus { status },
        }
    }
}

#[derive(Debug, Subcommand)]
enum MetaCommand {
    /// Set the registry date (YYYY-MM-DD, default: today).
    SetDate { date: Option<String> },
    /// Set a module version; `none` removes the module.
    SetModuleVersion {
        name: String,
        version: String,
        /// Version type, e.g. git or rpm (default: git).
        #[arg(long = "type")]
        kind: Option<String>,
    },
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_tables(tables: &[Table]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let colors = stdout.is_terminal();
    let mut printer = TextPrinter::new(stdout.lock(), colors);
    for table in tables {
        printer.print(table).context("failed to write to stdout")?;
    }
    Ok(())
}

fn load_results(path: &Path) -> anyhow::Result<RunReport> {
    RunReport::load(path).with_context(|| format!("failed to read results {}", path.display()))
}

fn file_label(path: &Path) -> String {
    path.display().to_string()
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = RegistryStore::new(cli.file);
    let regname = cli.regname.as_deref();

    match cli.command {
        Command::List => {
            let file = store.load()?;
            print_tables(&commands::list(&file, regname)?)?;
        }
        Command::Info { suite, case } => {
            let file = store.load()?;
            print!("{}", commands::info(&file, regname, &suite, &case)?);
        }
        Command::Verify { results, all } => {
            let file = store.load()?;
            let registry = commands::registry_for_results(&file, regname, &results)?;
            let report = load_results(&results)?;
            let not_run = if all { NotRun::Show } else { NotRun::Hide };
            let table = commands::verify(registry, &report.outcomes, not_run);
            print_tables(std::slice::from_ref(&table))?;

            // Unexpected failures fail the command; unexpected passes do not.
            let regressions = table
                .rows_with_code(StatusCode::Differs.symbol())
                .filter(|row| row.color == Color::Red)
                .count();
            if regressions > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Compare { reg1, reg2 } => {
            let first = load_registry_file(&reg1)?;
            let second = load_registry_file(&reg2)?;
            let labels = (file_label(&reg1), file_label(&reg2));
            let tables =
                commands::compare(&first, &second, regname, (&labels.0, &labels.1))?;
            print_tables(&tables)?;
        }
        Command::Create { results, name } => {
            let runs = results
                .iter()
                .map(|path| {
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Ok((stem, load_results(path)?.outcomes))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let file = commands::create(&runs, name.as_deref(), today())?;
            store.save(&file)?;
        }
        Command::Merge { reg1, reg2 } => {
            let first = load_registry_file(&reg1)?;
            let second = load_registry_file(&reg2)?;
            let merged = commands::merge(first, &second, regname)?;
            store.save(&merged)?;
        }
        Command::Edit {
            suite,
            case,
            action,
        } => {
            let mut file = store.load()?;
            commands::edit(&mut file, regname, &suite, &case, &action.into())?;
            store.save(&file)?;
        }
        Command::Meta { action } => {
            let action = match action {
                MetaCommand::SetDate { date } => MetaAction::SetDate(match date {
                    Some(text) => parse_date(&text)?,
                    None => today(),
                }),
                MetaCommand::SetModuleVersion {
                    name,
                    version,
                    kind,
                } => MetaAction::SetModuleVersion {
                    module: name,
                    version,
                    kind,
                },
            };
            let mut file = store.load()?;
            commands::meta(&mut file, regname, &action)?;
            store.save(&file)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
