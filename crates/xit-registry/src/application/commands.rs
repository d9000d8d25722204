//! The registry commands, on already loaded data.
//!
//! Every function here takes parsed registries and run outcomes and returns
//! either tables to print or the registry file to write back; reading and
//! writing is left to the caller.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{error, info, warn};
use xit_core::TestOutcome;

use super::table::{Color, Table};
use crate::domain::{
    registry_from_outcomes,
    verdict::{compare_module_versions, compare_tests, verify_outcomes, Verdict},
    EditAction, MetaAction, NotRun, Registry, RegistryError, RegistryFile, StatusCode,
};

fn status_cell(status: Option<bool>) -> String {
    status.map(|s| s.to_string()).unwrap_or_default()
}

fn verdict_color(verdict: &Verdict) -> Color {
    match verdict.code {
        StatusCode::Differs if verdict.is_improvement() => Color::Green,
        StatusCode::Differs => Color::Red,
        StatusCode::Missing => Color::Blue,
        StatusCode::ExpectedPass | StatusCode::ExpectedFail => Color::Default,
    }
}

fn verdict_table(section: Option<String>, headers: &[&str], verdicts: &[Verdict]) -> Table {
    let mut table = Table::new(section, headers);
    for verdict in verdicts {
        table.push(
            vec![
                verdict.code.to_string(),
                verdict.suite.clone(),
                verdict.name.clone(),
                status_cell(verdict.actual),
                status_cell(verdict.expected),
            ],
            verdict_color(verdict),
        );
    }
    table
}

/// `list`: every test with its expected status, one table per registry.
/// Expected failures are highlighted.
pub fn list(file: &RegistryFile, regname: Option<&str>) -> Result<Vec<Table>, RegistryError> {
    let tables = file
        .selected(regname)?
        .into_iter()
        .map(|registry| {
            let mut table = Table::new(
                Some(registry.name.clone()),
                &["TestSuite", "TestCase", "Success"],
            );
            for test in &registry.tests {
                let color = if test.success { Color::Default } else { Color::Red };
                table.push(
                    vec![test.suite.clone(), test.name.clone(), test.success.to_string()],
                    color,
                );
            }
            table
        })
        .collect();
    Ok(tables)
}

/// `info`: everything known about one test.
pub fn info(
    file: &RegistryFile,
    regname: Option<&str>,
    suite: &str,
    name: &str,
) -> Result<String, RegistryError> {
    let registry = pick_one(file, regname)?;
    registry
        .test(suite, name)
        .map(ToString::to_string)
        .ok_or_else(|| RegistryError::UnknownTest {
            registry: registry.name.clone(),
            suite: suite.to_string(),
            name: name.to_string(),
        })
}

/// The registry to verify `results` against: the one named `regname`, else
/// the one named like the results file (without extension).
pub fn registry_for_results<'a>(
    file: &'a RegistryFile,
    regname: Option<&str>,
    results: &Path,
) -> Result<&'a Registry, RegistryError> {
    if regname.is_some() {
        return file.select(regname);
    }
    let stem = results
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    file.find(&stem)
        .ok_or_else(|| RegistryError::NoRegistryFor(results.display().to_string()))
}

/// `verify`: one row per test that ran, plus the registered tests that did
/// not run if `not_run` asks for them.
pub fn verify(registry: &Registry, outcomes: &[TestOutcome], not_run: NotRun) -> Table {
    let verdicts = verify_outcomes(registry, outcomes, not_run);
    let unexpected = verdicts
        .iter()
        .filter(|v| v.code == StatusCode::Differs)
        .count();
    info!(registry = %registry.name, tests = verdicts.len(), unexpected, "verified results");
    verdict_table(
        Some(registry.name.clone()),
        &["Code", "TestSuite", "TestCase", "Result", "Expected"],
        &verdicts,
    )
}

/// Module versions and test-by-test comparison of two registries.
fn compare_pair(first: &Registry, second: &Registry, labels: (&str, &str)) -> Vec<Table> {
    let mut tables = Vec::new();

    let modules = compare_module_versions(first, second);
    if !modules.is_empty() {
        let mut table = Table::new(Some(first.name.clone()), &["Module name", labels.0, labels.1]);
        for row in modules {
            let color = if row.differs() { Color::Red } else { Color::Default };
            table.push(vec![row.module, row.first, row.second], color);
        }
        tables.push(table);
    }

    let section = tables.is_empty().then(|| first.name.clone());
    tables.push(verdict_table(
        section,
        &["Code", "TestSuite", "TestCase", labels.1, labels.0],
        &compare_tests(first, second),
    ));
    tables
}

/// `compare`: pairs registries by name (or just `regname`) and compares each
/// pair.  Registries present in only one file are logged and skipped.
///
/// `labels` name the two files in the column headers.
pub fn compare(
    first: &RegistryFile,
    second: &RegistryFile,
    regname: Option<&str>,
    labels: (&str, &str),
) -> Result<Vec<Table>, RegistryError> {
    if let Some(name) = regname {
        let a = first.select(Some(name))?;
        let b = second.select(Some(name))?;
        return Ok(compare_pair(a, b, labels));
    }

    let mut tables = Vec::new();
    for a in &first.registries {
        match second.find(&a.name) {
            Some(b) => tables.extend(compare_pair(a, b, labels)),
            None => error!(registry = %a.name, file = labels.1, "failed to compare: missing"),
        }
    }
    for b in &second.registries {
        if first.find(&b.name).is_none() {
            error!(registry = %b.name, file = labels.0, "failed to compare: missing");
        }
    }
    Ok(tables)
}

/// `create`: one registry per run, named `name` or after the results file.
///
/// Each run is `(results file stem, outcomes)`.
pub fn create(
    runs: &[(String, Vec<TestOutcome>)],
    name: Option<&str>,
    date: NaiveDate,
) -> Result<RegistryFile, RegistryError> {
    if name.is_some() && runs.len() != 1 {
        return Err(RegistryError::AmbiguousName);
    }
    let registries = runs
        .iter()
        .map(|(stem, outcomes)| {
            let registry = registry_from_outcomes(name.unwrap_or(stem.as_str()), date, outcomes);
            info!(registry = %registry.name, tests = registry.tests.len(), "created registry");
            registry
        })
        .collect();
    Ok(RegistryFile::new(registries))
}

/// `merge`: adds what `second` has and `first` lacks, leaving everything
/// already in `first` untouched.
///
/// With `regname`, only that registry is merged; it is an error if neither
/// file has it.
pub fn merge(
    mut first: RegistryFile,
    second: &RegistryFile,
    regname: Option<&str>,
) -> Result<RegistryFile, RegistryError> {
    match regname {
        Some(name) => match second.find(name) {
            Some(incoming) => merge_registry(&mut first, incoming),
            None if first.find(name).is_some() => {
                warn!(registry = name, "not in second file, nothing to merge");
            }
            None => return Err(RegistryError::UnknownRegistry(name.to_string())),
        },
        None => {
            for incoming in &second.registries {
                merge_registry(&mut first, incoming);
            }
        }
    }
    Ok(first)
}

fn merge_registry(file: &mut RegistryFile, incoming: &Registry) {
    if let Some(existing) = file.find_mut(&incoming.name) {
        let added = existing.merge_missing(incoming);
        info!(registry = %existing.name, added, "merged tests");
        return;
    }
    info!(registry = %incoming.name, "added registry");
    file.registries.push(incoming.clone());
}

fn pick_one<'a>(file: &'a RegistryFile, regname: Option<&str>) -> Result<&'a Registry, RegistryError> {
    if regname.is_none() && file.registries.len() > 1 {
        warn!("multiple registries found but no name given, using the first");
    }
    file.select(regname)
}

/// `edit SUITE CASE ACTION` on the selected registry.
pub fn edit(
    file: &mut RegistryFile,
    regname: Option<&str>,
    suite: &str,
    name: &str,
    action: &EditAction,
) -> Result<(), RegistryError> {
    pick_one(file, regname)?;
    let test = file.select_mut(regname)?.require_test_mut(suite, name)?;
    action.apply(test)
}

/// `meta ACTION` on the selected registry.
pub fn meta(
    file: &mut RegistryFile,
    regname: Option<&str>,
    action: &MetaAction,
) -> Result<(), RegistryError> {
    pick_one(file, regname)?;
    action.apply(file.select_mut(regname)?);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
