//! Changes to a single test entry or to a registry's metadata.

use chrono::NaiveDate;
use tracing::{debug, warn};
use xit_core::TestOutcome;

use super::{
    model::{parse_status, Bug, Fix, Registry, RegistryTest},
    RegistryError,
};

/// A change to one test entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    AddBug { url: String },
    RemoveBug { url: String },
    AddCommit { sha1: String, repo: Option<String> },
    RemoveCommit { sha1: String },
    AddRpm { nvr: String },
    RemoveRpm { nvr: String },
    /// `true`/`success` or `false`/`failure`.
    SetStatus { status: String },
}

impl EditAction {
    /// Applies the change to `test`.
    ///
    /// Adding something already present and removing something absent are
    /// no-ops.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidStatus`] for an unrecognised status.
    pub fn apply(&self, test: &mut RegistryTest) -> Result<(), RegistryError> {
        let changed = match self {
            Self::AddBug { url } => test.add_bug(Bug::bugzilla(url.as_str())),
            Self::RemoveBug { url } => test.remove_bug(&Bug::bugzilla(url.as_str())),
            Self::AddCommit { sha1, repo } => {
                test.add_fix(Fix::commit(sha1.as_str(), repo.clone()))
            }
            Self::RemoveCommit { sha1 } => test.remove_fix(&Fix::commit(sha1.as_str(), None)),
            Self::AddRpm { nvr } => test.add_fix(Fix::rpm(nvr.as_str())),
            Self::RemoveRpm { nvr } => test.remove_fix(&Fix::rpm(nvr.as_str())),
            Self::SetStatus { status } => {
                let success = parse_status(status)?;
                let changed = test.success != success;
                test.success = success;
                changed
            }
        };
        if changed {
            debug!(test = %test.full_name(), action = ?self, "edited");
        } else {
            warn!(test = %test.full_name(), action = ?self, "nothing to change");
        }
        Ok(())
    }
}

/// A change to a registry's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaAction {
    SetDate(NaiveDate),
    /// A version of `none` removes the module.
    SetModuleVersion {
        module: String,
        version: String,
        kind: Option<String>,
    },
}

impl MetaAction {
    pub fn apply(&self, registry: &mut Registry) {
        match self {
            Self::SetDate(date) => registry.date = *date,
            Self::SetModuleVersion {
                module,
                version,
                kind,
            } => registry.set_module_version(module, version, kind.clone()),
        }
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, RegistryError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| RegistryError::InvalidDate(text.to_string()))
}

/// Builds a registry expecting exactly the outcomes of one run.
pub fn registry_from_outcomes(
    name: impl Into<String>,
    date: NaiveDate,
    outcomes: &[TestOutcome],
) -> Registry {
    let mut registry = Registry::new(name, date);
    for outcome in outcomes {
        registry.add_test(RegistryTest::new(
            outcome.suite.as_str(),
            outcome.name.as_str(),
            outcome.success,
        ));
    }
    registry
}

// ── Tests ─────────────────────────────────────────────────────────────────────
