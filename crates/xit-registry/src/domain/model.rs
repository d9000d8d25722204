//! Registry data model.
//!
//! A registry file holds one or more named registries.  Each registry
//! records, per test case, whether the case is expected to pass, plus any
//! bugs, fixes and notes attached to it, and the module versions the
//! expectations were taken against.
//!
//! ```toml
//! [[registries]]
//! name = "fedora-18"
//! date = "2013-01-31"
//!
//! [[registries.module_versions]]
//! module = "xorg-x11-drv-evdev"
//! version = "2.7.3-2.fc18"
//! kind = "rpm"
//!
//! [[registries.tests]]
//! suite = "LegacyInputDriverTest"
//! name = "DriverDevice/fpit"
//! success = false
//!
//! [[registries.tests.bugs]]
//! url = "https://bugs.freedesktop.org/show_bug.cgi?id=59332"
//! ```
//!
//! Tests are kept sorted by `(suite, name)` and attachments are kept sorted
//! and free of duplicates, so a file written back out is stable.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::RegistryError;

// ── Attachments ───────────────────────────────────────────────────────────────

/// A known bug affecting a test case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bug {
    #[serde(default = "default_bug_kind")]
    pub kind: String,
    pub url: String,
}

impl Bug {
    /// A bugzilla link.
    pub fn bugzilla(url: impl Into<String>) -> Self {
        Self {
            kind: default_bug_kind(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Bug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixKind {
    /// A commit, identified by its SHA-1.
    Git,
    /// A package NVR.
    Rpm,
}

/// A change known to alter the outcome of a test case.
///
/// Two fixes are the same fix when kind and text match; the repository is
/// informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fix {
    pub kind: FixKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl Fix {
    pub fn commit(sha1: impl Into<String>, repo: Option<String>) -> Self {
        Self {
            kind: FixKind::Git,
            text: sha1.into(),
            repo,
        }
    }

    pub fn rpm(nvr: impl Into<String>) -> Self {
        Self {
            kind: FixKind::Rpm,
            text: nvr.into(),
            repo: None,
        }
    }

    fn key(&self) -> (FixKind, &str) {
        (self.kind, &self.text)
    }
}

impl PartialEq for Fix {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Fix {}

impl PartialOrd for Fix {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fix {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repo {
            Some(repo) => write!(f, "{} ({repo})", self.text),
            None => f.write_str(&self.text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoKind {
    Text,
    Url,
}

/// Free-form note on a test case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Info {
    pub kind: InfoKind,
    pub text: String,
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Inserts `item` keeping `items` sorted; returns `false` if already present.
fn insert_sorted<T: Ord>(items: &mut Vec<T>, item: T) -> bool {
    match items.binary_search(&item) {
        Ok(_) => false,
        Err(at) => {
            items.insert(at, item);
            true
        }
    }
}

/// Removes `item` from `items`; returns `false` if it was not there.
fn remove_item<T: Ord>(items: &mut Vec<T>, item: &T) -> bool {
    let before = items.len();
    items.retain(|existing| existing != item);
    items.len() != before
}

// ── Test cases ────────────────────────────────────────────────────────────────

/// Expected outcome of one test case and what is known about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryTest {
    pub suite: String,
    pub name: String,
    /// `true` if the case is expected to pass.
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bugs: Vec<Bug>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<Fix>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<Info>,
}

impl RegistryTest {
    pub fn new(suite: impl Into<String>, name: impl Into<String>, success: bool) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            success,
            bugs: Vec::new(),
            fixes: Vec::new(),
            info: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.suite, self.name)
    }

    pub fn add_bug(&mut self, bug: Bug) -> bool {
        insert_sorted(&mut self.bugs, bug)
    }

    pub fn remove_bug(&mut self, bug: &Bug) -> bool {
        remove_item(&mut self.bugs, bug)
    }

    pub fn add_fix(&mut self, fix: Fix) -> bool {
        insert_sorted(&mut self.fixes, fix)
    }

    pub fn remove_fix(&mut self, fix: &Fix) -> bool {
        remove_item(&mut self.fixes, fix)
    }

    pub fn add_info(&mut self, info: Info) -> bool {
        insert_sorted(&mut self.info, info)
    }

    /// Restores the sorted, duplicate-free order of the attachments.
    fn normalize(&mut self) {
        self.bugs.sort();
        self.bugs.dedup();
        self.fixes.sort();
        self.fixes.dedup();
        self.info.sort();
        self.info.dedup();
    }
}

/// Parses an expected status: `true`/`success` or `false`/`failure`.
pub fn parse_status(text: &str) -> Result<bool, RegistryError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "success" => Ok(true),
        "false" | "failure" => Ok(false),
        _ => Err(RegistryError::InvalidStatus(text.to_string())),
    }
}

fn write_numbered<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    items: &[T],
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}:")?;
    for (i, item) in items.iter().enumerate() {
        writeln!(f, "{i}: {item}")?;
    }
    Ok(())
}

impl fmt::Display for RegistryTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = if self.success { "Success" } else { "Failure" };
        writeln!(f, "{} {}:\tExpected result: {expected}", self.suite, self.name)?;
        write_numbered(f, "Extra info", &self.info)?;
        write_numbered(f, "Known bugs", &self.bugs)?;
        write_numbered(f, "Known fixes", &self.fixes)
    }
}

// ── Registries ────────────────────────────────────────────────────────────────

/// Version of a component the expectations were recorded against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleVersion {
    pub module: String,
    pub version: String,
    #[serde(default = "default_module_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl ModuleVersion {
    pub fn new(module: impl Into<String>, version: impl Into<String>, kind: Option<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
            kind: kind.unwrap_or_else(default_module_kind),
            repo: None,
        }
    }
}

/// One named set of expectations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub module_versions: Vec<ModuleVersion>,
    #[serde(default)]
    pub tests: Vec<RegistryTest>,
}

impl Registry {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            module_versions: Vec::new(),
            tests: Vec::new(),
        }
    }

    fn position(&self, suite: &str, name: &str) -> Result<usize, usize> {
        self.tests
            .binary_search_by(|t| (t.suite.as_str(), t.name.as_str()).cmp(&(suite, name)))
    }

    pub fn test(&self, suite: &str, name: &str) -> Option<&RegistryTest> {
        self.position(suite, name).ok().map(|i| &self.tests[i])
    }

    pub fn test_mut(&mut self, suite: &str, name: &str) -> Option<&mut RegistryTest> {
        self.position(suite, name).ok().map(|i| &mut self.tests[i])
    }

    /// Like [`Registry::test_mut`], failing with [`RegistryError::UnknownTest`].
    pub fn require_test_mut(
        &mut self,
        suite: &str,
        name: &str,
    ) -> Result<&mut RegistryTest, RegistryError> {
        let registry = self.name.clone();
        self.test_mut(suite, name)
            .ok_or_else(|| RegistryError::UnknownTest {
                registry,
                suite: suite.to_string(),
                name: name.to_string(),
            })
    }

    /// Adds `test`, replacing any test with the same suite and name.
    pub fn add_test(&mut self, test: RegistryTest) {
        match self.position(&test.suite, &test.name) {
            Ok(i) => self.tests[i] = test,
            Err(i) => self.tests.insert(i, test),
        }
    }

    /// Copies every test of `other` this registry does not have yet.
    ///
    /// Existing tests are left untouched.  Returns the number added.
    pub fn merge_missing(&mut self, other: &Registry) -> usize {
        let mut added = 0;
        for test in &other.tests {
            if self.test(&test.suite, &test.name).is_none() {
                self.add_test(test.clone());
                added += 1;
            }
        }
        added
    }

    /// Sets `module` to `version`, or removes it when `version` is `none`.
    pub fn set_module_version(&mut self, module: &str, version: &str, kind: Option<String>) {
        self.module_versions.retain(|mv| mv.module != module);
        if !version.eq_ignore_ascii_case("none") {
            self.module_versions
                .push(ModuleVersion::new(module, version, kind));
            self.module_versions.sort();
        }
    }

    pub fn module_version(&self, module: &str) -> Option<&ModuleVersion> {
        self.module_versions.iter().find(|mv| mv.module == module)
    }

    fn normalize(&mut self) {
        self.module_versions.sort();
        self.tests.sort_by(|a, b| (&a.suite, &a.name).cmp(&(&b.suite, &b.name)));
        self.tests
            .dedup_by(|later, earlier| later.suite == earlier.suite && later.name == earlier.name);
        for test in &mut self.tests {
            test.normalize();
        }
    }
}

/// The contents of one registry file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub registries: Vec<Registry>,
}

impl RegistryFile {
    pub fn new(registries: Vec<Registry>) -> Self {
        Self { registries }
    }

    /// Parses a registry file.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Parse`] for malformed TOML, [`RegistryError::Empty`]
    /// if the file names no registry.
    pub fn from_toml(text: &str) -> Result<Self, RegistryError> {
        let mut file: Self = toml::from_str(text)?;
        if file.registries.is_empty() {
            return Err(RegistryError::Empty);
        }
        for registry in &mut file.registries {
            registry.normalize();
        }
        Ok(file)
    }

    pub fn to_toml(&self) -> Result<String, RegistryError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn find(&self, name: &str) -> Option<&Registry> {
        self.registries.iter().find(|r| r.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Registry> {
        self.registries.iter_mut().find(|r| r.name == name)
    }

    /// The registry called `name`, or the first one when no name is given.
    pub fn select(&self, name: Option<&str>) -> Result<&Registry, RegistryError> {
        match name {
            Some(name) => self
                .find(name)
                .ok_or_else(|| RegistryError::UnknownRegistry(name.to_string())),
            None => self.registries.first().ok_or(RegistryError::Empty),
        }
    }

    /// Mutable form of [`RegistryFile::select`].
    pub fn select_mut(&mut self, name: Option<&str>) -> Result<&mut Registry, RegistryError> {
        match name {
            Some(name) => self
                .find_mut(name)
                .ok_or_else(|| RegistryError::UnknownRegistry(name.to_string())),
            None => self.registries.first_mut().ok_or(RegistryError::Empty),
        }
    }

    /// Registries selected by `name`: just that one, or all of them.
    pub fn selected(&self, name: Option<&str>) -> Result<Vec<&Registry>, RegistryError> {
        match name {
            Some(_) => Ok(vec![self.select(name)?]),
            None => Ok(self.registries.iter().collect()),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bug_kind() -> String {
    "bugzilla".to_string()
}
fn default_module_kind() -> String {
    "git".to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
