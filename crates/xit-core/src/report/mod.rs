//! Test outcomes and the run report written after a harness run.
//!
//! A [`RunReport`] is the harness's equivalent of a JUnit results file: one
//! [`TestOutcome`] per executed case, keyed by suite and case name.  The
//! registry tool reads these reports to compare them against the outcomes it
//! expects.
//!
//! Reports are stored as TOML:
//!
//! ```toml
//! run_id = "0b7c…"
//! started = "2026-10-17T09:12:44+00:00"
//!
//! [[outcomes]]
//! suite = "EvdevDriverXKBTest"
//! name = "KeyboardLayout/de"
//! success = true
//! ```

pub mod filter;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use filter::TestFilter;

/// Error type for reading and writing run reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error accessing report at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse report TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result of one executed test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub suite: String,
    pub name: String,
    pub success: bool,
    /// Failure message; absent for passing cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestOutcome {
    pub fn passed(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            success: true,
            message: None,
        }
    }

    pub fn failed(
        suite: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            success: false,
            message: Some(message.into()),
        }
    }

    /// `Suite.Name`, the form used by filters and printed reports.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.suite, self.name)
    }
}

/// All outcomes of one harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// RFC 3339 timestamp of the run start.
    pub started: String,
    #[serde(default)]
    pub outcomes: Vec<TestOutcome>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    /// Starts a new report with a fresh run id and the current time.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started: chrono::Utc::now().to_rfc3339(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// `true` when every recorded case passed (vacuously true when empty).
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// Serializes the report to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ReportError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parses a report from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Parse`] if the text is not a valid report.
    pub fn from_toml(text: &str) -> Result<Self, ReportError> {
        Ok(toml::from_str(text)?)
    }

    /// Writes the report to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] or [`ReportError::Serialize`].
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a report from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] or [`ReportError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
