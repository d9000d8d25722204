//! Domain layer: the registry model, comparisons and edits.
//!
//! Pure data manipulation; no file or terminal access.

pub mod edit;
pub mod model;
pub mod verdict;

use thiserror::Error;

pub use edit::{parse_date, registry_from_outcomes, EditAction, MetaAction};
pub use model::{Bug, Fix, FixKind, Info, InfoKind, ModuleVersion, Registry, RegistryFile, RegistryTest};
pub use verdict::{NotRun, StatusCode, Verdict};

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to parse registry TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize registry: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("registry file contains no registry")]
    Empty,

    #[error("no registry named '{0}'")]
    UnknownRegistry(String),

    #[error("no registry matches results file '{0}'")]
    NoRegistryFor(String),

    #[error("registry '{registry}' has no test '{suite} {name}'")]
    UnknownTest {
        registry: String,
        suite: String,
        name: String,
    },

    #[error("invalid status '{0}', allowed are true, false, success, failure")]
    InvalidStatus(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("--name needs exactly one results file")]
    AmbiguousName,
}
