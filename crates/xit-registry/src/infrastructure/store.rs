//! Where registry files are read from and written to.
//!
//! With `--file PATH` the file is both input and output and is rewritten in
//! place; without it the registry is read from stdin and written to stdout,
//! so edits can be chained in a pipeline:
//!
//! ```text
//! xit-registry edit S T add-bug URL < old.toml | xit-registry meta set-date > new.toml
//! ```

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{RegistryError, RegistryFile};

/// Error type for reading and writing registries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Registry {
        path: String,
        #[source]
        source: RegistryError,
    },
}

/// Input and output location of the registry being worked on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryStore {
    /// Read from and rewritten at this path.
    File(PathBuf),
    /// Read from stdin, written to stdout.
    Stdio,
}

impl RegistryStore {
    pub fn new(file: Option<PathBuf>) -> Self {
        file.map_or(Self::Stdio, Self::File)
    }

    /// Human-readable name of the location.
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Stdio => "<stdin>".to_string(),
        }
    }

    /// Reads and parses the registry file.
    pub fn load(&self) -> Result<RegistryFile, StoreError> {
        let text = match self {
            Self::File(path) => read_file(path)?,
            Self::Stdio => {
                info!("reading registry from stdin");
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|source| StoreError::Io {
                        path: self.label(),
                        source,
                    })?;
                text
            }
        };
        parse(&self.label(), &text)
    }

    /// Serializes `file` and writes it back.
    pub fn save(&self, file: &RegistryFile) -> Result<(), StoreError> {
        let text = file.to_toml().map_err(|source| StoreError::Registry {
            path: self.label(),
            source,
        })?;
        match self {
            Self::File(path) => {
                std::fs::write(path, text).map_err(|source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                debug!(path = %path.display(), "registry written");
            }
            Self::Stdio => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|source| StoreError::Io {
                        path: "<stdout>".to_string(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse(label: &str, text: &str) -> Result<RegistryFile, StoreError> {
    RegistryFile::from_toml(text).map_err(|source| StoreError::Registry {
        path: label.to_string(),
        source,
    })
}

/// Reads a registry file given on the command line (`compare`, `merge`).
pub fn load_registry_file(path: &Path) -> Result<RegistryFile, StoreError> {
    parse(&path.display().to_string(), &read_file(path)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Registry, RegistryTest};
    use chrono::NaiveDate;

    fn sample() -> RegistryFile {
        let date = NaiveDate::from_ymd_opt(2013, 1, 31).expect("valid date");
        let mut registry = Registry::new("fedora", date);
        registry.add_test(RegistryTest::new("EvdevDriverMouseTest", "ScrollWheel", true));
        RegistryFile::new(vec![registry])
    }

    #[test]
    fn test_file_store_round_trips() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RegistryStore::new(Some(dir.path().join("registry.toml")));

        // Act
        store.save(&sample()).expect("save");
        let loaded = store.load().expect("load");

        // Assert
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_missing_file_is_an_io_error_naming_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");

        let err = load_registry_file(&path).expect_err("must fail");

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_malformed_file_is_a_registry_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[[registries]]\nname = 3\n").expect("write");

        let err = load_registry_file(&path).expect_err("must fail");

        assert!(matches!(err, StoreError::Registry { .. }));
    }

    #[test]
    fn test_no_file_means_stdio() {
        assert_eq!(RegistryStore::new(None), RegistryStore::Stdio);
        assert_eq!(RegistryStore::Stdio.label(), "<stdin>");
    }
}
