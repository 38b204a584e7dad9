// crates/suite-harness-core/src/runtime/fixtures.rs
// ============================================================================
// Module: Fixture Locator
// Description: Testing utilities for resolving fixture files.
// Purpose: Keep fixture access confined to a single root directory.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Fixture names are relative paths under a configured root. Absolute paths,
//! parent traversal and oversized names are rejected before touching the
//! filesystem.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a fixture name.
const MAX_FIXTURE_NAME_LENGTH: usize = 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture resolution errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture name escapes or abuses the fixture root.
    #[error("invalid fixture name {name}: {reason}")]
    InvalidName {
        /// Offending fixture name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Reading the fixture failed.
    #[error("fixture io error for {path}: {message}")]
    Io {
        /// Resolved fixture path.
        path: PathBuf,
        /// I/O error text.
        message: String,
    },
}

// ============================================================================
// SECTION: Locator
// ============================================================================

/// Resolves fixture files under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLocator {
    /// Fixture root directory.
    root: PathBuf,
}

impl FixtureLocator {
    /// Creates a locator rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the fixture root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a fixture name to a path under the root.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidName`] for empty, absolute, traversing or
    /// oversized names.
    pub fn path(&self, name: &str) -> Result<PathBuf, FixtureError> {
        let invalid = |reason| FixtureError::InvalidName {
            name: name.to_string(),
            reason,
        };
        if name.trim().is_empty() {
            return Err(invalid("must be non-empty"));
        }
        if name.len() > MAX_FIXTURE_NAME_LENGTH {
            return Err(invalid("exceeds max length"));
        }
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => {
                    if part.len() > MAX_PATH_COMPONENT_LENGTH {
                        return Err(invalid("path component too long"));
                    }
                }
                Component::CurDir => {}
                Component::ParentDir => return Err(invalid("must not traverse to parent")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("must be relative"));
                }
            }
        }
        Ok(self.root.join(name))
    }

    /// Reads a fixture as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the name is invalid or the file cannot be read.
    pub fn read_to_string(&self, name: &str) -> Result<String, FixtureError> {
        let path = self.path(name)?;
        fs::read_to_string(&path).map_err(|err| FixtureError::Io {
            path,
            message: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use super::FixtureError;
    use super::FixtureLocator;

    #[test]
    fn resolves_nested_names_under_root() {
        let locator = FixtureLocator::new("fixtures");
        let path = locator.path("entities/blog.json").expect("valid name");
        assert_eq!(path, std::path::Path::new("fixtures/entities/blog.json"));
    }

    #[test]
    fn rejects_parent_traversal() {
        let locator = FixtureLocator::new("fixtures");
        let err = locator.path("../secrets.txt").unwrap_err();
        assert!(matches!(err, FixtureError::InvalidName { reason, .. } if reason.contains("parent")));
    }

    #[test]
    fn rejects_absolute_and_empty_names() {
        let locator = FixtureLocator::new("fixtures");
        assert!(locator.path("/etc/passwd").is_err());
        assert!(locator.path("   ").is_err());
    }

    #[test]
    fn reads_fixture_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("hello.txt"), "hello").expect("write fixture");
        let locator = FixtureLocator::new(dir.path());
        assert_eq!(locator.read_to_string("hello.txt").expect("read"), "hello");
        assert!(matches!(locator.read_to_string("missing.txt"), Err(FixtureError::Io { .. })));
    }
}
