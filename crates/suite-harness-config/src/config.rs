// crates/suite-harness-config/src/config.rs
// ============================================================================
// Module: Suite Harness Configuration
// Description: Configuration loading and validation for the lifecycle harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: suite-harness-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and defaults to the values the in-memory host
//! reports, so an empty file is valid. Unknown fields and invalid values fail
//! closed. Builders turn a validated configuration into
//! [`HarnessOptions`] and a [`FixtureLocator`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use suite_harness_core::AttributeEquivalence;
use suite_harness_core::ComponentKind;
use suite_harness_core::DEFAULT_IGNORED_FIELDS;
use suite_harness_core::ExpectedKinds;
use suite_harness_core::FileHarnessAuditSink;
use suite_harness_core::FixtureLocator;
use suite_harness_core::HarnessAuditSink;
use suite_harness_core::HarnessOptions;
use suite_harness_core::NoopHarnessAuditSink;
use suite_harness_core::StderrHarnessAuditSink;
use thiserror::Error;

use crate::env::CONFIG_ENV_VAR;
use crate::env::read_env_nonempty;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "suite-harness.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a component kind label.
pub(crate) const MAX_KIND_LENGTH: usize = 128;
/// Maximum number of ignored equivalence fields.
pub(crate) const MAX_IGNORED_FIELDS: usize = 64;
/// Maximum length of an ignored field name.
pub(crate) const MAX_FIELD_NAME_LENGTH: usize = 128;
/// Default fixture root, relative to the crate under test.
const DEFAULT_FIXTURE_ROOT: &str = "tests/fixtures";

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Expected host component kinds.
    #[serde(default)]
    pub kinds: KindsConfig,
    /// Lifecycle audit output.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Entity equivalence rule settings.
    #[serde(default)]
    pub equivalence: EquivalenceConfig,
    /// Fixture file location.
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

impl HarnessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, else from `SUITE_HARNESS_CONFIG`, else
    /// `suite-harness.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kinds.validate()?;
        self.audit.validate()?;
        self.equivalence.validate()?;
        self.fixtures.validate()
    }

    /// Returns the expected component kinds.
    #[must_use]
    pub fn expected_kinds(&self) -> ExpectedKinds {
        ExpectedKinds {
            application: ComponentKind::new(self.kinds.application.trim()),
            services: ComponentKind::new(self.kinds.services.trim()),
            config: ComponentKind::new(self.kinds.config.trim()),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit file cannot be opened.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn HarnessAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopHarnessAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrHarnessAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path required for file sink".to_string())
                })?;
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent).map_err(|err| ConfigError::Io(err.to_string()))?;
                }
                let sink =
                    FileHarnessAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }

    /// Returns the configured equivalence rule.
    #[must_use]
    pub fn equivalence_rule(&self) -> AttributeEquivalence {
        AttributeEquivalence::with_ignored(
            self.equivalence.ignored_fields.iter().map(|field| field.trim().to_string()),
        )
    }

    /// Returns a fixture locator for the configured root.
    #[must_use]
    pub fn fixture_locator(&self) -> FixtureLocator {
        FixtureLocator::new(self.fixtures.root.clone())
    }

    /// Builds harness options from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit sink cannot be built.
    pub fn harness_options(&self) -> Result<HarnessOptions, ConfigError> {
        Ok(HarnessOptions {
            expected_kinds: self.expected_kinds(),
            equivalence: Box::new(self.equivalence_rule()),
            audit: self.build_audit_sink()?,
        })
    }
}

/// Expected component kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindsConfig {
    /// Kind reported by the application handle.
    #[serde(default = "default_application_kind")]
    pub application: String,
    /// Kind reported by the service locator.
    #[serde(default = "default_services_kind")]
    pub services: String,
    /// Kind reported by the configuration handle.
    #[serde(default = "default_config_kind")]
    pub config: String,
}

impl Default for KindsConfig {
    fn default() -> Self {
        Self {
            application: default_application_kind(),
            services: default_services_kind(),
            config: default_config_kind(),
        }
    }
}

impl KindsConfig {
    /// Validates kind labels.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_kind("kinds.application", &self.application)?;
        validate_kind("kinds.services", &self.services)?;
        validate_kind("kinds.config", &self.config)
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard lifecycle events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Lifecycle audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path (file sink only).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates sink and path consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path required for file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path only allowed for file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

/// Entity equivalence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquivalenceConfig {
    /// Field names skipped by the default rule.
    #[serde(default = "default_ignored_fields")]
    pub ignored_fields: Vec<String>,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            ignored_fields: default_ignored_fields(),
        }
    }
}

impl EquivalenceConfig {
    /// Validates ignored field names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ignored_fields.len() > MAX_IGNORED_FIELDS {
            return Err(ConfigError::Invalid(format!(
                "equivalence.ignored_fields exceeds max entries ({MAX_IGNORED_FIELDS})"
            )));
        }
        let mut seen = BTreeSet::new();
        for field in &self.ignored_fields {
            let trimmed = field.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(
                    "equivalence.ignored_fields entries must be non-empty".to_string(),
                ));
            }
            if trimmed.len() > MAX_FIELD_NAME_LENGTH {
                return Err(ConfigError::Invalid(
                    "equivalence.ignored_fields entry exceeds max length".to_string(),
                ));
            }
            if !seen.insert(trimmed) {
                return Err(ConfigError::Invalid(format!(
                    "equivalence.ignored_fields contains duplicate entry: {trimmed}"
                )));
            }
        }
        Ok(())
    }
}

/// Fixture file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixturesConfig {
    /// Fixture root directory.
    #[serde(default = "default_fixture_root")]
    pub root: PathBuf,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            root: default_fixture_root(),
        }
    }
}

impl FixturesConfig {
    /// Validates the fixture root.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("fixtures.root", &self.root.to_string_lossy())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default application kind.
fn default_application_kind() -> String {
    ExpectedKinds::default().application.as_str().to_string()
}

/// Default service locator kind.
fn default_services_kind() -> String {
    ExpectedKinds::default().services.as_str().to_string()
}

/// Default configuration kind.
fn default_config_kind() -> String {
    ExpectedKinds::default().config.as_str().to_string()
}

/// Default ignored equivalence fields.
fn default_ignored_fields() -> Vec<String> {
    DEFAULT_IGNORED_FIELDS.iter().map(|field| (*field).to_string()).collect()
}

/// Default fixture root.
fn default_fixture_root() -> PathBuf {
    PathBuf::from(DEFAULT_FIXTURE_ROOT)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = read_env_nonempty(CONFIG_ENV_VAR).map_err(ConfigError::Invalid)? {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a component kind label.
fn validate_kind(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_KIND_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
