// crates/suite-harness-core/src/runtime/equivalence.rs
// ============================================================================
// Module: Entity Equivalence
// Description: Pluggable equivalence assertion for host entities.
// Purpose: Compare two entities by concrete kind and snapshot contents.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`assert_entities_equivalent`] passes only when both subjects are
//! entities, their concrete kinds match, and the configured
//! [`EquivalenceRule`] reports no field mismatch. Each failure cause has its
//! own [`EquivalenceError`] variant so callers can tell them apart.
//!
//! The default rule, [`AttributeEquivalence`], compares attributes and
//! metadata field by field with JSON equality and skips volatile fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::type_name;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::core::Entity;
use crate::core::EntityKind;
use crate::core::EntitySnapshot;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fields skipped by the default rule; they change on every save.
pub const DEFAULT_IGNORED_FIELDS: &[&str] = &["time_updated", "last_action"];

/// Placeholder substituted with the diagnostic in assertion messages.
const MESSAGE_PLACEHOLDER: &str = "%s";

// ============================================================================
// SECTION: Subjects
// ============================================================================

/// Value handed to the equivalence assertion.
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    /// A host entity.
    Entity(&'a dyn Entity),
    /// Anything else, recorded by type name.
    Other(&'static str),
}

impl<'a> Subject<'a> {
    /// Wraps an entity.
    #[must_use]
    pub fn entity<E: Entity>(entity: &'a E) -> Self {
        Self::Entity(entity)
    }

    /// Wraps a non-entity value.
    #[must_use]
    pub fn other<T: ?Sized>(_value: &T) -> Self {
        Self::Other(type_name::<T>())
    }
}

/// Argument position for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentPosition {
    /// First argument.
    First,
    /// Second argument.
    Second,
}

impl fmt::Display for ArgumentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

// ============================================================================
// SECTION: Mismatches
// ============================================================================

/// Snapshot section a mismatch was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSection {
    /// Core attributes.
    Attribute,
    /// Metadata.
    Metadata,
}

/// A single differing field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMismatch {
    /// Section of the field.
    pub section: SnapshotSection,
    /// Field name.
    pub key: String,
    /// Value on the first entity (`None` when absent).
    pub first: Option<Value>,
    /// Value on the second entity (`None` when absent).
    pub second: Option<Value>,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = match self.section {
            SnapshotSection::Attribute => "attribute",
            SnapshotSection::Metadata => "metadata",
        };
        write!(
            f,
            "{section} {}: {} != {}",
            self.key,
            render_value(self.first.as_ref()),
            render_value(self.second.as_ref())
        )
    }
}

/// Renders an optional JSON value for diagnostics.
fn render_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "<absent>".to_string(), Value::to_string)
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Equivalence rule comparing two entity snapshots of the same kind.
pub trait EquivalenceRule {
    /// Returns every field that differs; empty means equivalent.
    fn mismatches(&self, first: &EntitySnapshot, second: &EntitySnapshot) -> Vec<FieldMismatch>;
}

/// Field-by-field comparison of attributes and metadata.
///
/// # Invariants
/// - Ignored fields are skipped in both sections.
/// - A field present on one side only is a mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEquivalence {
    /// Field names skipped during comparison.
    ignored: BTreeSet<String>,
}

impl AttributeEquivalence {
    /// Creates a rule that ignores the given fields.
    #[must_use]
    pub fn with_ignored<I, S>(ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: ignored.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a rule that compares every field.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            ignored: BTreeSet::new(),
        }
    }

    /// Returns the ignored field names.
    #[must_use]
    pub const fn ignored(&self) -> &BTreeSet<String> {
        &self.ignored
    }

    /// Appends mismatches for one snapshot section.
    fn diff_section(
        &self,
        section: SnapshotSection,
        first: &BTreeMap<String, Value>,
        second: &BTreeMap<String, Value>,
        out: &mut Vec<FieldMismatch>,
    ) {
        let keys: BTreeSet<&String> = first.keys().chain(second.keys()).collect();
        for key in keys {
            if self.ignored.contains(key) {
                continue;
            }
            let left = first.get(key);
            let right = second.get(key);
            if left != right {
                out.push(FieldMismatch {
                    section,
                    key: key.clone(),
                    first: left.cloned(),
                    second: right.cloned(),
                });
            }
        }
    }
}

impl Default for AttributeEquivalence {
    fn default() -> Self {
        Self::with_ignored(DEFAULT_IGNORED_FIELDS.iter().copied())
    }
}

impl EquivalenceRule for AttributeEquivalence {
    fn mismatches(&self, first: &EntitySnapshot, second: &EntitySnapshot) -> Vec<FieldMismatch> {
        let mut out = Vec::new();
        self.diff_section(SnapshotSection::Attribute, &first.attributes, &second.attributes, &mut out);
        self.diff_section(SnapshotSection::Metadata, &first.metadata, &second.metadata, &mut out);
        out
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Entity equivalence assertion failures.
///
/// # Invariants
/// - Each failure cause maps to exactly one variant.
/// - `message` is the rendered assertion message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquivalenceError {
    /// One argument is not an entity.
    #[error("{message}")]
    NotAnEntity {
        /// Which argument.
        position: ArgumentPosition,
        /// Type name of the offending value.
        type_name: &'static str,
        /// Rendered assertion message.
        message: String,
    },
    /// Both are entities but of different concrete kinds.
    #[error("{message}")]
    KindMismatch {
        /// Kind of the first entity.
        first: EntityKind,
        /// Kind of the second entity.
        second: EntityKind,
        /// Rendered assertion message.
        message: String,
    },
    /// Same kind, but the rule found differing fields.
    #[error("{message}")]
    Mismatch {
        /// Differing fields.
        mismatches: Vec<FieldMismatch>,
        /// Rendered assertion message.
        message: String,
    },
}

// ============================================================================
// SECTION: Assertion
// ============================================================================

/// Asserts two subjects are equivalent entities under `rule`.
///
/// `message` may contain `%s`, which is replaced by the diagnostic; without a
/// placeholder the diagnostic is appended.
///
/// # Errors
///
/// Returns [`EquivalenceError`] naming the first failing cause.
pub fn assert_entities_equivalent(
    rule: &dyn EquivalenceRule,
    first: Subject<'_>,
    second: Subject<'_>,
    message: Option<&str>,
) -> Result<(), EquivalenceError> {
    let first = require_entity(first, ArgumentPosition::First, message)?;
    let second = require_entity(second, ArgumentPosition::Second, message)?;

    let first_kind = first.kind();
    let second_kind = second.kind();
    if first_kind != second_kind {
        let diagnostic = format!("entity kinds differ: [{first_kind}] vs [{second_kind}]");
        return Err(EquivalenceError::KindMismatch {
            first: first_kind,
            second: second_kind,
            message: render_message(message, &diagnostic),
        });
    }

    let mismatches = rule.mismatches(&first.snapshot(), &second.snapshot());
    if mismatches.is_empty() {
        return Ok(());
    }
    let details: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
    let diagnostic = format!(
        "entities {} and {} of kind [{first_kind}] differ: {}",
        first.guid(),
        second.guid(),
        details.join("; ")
    );
    Err(EquivalenceError::Mismatch {
        mismatches,
        message: render_message(message, &diagnostic),
    })
}

/// Returns true when the assertion would pass.
#[must_use]
pub fn entities_equivalent(
    rule: &dyn EquivalenceRule,
    first: Subject<'_>,
    second: Subject<'_>,
) -> bool {
    assert_entities_equivalent(rule, first, second, None).is_ok()
}

/// Unwraps an entity subject or reports which argument is not one.
fn require_entity<'a>(
    subject: Subject<'a>,
    position: ArgumentPosition,
    message: Option<&str>,
) -> Result<&'a dyn Entity, EquivalenceError> {
    match subject {
        Subject::Entity(entity) => Ok(entity),
        Subject::Other(type_name) => {
            let diagnostic = format!("{position} argument is not an entity: [{type_name}]");
            Err(EquivalenceError::NotAnEntity {
                position,
                type_name,
                message: render_message(message, &diagnostic),
            })
        }
    }
}

/// Renders the caller's message around the diagnostic.
fn render_message(template: Option<&str>, diagnostic: &str) -> String {
    match template {
        None => diagnostic.to_string(),
        Some(template) if template.contains(MESSAGE_PLACEHOLDER) => {
            template.replace(MESSAGE_PLACEHOLDER, diagnostic)
        }
        Some(template) => format!("{template}: {diagnostic}"),
    }
}
