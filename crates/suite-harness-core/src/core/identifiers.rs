// crates/suite-harness-core/src/core/identifiers.rs
// ============================================================================
// Module: Suite Harness Identifiers
// Description: Canonical opaque identifiers for services, entities, and hosts.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the identifiers shared by the harness and the host
//! interfaces it consumes. Identifiers are opaque and serialize as numbers or
//! strings. Entity guids enforce non-zero, 1-based invariants at construction
//! boundaries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Name of a process-wide host service that can be reset between tests.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Creates a new service name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ServiceName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ServiceName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Entity guid assigned by the host (or the seeder).
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityGuid(NonZeroU64);

impl EntityGuid {
    /// Creates a new entity guid from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates an entity guid from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw guid value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for EntityGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Kind reported by a bootstrapped host component (application, locator, config).
///
/// # Invariants
/// - Opaque UTF-8 string compared by exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentKind(String);

impl ComponentKind {
    /// Creates a new component kind label.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ComponentKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Concrete entity kind: a type plus an optional subtype.
///
/// # Invariants
/// - Two kinds are the same concrete kind only when type and subtype both match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKind {
    /// Entity type (`user`, `object`, `group`, ...).
    pub entity_type: String,
    /// Optional subtype (`blog`, `file`, ...).
    pub subtype: Option<String>,
}

impl EntityKind {
    /// Creates an entity kind without a subtype.
    #[must_use]
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            subtype: None,
        }
    }

    /// Creates an entity kind with a subtype.
    #[must_use]
    pub fn with_subtype(entity_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            subtype: Some(subtype.into()),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subtype {
            Some(subtype) => write!(f, "{}:{subtype}", self.entity_type),
            None => self.entity_type.fmt(f),
        }
    }
}
