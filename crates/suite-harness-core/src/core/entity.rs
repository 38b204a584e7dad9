// crates/suite-harness-core/src/core/entity.rs
// ============================================================================
// Module: Suite Harness Entities
// Description: Minimal entity surface consumed from the host application.
// Purpose: Describe entities as comparable snapshots for equivalence checks.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The harness does not own an entity model. It only needs three things from
//! any host entity: its guid, its concrete kind, and a snapshot of its
//! attributes and metadata. [`User`], [`SeededObject`] and [`SeededGroup`]
//! are the concrete entities produced by the seeding collaborator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::identifiers::EntityGuid;
use crate::core::identifiers::EntityKind;

// ============================================================================
// SECTION: Entity Trait
// ============================================================================

/// Host entity as seen by the harness.
pub trait Entity {
    /// Returns the entity guid.
    fn guid(&self) -> EntityGuid;

    /// Returns the concrete entity kind.
    fn kind(&self) -> EntityKind;

    /// Returns a comparable snapshot of attributes and metadata.
    fn snapshot(&self) -> EntitySnapshot;
}

/// Comparable snapshot of an entity.
///
/// # Invariants
/// - Keys are unique within each section; ordering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Core attributes (guid, owner, timestamps, ...).
    pub attributes: BTreeMap<String, Value>,
    /// Free-form metadata attached to the entity.
    pub metadata: BTreeMap<String, Value>,
}

impl EntitySnapshot {
    /// Adds an attribute and returns the snapshot.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Adds every metadata entry from `metadata` and returns the snapshot.
    #[must_use]
    pub fn with_metadata(mut self, metadata: &BTreeMap<String, Value>) -> Self {
        self.metadata.extend(metadata.iter().map(|(key, value)| (key.clone(), value.clone())));
        self
    }
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// Session principal.
///
/// # Invariants
/// - `admin` marks an admin-equivalent principal for session checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User guid.
    pub guid: EntityGuid,
    /// Login name.
    pub username: String,
    /// Whether the user is an administrator.
    pub admin: bool,
}

impl Entity for User {
    fn guid(&self) -> EntityGuid {
        self.guid
    }

    fn kind(&self) -> EntityKind {
        EntityKind::new("user")
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot::default()
            .attribute("guid", json!(self.guid.get()))
            .attribute("username", json!(self.username))
            .attribute("admin", json!(self.admin))
    }
}

// ============================================================================
// SECTION: Seeded Content
// ============================================================================

/// Content object created by a seeder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededObject {
    /// Object guid.
    pub guid: EntityGuid,
    /// Object subtype.
    pub subtype: String,
    /// Owning entity guid.
    pub owner_guid: EntityGuid,
    /// Container entity guid (defaults to the owner).
    pub container_guid: EntityGuid,
    /// Object title.
    pub title: String,
    /// Creation time in seconds.
    pub time_created: u64,
    /// Last update time in seconds.
    pub time_updated: u64,
    /// Free-form metadata.
    pub metadata: BTreeMap<String, Value>,
}

impl Entity for SeededObject {
    fn guid(&self) -> EntityGuid {
        self.guid
    }

    fn kind(&self) -> EntityKind {
        EntityKind::with_subtype("object", self.subtype.clone())
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot::default()
            .attribute("guid", json!(self.guid.get()))
            .attribute("owner_guid", json!(self.owner_guid.get()))
            .attribute("container_guid", json!(self.container_guid.get()))
            .attribute("title", json!(self.title))
            .attribute("time_created", json!(self.time_created))
            .attribute("time_updated", json!(self.time_updated))
            .with_metadata(&self.metadata)
    }
}

/// Group created by a seeder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededGroup {
    /// Group guid.
    pub guid: EntityGuid,
    /// Display name.
    pub name: String,
    /// Owning user guid.
    pub owner_guid: EntityGuid,
    /// Free-form metadata.
    pub metadata: BTreeMap<String, Value>,
}

impl Entity for SeededGroup {
    fn guid(&self) -> EntityGuid {
        self.guid
    }

    fn kind(&self) -> EntityKind {
        EntityKind::new("group")
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot::default()
            .attribute("guid", json!(self.guid.get()))
            .attribute("name", json!(self.name))
            .attribute("owner_guid", json!(self.owner_guid.get()))
            .with_metadata(&self.metadata)
    }
}
