// crates/suite-harness-core/src/interfaces/mod.rs
// ============================================================================
// Module: Suite Harness Interfaces
// Description: Host-facing interfaces consumed by the lifecycle harness.
// Purpose: Define the contract surfaces the harness checks and mutates.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The harness never reaches into ambient globals. Everything it consumes from
//! the host application is expressed here as a trait: the service locator,
//! the access-override flags, the session store, component kinds, and the
//! seeding collaborator. Implementations must report failures as errors and
//! never panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::core::ComponentKind;
use crate::core::EntityGuid;
use crate::core::SeededGroup;
use crate::core::SeededObject;
use crate::core::ServiceName;
use crate::core::User;

// ============================================================================
// SECTION: Host Components
// ============================================================================

/// Bootstrapped host component that reports its kind.
pub trait HostComponent {
    /// Returns the component kind label.
    fn component_kind(&self) -> ComponentKind;
}

// ============================================================================
// SECTION: Service Locator
// ============================================================================

/// Handle to a live service instance.
///
/// # Invariants
/// - `generation` increases every time the service is re-initialized after a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle {
    /// Service name.
    pub name: ServiceName,
    /// Instance generation (1 for the first initialization).
    pub generation: u64,
}

/// Service locator errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service name is not registered with the locator.
    #[error("unknown service: {0}")]
    Unknown(ServiceName),
    /// The locator could not complete the operation.
    #[error("service locator unavailable: {0}")]
    Unavailable(String),
}

/// Process-wide service registry keyed by service name.
pub trait ServiceLocator: HostComponent {
    /// Returns true when the service name is registered.
    fn has_service(&self, name: &ServiceName) -> bool;

    /// Returns the live instance, initializing it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service is unknown or unavailable.
    fn get_service(&self, name: &ServiceName) -> Result<ServiceHandle, ServiceError>;

    /// Drops the live instance so the next access re-initializes it.
    ///
    /// Resetting a service that was never initialized is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service is unknown or unavailable.
    fn reset_service(&self, name: &ServiceName) -> Result<(), ServiceError>;
}

// ============================================================================
// SECTION: Access Overrides
// ============================================================================

/// Process-wide access-override flags.
pub trait AccessOverrides {
    /// Returns true while access control is being ignored.
    fn is_access_ignored(&self) -> bool;

    /// Returns true while hidden (disabled) content is visible.
    fn is_hidden_content_visible(&self) -> bool;

    /// Sets the ignore-access flag and returns the previous value.
    fn set_ignore_access(&self, ignore: bool) -> bool;

    /// Sets the show-hidden flag and returns the previous value.
    fn set_show_hidden(&self, show: bool) -> bool;
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Session store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Session state could not be read or written.
    #[error("session unavailable: {0}")]
    Unavailable(String),
}

/// Session accessor for the active principal.
pub trait SessionStore {
    /// Returns the logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be read.
    fn logged_in_user(&self) -> Result<Option<User>, SessionError>;

    /// Replaces the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be written.
    fn set_logged_in_user(&self, user: User) -> Result<(), SessionError>;

    /// Logs the current user out.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be written.
    fn remove_logged_in_user(&self) -> Result<(), SessionError>;

    /// Returns true when an admin-equivalent principal is logged in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be read.
    fn is_admin_session_active(&self) -> Result<bool, SessionError>;
}

// ============================================================================
// SECTION: Seeding
// ============================================================================

/// Request to seed a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSeed {
    /// Login name; generated when absent.
    pub username: Option<String>,
    /// Whether the user is an administrator.
    pub admin: bool,
}

/// Request to seed a content object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSeed {
    /// Object subtype.
    pub subtype: String,
    /// Owning entity guid.
    pub owner: EntityGuid,
    /// Container guid; defaults to the owner.
    pub container: Option<EntityGuid>,
    /// Title; generated when absent.
    pub title: Option<String>,
    /// Initial metadata.
    pub metadata: BTreeMap<String, Value>,
}

impl ObjectSeed {
    /// Creates an object seed with defaults for everything but subtype and owner.
    #[must_use]
    pub fn new(subtype: impl Into<String>, owner: EntityGuid) -> Self {
        Self {
            subtype: subtype.into(),
            owner,
            container: None,
            title: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Request to seed a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSeed {
    /// Display name; generated when absent.
    pub name: Option<String>,
    /// Owning user guid.
    pub owner: EntityGuid,
    /// Initial metadata.
    pub metadata: BTreeMap<String, Value>,
}

/// Seeding errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// The seed request is invalid.
    #[error("invalid seed: {0}")]
    Invalid(String),
    /// The seeder could not persist the entity.
    #[error("seed store error: {0}")]
    Store(String),
}

/// Seeding provider composed into the test context.
pub trait Seeder {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the user cannot be created.
    fn create_user(&self, seed: UserSeed) -> Result<User, SeedError>;

    /// Creates a content object.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the owner is unknown or persistence fails.
    fn create_object(&self, seed: ObjectSeed) -> Result<SeededObject, SeedError>;

    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] when the owner is unknown or persistence fails.
    fn create_group(&self, seed: GroupSeed) -> Result<SeededGroup, SeedError>;
}
