// crates/suite-harness-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Host
// Description: Test double implementing every host interface in memory.
// Purpose: Exercise the lifecycle harness without a real application.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`InMemoryHost`] stands in for a bootstrapped application: a service
//! registry with lazy initialization, the two access-override flags, a
//! session store with an admin logged in, and a seeder that hands out fresh
//! guids. The built-in `access` service owns the override flags, so resetting
//! it clears both.
//!
//! Shared state sits behind atomics and mutexes; poisoned locks surface as
//! errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::num::NonZeroU64;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::core::ComponentKind;
use crate::core::EntityGuid;
use crate::core::EntityKind;
use crate::core::SeededGroup;
use crate::core::SeededObject;
use crate::core::ServiceName;
use crate::core::User;
use crate::interfaces::AccessOverrides;
use crate::interfaces::GroupSeed;
use crate::interfaces::HostComponent;
use crate::interfaces::ObjectSeed;
use crate::interfaces::SeedError;
use crate::interfaces::Seeder;
use crate::interfaces::ServiceError;
use crate::interfaces::ServiceHandle;
use crate::interfaces::ServiceLocator;
use crate::interfaces::SessionError;
use crate::interfaces::SessionStore;
use crate::interfaces::UserSeed;
use crate::runtime::context::HostBindings;
use crate::runtime::context::TestContext;
use crate::runtime::fixtures::FixtureLocator;
use crate::runtime::harness::ExpectedKinds;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Built-in service owning the access-override flags.
pub const ACCESS_SERVICE: &str = "access";
/// Guid of the bootstrap administrator.
const BOOTSTRAP_ADMIN_GUID: EntityGuid = EntityGuid::new(NonZeroU64::MIN);
/// Username of the bootstrap administrator.
const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

// ============================================================================
// SECTION: Components
// ============================================================================

/// Host component that only reports a fixed kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticComponent {
    /// Reported kind.
    kind: ComponentKind,
}

impl StaticComponent {
    /// Creates a component reporting `kind`.
    #[must_use]
    pub fn new(kind: impl Into<ComponentKind>) -> Self {
        Self {
            kind: kind.into(),
        }
    }
}

impl HostComponent for StaticComponent {
    fn component_kind(&self) -> ComponentKind {
        self.kind.clone()
    }
}

/// Registry slot for one service.
#[derive(Debug, Default)]
struct ServiceSlot {
    /// Generation of the live instance, if initialized.
    live: Option<u64>,
    /// Last generation handed out.
    generation: u64,
    /// Number of reset calls received.
    reset_calls: u64,
}

// ============================================================================
// SECTION: Host
// ============================================================================

/// In-memory implementation of every host interface.
///
/// # Invariants
/// - The bootstrap administrator (guid 1) is logged in after construction.
/// - Seeded guids start at 2 and are never reused.
#[derive(Debug)]
pub struct InMemoryHost {
    /// Application handle.
    application: StaticComponent,
    /// Kind reported by the service locator.
    services_kind: ComponentKind,
    /// Configuration handle.
    config: StaticComponent,
    /// Registered services.
    services: Mutex<BTreeMap<ServiceName, ServiceSlot>>,
    /// Ignore-access override.
    ignore_access: AtomicBool,
    /// Show-hidden override.
    show_hidden: AtomicBool,
    /// Logged-in user.
    session: Mutex<Option<User>>,
    /// Bootstrap administrator.
    admin: User,
    /// Known entity kinds by guid.
    entities: Mutex<BTreeMap<EntityGuid, EntityKind>>,
    /// Next guid to hand out.
    next_guid: AtomicU64,
    /// Logical clock for seeded timestamps.
    clock: AtomicU64,
}

impl InMemoryHost {
    /// Creates a bootstrapped host with default component kinds and an admin session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kinds(&ExpectedKinds::default())
    }

    /// Creates a bootstrapped host reporting the given component kinds.
    #[must_use]
    pub fn with_kinds(kinds: &ExpectedKinds) -> Self {
        let admin = User {
            guid: BOOTSTRAP_ADMIN_GUID,
            username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
            admin: true,
        };
        let mut services = BTreeMap::new();
        services.insert(ServiceName::new(ACCESS_SERVICE), ServiceSlot::default());
        let mut entities = BTreeMap::new();
        entities.insert(admin.guid, EntityKind::new("user"));
        Self {
            application: StaticComponent::new(kinds.application.clone()),
            services_kind: kinds.services.clone(),
            config: StaticComponent::new(kinds.config.clone()),
            services: Mutex::new(services),
            ignore_access: AtomicBool::new(false),
            show_hidden: AtomicBool::new(false),
            session: Mutex::new(Some(admin.clone())),
            admin,
            entities: Mutex::new(entities),
            next_guid: AtomicU64::new(BOOTSTRAP_ADMIN_GUID.get() + 1),
            clock: AtomicU64::new(1),
        }
    }

    /// Registers an additional service and returns the host.
    #[must_use]
    pub fn with_service(mut self, name: impl Into<ServiceName>) -> Self {
        if let Ok(services) = self.services.get_mut() {
            services.entry(name.into()).or_default();
        }
        self
    }

    /// Returns the bootstrap administrator.
    #[must_use]
    pub const fn admin(&self) -> &User {
        &self.admin
    }

    /// Returns host bindings borrowing this host.
    #[must_use]
    pub fn bindings(&self) -> HostBindings<'_> {
        HostBindings {
            application: &self.application,
            services: self,
            config: &self.config,
            access: self,
            session: self,
        }
    }

    /// Returns a test context using this host as seeder.
    #[must_use]
    pub fn context<'a>(&'a self, fixtures: &'a FixtureLocator) -> TestContext<'a> {
        TestContext::new(self.bindings(), self, fixtures)
    }

    /// Returns true when the service currently has a live instance.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service is unknown or the registry is poisoned.
    pub fn is_initialized(&self, name: &ServiceName) -> Result<bool, ServiceError> {
        self.with_slot(name, |slot| slot.live.is_some())
    }

    /// Returns how many times the service has been reset.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service is unknown or the registry is poisoned.
    pub fn reset_calls(&self, name: &ServiceName) -> Result<u64, ServiceError> {
        self.with_slot(name, |slot| slot.reset_calls)
    }

    /// Runs `f` against a registered slot.
    fn with_slot<T>(
        &self,
        name: &ServiceName,
        f: impl FnOnce(&mut ServiceSlot) -> T,
    ) -> Result<T, ServiceError> {
        let mut services = self
            .services
            .lock()
            .map_err(|_| ServiceError::Unavailable("service registry mutex poisoned".to_string()))?;
        let slot = services.get_mut(name).ok_or_else(|| ServiceError::Unknown(name.clone()))?;
        Ok(f(slot))
    }

    /// Allocates a fresh guid and records its kind.
    fn allocate(&self, kind: EntityKind) -> Result<EntityGuid, SeedError> {
        let raw = self.next_guid.fetch_add(1, Ordering::SeqCst);
        let guid = EntityGuid::from_raw(raw)
            .ok_or_else(|| SeedError::Store("guid counter overflowed".to_string()))?;
        self.entities
            .lock()
            .map_err(|_| SeedError::Store("entity registry mutex poisoned".to_string()))?
            .insert(guid, kind);
        Ok(guid)
    }

    /// Requires `guid` to name a known entity.
    fn require_entity(&self, guid: EntityGuid, role: &str) -> Result<(), SeedError> {
        let entities = self
            .entities
            .lock()
            .map_err(|_| SeedError::Store("entity registry mutex poisoned".to_string()))?;
        if entities.contains_key(&guid) {
            Ok(())
        } else {
            Err(SeedError::Invalid(format!("unknown {role} guid: {guid}")))
        }
    }

    /// Advances the logical clock.
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Service Locator
// ============================================================================

impl HostComponent for InMemoryHost {
    fn component_kind(&self) -> ComponentKind {
        self.services_kind.clone()
    }
}

impl ServiceLocator for InMemoryHost {
    fn has_service(&self, name: &ServiceName) -> bool {
        self.services.lock().is_ok_and(|services| services.contains_key(name))
    }

    fn get_service(&self, name: &ServiceName) -> Result<ServiceHandle, ServiceError> {
        let generation = self.with_slot(name, |slot| {
            if let Some(live) = slot.live {
                return live;
            }
            slot.generation += 1;
            slot.live = Some(slot.generation);
            slot.generation
        })?;
        Ok(ServiceHandle {
            name: name.clone(),
            generation,
        })
    }

    fn reset_service(&self, name: &ServiceName) -> Result<(), ServiceError> {
        self.with_slot(name, |slot| {
            slot.reset_calls += 1;
            slot.live = None;
        })?;
        if name.as_str() == ACCESS_SERVICE {
            self.ignore_access.store(false, Ordering::SeqCst);
            self.show_hidden.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Access Overrides
// ============================================================================

impl AccessOverrides for InMemoryHost {
    fn is_access_ignored(&self) -> bool {
        self.ignore_access.load(Ordering::SeqCst)
    }

    fn is_hidden_content_visible(&self) -> bool {
        self.show_hidden.load(Ordering::SeqCst)
    }

    fn set_ignore_access(&self, ignore: bool) -> bool {
        self.ignore_access.swap(ignore, Ordering::SeqCst)
    }

    fn set_show_hidden(&self, show: bool) -> bool {
        self.show_hidden.swap(show, Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Error returned when the session mutex is poisoned.
fn session_poisoned() -> SessionError {
    SessionError::Unavailable("session mutex poisoned".to_string())
}

impl SessionStore for InMemoryHost {
    fn logged_in_user(&self) -> Result<Option<User>, SessionError> {
        Ok(self.session.lock().map_err(|_| session_poisoned())?.clone())
    }

    fn set_logged_in_user(&self, user: User) -> Result<(), SessionError> {
        *self.session.lock().map_err(|_| session_poisoned())? = Some(user);
        Ok(())
    }

    fn remove_logged_in_user(&self) -> Result<(), SessionError> {
        *self.session.lock().map_err(|_| session_poisoned())? = None;
        Ok(())
    }

    fn is_admin_session_active(&self) -> Result<bool, SessionError> {
        let session = self.session.lock().map_err(|_| session_poisoned())?;
        Ok(session.as_ref().is_some_and(|user| user.admin))
    }
}

// ============================================================================
// SECTION: Seeder
// ============================================================================

impl Seeder for InMemoryHost {
    fn create_user(&self, seed: UserSeed) -> Result<User, SeedError> {
        if let Some(username) = &seed.username
            && username.trim().is_empty()
        {
            return Err(SeedError::Invalid("username must be non-empty".to_string()));
        }
        let guid = self.allocate(EntityKind::new("user"))?;
        Ok(User {
            guid,
            username: seed.username.unwrap_or_else(|| format!("seed_user_{guid}")),
            admin: seed.admin,
        })
    }

    fn create_object(&self, seed: ObjectSeed) -> Result<SeededObject, SeedError> {
        if seed.subtype.trim().is_empty() {
            return Err(SeedError::Invalid("object subtype must be non-empty".to_string()));
        }
        self.require_entity(seed.owner, "owner")?;
        let container = seed.container.unwrap_or(seed.owner);
        self.require_entity(container, "container")?;
        let guid = self.allocate(EntityKind::with_subtype("object", seed.subtype.clone()))?;
        let now = self.tick();
        Ok(SeededObject {
            guid,
            title: seed.title.unwrap_or_else(|| format!("Seeded {} {guid}", seed.subtype)),
            subtype: seed.subtype,
            owner_guid: seed.owner,
            container_guid: container,
            time_created: now,
            time_updated: now,
            metadata: seed.metadata,
        })
    }

    fn create_group(&self, seed: GroupSeed) -> Result<SeededGroup, SeedError> {
        self.require_entity(seed.owner, "owner")?;
        let guid = self.allocate(EntityKind::new("group"))?;
        Ok(SeededGroup {
            guid,
            name: seed.name.unwrap_or_else(|| format!("Seeded group {guid}")),
            owner_guid: seed.owner,
            metadata: seed.metadata,
        })
    }
}
