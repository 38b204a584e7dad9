// crates/suite-harness-core/src/runtime/memory_tests.rs
// ============================================================================
// Module: In-Memory Host Unit Tests
// Description: Unit coverage for the in-memory host double.
// Purpose: Ensure the double honors the host interface contracts.
// Dependencies: crate::runtime::memory
// ============================================================================

//! ## Overview
//! Unit coverage for the in-memory host double.
//! Invariants:
//! - Resetting an uninitialized service is a no-op.
//! - The access service owns the override flags.
//! - Seeding rejects unknown owners.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use super::memory::ACCESS_SERVICE;
use super::memory::InMemoryHost;
use crate::core::EntityGuid;
use crate::core::ServiceName;
use crate::interfaces::AccessOverrides;
use crate::interfaces::GroupSeed;
use crate::interfaces::ObjectSeed;
use crate::interfaces::SeedError;
use crate::interfaces::Seeder;
use crate::interfaces::ServiceError;
use crate::interfaces::ServiceLocator;
use crate::interfaces::SessionStore;
use crate::interfaces::UserSeed;

#[test]
fn services_initialize_lazily_and_bump_generation_after_reset() {
    let host = InMemoryHost::new().with_service("cache");
    let cache = ServiceName::new("cache");
    assert!(!host.is_initialized(&cache).unwrap());

    let first = host.get_service(&cache).unwrap();
    let again = host.get_service(&cache).unwrap();
    assert_eq!(first.generation, 1);
    assert_eq!(again.generation, 1);

    host.reset_service(&cache).unwrap();
    assert!(!host.is_initialized(&cache).unwrap());
    assert_eq!(host.get_service(&cache).unwrap().generation, 2);
}

#[test]
fn resetting_uninitialized_service_is_a_noop() {
    let host = InMemoryHost::new().with_service("search-index");
    let index = ServiceName::new("search-index");
    host.reset_service(&index).unwrap();
    host.reset_service(&index).unwrap();
    assert!(!host.is_initialized(&index).unwrap());
    assert_eq!(host.reset_calls(&index).unwrap(), 2);
}

#[test]
fn unknown_services_are_reported() {
    let host = InMemoryHost::new();
    let missing = ServiceName::new("missing");
    assert!(!host.has_service(&missing));
    assert_eq!(host.reset_service(&missing), Err(ServiceError::Unknown(missing.clone())));
    assert!(matches!(host.get_service(&missing), Err(ServiceError::Unknown(_))));
}

#[test]
fn access_service_reset_clears_override_flags() {
    let host = InMemoryHost::new();
    assert!(!host.set_ignore_access(true));
    assert!(!host.set_show_hidden(true));
    assert!(host.is_access_ignored());
    assert!(host.is_hidden_content_visible());

    host.reset_service(&ServiceName::new(ACCESS_SERVICE)).unwrap();
    assert!(!host.is_access_ignored());
    assert!(!host.is_hidden_content_visible());
}

#[test]
fn host_boots_with_admin_session() {
    let host = InMemoryHost::new();
    assert!(host.is_admin_session_active().unwrap());
    assert_eq!(host.logged_in_user().unwrap().as_ref(), Some(host.admin()));

    host.remove_logged_in_user().unwrap();
    assert!(!host.is_admin_session_active().unwrap());
}

#[test]
fn seeding_assigns_fresh_guids_and_validates_owners() {
    let host = InMemoryHost::new();
    let user = host.create_user(UserSeed::default()).unwrap();
    assert_eq!(user.guid.get(), 2);
    assert_eq!(user.username, "seed_user_2");
    assert!(!user.admin);

    let blog = host.create_object(ObjectSeed::new("blog", user.guid)).unwrap();
    assert_eq!(blog.owner_guid, user.guid);
    assert_eq!(blog.container_guid, user.guid);
    assert!(blog.guid > user.guid);

    let group = host
        .create_group(GroupSeed {
            name: None,
            owner: user.guid,
            metadata: std::collections::BTreeMap::new(),
        })
        .unwrap();
    assert!(group.guid > blog.guid);

    let orphan = ObjectSeed::new("blog", EntityGuid::from_raw(999).unwrap());
    assert!(matches!(host.create_object(orphan), Err(SeedError::Invalid(_))));
}

#[test]
fn seeding_rejects_blank_inputs() {
    let host = InMemoryHost::new();
    let blank_user = UserSeed {
        username: Some("  ".to_string()),
        admin: false,
    };
    assert!(host.create_user(blank_user).is_err());
    assert!(host.create_object(ObjectSeed::new(" ", host.admin().guid)).is_err());
}
