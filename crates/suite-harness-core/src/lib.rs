// crates/suite-harness-core/src/lib.rs
// ============================================================================
// Module: Suite Harness Core Library
// Description: Public API surface for the suite harness core.
// Purpose: Expose core types, host interfaces, and the lifecycle runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Suite harness core wraps tests that run against a bootstrapped host
//! application. Each test gets a sealed lifecycle: declared services are
//! reset, access overrides and the admin session are checked before and
//! after the test, and test-specific fixtures run through two hooks. Host
//! state is reached only through the explicit [`TestContext`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::AccessOverrides;
pub use interfaces::GroupSeed;
pub use interfaces::HostComponent;
pub use interfaces::ObjectSeed;
pub use interfaces::SeedError;
pub use interfaces::Seeder;
pub use interfaces::ServiceError;
pub use interfaces::ServiceHandle;
pub use interfaces::ServiceLocator;
pub use interfaces::SessionError;
pub use interfaces::SessionStore;
pub use interfaces::UserSeed;
pub use crate::runtime::*;
