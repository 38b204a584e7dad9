// crates/suite-harness-core/src/runtime/context.rs
// ============================================================================
// Module: Test Context
// Description: Explicit handles to host state passed into lifecycle hooks.
// Purpose: Replace ambient globals with a single borrowed context object.
// Dependencies: crate::interfaces, crate::runtime::fixtures
// ============================================================================

//! ## Overview
//! A [`TestContext`] borrows every piece of host state a test may touch: the
//! application handle, the service locator, the configuration handle, the
//! access-override flags and the session. It also carries the two composed
//! collaborators, a [`Seeder`] and a [`FixtureLocator`]. Hooks and test
//! bodies receive the context explicitly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::interfaces::AccessOverrides;
use crate::interfaces::HostComponent;
use crate::interfaces::Seeder;
use crate::interfaces::ServiceLocator;
use crate::interfaces::SessionStore;
use crate::runtime::fixtures::FixtureLocator;

// ============================================================================
// SECTION: Host Bindings
// ============================================================================

/// Borrowed handles to the bootstrapped host.
#[derive(Clone, Copy)]
pub struct HostBindings<'a> {
    /// Application instance.
    pub application: &'a dyn HostComponent,
    /// Service locator.
    pub services: &'a dyn ServiceLocator,
    /// Global configuration object.
    pub config: &'a dyn HostComponent,
    /// Access-override flags.
    pub access: &'a dyn AccessOverrides,
    /// Session accessor.
    pub session: &'a dyn SessionStore,
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Context passed to lifecycle hooks and test bodies.
#[derive(Clone, Copy)]
pub struct TestContext<'a> {
    /// Host handles.
    host: HostBindings<'a>,
    /// Seeding collaborator.
    seeder: &'a dyn Seeder,
    /// Fixture collaborator.
    fixtures: &'a FixtureLocator,
}

impl<'a> TestContext<'a> {
    /// Creates a context from host bindings and collaborators.
    #[must_use]
    pub const fn new(
        host: HostBindings<'a>,
        seeder: &'a dyn Seeder,
        fixtures: &'a FixtureLocator,
    ) -> Self {
        Self {
            host,
            seeder,
            fixtures,
        }
    }

    /// Returns the application handle.
    #[must_use]
    pub const fn application(&self) -> &'a dyn HostComponent {
        self.host.application
    }

    /// Returns the service locator.
    #[must_use]
    pub const fn services(&self) -> &'a dyn ServiceLocator {
        self.host.services
    }

    /// Returns the configuration handle.
    #[must_use]
    pub const fn config(&self) -> &'a dyn HostComponent {
        self.host.config
    }

    /// Returns the access-override flags.
    #[must_use]
    pub const fn access(&self) -> &'a dyn AccessOverrides {
        self.host.access
    }

    /// Returns the session accessor.
    #[must_use]
    pub const fn session(&self) -> &'a dyn SessionStore {
        self.host.session
    }

    /// Returns the seeding collaborator.
    #[must_use]
    pub const fn seeder(&self) -> &'a dyn Seeder {
        self.seeder
    }

    /// Returns the fixture collaborator.
    #[must_use]
    pub const fn fixtures(&self) -> &'a FixtureLocator {
        self.fixtures
    }
}
