// crates/suite-harness-core/src/runtime/harness.rs
// ============================================================================
// Module: Lifecycle Harness
// Description: Sealed per-test set-up and tear-down orchestration.
// Purpose: Reset services, check environment invariants, and run test hooks.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`LifecycleHarness`] owns one [`TestCase`] and wraps every test with a
//! fixed sequence that test cases cannot reorder:
//!
//! - `before_each`: reset declared services, require both access overrides
//!   off, require the application, service locator and config to be of the
//!   expected kinds, require an admin session, then call `on_set_up`.
//! - `after_each`: call `on_tear_down`, then require both access overrides
//!   off and the admin session still active.
//!
//! Environment checks abort the test with [`HarnessError::Precondition`].
//! Unknown resettable services are rejected when the harness is built.
//!
//! ## Invariants
//! - Only the services declared by the test case are ever reset.
//! - Tear-down cleanup runs before the leak checks, so it is covered by them.
//! - The harness verifies shared state; it never forces flags or sessions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::ComponentKind;
use crate::core::ServiceName;
use crate::core::User;
use crate::interfaces::SeedError;
use crate::interfaces::ServiceError;
use crate::interfaces::SessionError;
use crate::runtime::audit::HarnessAuditEvent;
use crate::runtime::audit::HarnessAuditSink;
use crate::runtime::audit::HarnessOutcome;
use crate::runtime::audit::HarnessPhase;
use crate::runtime::audit::NoopHarnessAuditSink;
use crate::runtime::context::TestContext;
use crate::runtime::equivalence::AttributeEquivalence;
use crate::runtime::equivalence::EquivalenceError;
use crate::runtime::equivalence::EquivalenceRule;
use crate::runtime::equivalence::Subject;
use crate::runtime::equivalence::assert_entities_equivalent;
use crate::runtime::fixtures::FixtureError;
use crate::runtime::session::swap_session_user;

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// Failure raised by a hook or a test body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TestFailure {
    /// Failure description.
    message: String,
}

impl TestFailure {
    /// Creates a failure with the given description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EquivalenceError> for TestFailure {
    fn from(err: EquivalenceError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<SessionError> for TestFailure {
    fn from(err: SessionError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<SeedError> for TestFailure {
    fn from(err: SeedError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<ServiceError> for TestFailure {
    fn from(err: ServiceError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<FixtureError> for TestFailure {
    fn from(err: FixtureError) -> Self {
        Self::new(err.to_string())
    }
}

/// Extension surface implemented by each concrete test case.
pub trait TestCase {
    /// Returns the test case label used in errors and audit events.
    fn name(&self) -> &str;

    /// Returns the services reset before every test. Defaults to none.
    fn resettable_services(&self) -> Vec<ServiceName> {
        Vec::new()
    }

    /// Test-specific set-up, called after the environment checks pass.
    ///
    /// # Errors
    ///
    /// Returns [`TestFailure`] when fixtures cannot be prepared.
    fn on_set_up(&mut self, ctx: &TestContext<'_>) -> Result<(), TestFailure>;

    /// Test-specific tear-down, called before the leak checks.
    ///
    /// # Errors
    ///
    /// Returns [`TestFailure`] when fixtures cannot be cleaned up.
    fn on_tear_down(&mut self, ctx: &TestContext<'_>) -> Result<(), TestFailure>;
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Access-override flag checked by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFlag {
    /// Access control is being ignored.
    IgnoreAccess,
    /// Hidden content is visible.
    ShowHidden,
}

impl fmt::Display for AccessFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IgnoreAccess => f.write_str("ignore-access"),
            Self::ShowHidden => f.write_str("show-hidden"),
        }
    }
}

/// Host component whose kind is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    /// Application instance.
    Application,
    /// Service locator.
    ServiceLocator,
    /// Configuration object.
    Config,
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => f.write_str("application"),
            Self::ServiceLocator => f.write_str("service locator"),
            Self::Config => f.write_str("config"),
        }
    }
}

/// Environment precondition violations; fatal to the current test.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    /// An access override was left on.
    #[error("{flag} override is still enabled at {phase}")]
    AccessOverrideLeaked {
        /// Leaked flag.
        flag: AccessFlag,
        /// Phase that detected the leak.
        phase: HarnessPhase,
    },
    /// No admin-equivalent principal is logged in.
    #[error("admin session is not active at {phase}")]
    AdminSessionMissing {
        /// Phase that detected the missing session.
        phase: HarnessPhase,
    },
    /// A host component is not of the expected kind.
    #[error("{role} has kind {actual}, expected {expected}")]
    UnexpectedKind {
        /// Checked component.
        role: ComponentRole,
        /// Expected kind.
        expected: ComponentKind,
        /// Reported kind.
        actual: ComponentKind,
    },
    /// The session could not be inspected.
    #[error("session could not be inspected at {phase}: {error}")]
    SessionUnavailable {
        /// Phase that attempted the check.
        phase: HarnessPhase,
        /// Underlying session error.
        error: SessionError,
    },
}

/// Harness construction errors; reported before any test runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A declared resettable service is not registered with the locator.
    #[error("test case {test_case} declares unknown resettable service: {service}")]
    UnknownService {
        /// Test case label.
        test_case: String,
        /// Unknown service.
        service: ServiceName,
    },
    /// A resettable service is declared more than once.
    #[error("test case {test_case} declares resettable service more than once: {service}")]
    DuplicateService {
        /// Test case label.
        test_case: String,
        /// Duplicated service.
        service: ServiceName,
    },
}

/// Lifecycle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Environment precondition violated.
    #[error("environment precondition failed: {0}")]
    Precondition(#[from] PreconditionViolation),
    /// Invalid harness configuration.
    #[error("harness configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The locator failed to reset a declared service.
    #[error("service reset failed: {0}")]
    Service(#[from] ServiceError),
    /// A test case hook failed.
    #[error("{phase} hook failed: {failure}")]
    Hook {
        /// Phase running the hook.
        phase: HarnessPhase,
        /// Hook failure.
        failure: TestFailure,
    },
    /// The test body failed.
    #[error("test body failed: {0}")]
    Body(TestFailure),
    /// The test body failed and tear-down failed afterwards.
    #[error("test body failed: {body}; tear-down also failed: {teardown}")]
    BodyAndTeardown {
        /// Body failure.
        body: TestFailure,
        /// Tear-down failure.
        teardown: Box<HarnessError>,
    },
}

impl HarnessError {
    /// Returns the precondition violation when this error is one.
    #[must_use]
    pub const fn precondition(&self) -> Option<&PreconditionViolation> {
        match self {
            Self::Precondition(violation) => Some(violation),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Component kinds the bootstrapped host must report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedKinds {
    /// Application kind.
    pub application: ComponentKind,
    /// Service locator kind.
    pub services: ComponentKind,
    /// Configuration object kind.
    pub config: ComponentKind,
}

impl Default for ExpectedKinds {
    fn default() -> Self {
        Self {
            application: ComponentKind::new("application"),
            services: ComponentKind::new("service-provider"),
            config: ComponentKind::new("config"),
        }
    }
}

/// Harness options.
pub struct HarnessOptions {
    /// Expected host component kinds.
    pub expected_kinds: ExpectedKinds,
    /// Rule used by entity equivalence assertions.
    pub equivalence: Box<dyn EquivalenceRule>,
    /// Lifecycle audit sink.
    pub audit: Arc<dyn HarnessAuditSink>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            expected_kinds: ExpectedKinds::default(),
            equivalence: Box::new(AttributeEquivalence::default()),
            audit: Arc::new(NoopHarnessAuditSink),
        }
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Sealed lifecycle orchestration around a single test case.
pub struct LifecycleHarness<'a, C: TestCase> {
    /// Host handles and collaborators.
    ctx: TestContext<'a>,
    /// Wrapped test case.
    case: C,
    /// Validated resettable services.
    services: Vec<ServiceName>,
    /// Harness options.
    options: HarnessOptions,
}

impl<'a, C: TestCase> LifecycleHarness<'a, C> {
    /// Builds a harness and validates the case's resettable services.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a declared service is unknown to the
    /// locator or declared twice.
    pub fn new(
        ctx: TestContext<'a>,
        case: C,
        options: HarnessOptions,
    ) -> Result<Self, ConfigurationError> {
        let services = case.resettable_services();
        let mut seen = BTreeSet::new();
        for service in &services {
            if !seen.insert(service) {
                return Err(ConfigurationError::DuplicateService {
                    test_case: case.name().to_string(),
                    service: service.clone(),
                });
            }
            if !ctx.services().has_service(service) {
                return Err(ConfigurationError::UnknownService {
                    test_case: case.name().to_string(),
                    service: service.clone(),
                });
            }
        }
        Ok(Self {
            ctx,
            case,
            services,
            options,
        })
    }

    /// Returns the test context.
    #[must_use]
    pub const fn context(&self) -> &TestContext<'a> {
        &self.ctx
    }

    /// Returns the wrapped test case.
    #[must_use]
    pub const fn case(&self) -> &C {
        &self.case
    }

    /// Returns the wrapped test case mutably.
    pub const fn case_mut(&mut self) -> &mut C {
        &mut self.case
    }

    /// Consumes the harness and returns the test case.
    #[must_use]
    pub fn into_case(self) -> C {
        self.case
    }

    /// Returns the validated resettable services.
    #[must_use]
    pub fn resettable_services(&self) -> &[ServiceName] {
        &self.services
    }

    /// Resets every declared service, and only those.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Service`] when the locator rejects a reset.
    pub fn reset_services(&self) -> Result<(), HarnessError> {
        let result = self.reset_declared_services();
        let detail = match &result {
            Ok(()) => Some(format!("reset {} service(s)", self.services.len())),
            Err(err) => Some(err.to_string()),
        };
        self.record(HarnessPhase::ResetServices, result.is_ok(), detail);
        result
    }

    /// Sealed set-up phase.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when a reset fails, an environment check fails,
    /// or the `on_set_up` hook fails.
    pub fn before_each(&mut self) -> Result<(), HarnessError> {
        let result = self.set_up_phase();
        self.record_result(HarnessPhase::BeforeEach, &result);
        result
    }

    /// Sealed tear-down phase.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the `on_tear_down` hook fails or an
    /// environment check fails afterwards.
    pub fn after_each(&mut self) -> Result<(), HarnessError> {
        let result = self.tear_down_phase();
        self.record_result(HarnessPhase::AfterEach, &result);
        result
    }

    /// Runs one test: set-up, body, tear-down.
    ///
    /// Tear-down runs even when the body fails. A failed set-up skips both.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] for the first failing phase; body and
    /// tear-down failures are combined when both occur.
    pub fn run<F>(&mut self, body: F) -> Result<(), HarnessError>
    where
        F: FnOnce(&mut C, &TestContext<'a>) -> Result<(), TestFailure>,
    {
        self.before_each()?;
        let ctx = self.ctx;
        let body_result = body(&mut self.case, &ctx);
        let detail = body_result.as_ref().err().map(ToString::to_string);
        self.record(HarnessPhase::Body, body_result.is_ok(), detail);
        let teardown = self.after_each();
        match (body_result, teardown) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(err)) => Err(err),
            (Err(failure), Ok(())) => Err(HarnessError::Body(failure)),
            (Err(failure), Err(err)) => Err(HarnessError::BodyAndTeardown {
                body: failure,
                teardown: Box::new(err),
            }),
        }
    }

    /// Asserts two subjects are equivalent entities under the configured rule.
    ///
    /// # Errors
    ///
    /// Returns [`EquivalenceError`] naming the failing cause.
    pub fn assert_entities_equivalent(
        &self,
        first: Subject<'_>,
        second: Subject<'_>,
        message: Option<&str>,
    ) -> Result<(), EquivalenceError> {
        assert_entities_equivalent(self.options.equivalence.as_ref(), first, second, message)
    }

    /// Replaces the session user and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be read or written.
    pub fn swap_session_user(&self, user: Option<User>) -> Result<Option<User>, SessionError> {
        let next = user.as_ref().map(|user| user.guid);
        let result = swap_session_user(self.ctx.session(), user);
        let detail = match &result {
            Ok(_) => Some(next.map_or_else(
                || "logged out".to_string(),
                |guid| format!("logged in as {guid}"),
            )),
            Err(err) => Some(err.to_string()),
        };
        self.record(HarnessPhase::SessionSwap, result.is_ok(), detail);
        result
    }

    // ------------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------------

    /// Resets declared services without recording an audit event.
    fn reset_declared_services(&self) -> Result<(), HarnessError> {
        for service in &self.services {
            self.ctx.services().reset_service(service)?;
        }
        Ok(())
    }

    /// Runs the set-up checks and hook.
    fn set_up_phase(&mut self) -> Result<(), HarnessError> {
        self.reset_services()?;
        self.check_access_overrides(HarnessPhase::BeforeEach)?;
        self.check_component_kinds()?;
        self.check_admin_session(HarnessPhase::BeforeEach)?;
        let ctx = self.ctx;
        self.case.on_set_up(&ctx).map_err(|failure| HarnessError::Hook {
            phase: HarnessPhase::BeforeEach,
            failure,
        })
    }

    /// Runs the tear-down hook and checks.
    fn tear_down_phase(&mut self) -> Result<(), HarnessError> {
        let ctx = self.ctx;
        self.case.on_tear_down(&ctx).map_err(|failure| HarnessError::Hook {
            phase: HarnessPhase::AfterEach,
            failure,
        })?;
        self.check_access_overrides(HarnessPhase::AfterEach)?;
        self.check_admin_session(HarnessPhase::AfterEach)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------------

    /// Requires both access overrides to be off.
    fn check_access_overrides(&self, phase: HarnessPhase) -> Result<(), PreconditionViolation> {
        let access = self.ctx.access();
        if access.is_access_ignored() {
            return Err(PreconditionViolation::AccessOverrideLeaked {
                flag: AccessFlag::IgnoreAccess,
                phase,
            });
        }
        if access.is_hidden_content_visible() {
            return Err(PreconditionViolation::AccessOverrideLeaked {
                flag: AccessFlag::ShowHidden,
                phase,
            });
        }
        Ok(())
    }

    /// Requires the application, locator and config to report expected kinds.
    fn check_component_kinds(&self) -> Result<(), PreconditionViolation> {
        let expected = &self.options.expected_kinds;
        let checks = [
            (ComponentRole::Application, &expected.application, self.ctx.application().component_kind()),
            (ComponentRole::ServiceLocator, &expected.services, self.ctx.services().component_kind()),
            (ComponentRole::Config, &expected.config, self.ctx.config().component_kind()),
        ];
        for (role, expected, actual) in checks {
            if *expected != actual {
                return Err(PreconditionViolation::UnexpectedKind {
                    role,
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Requires an admin-equivalent session.
    fn check_admin_session(&self, phase: HarnessPhase) -> Result<(), PreconditionViolation> {
        let active = self.ctx.session().is_admin_session_active().map_err(|error| {
            PreconditionViolation::SessionUnavailable {
                phase,
                error,
            }
        })?;
        if active {
            Ok(())
        } else {
            Err(PreconditionViolation::AdminSessionMissing {
                phase,
            })
        }
    }

    // ------------------------------------------------------------------------
    // Audit
    // ------------------------------------------------------------------------

    /// Records a phase result.
    fn record_result(&self, phase: HarnessPhase, result: &Result<(), HarnessError>) {
        let detail = result.as_ref().err().map(ToString::to_string);
        self.record(phase, result.is_ok(), detail);
    }

    /// Records an audit event for the wrapped case.
    fn record(&self, phase: HarnessPhase, ok: bool, detail: Option<String>) {
        let outcome = if ok { HarnessOutcome::Ok } else { HarnessOutcome::Error };
        self.options.audit.record(&HarnessAuditEvent::new(self.case.name(), phase, outcome, detail));
    }
}
