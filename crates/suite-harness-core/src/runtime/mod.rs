// crates/suite-harness-core/src/runtime/mod.rs
// ============================================================================
// Module: Suite Harness Runtime
// Description: Lifecycle orchestration, assertions, and host doubles.
// Purpose: Wire host interfaces into the sealed per-test lifecycle.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime holds the lifecycle harness and everything it composes: the
//! test context, entity equivalence, session swapping, fixture lookup, audit
//! sinks, and the in-memory host used by the crate's own tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod context;
pub mod equivalence;
pub mod fixtures;
pub mod harness;
pub mod memory;
pub mod session;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod memory_tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use audit::FileHarnessAuditSink;
pub use audit::HarnessAuditEvent;
pub use audit::HarnessAuditSink;
pub use audit::HarnessOutcome;
pub use audit::HarnessPhase;
pub use audit::NoopHarnessAuditSink;
pub use audit::StderrHarnessAuditSink;
pub use context::HostBindings;
pub use context::TestContext;
pub use equivalence::ArgumentPosition;
pub use equivalence::AttributeEquivalence;
pub use equivalence::DEFAULT_IGNORED_FIELDS;
pub use equivalence::EquivalenceError;
pub use equivalence::EquivalenceRule;
pub use equivalence::FieldMismatch;
pub use equivalence::SnapshotSection;
pub use equivalence::Subject;
pub use equivalence::assert_entities_equivalent;
pub use equivalence::entities_equivalent;
pub use fixtures::FixtureError;
pub use fixtures::FixtureLocator;
pub use harness::AccessFlag;
pub use harness::ComponentRole;
pub use harness::ConfigurationError;
pub use harness::ExpectedKinds;
pub use harness::HarnessError;
pub use harness::HarnessOptions;
pub use harness::LifecycleHarness;
pub use harness::PreconditionViolation;
pub use harness::TestCase;
pub use harness::TestFailure;
pub use memory::ACCESS_SERVICE;
pub use memory::InMemoryHost;
pub use memory::StaticComponent;
pub use session::swap_session_user;
