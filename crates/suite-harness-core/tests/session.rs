//! Session swap tests for suite-harness-core.
// crates/suite-harness-core/tests/session.rs
// ============================================================================
// Module: Session Swap Tests
// Description: Coverage for replacing and restoring the session user.
// Purpose: Ensure swaps return the prior user and are audited by the harness.
// Dependencies: suite-harness-core
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use suite_harness_core::FixtureLocator;
use suite_harness_core::HarnessAuditEvent;
use suite_harness_core::HarnessAuditSink;
use suite_harness_core::HarnessOptions;
use suite_harness_core::HarnessOutcome;
use suite_harness_core::HarnessPhase;
use suite_harness_core::InMemoryHost;
use suite_harness_core::LifecycleHarness;
use suite_harness_core::PreconditionViolation;
use suite_harness_core::Seeder;
use suite_harness_core::SessionStore;
use suite_harness_core::TestCase;
use suite_harness_core::TestContext;
use suite_harness_core::TestFailure;
use suite_harness_core::UserSeed;
use suite_harness_core::swap_session_user;

#[derive(Default)]
struct CollectingAudit {
    events: Mutex<Vec<HarnessAuditEvent>>,
}

impl HarnessAuditSink for CollectingAudit {
    fn record(&self, event: &HarnessAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct PlainCase;

impl TestCase for PlainCase {
    fn name(&self) -> &str {
        "plain_case"
    }

    fn on_set_up(&mut self, _ctx: &TestContext<'_>) -> Result<(), TestFailure> {
        Ok(())
    }

    fn on_tear_down(&mut self, _ctx: &TestContext<'_>) -> Result<(), TestFailure> {
        Ok(())
    }
}

#[test]
fn swap_returns_previous_user_and_installs_new_one() {
    let host = InMemoryHost::new();
    let member = host.create_user(UserSeed::default()).unwrap();

    let previous = swap_session_user(&host, Some(member.clone())).unwrap();
    assert_eq!(previous.as_ref(), Some(host.admin()));
    assert_eq!(host.logged_in_user().unwrap(), Some(member.clone()));
    assert!(!host.is_admin_session_active().unwrap());

    let restored = swap_session_user(&host, previous).unwrap();
    assert_eq!(restored, Some(member));
    assert!(host.is_admin_session_active().unwrap());
}

#[test]
fn swapping_in_none_logs_out() {
    let host = InMemoryHost::new();
    let previous = swap_session_user(&host, None).unwrap();
    assert_eq!(previous.as_ref(), Some(host.admin()));
    assert_eq!(host.logged_in_user().unwrap(), None);

    let again = swap_session_user(&host, None).unwrap();
    assert_eq!(again, None);
}

#[test]
fn body_that_restores_session_passes_tear_down() {
    let host = InMemoryHost::new();
    let fixtures = FixtureLocator::new("fixtures");
    let audit = Arc::new(CollectingAudit::default());
    let options = HarnessOptions {
        audit: Arc::clone(&audit) as Arc<dyn HarnessAuditSink>,
        ..HarnessOptions::default()
    };
    let mut harness = LifecycleHarness::new(host.context(&fixtures), PlainCase, options).unwrap();
    let member = host.create_user(UserSeed::default()).unwrap();

    harness.before_each().unwrap();
    let previous = harness.swap_session_user(Some(member.clone())).unwrap();
    assert_eq!(host.logged_in_user().unwrap(), Some(member.clone()));
    harness.swap_session_user(previous).unwrap();
    harness.after_each().unwrap();

    let swaps: Vec<HarnessAuditEvent> = audit
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|event| event.phase == HarnessPhase::SessionSwap)
        .cloned()
        .collect();
    assert_eq!(swaps.len(), 2);
    assert!(swaps.iter().all(|event| event.outcome == HarnessOutcome::Ok));
    assert_eq!(swaps[0].detail.as_deref(), Some(format!("logged in as {}", member.guid).as_str()));
    assert_eq!(swaps[0].test_case, "plain_case");
}

#[test]
fn body_that_leaves_non_admin_session_fails_tear_down() {
    let host = InMemoryHost::new();
    let fixtures = FixtureLocator::new("fixtures");
    let mut harness =
        LifecycleHarness::new(host.context(&fixtures), PlainCase, HarnessOptions::default())
            .unwrap();
    let member = host.create_user(UserSeed::default()).unwrap();

    let err = harness
        .run(|_case, ctx| {
            swap_session_user(ctx.session(), Some(member.clone()))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err.precondition(),
        Some(PreconditionViolation::AdminSessionMissing {
            phase: HarnessPhase::AfterEach
        })
    ));
}
