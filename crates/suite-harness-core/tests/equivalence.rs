//! Entity equivalence tests for suite-harness-core.
// crates/suite-harness-core/tests/equivalence.rs
// ============================================================================
// Module: Entity Equivalence Tests
// Description: Coverage for the entity equivalence assertion and default rule.
// Purpose: Ensure each failure cause is distinguishable and diffs are precise.
// Dependencies: suite-harness-core, proptest, serde_json
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use suite_harness_core::ArgumentPosition;
use suite_harness_core::AttributeEquivalence;
use suite_harness_core::EntityGuid;
use suite_harness_core::EquivalenceError;
use suite_harness_core::FixtureLocator;
use suite_harness_core::HarnessOptions;
use suite_harness_core::InMemoryHost;
use suite_harness_core::LifecycleHarness;
use suite_harness_core::ObjectSeed;
use suite_harness_core::SeededObject;
use suite_harness_core::Seeder;
use suite_harness_core::SnapshotSection;
use suite_harness_core::Subject;
use suite_harness_core::TestCase;
use suite_harness_core::TestContext;
use suite_harness_core::TestFailure;
use suite_harness_core::User;
use suite_harness_core::assert_entities_equivalent;
use suite_harness_core::entities_equivalent;

fn guid(raw: u64) -> EntityGuid {
    EntityGuid::from_raw(raw).unwrap()
}

fn blog(guid_raw: u64, title: &str) -> SeededObject {
    SeededObject {
        guid: guid(guid_raw),
        subtype: "blog".to_string(),
        owner_guid: guid(1),
        container_guid: guid(1),
        title: title.to_string(),
        time_created: 10,
        time_updated: 10,
        metadata: BTreeMap::from([("tags".to_string(), json!(["rust"]))]),
    }
}

fn user(guid_raw: u64) -> User {
    User {
        guid: guid(guid_raw),
        username: format!("user{guid_raw}"),
        admin: false,
    }
}

#[test]
fn identical_entities_are_equivalent() {
    let rule = AttributeEquivalence::default();
    let first = blog(5, "Hello");
    let second = first.clone();
    assert_entities_equivalent(&rule, Subject::entity(&first), Subject::entity(&second), None)
        .unwrap();
}

#[test]
fn volatile_fields_are_ignored_by_default_rule() {
    let rule = AttributeEquivalence::default();
    let first = blog(5, "Hello");
    let mut second = first.clone();
    second.time_updated = 99;
    assert!(entities_equivalent(&rule, Subject::entity(&first), Subject::entity(&second)));

    let strict = AttributeEquivalence::strict();
    assert!(!entities_equivalent(&strict, Subject::entity(&first), Subject::entity(&second)));
}

#[test]
fn non_entity_argument_is_reported_with_position() {
    let rule = AttributeEquivalence::default();
    let entity = blog(5, "Hello");
    let not_entity = 42_u32;
    let err = assert_entities_equivalent(
        &rule,
        Subject::entity(&entity),
        Subject::other(&not_entity),
        None,
    )
    .unwrap_err();
    match err {
        EquivalenceError::NotAnEntity {
            position,
            type_name,
            ..
        } => {
            assert_eq!(position, ArgumentPosition::Second);
            assert_eq!(type_name, "u32");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = assert_entities_equivalent(
        &rule,
        Subject::other("text"),
        Subject::entity(&entity),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, EquivalenceError::NotAnEntity { position: ArgumentPosition::First, .. }));
}

#[test]
fn different_concrete_kinds_are_reported() {
    let rule = AttributeEquivalence::default();
    let object = blog(5, "Hello");
    let mut file = blog(5, "Hello");
    file.subtype = "file".to_string();
    let person = user(5);

    let err = assert_entities_equivalent(&rule, Subject::entity(&object), Subject::entity(&file), None)
        .unwrap_err();
    match err {
        EquivalenceError::KindMismatch {
            first,
            second,
            ..
        } => {
            assert_eq!(first.to_string(), "object:blog");
            assert_eq!(second.to_string(), "object:file");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err =
        assert_entities_equivalent(&rule, Subject::entity(&object), Subject::entity(&person), None)
            .unwrap_err();
    assert!(matches!(err, EquivalenceError::KindMismatch { .. }));
}

#[test]
fn field_mismatches_list_every_difference() {
    let rule = AttributeEquivalence::default();
    let first = blog(5, "Hello");
    let mut second = blog(5, "Goodbye");
    second.metadata.insert("status".to_string(), json!("draft"));

    let err = assert_entities_equivalent(&rule, Subject::entity(&first), Subject::entity(&second), None)
        .unwrap_err();
    let EquivalenceError::Mismatch {
        mismatches,
        message,
    } = err
    else {
        panic!("expected field mismatch");
    };
    assert_eq!(mismatches.len(), 2);
    assert_eq!(mismatches[0].section, SnapshotSection::Attribute);
    assert_eq!(mismatches[0].key, "title");
    assert_eq!(mismatches[1].section, SnapshotSection::Metadata);
    assert_eq!(mismatches[1].key, "status");
    assert_eq!(mismatches[1].first, None);
    assert_eq!(mismatches[1].second, Some(Value::from("draft")));
    assert!(message.contains("title"));
    assert!(message.contains("<absent>"));
}

#[test]
fn message_placeholder_is_substituted() {
    let rule = AttributeEquivalence::default();
    let first = blog(5, "Hello");
    let second = blog(6, "Hello");

    let err = assert_entities_equivalent(
        &rule,
        Subject::entity(&first),
        Subject::entity(&second),
        Some("saved blog round-trip: %s"),
    )
    .unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("saved blog round-trip: entities 5 and 6"));
    assert!(!text.contains("%s"));

    let err = assert_entities_equivalent(
        &rule,
        Subject::entity(&first),
        Subject::entity(&second),
        Some("saved blog round-trip"),
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("saved blog round-trip: entities"));
}

// ============================================================================
// SECTION: Harness Integration
// ============================================================================

struct SeedingCase {
    seeded: Option<SeededObject>,
}

impl TestCase for SeedingCase {
    fn name(&self) -> &str {
        "seeding_case"
    }

    fn on_set_up(&mut self, ctx: &TestContext<'_>) -> Result<(), TestFailure> {
        let owner = ctx.session().logged_in_user()?.ok_or_else(|| TestFailure::new("no session"))?;
        self.seeded = Some(ctx.seeder().create_object(ObjectSeed::new("blog", owner.guid))?);
        Ok(())
    }

    fn on_tear_down(&mut self, _ctx: &TestContext<'_>) -> Result<(), TestFailure> {
        self.seeded = None;
        Ok(())
    }
}

#[test]
fn harness_uses_configured_rule_for_seeded_entities() {
    let host = InMemoryHost::new();
    let fixtures = FixtureLocator::new("fixtures");
    let options = HarnessOptions {
        equivalence: Box::new(AttributeEquivalence::with_ignored(["title"])),
        ..HarnessOptions::default()
    };
    let mut harness = LifecycleHarness::new(
        host.context(&fixtures),
        SeedingCase {
            seeded: None,
        },
        options,
    )
    .unwrap();

    harness.before_each().unwrap();
    let seeded = harness.case().seeded.clone().unwrap();
    let mut renamed = seeded.clone();
    renamed.title = "Renamed".to_string();
    harness
        .assert_entities_equivalent(Subject::entity(&seeded), Subject::entity(&renamed), None)
        .unwrap();

    let other = host.create_object(ObjectSeed::new("blog", host.admin().guid)).unwrap();
    assert!(
        harness
            .assert_entities_equivalent(Subject::entity(&seeded), Subject::entity(&other), None)
            .is_err()
    );
    harness.after_each().unwrap();
    assert!(harness.case().seeded.is_none());
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn equivalence_is_reflexive(title in ".{0,24}", tag in "[a-z]{0,8}", stamp in 0_u64..1_000) {
        let rule = AttributeEquivalence::default();
        let mut entity = blog(7, &title);
        entity.time_created = stamp;
        entity.metadata.insert("tag".to_string(), json!(tag));
        prop_assert!(entities_equivalent(&rule, Subject::entity(&entity), Subject::entity(&entity)));
    }

    #[test]
    fn equivalence_is_symmetric(left in ".{0,12}", right in ".{0,12}") {
        let rule = AttributeEquivalence::default();
        let first = blog(7, &left);
        let second = blog(7, &right);
        prop_assert_eq!(
            entities_equivalent(&rule, Subject::entity(&first), Subject::entity(&second)),
            entities_equivalent(&rule, Subject::entity(&second), Subject::entity(&first))
        );
        prop_assert_eq!(
            entities_equivalent(&rule, Subject::entity(&first), Subject::entity(&second)),
            left == right
        );
    }
}
