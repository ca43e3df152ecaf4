use super::*;
use crate::audit::NoOpAuditLogger;
use crate::test_support::{
    acl_admin, acl_with_audit, alice, authorization_strategy, bob, document, granting_strategy,
    principal,
};
use yare::parameterized;


fn folder_acl(id: i64, entries: Vec<NewAce>) -> SharedAcl {
    let acl = entries
        .into_iter()
        .fold(
            Acl::builder()
                .id(id)
                .object_identity(ObjectIdentity::new("Folder", "reports").unwrap())
                .owner(alice())
                .authorization(authorization_strategy())
                .granting(granting_strategy(Arc::new(NoOpAuditLogger))),
            |builder, entry| builder.entry(entry),
        )
        .build()
        .unwrap();
    Arc::new(acl)
}

fn child_of(parent: &SharedAcl, inheriting: bool, entries: Vec<NewAce>) -> SharedAcl {
    let acl = entries
        .into_iter()
        .fold(
            Acl::builder()
                .id(2)
                .object_identity(document())
                .owner(alice())
                .authorization(authorization_strategy())
                .granting(granting_strategy(Arc::new(NoOpAuditLogger)))
                .parent(parent)
                .entries_inheriting(inheriting),
            |builder, entry| builder.entry(entry),
        )
        .build()
        .unwrap();
    Arc::new(acl)
}

#[test]
fn test_new_acl_is_empty_and_inheriting() {
    let acl = Acl::new(
        document(),
        7,
        alice(),
        authorization_strategy(),
        granting_strategy(Arc::new(NoOpAuditLogger)),
    );

    assert_eq!(acl.id(), &Identifier::Number(7));
    assert_eq!(acl.object_identity(), &document());
    assert_eq!(acl.owner(), alice());
    assert!(acl.is_entries_inheriting());
    assert!(acl.parent().is_none());
    assert_eq!(acl.entry_count(), 0);
    assert!(acl.loaded_sids().is_none());
}

#[test]
fn test_document_scenario() {
    let (acl, _) = acl_with_audit(vec![NewAce::new(bob(), Permission::READ, true)]);

    assert!(acl.is_granted(&[Permission::READ], &[bob()], false).unwrap());
    assert!(matches!(
        acl.is_granted(&[Permission::WRITE], &[bob()], false),
        Err(AclError::NoMatchingEntry(_))
    ));

    // The owner flips bob's entry into a denial by replacing it.
    acl.delete_ace(&[alice()], 0).unwrap();
    acl.insert_ace(&[alice()], 0, Permission::READ, bob(), false)
        .unwrap();
    assert!(!acl.is_granted(&[Permission::READ], &[bob()], false).unwrap());
}

#[parameterized(
    no_permissions = { vec![], vec![principal("bob")] },
    no_sids = { vec![Permission::READ], vec![] },
)]
fn test_empty_request_is_invalid(permissions: Vec<Permission>, sids: Vec<Sid>) {
    let (acl, _) = acl_with_audit(vec![NewAce::new(bob(), Permission::READ, true)]);
    assert!(matches!(
        acl.is_granted(&permissions, &sids, false),
        Err(AclError::InvalidArgument(_))
    ));
}

#[test]
fn test_empty_acl_without_parent_has_no_matching_entry() {
    let (acl, _) = acl_with_audit(vec![]);
    assert!(matches!(
        acl.is_granted(&[Permission::READ], &[bob()], false),
        Err(AclError::NoMatchingEntry(_))
    ));
}

#[parameterized(
    parent_grants = { true, Ok(true) },
    parent_denies = { false, Ok(false) },
)]
fn test_inheriting_child_returns_parent_result(granting: bool, expected: Result<bool, AclError>) {
    let parent = folder_acl(1, vec![NewAce::new(bob(), Permission::READ, granting)]);
    let child = child_of(&parent, true, vec![]);

    assert_eq!(
        child.is_granted(&[Permission::READ], &[bob()], false),
        expected
    );
    assert_eq!(
        child.is_granted(&[Permission::READ], &[bob()], false),
        parent.is_granted(&[Permission::READ], &[bob()], false)
    );
}

#[test]
fn test_inheriting_child_propagates_parent_miss() {
    let parent = folder_acl(1, vec![]);
    let child = child_of(&parent, true, vec![]);
    assert!(matches!(
        child.is_granted(&[Permission::READ], &[bob()], false),
        Err(AclError::NoMatchingEntry(_))
    ));
}

#[test]
fn test_non_inheriting_child_ignores_parent() {
    let parent = folder_acl(1, vec![NewAce::new(bob(), Permission::READ, true)]);
    let child = child_of(&parent, false, vec![]);
    assert!(matches!(
        child.is_granted(&[Permission::READ], &[bob()], false),
        Err(AclError::NoMatchingEntry(_))
    ));
}

#[test]
fn test_own_entries_take_precedence_over_parent() {
    let parent = folder_acl(1, vec![NewAce::new(bob(), Permission::READ, true)]);
    let child = child_of(&parent, true, vec![NewAce::new(bob(), Permission::READ, false)]);
    assert!(!child.is_granted(&[Permission::READ], &[bob()], false).unwrap());
}

#[test]
fn test_dropped_parent_is_treated_as_absent() {
    let parent = folder_acl(1, vec![NewAce::new(bob(), Permission::READ, true)]);
    let child = child_of(&parent, true, vec![]);
    assert!(child.parent().is_some());

    drop(parent);
    assert!(child.parent().is_none());
    assert!(matches!(
        child.is_granted(&[Permission::READ], &[bob()], false),
        Err(AclError::NoMatchingEntry(_))
    ));
}

#[test]
fn test_is_granted_is_idempotent() {
    let (acl, audit) = acl_with_audit(vec![
        NewAce::new(bob(), Permission::READ, true).with_auditing(true, false),
    ]);
    let entries = acl.entries();

    let first = acl.is_granted(&[Permission::READ], &[bob()], false);
    let second = acl.is_granted(&[Permission::READ], &[bob()], false);
    assert_eq!(first, second);
    assert_eq!(acl.entries(), entries);
    assert_eq!(audit.outcomes(), vec![true, true]);
}

fn partially_loaded(loaded: Vec<Sid>) -> Acl {
    Acl::builder()
        .id(1)
        .object_identity(document())
        .owner(alice())
        .authorization(authorization_strategy())
        .granting(granting_strategy(Arc::new(NoOpAuditLogger)))
        .loaded_sids(loaded)
        .entry(NewAce::new(bob(), Permission::READ, true))
        .build()
        .unwrap()
}

#[parameterized(
    all_loaded = { vec![principal("bob")], vec![principal("bob")], true },
    subset_loaded = { vec![principal("bob"), principal("alice")], vec![principal("bob")], true },
    one_missing = { vec![principal("bob")], vec![principal("bob"), principal("alice")], false },
    none_loaded = { vec![], vec![principal("bob")], false },
    empty_request = { vec![], vec![], true },
)]
fn test_is_sid_loaded(loaded: Vec<Sid>, requested: Vec<Sid>, expected: bool) {
    assert_eq!(partially_loaded(loaded).is_sid_loaded(&requested), expected);
}

#[test]
fn test_fully_loaded_acl_answers_for_any_sid() {
    let (acl, _) = acl_with_audit(vec![]);
    assert!(acl.is_sid_loaded(&[bob(), alice(), acl_admin()]));
}

#[test]
fn test_unloaded_sid_is_rejected() {
    let acl = partially_loaded(vec![bob()]);

    assert!(acl.is_granted(&[Permission::READ], &[bob()], false).unwrap());
    assert!(matches!(
        acl.is_granted(&[Permission::READ], &[bob(), alice()], false),
        Err(AclError::SidUnloaded(_))
    ));
}

#[test]
fn test_builder_keeps_entry_order_and_ids() {
    let acl = Acl::builder()
        .id(3)
        .object_identity(document())
        .owner(alice())
        .authorization(authorization_strategy())
        .granting(granting_strategy(Arc::new(NoOpAuditLogger)))
        .entry(NewAce::new(bob(), Permission::READ, true).with_id(10))
        .entry(NewAce::new(alice(), Permission::WRITE, false).with_id(11))
        .build()
        .unwrap();

    let entries = acl.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id(), Some(&Identifier::Number(10)));
    assert_eq!(entries[0].sid(), &bob());
    assert_eq!(entries[1].id(), Some(&Identifier::Number(11)));
    assert!(!entries[1].is_granting());
    assert!(entries.iter().all(|ace| ace.acl_id() == &Identifier::Number(3)));
}

#[parameterized(
    missing_id = { "id" },
    missing_identity = { "identity" },
    missing_owner = { "owner" },
    missing_authorization = { "authorization" },
    missing_granting = { "granting" },
)]
fn test_builder_requires_mandatory_parts(missing: &str) {
    let mut builder = Acl::builder();
    if missing != "id" {
        builder = builder.id(1);
    }
    if missing != "identity" {
        builder = builder.object_identity(document());
    }
    if missing != "owner" {
        builder = builder.owner(alice());
    }
    if missing != "authorization" {
        builder = builder.authorization(authorization_strategy());
    }
    if missing != "granting" {
        builder = builder.granting(granting_strategy(Arc::new(NoOpAuditLogger)));
    }

    assert!(matches!(builder.build(), Err(AclError::InvalidArgument(_))));
}

#[test]
fn test_display() {
    let parent = folder_acl(1, vec![]);
    let child = child_of(&parent, true, vec![NewAce::new(bob(), Permission::READ, true)]);

    insta::assert_snapshot!(
        parent.to_string(),
        @r#"Acl[id: 1; identity: Folder::"reports"; owner: Principal::"alice"; entries: 0; inheriting: true; parent: none]"#
    );
    insta::assert_snapshot!(
        child.to_string(),
        @r#"Acl[id: 2; identity: Document::42; owner: Principal::"alice"; entries: 1; inheriting: true; parent: Folder::"reports"]"#
    );
}
