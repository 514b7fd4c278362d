//! Integration tests for the users/custom-roles slice.
//!
//! This slice validates before any state change or gateway call, and —
//! unlike every other slice — surfaces failures as plain strings in its
//! published state.

mod common;

use assert_matches::assert_matches;

use gangway_core::account::{CustomRoleChanges, NewCustomRole, NewUserAccount, UserAccountChanges};
use gangway_core::error::CoreError;
use gangway_core::role::RoleTag;
use gangway_store::StoreError;

use common::seeded_store;

fn new_user(name: &str, email: &str) -> NewUserAccount {
    NewUserAccount {
        name: name.to_string(),
        email: email.to_string(),
        role: RoleTag::from("employee"),
        department: "Engineering".to_string(),
        custom_roles: vec![],
    }
}

// ---------------------------------------------------------------------------
// Test: validation rejects before any effect
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_user_is_rejected_before_any_effect() {
    let (_gateway, store) = seeded_store();
    let (rx, _h) = store.users.subscribe();
    let before = rx.borrow().users.clone();

    let result = store.users.create_user(new_user("Kai Ito", "not-an-email")).await;
    assert_matches!(result, Err(StoreError::Domain(CoreError::Validation(_))));

    // No state change and no error string: the rejection happened before
    // the mutation protocol began. A gateway-side create would have pushed
    // a four-element array here.
    assert_eq!(rx.borrow().users, before);
    assert_eq!(rx.borrow().users.len(), 3);
    assert!(rx.borrow().error.is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (_gateway, store) = seeded_store();
    let (_rx, _h) = store.users.subscribe();

    let result = store.users.create_user(new_user("Imposter", "SAM@example.com")).await;
    assert_matches!(result, Err(StoreError::Domain(CoreError::Conflict(_))));
}

// ---------------------------------------------------------------------------
// Test: create appends the server-confirmed record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_appends_record_with_assigned_id() {
    let (_gateway, store) = seeded_store();
    let (rx, _h) = store.users.subscribe();
    assert_eq!(rx.borrow().users.len(), 3);

    let created = store
        .users
        .create_user(new_user("Kai Ito", "kai@example.com"))
        .await
        .unwrap();
    assert!(created.id > 0);
    let state = rx.borrow().clone();
    assert_eq!(state.users.len(), 4);
    assert!(state.users.iter().any(|u| u.id == created.id));
    assert!(state.error.is_none());
}

// ---------------------------------------------------------------------------
// Test: failed update rolls back and stores a string error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_update_rolls_back_and_sets_error_string() {
    let (gateway, store) = seeded_store();
    let (rx, _h) = store.users.subscribe();
    let target = rx.borrow().users[0].clone();
    let before = rx.borrow().users.clone();

    gateway.fail_next_call("backend unavailable");
    let result = store
        .users
        .update_user(
            target.id,
            UserAccountChanges {
                department: Some("Design".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(rx.borrow().users, before);
    assert_eq!(
        rx.borrow().error.as_deref(),
        Some("Gateway call rejected: backend unavailable")
    );
}

#[tokio::test]
async fn successful_update_applies_optimistically() {
    let (_gateway, store) = seeded_store();
    let (rx, _h) = store.users.subscribe();
    let target = rx.borrow().users[0].clone();

    store
        .users
        .update_user(
            target.id,
            UserAccountChanges {
                department: Some("Design".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        rx.borrow().users.iter().find(|u| u.id == target.id).unwrap().department,
        "Design"
    );
}

// ---------------------------------------------------------------------------
// Test: delete is pessimistic
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_delete_leaves_users_untouched() {
    let (gateway, store) = seeded_store();
    let (rx, _h) = store.users.subscribe();
    let target = rx.borrow().users[0].clone();
    let before = rx.borrow().users.clone();

    gateway.fail_next_call("backend unavailable");
    let result = store.users.delete_user(target.id).await;
    assert!(result.is_err());
    assert_eq!(rx.borrow().users, before);
    assert!(rx.borrow().error.is_some());

    store.users.delete_user(target.id).await.unwrap();
    assert!(!rx.borrow().users.iter().any(|u| u.id == target.id));
}

// ---------------------------------------------------------------------------
// Test: custom role validation and uniqueness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn role_names_share_one_namespace_with_builtins() {
    let (_gateway, store) = seeded_store();
    let (_rx, _h) = store.users.subscribe();
    store.users.load_custom_roles().await.unwrap();

    // Case-insensitive collision with a built-in.
    let result = store
        .users
        .create_custom_role(NewCustomRole {
            name: "MANAGER".to_string(),
            description: String::new(),
        })
        .await;
    assert_matches!(result, Err(StoreError::Domain(CoreError::Conflict(_))));

    // Case-insensitive collision with a seeded custom role.
    let result = store
        .users
        .create_custom_role(NewCustomRole {
            name: "buddy".to_string(),
            description: String::new(),
        })
        .await;
    assert_matches!(result, Err(StoreError::Domain(CoreError::Conflict(_))));

    // A fresh name goes through and appends the confirmed record.
    let created = store
        .users
        .create_custom_role(NewCustomRole {
            name: "Mentor".to_string(),
            description: "Guides the first quarter".to_string(),
        })
        .await
        .unwrap();
    assert!(store.users.current().roles.iter().any(|r| r.id == created.id));
}

#[tokio::test]
async fn role_rename_is_validated_and_rolls_back_on_failure() {
    let (gateway, store) = seeded_store();
    let (_rx, _h) = store.users.subscribe();
    store.users.load_custom_roles().await.unwrap();
    let target = store.users.current().roles[0].clone();

    // Format rejection, before any effect.
    let result = store
        .users
        .update_custom_role(
            target.id,
            CustomRoleChanges {
                name: Some("no/slash".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(StoreError::Domain(CoreError::Validation(_))));

    // Renaming to itself is allowed (the record under edit is excluded
    // from the uniqueness pool).
    store
        .users
        .update_custom_role(
            target.id,
            CustomRoleChanges {
                name: Some(target.name.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Gateway failure rolls the optimistic rename back.
    let before = store.users.current().roles;
    gateway.fail_next_call("backend unavailable");
    let result = store
        .users
        .update_custom_role(
            target.id,
            CustomRoleChanges {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());
    assert_eq!(store.users.current().roles, before);
}
