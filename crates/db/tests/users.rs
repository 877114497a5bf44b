//! Integration tests for user persistence.

mod common;

use agora_core::roles::Role;
use agora_db::models::user::CreateUser;
use agora_db::repositories::UserRepo;

use common::{create_user, test_db};

#[tokio::test]
async fn find_by_email_ignores_surrounding_whitespace() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;

    let found = UserRepo::find_by_email(&db.pool, "  alice@example.com ")
        .await
        .unwrap()
        .expect("user found");
    assert_eq!(found.id, alice.id);
    assert_eq!(found.role(), Role::User);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let db = test_db().await;
    create_user(&db.pool, "alice").await;

    let err = UserRepo::create(
        &db.pool,
        &CreateUser {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "x".to_string(),
            role: Role::User,
            provider: None,
            provider_id: None,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert!(db_err.is_unique_violation());
}

#[tokio::test]
async fn ban_and_role_changes_persist() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;

    let banned = UserRepo::set_banned(&db.pool, alice.id, true).await.unwrap().unwrap();
    assert!(banned.banned);

    let promoted = UserRepo::set_role(&db.pool, alice.id, Role::Moderator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role(), Role::Moderator);
    assert!(promoted.actor().role.is_staff());

    assert!(UserRepo::set_banned(&db.pool, 9999, true).await.unwrap().is_none());
}

#[tokio::test]
async fn provider_identity_lookup() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;

    assert!(UserRepo::find_by_provider(&db.pool, "github", "42").await.unwrap().is_none());
    UserRepo::link_provider(&db.pool, alice.id, "github", "42").await.unwrap();

    let found = UserRepo::find_by_provider(&db.pool, "github", "42")
        .await
        .unwrap()
        .expect("linked");
    assert_eq!(found.id, alice.id);
    assert!(UserRepo::username_exists(&db.pool, "alice").await.unwrap());
    assert!(!UserRepo::username_exists(&db.pool, "bob").await.unwrap());
}
