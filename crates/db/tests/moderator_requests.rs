//! Integration tests for moderator promotion requests.

mod common;

use agora_core::promotion::RequestStatus;
use agora_core::roles::Role;
use agora_db::repositories::{ModeratorRequestRepo, UserRepo};

use common::{create_user, test_db};

// ---------------------------------------------------------------------------
// Filing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_pending_request_is_rejected() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;

    let request = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();
    assert_eq!(request.status(), RequestStatus::Pending);
    assert!(ModeratorRequestRepo::has_pending(&db.pool, alice.id).await.unwrap());

    let err = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap_err();
    assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
}

#[tokio::test]
async fn a_new_request_may_follow_a_rejection() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;
    let admin = create_user(&db.pool, "root").await;

    let first = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();
    ModeratorRequestRepo::reject(&db.pool, first.id, admin.id).await.unwrap();
    assert!(!ModeratorRequestRepo::has_pending(&db.pool, alice.id).await.unwrap());

    let second = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();
    let latest = ModeratorRequestRepo::latest_for_user(&db.pool, alice.id)
        .await
        .unwrap()
        .expect("latest request");
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.status(), RequestStatus::Pending);
}

#[tokio::test]
async fn pending_queue_lists_only_undecided_requests() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;
    let bob = create_user(&db.pool, "bob").await;
    let admin = create_user(&db.pool, "root").await;

    let decided = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();
    ModeratorRequestRepo::reject(&db.pool, decided.id, admin.id).await.unwrap();
    let waiting = ModeratorRequestRepo::create(&db.pool, bob.id).await.unwrap();

    let queue = ModeratorRequestRepo::list_pending(&db.pool).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, waiting.id);
    assert_eq!(queue[0].username, "bob");
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn approval_promotes_the_author_once() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;
    let admin = create_user(&db.pool, "root").await;
    let request = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();

    let approved = ModeratorRequestRepo::approve(&db.pool, request.id, admin.id)
        .await
        .unwrap()
        .expect("pending request");
    assert_eq!(approved.status(), RequestStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(admin.id));
    assert!(approved.reviewed_at.is_some());

    let alice = UserRepo::find_by_id(&db.pool, alice.id).await.unwrap().unwrap();
    assert_eq!(alice.role(), Role::Moderator);

    assert!(ModeratorRequestRepo::approve(&db.pool, request.id, admin.id)
        .await
        .unwrap()
        .is_none());
    assert!(ModeratorRequestRepo::reject(&db.pool, request.id, admin.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn rejection_leaves_the_role_alone() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;
    let admin = create_user(&db.pool, "root").await;
    let request = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();

    let rejected = ModeratorRequestRepo::reject(&db.pool, request.id, admin.id)
        .await
        .unwrap()
        .expect("pending request");
    assert_eq!(rejected.status(), RequestStatus::Rejected);

    let alice = UserRepo::find_by_id(&db.pool, alice.id).await.unwrap().unwrap();
    assert_eq!(alice.role(), Role::User);
}

#[tokio::test]
async fn approval_never_demotes_an_admin() {
    let db = test_db().await;
    let alice = create_user(&db.pool, "alice").await;
    let admin = create_user(&db.pool, "root").await;
    let request = ModeratorRequestRepo::create(&db.pool, alice.id).await.unwrap();
    UserRepo::set_role(&db.pool, alice.id, Role::Admin).await.unwrap();

    ModeratorRequestRepo::approve(&db.pool, request.id, admin.id)
        .await
        .unwrap()
        .expect("pending request");

    let alice = UserRepo::find_by_id(&db.pool, alice.id).await.unwrap().unwrap();
    assert_eq!(alice.role(), Role::Admin);
}

#[tokio::test]
async fn reviewing_an_unknown_request_finds_nothing() {
    let db = test_db().await;
    let admin = create_user(&db.pool, "root").await;

    assert!(ModeratorRequestRepo::approve(&db.pool, 4242, admin.id)
        .await
        .unwrap()
        .is_none());
    assert!(ModeratorRequestRepo::find_by_id(&db.pool, 4242)
        .await
        .unwrap()
        .is_none());
}
