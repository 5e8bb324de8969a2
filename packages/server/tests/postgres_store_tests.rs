//! Postgres store tests against a real database.
//!
//! Require Docker; run with `cargo test -- --ignored`.

mod common;

use common::TestHarness;
use family_core::common::{PageRequest, StoreError};
use family_core::domains::family::generate_family_code;
use family_core::domains::posts::{Comment, Like, Media, PgPostStore, Post};
use family_core::domains::users::models::{Dependent, ProfileUpdate};
use family_core::domains::users::{PgUserStore, Relationship, Role, User};
use family_core::kernel::{BasePostStore, BaseUserStore, MediaKind};
use test_context::test_context;
use uuid::Uuid;

fn new_user(first_name: &str) -> User {
    User::new(
        format!("{}-{}@example.com", first_name.to_lowercase(), Uuid::new_v4()),
        "$argon2id$v=19$test".to_string(),
        first_name.to_string(),
        "Tester".to_string(),
        Role::Parent,
        Some(generate_family_code()),
    )
}

fn photo(n: usize) -> Media {
    Media {
        kind: MediaKind::Image,
        url: format!("https://media.test/{}.jpg", n),
        public_id: format!("family-photos/{}", n),
    }
}

// ============================================================================
// Users
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn user_round_trips_with_dependents(ctx: &TestHarness) {
    let store = PgUserStore::new(ctx.db_pool.clone());
    let mut user = new_user("Ann");
    user.dependents
        .push(Dependent::new("Mia".to_string(), None, Relationship::Child));
    store.insert(&user).await.unwrap();

    let loaded = store.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.email, user.email);
    assert_eq!(loaded.family_code, user.family_code);
    assert_eq!(loaded.dependents.len(), 1);
    assert_eq!(loaded.dependents[0].name, "Mia");

    let by_code = store
        .find_by_family_code(user.family_code.as_deref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_code.id, user.id);
    assert!(store
        .family_code_exists(user.family_code.as_deref().unwrap())
        .await
        .unwrap());
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn duplicate_email_and_family_code_conflict(ctx: &TestHarness) {
    let store = PgUserStore::new(ctx.db_pool.clone());
    let user = new_user("Ann");
    store.insert(&user).await.unwrap();

    let mut same_email = new_user("Ann");
    same_email.email = user.email.clone();
    match store.insert(&same_email).await {
        Err(StoreError::Conflict(constraint)) => assert_eq!(constraint, "users_email_key"),
        other => panic!("expected email conflict, got {:?}", other),
    }

    let mut same_code = new_user("Ben");
    same_code.family_code = user.family_code.clone();
    match store.insert(&same_code).await {
        Err(StoreError::Conflict(constraint)) => {
            assert_eq!(constraint, "users_family_code_key")
        }
        other => panic!("expected family code conflict, got {:?}", other),
    }
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn membership_edges_are_ordered_and_repairable(ctx: &TestHarness) {
    let store = PgUserStore::new(ctx.db_pool.clone());
    let ann = new_user("Ann");
    let ben = new_user("Ben");
    let cal = new_user("Cal");
    for user in [&ann, &ben, &cal] {
        store.insert(user).await.unwrap();
    }

    store.add_family_member(ann.id, ben.id).await.unwrap();
    store.add_family_member(ann.id, cal.id).await.unwrap();
    // Duplicate edge is a no-op
    store.add_family_member(ann.id, ben.id).await.unwrap();

    let loaded = store.find_by_id(ann.id).await.unwrap().unwrap();
    assert_eq!(loaded.family_members, vec![ben.id, cal.id]);

    assert!(store.repair_family_links(true).await.unwrap() >= 2);
    assert!(store.repair_family_links(false).await.unwrap() >= 2);
    assert_eq!(
        store.find_by_id(ben.id).await.unwrap().unwrap().family_members,
        vec![ann.id]
    );
    assert_eq!(store.repair_family_links(true).await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn profile_and_dependent_updates(ctx: &TestHarness) {
    let store = PgUserStore::new(ctx.db_pool.clone());
    let user = new_user("Ann");
    store.insert(&user).await.unwrap();

    let updated = store
        .update_profile(
            user.id,
            &ProfileUpdate {
                first_name: None,
                last_name: Some("Smith".to_string()),
                profile_picture: Some(String::new()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Ann");
    assert_eq!(updated.last_name, "Smith");

    let mut pet = Dependent::new("Rex".to_string(), None, Relationship::Pet);
    store.insert_dependent(user.id, &pet).await.unwrap();
    pet.name = "Rexy".to_string();
    assert!(store.update_dependent(user.id, &pet).await.unwrap());

    let loaded = store.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.dependents[0].name, "Rexy");
    assert_eq!(loaded.dependents[0].relationship, Relationship::Pet);

    assert!(store.remove_dependent(user.id, pet.id).await.unwrap());
    assert!(!store.remove_dependent(user.id, pet.id).await.unwrap());
}

// ============================================================================
// Posts
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn family_feed_is_newest_first_and_paginated(ctx: &TestHarness) {
    let users = PgUserStore::new(ctx.db_pool.clone());
    let posts = PgPostStore::new(ctx.db_pool.clone());
    let author = new_user("Ann");
    users.insert(&author).await.unwrap();
    let code = author.family_code.clone().unwrap();

    let mut ids = Vec::new();
    for n in 0..3 {
        let post = Post::new(
            author.id,
            format!("post {}", n),
            vec![photo(n)],
            Vec::new(),
            code.clone(),
            false,
        );
        posts.insert(&post).await.unwrap();
        ids.push(post.id);
    }

    let (page, total) = posts
        .list_by_family_codes(&[code.clone()], PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, ids[2]);
    assert_eq!(page[0].media, vec![photo(2)]);

    let (page, _) = posts
        .list_by_family_codes(&[code], PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, ids[0]);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn likes_are_unique_and_delete_cascades(ctx: &TestHarness) {
    let users = PgUserStore::new(ctx.db_pool.clone());
    let posts = PgPostStore::new(ctx.db_pool.clone());
    let author = new_user("Ann");
    let fan = new_user("Ben");
    users.insert(&author).await.unwrap();
    users.insert(&fan).await.unwrap();

    let post = Post::new(
        author.id,
        String::new(),
        vec![photo(1)],
        Vec::new(),
        author.family_code.clone().unwrap(),
        false,
    );
    posts.insert(&post).await.unwrap();

    assert!(posts.add_like(post.id, &Like::new(fan.id)).await.unwrap());
    assert!(!posts.add_like(post.id, &Like::new(fan.id)).await.unwrap());
    assert_eq!(posts.likes(post.id).await.unwrap().len(), 1);

    posts
        .add_comment(post.id, &Comment::new(fan.id, "Lovely".to_string()))
        .await
        .unwrap();
    let loaded = posts.find_by_id(post.id).await.unwrap().unwrap();
    assert!(loaded.liked_by(fan.id));
    assert_eq!(loaded.comments[0].text, "Lovely");

    assert!(posts.remove_like(post.id, fan.id).await.unwrap());
    assert!(posts.delete(post.id).await.unwrap());
    assert!(posts.find_by_id(post.id).await.unwrap().is_none());
    assert!(posts.likes(post.id).await.unwrap().is_empty());
}
