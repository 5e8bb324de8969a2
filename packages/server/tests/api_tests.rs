//! End-to-end tests for the REST API.
//!
//! Every request goes through the real router with in-memory stores and a
//! recording media store.

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use common::{ApiClient, FilePart};
use family_core::kernel::test_dependencies::MockMediaStore;
use family_core::kernel::TestDependencies;
use serde_json::json;

// ============================================================================
// Shell
// ============================================================================

#[tokio::test]
async fn health_reports_ok_at_root_and_api_prefix() {
    let client = ApiClient::new();

    for uri in ["/health", "/api/health"] {
        let (status, body) = client.get(uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["environment"], "test");
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let client = ApiClient::new();

    let (status, body) = client.get("/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let client = ApiClient::new();

    let (status, body) = client.get("/posts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");

    let (status, body) = client.get("/auth/profile", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let client = ApiClient::new();
    let ghost = family_core::common::UserId::new();
    let token = client.deps.jwt_service.create_token(ghost).unwrap();

    let (status, _) = client.get("/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn register_then_login() {
    let client = ApiClient::new();
    let (_, user) = client.register("Ann").await;

    assert_eq!(user["email"], "ann@example.com");
    assert_eq!(user["role"], "parent");
    assert_eq!(user["familyCode"].as_str().unwrap().len(), 6);
    assert!(user.get("passwordHash").is_none());

    let (status, body) = client
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ANN@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], user["id"]);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_registration_and_bad_login_are_400() {
    let client = ApiClient::new();
    client.register("Ann").await;

    let (status, body) = client
        .post(
            "/auth/register",
            None,
            json!({
                "email": "ann@example.com",
                "password": "another1",
                "firstName": "Ann",
                "lastName": "Again",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = client
        .post(
            "/auth/login",
            None,
            json!({ "email": "ann@example.com", "password": "wrong-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn malformed_json_body_is_400_with_message() {
    let client = ApiClient::new();

    let (status, body) = client
        .post("/auth/login", None, json!({ "email": 42 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

// ============================================================================
// Family
// ============================================================================

#[tokio::test]
async fn join_family_links_both_profiles() {
    let client = ApiClient::new();
    let (token_a, user_a) = client.register("Ann").await;
    let (token_b, user_b) = client.register("Ben").await;
    let code_a = user_a["familyCode"].as_str().unwrap();

    let (status, body) = client
        .post("/auth/join-family", Some(&token_b), json!({ "familyCode": code_a }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully joined family");

    let (_, profile_a) = client.get("/auth/profile", Some(&token_a)).await;
    assert_eq!(profile_a["user"]["familyMembers"][0]["id"], user_b["id"]);
    assert_eq!(profile_a["user"]["familyMembers"][0]["firstName"], "Ben");

    let (_, profile_b) = client.get("/auth/profile", Some(&token_b)).await;
    assert_eq!(profile_b["user"]["familyMembers"][0]["id"], user_a["id"]);

    let (status, _) = client
        .post("/auth/join-family", Some(&token_b), json!({ "familyCode": code_a }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = client
        .post("/auth/join-family", Some(&token_b), json!({ "familyCode": "ZZZZZZ" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Family not found");
}

#[tokio::test]
async fn children_crud_and_family_overview() {
    let client = ApiClient::new();
    let (token_a, user_a) = client.register("Ann").await;
    let (token_b, _) = client.register("Ben").await;
    client
        .post(
            "/auth/join-family",
            Some(&token_b),
            json!({ "familyCode": user_a["familyCode"] }),
        )
        .await;

    let (status, body) = client
        .post(
            "/profile/children",
            Some(&token_a),
            json!({ "name": "Mia", "birthDate": "2020-05-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Child added successfully");
    let child_id = body["child"]["id"].as_str().unwrap().to_string();

    let (status, body) = client
        .post(
            "/profile/children",
            Some(&token_a),
            json!({ "name": "Rex", "relationship": "pet" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Pet added successfully");

    let (status, body) = client
        .request(
            Method::PUT,
            &format!("/profile/children/{}", child_id),
            Some(&token_a),
            Some(json!({ "name": "Mia Rose" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["child"]["name"], "Mia Rose");

    let (_, body) = client.get("/profile/children", Some(&token_a)).await;
    assert_eq!(body["children"].as_array().unwrap().len(), 2);

    let (status, body) = client.get("/profile/family", Some(&token_b)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["familyMembers"][0]["firstName"], "Ann");
    let all = body["allChildren"].as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["parentName"], "Ann Tester");

    let (status, body) = client
        .request(
            Method::DELETE,
            &format!("/profile/children/{}", child_id),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile removed successfully");

    let (status, body) = client
        .request(
            Method::DELETE,
            &format!("/profile/children/{}", child_id),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Child not found");
}

#[tokio::test]
async fn update_profile_rejects_blank_names() {
    let client = ApiClient::new();
    let (token, _) = client.register("Ann").await;

    let (status, body) = client
        .request(
            Method::PUT,
            "/profile/update",
            Some(&token),
            Some(json!({ "lastName": "Smith", "profilePicture": "https://img.test/a.png" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["lastName"], "Smith");
    assert_eq!(body["user"]["profilePicture"], "https://img.test/a.png");

    let (status, _) = client
        .request(
            Method::PUT,
            "/profile/update",
            Some(&token),
            Some(json!({ "firstName": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Posts
// ============================================================================

#[tokio::test]
async fn shared_family_post_lifecycle() {
    let client = ApiClient::new();
    let (token_a, user_a) = client.register("Ann").await;
    let (token_b, user_b) = client.register("Ben").await;
    client
        .post(
            "/auth/join-family",
            Some(&token_b),
            json!({ "familyCode": user_a["familyCode"] }),
        )
        .await;

    let (status, body) = client
        .upload(
            &token_a,
            &[FilePart::image("beach.jpg"), FilePart::image("cake.jpg")],
            &[("caption", "Saturday"), ("isPrivate", "true")],
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Post created successfully");
    let post = &body["post"];
    assert_eq!(post["media"].as_array().unwrap().len(), 2);
    assert_eq!(post["media"][0]["type"], "image");
    assert_eq!(post["author"]["firstName"], "Ann");
    assert_eq!(post["isPrivate"], true);
    let post_id = post["id"].as_str().unwrap().to_string();

    // Ben sees Ann's post through the direct membership
    let (status, feed) = client.get("/posts", Some(&token_b)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["total"], 1);
    assert_eq!(feed["currentPage"], 1);
    assert_eq!(feed["totalPages"], 1);
    assert_eq!(feed["posts"][0]["id"], post_id.as_str());

    let (status, body) = client
        .post(&format!("/posts/{}/like", post_id), Some(&token_b), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post liked");
    assert_eq!(body["likes"].as_array().unwrap().len(), 1);
    assert_eq!(body["likes"][0]["user"]["id"], user_b["id"]);

    let (status, body) = client
        .post(
            &format!("/posts/{}/comments", post_id),
            Some(&token_b),
            json!({ "text": "  Lovely!  " }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["text"], "Lovely!");
    assert_eq!(body["comment"]["user"]["firstName"], "Ben");

    // Only the author may delete
    let (status, _) = client
        .request(
            Method::DELETE,
            &format!("/posts/{}", post_id),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = client
        .request(
            Method::DELETE,
            &format!("/posts/{}", post_id),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted successfully");

    assert!(client.deps.media.live().is_empty());
    let (_, feed) = client.get("/posts", Some(&token_a)).await;
    assert_eq!(feed["total"], 0);
}

#[tokio::test]
async fn outsiders_cannot_see_or_like_family_posts() {
    let client = ApiClient::new();
    let (token_a, _) = client.register("Ann").await;
    let (token_c, _) = client.register("Cal").await;

    let (_, body) = client
        .upload(&token_a, &[FilePart::image("a.jpg")], &[])
        .await;
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    let (_, feed) = client.get("/posts", Some(&token_c)).await;
    assert_eq!(feed["total"], 0);

    let (status, body) = client
        .post(&format!("/posts/{}/like", post_id), Some(&token_c), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
}

#[tokio::test]
async fn upload_without_media_is_rejected() {
    let client = ApiClient::new();
    let (token, _) = client.register("Ann").await;

    let (status, body) = client.upload(&token, &[], &[("caption", "empty")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one media file is required");
    assert_eq!(client.deps.media.upload_calls(), 0);
}

#[tokio::test]
async fn upload_rejects_unsupported_files_and_too_many_parts() {
    let client = ApiClient::new();
    let (token, _) = client.register("Ann").await;

    let text = FilePart {
        file_name: "notes.txt",
        content_type: Some("text/plain"),
        bytes: b"hello",
    };
    let (status, _) = client.upload(&token, &[text], &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let names: Vec<String> = (0..11).map(|i| format!("p{}.jpg", i)).collect();
    let files: Vec<FilePart> = names.iter().map(|n| FilePart::image(n)).collect();
    let (status, _) = client.upload(&token, &files, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(client.deps.media.upload_calls(), 0);
}

#[tokio::test]
async fn upload_guesses_content_type_from_file_name() {
    let client = ApiClient::new();
    let (token, _) = client.register("Ann").await;

    let clip = FilePart {
        file_name: "party.mp4",
        content_type: None,
        bytes: b"\x00\x00\x00\x18ftypmp42",
    };
    let (status, body) = client.upload(&token, &[clip], &[]).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["post"]["media"][0]["type"], "video");
}

#[tokio::test]
async fn failed_upload_leaves_nothing_behind() {
    let client = ApiClient::with_deps(TestDependencies::with_media(
        MockMediaStore::new().fail_upload_at(2),
    ));
    let (token, _) = client.register("Ann").await;

    let (status, _) = client
        .upload(
            &token,
            &[FilePart::image("a.jpg"), FilePart::image("b.jpg")],
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(client.deps.media.live().is_empty());
    assert!(client.deps.posts.is_empty());
}

#[tokio::test]
async fn timed_out_upload_answers_json_and_still_finishes() {
    let client = ApiClient::with_timeout(
        TestDependencies::with_media(
            MockMediaStore::new().delay_upload_at(2, Duration::from_millis(200)),
        ),
        Duration::from_millis(50),
    );
    let ann = client.deps.seed_user("Ann", Some("F1")).await;
    let token = client.deps.jwt_service.create_token(ann.id).unwrap();

    let (status, body) = client
        .upload(
            &token,
            &[FilePart::image("a.jpg"), FilePart::image("b.jpg")],
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["message"], "Request timed out");

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(client.deps.posts.len(), 1);
    assert_eq!(client.deps.media.live().len(), 2);
}

#[tokio::test]
async fn invalid_post_id_is_not_found() {
    let client = ApiClient::new();
    let (token, _) = client.register("Ann").await;

    let (status, body) = client
        .post("/posts/not-a-uuid/like", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");
}
