//! End-to-end coverage of the profile and avatar endpoints.

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};

use common::{multipart_body, multipart_content_type, register_user, vault_app};
use strongroom_backend::test_support::harness;

// Smallest possible payload that still looks like an image to the upload
// checks: the checks are extension and declared content type, not magic
// bytes.
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0, 0, 0, 0];

#[actix_rt::test]
async fn profile_reflects_updates() {
    let harness = harness().await;
    let app = test::init_service(vault_app(&harness)).await;
    let (bearer, user) = register_user(&app, "alice@example.com", "Alice").await;
    assert_eq!(user["displayName"], "Alice");
    assert!(user.get("avatar").is_none());

    let updated = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/user/profile")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({ "displayName": "Alice Lidell" }))
            .to_request(),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(updated).await;
    assert_eq!(updated["displayName"], "Alice Lidell");
    // Untouched fields survive partial updates.
    assert_eq!(updated["email"], "alice@example.com");

    let fetched = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/user/profile")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    let fetched: Value = test::read_body_json(fetched).await;
    assert_eq!(fetched["displayName"], "Alice Lidell");
    assert!(fetched.get("passwordHash").is_none());
}

#[actix_rt::test]
async fn avatar_replacement_discards_the_previous_blob() {
    let harness = harness().await;
    let app = test::init_service(vault_app(&harness)).await;
    let (bearer, _) = register_user(&app, "bob@example.com", "Bob").await;

    let first = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/user/avatar")
            .insert_header(("Authorization", bearer.clone()))
            .insert_header(("Content-Type", multipart_content_type()))
            .set_payload(multipart_body("avatar", "face.png", "image/png", PNG_BYTES))
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let first: Value = test::read_body_json(first).await;
    let first_locator = first["avatar"].as_str().unwrap().to_owned();

    let second = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/user/avatar")
            .insert_header(("Authorization", bearer.clone()))
            .insert_header(("Content-Type", multipart_content_type()))
            .set_payload(multipart_body("avatar", "new-face.png", "image/png", PNG_BYTES))
            .to_request(),
    )
    .await;
    let second: Value = test::read_body_json(second).await;
    let second_locator = second["avatar"].as_str().unwrap().to_owned();
    assert_ne!(first_locator, second_locator);

    // The replaced blob is gone, the current one present.
    let relative = |locator: &str| {
        harness
            .uploads_root
            .join(locator.trim_start_matches("uploads/"))
    };
    assert!(!relative(&first_locator).exists());
    assert!(relative(&second_locator).exists());

    let cleared = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/user/avatar")
            .insert_header(("Authorization", bearer))
            .to_request(),
    )
    .await;
    assert_eq!(cleared.status(), StatusCode::OK);
    let cleared: Value = test::read_body_json(cleared).await;
    assert!(cleared.get("avatar").is_none());
    assert!(!relative(&second_locator).exists());
}

#[actix_rt::test]
async fn avatar_type_checks_reject_non_images() {
    let harness = harness().await;
    let app = test::init_service(vault_app(&harness)).await;
    let (bearer, _) = register_user(&app, "carol@example.com", "Carol").await;

    // Wrong extension and wrong content type.
    let cases = [
        ("notes.txt", "text/plain"),
        // Extension on the allow-list but content type not.
        ("face.png", "application/octet-stream"),
        // Content type on the allow-list but extension not.
        ("face.svg", "image/png"),
    ];
    for (filename, content_type) in cases {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/user/avatar")
                .insert_header(("Authorization", bearer.clone()))
                .insert_header(("Content-Type", multipart_content_type()))
                .set_payload(multipart_body("avatar", filename, content_type, PNG_BYTES))
                .to_request(),
        )
        .await;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "{filename} as {content_type} should be rejected"
        );
    }

    // Nothing was persisted by the rejected uploads.
    let avatars: Vec<_> = std::fs::read_dir(harness.uploads_root.join("avatars"))
        .unwrap()
        .collect();
    assert!(avatars.is_empty());
}

#[actix_rt::test]
async fn change_password_requires_the_current_one() {
    let harness = harness().await;
    let app = test::init_service(vault_app(&harness)).await;
    let (bearer, _) = register_user(&app, "dave@example.com", "Dave").await;

    let wrong = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/user/change-password")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({
                "currentPassword": "not my password",
                "newPassword": "long enough replacement",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

    let changed = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/user/change-password")
            .insert_header(("Authorization", bearer))
            .set_json(json!({
                "currentPassword": "correct horse battery",
                "newPassword": "long enough replacement",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(changed.status(), StatusCode::NO_CONTENT);

    // Old credentials stop working, new ones authenticate.
    let old_login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": "dave@example.com",
                "password": "correct horse battery",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(old_login.status(), StatusCode::UNAUTHORIZED);

    let new_login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": "dave@example.com",
                "password": "long enough replacement",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(new_login.status(), StatusCode::OK);
}
