mod common;

use axum::http::StatusCode;
use birthday_wishes::wish_backend::BackendCall;
use common::*;
use serde_json::json;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn valid_wish() -> serde_json::Value {
    json!({
        "author_name": "Alice",
        "message": "Happy birthday, have a great one!",
    })
}

#[tokio::test]
async fn test_create_wish_without_image() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/v1/wishes", valid_wish())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["image_url"], "");
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(body["created_at"].as_str().unwrap()).is_ok());

    assert_eq!(
        setup.backend.calls(),
        vec![BackendCall::Insert {
            table: TEST_TABLE.to_string()
        }]
    );

    let rows = setup.backend.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.author_name, "Alice");
    assert_eq!(rows[0].1.recipient_name, "Cheata");
    assert_eq!(rows[0].1.message, "Happy birthday, have a great one!");
}

#[tokio::test]
async fn test_create_wish_with_image_uploads_before_insert() {
    let setup = TestSetup::new();

    let mut payload = valid_wish();
    payload["recipient_name"] = json!("  Bob  ");
    payload["image"] = image_payload("party.PNG", "image/png", PNG_BYTES);

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;

    let calls = setup.backend.calls();
    assert_eq!(calls.len(), 2);
    let BackendCall::Upload { bucket, key } = &calls[0] else {
        panic!("expected upload first, got {calls:?}");
    };
    assert_eq!(bucket, TEST_BUCKET);
    assert!(key.starts_with("wish_"));
    assert!(key.ends_with(".png"));
    assert_eq!(
        calls[1],
        BackendCall::Insert {
            table: TEST_TABLE.to_string()
        }
    );

    let expected_url = format!("https://media.test/{TEST_BUCKET}/{key}");
    assert_eq!(body["image_url"], expected_url.as_str());

    let object = setup.backend.object(key).unwrap();
    assert_eq!(object.bytes, PNG_BYTES);
    assert_eq!(object.content_type, "image/png");

    let rows = setup.backend.rows();
    assert_eq!(rows[0].1.recipient_name, "Bob");
    assert_eq!(rows[0].1.image_url, expected_url);
}

#[tokio::test]
async fn test_create_wish_validation_message() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            "/v1/wishes",
            json!({ "author_name": "Alice", "message": "Too short" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        body["error"]["message"],
        "Please write a longer birthday wish (at least 10 characters)"
    );
    assert_eq!(body["allowRetry"], false);
    assert!(setup.backend.calls().is_empty());
}

#[tokio::test]
async fn test_create_wish_missing_fields_checked_first() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/v1/wishes", json!({ "author_name": "   ", "message": "" }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["message"], "Please fill in all required fields!");
}

#[tokio::test]
async fn test_create_wish_rejects_non_image_upload() {
    let setup = TestSetup::new();

    let mut payload = valid_wish();
    payload["image"] = image_payload("notes.pdf", "application/pdf", b"%PDF-1.4");

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "Please select a valid image file (JPG, PNG, GIF)"
    );
    assert_eq!(setup.backend.object_count(), 0);
}

#[tokio::test]
async fn test_create_wish_recipient_required() {
    let setup = TestSetup::with_rules(birthday_wishes::submission::ValidationRules {
        recipient_required: true,
        ..Default::default()
    });

    let response = setup
        .send_post_request("/v1/wishes", valid_wish())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["message"], "Please fill in all required fields!");
}

#[tokio::test]
async fn test_upload_failure_skips_insert() {
    let setup = TestSetup::new();
    setup.backend.fail_uploads("quota exceeded");

    let mut payload = valid_wish();
    payload["image"] = image_payload("cake.jpg", "image/jpeg", PNG_BYTES);

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "upload_failed");
    assert_eq!(body["error"]["message"], "Image upload failed: quota exceeded");
    assert_eq!(body["allowRetry"], true);
    assert!(setup.backend.rows().is_empty());
    assert!(!setup
        .backend
        .calls()
        .iter()
        .any(|call| matches!(call, BackendCall::Insert { .. })));
}

#[tokio::test]
async fn test_insert_failure_reports_database_error() {
    let setup = TestSetup::new();
    setup.backend.fail_inserts("table is gone");

    let mut payload = valid_wish();
    payload["image"] = image_payload("cake.gif", "image/gif", PNG_BYTES);

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "persist_failed");
    assert_eq!(body["error"]["message"], "Database error: table is gone");

    // The photo stays behind
    assert_eq!(setup.backend.object_count(), 1);
}

#[tokio::test]
async fn test_create_wish_rejects_bad_base64() {
    let setup = TestSetup::new();

    let mut payload = valid_wish();
    payload["image"] = json!({
        "filename": "cake.png",
        "content_type": "image/png",
        "data": "not base64 !!!",
    });

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "invalid_input");
    assert!(setup.backend.calls().is_empty());
}

#[tokio::test]
async fn test_preview_uses_placeholders() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/v1/wishes/preview", json!({ "message": "  " }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["author"], "YOU");
    assert_eq!(body["recipient"], "FRIEND");
    assert_eq!(
        body["message"],
        "Your beautiful birthday wish will appear here..."
    );
    assert_eq!(body["image"]["kind"], "placeholder");

    let date = body["date"].as_str().unwrap();
    assert_eq!(date, date.to_uppercase());
    assert_eq!(date.len(), "OCT 17, 26".len());
}

#[tokio::test]
async fn test_preview_trims_fields() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            "/v1/wishes/preview",
            json!({
                "author_name": " Alice ",
                "recipient_name": "Bob",
                "message": " Many happy returns ",
            }),
        )
        .await
        .unwrap();
    let body = parse_response_body(response).await;

    assert_eq!(body["author"], "Alice");
    assert_eq!(body["recipient"], "Bob");
    assert_eq!(body["message"], "Many happy returns");
}

#[tokio::test]
async fn test_get_wish() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/v1/wishes/missing").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "not_found");

    let response = setup
        .send_post_request("/v1/wishes", valid_wish())
        .await
        .unwrap();
    let created = parse_response_body(response).await;
    let id = created["id"].as_str().unwrap();

    let response = setup
        .send_get_request(&format!("/v1/wishes/{id}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["author_name"], "Alice");
    assert_eq!(body["recipient_name"], "Cheata");
}

#[tokio::test]
async fn test_config_reports_limits() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/v1/config").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(
        body,
        json!({
            "recipient_required": false,
            "default_recipient": "Cheata",
            "min_name_chars": 2,
            "max_name_chars": 100,
            "min_message_chars": 10,
            "max_image_size_bytes": 5 * 1024 * 1024,
        })
    );
}

#[tokio::test]
async fn test_health_and_docs() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");

    let response = setup.send_get_request("/openapi.json").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["paths"]["/v1/wishes"].is_object());
}

#[tokio::test]
async fn test_photo_over_request_limit_is_a_validation_error() {
    let setup = TestSetup::new();

    let mut payload = valid_wish();
    payload["image"] = image_payload("huge.png", "image/png", &vec![0_u8; 7 * 1024 * 1024]);

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "Image size should be less than 5MB!");
    assert_eq!(body["allowRetry"], false);
    assert!(setup.backend.calls().is_empty());
}

#[tokio::test]
async fn test_photo_just_over_limit_reaches_validator() {
    let setup = TestSetup::new();

    let mut payload = valid_wish();
    payload["image"] = image_payload("big.png", "image/png", &vec![0_u8; 5 * 1024 * 1024 + 1]);

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "Image size should be less than 5MB!");
    assert_eq!(setup.backend.object_count(), 0);
}

#[tokio::test]
async fn test_empty_photo_is_rejected() {
    let setup = TestSetup::new();

    let mut payload = valid_wish();
    payload["image"] = image_payload("empty.png", "image/png", &[]);

    let response = setup.send_post_request("/v1/wishes", payload).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "The selected image is empty");
    assert!(setup.backend.calls().is_empty());
}
