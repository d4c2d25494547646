use axum::http::StatusCode;

use crate::files::MAX_FILE_SIZE;
use crate::tests::helper;

#[tokio::test]
async fn test_submit_missing_fields() {
    let mut app = helper::setup_test_app().await;

    let (status_code, entry, error) = helper::maybe_submit(&mut app, &[], &[]).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(entry.is_none());
    assert_eq!(
        Some("Name is required, Email is required, Message is required".to_string()),
        error
    );

    let (status_code, _, error) =
        helper::maybe_submit(&mut app, &[("name", "Alice"), ("message", "  ")], &[]).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Email is required, Message is required".to_string()),
        error
    );

    // nothing was stored
    let (_, entries) = helper::list_entries(&mut app, "").await;
    assert!(entries.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_malformed_fields() {
    let mut app = helper::setup_test_app().await;

    let name = "n".repeat(101);
    let message = "m".repeat(1001);

    let (status_code, _, error) = helper::maybe_submit(
        &mut app,
        &[
            ("name", name.as_str()),
            ("email", "not-an-email"),
            ("message", message.as_str()),
            ("type", "diary"),
        ],
        &[],
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some(
            "Name too long, Invalid email format, Message too long, Invalid entry type".to_string()
        ),
        error
    );
}

#[tokio::test]
async fn test_submit_limits_are_inclusive() {
    let mut app = helper::setup_test_app().await;

    let name = "n".repeat(100);
    let message = "m".repeat(1000);

    let entry = helper::submit(&mut app, &name, "a@b.com", &message).await;
    assert_eq!(name, entry.name);
    assert_eq!(message, entry.message);
}

#[tokio::test]
async fn test_submit_type() {
    let mut app = helper::setup_test_app().await;

    let (status_code, entry, _) = helper::maybe_submit(
        &mut app,
        &[
            ("name", "Wifi"),
            ("email", "a@b.com"),
            ("message", "hunter2"),
            ("type", "Secret"),
        ],
        &[],
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!("secret", entry.unwrap().entry_type);
}

#[tokio::test]
async fn test_submit_json() {
    let mut app = helper::setup_test_app().await;

    let body = r#"{"name":"Alice","email":"a@b.com","message":"from json","type":"todo"}"#;
    let (status_code, entry, _) =
        helper::maybe_submit_with_raw_body(&mut app, Some("application/json"), body).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let entry = entry.unwrap();
    assert_eq!("from json", entry.message);
    assert_eq!("todo", entry.entry_type);

    // missing fields are still reported together
    let (status_code, _, error) =
        helper::maybe_submit_with_raw_body(&mut app, Some("application/json"), r"{}").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Name is required, Email is required, Message is required".to_string()),
        error
    );

    // syntax error
    let (status_code, _, error) =
        helper::maybe_submit_with_raw_body(&mut app, Some("application/json"), r#"{"}"#).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("JSON syntax error".to_string()), error);

    // wrong shape
    let (status_code, _, error) =
        helper::maybe_submit_with_raw_body(&mut app, Some("application/json"), r#"{"name":1}"#)
            .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Data error".to_string()), error);
}

#[tokio::test]
async fn test_submit_url_encoded() {
    let mut app = helper::setup_test_app().await;

    let body = "name=Alice&email=a%40b.com&message=hello+world";
    let (status_code, entry, _) = helper::maybe_submit_with_raw_body(
        &mut app,
        Some("application/x-www-form-urlencoded"),
        body,
    )
    .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let entry = entry.unwrap();
    assert_eq!("a@b.com", entry.email);
    assert_eq!("hello world", entry.message);
}

#[tokio::test]
async fn test_submit_unsupported_content_type() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) =
        helper::maybe_submit_with_raw_body(&mut app, Some("text/plain"), "hello").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Expected multipart form data, JSON or a URL-encoded form".to_string()),
        error
    );

    let (status_code, _, _) = helper::maybe_submit_with_raw_body(&mut app, None, "hello").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
}

#[tokio::test]
async fn test_submit_body_too_large() {
    let mut app = helper::setup_test_app().await;

    // larger than the body limit of the submit route
    let message = "x".repeat(MAX_FILE_SIZE * 2);

    let body = format!(r#"{{"name":"Alice","email":"a@b.com","message":"{message}"}}"#);
    let (status_code, entry, error) =
        helper::maybe_submit_with_raw_body(&mut app, Some("application/json"), body).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(entry.is_none());
    assert_eq!(Some("File too large. Max 5MB.".to_string()), error);

    let body = format!("name=Alice&email=a%40b.com&message={message}");
    let (status_code, entry, error) = helper::maybe_submit_with_raw_body(
        &mut app,
        Some("application/x-www-form-urlencoded"),
        body,
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert!(entry.is_none());
    assert_eq!(Some("File too large. Max 5MB.".to_string()), error);

    let (_, entries) = helper::list_entries(&mut app, "").await;
    assert!(entries.unwrap().is_empty());
}
