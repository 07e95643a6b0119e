//! Message service endpoint tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{fake_email, TestApp};

#[tokio::test]
async fn inbox_is_returned_once() {
    let app = TestApp::new();
    let sender_email = fake_email();
    let sender = app.register(&sender_email).await;
    let recipient = app.register("reader@x.com").await;
    app.sync_users().await;

    for text in ["first", "second"] {
        let response = app
            .post(
                &app.message_router,
                "/messages/send-message",
                json!({ "recipient_email": "reader@x.com", "text": text }),
                Some(&sender),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "success": true }));
    }

    let first = app
        .get(&app.message_router, "/messages/get-messages", Some(&recipient))
        .await;
    let second = app
        .get(&app.message_router, "/messages/get-messages", Some(&recipient))
        .await;

    assert_eq!(first.status, StatusCode::OK);
    let texts: Vec<&str> = first
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);

    let sender_id = app.users.get(&sender_email).unwrap().id.to_string();
    assert!(first
        .body
        .as_array()
        .unwrap()
        .iter()
        .all(|m| m["sender_id"] == sender_id.as_str()));

    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body, json!([]));
}

#[tokio::test]
async fn sending_to_unknown_recipient_is_conflict() {
    let app = TestApp::new();
    let sender = app.register(&fake_email()).await;
    app.sync_users().await;

    let response = app
        .post(
            &app.message_router,
            "/messages/send-message",
            json!({ "recipient_email": "ghost@x.com", "text": "hello?" }),
            Some(&sender),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "Message.Recipient");
    assert_eq!(response.body["description"], "Recipient User not exists");
    assert_eq!(app.messages.len(), 0);
}

#[tokio::test]
async fn recipient_unknown_until_replica_is_synced() {
    let app = TestApp::new();
    let sender = app.register(&fake_email()).await;
    app.register("late@x.com").await;
    let body = json!({ "recipient_email": "late@x.com", "text": "hi" });

    let before = app
        .post(&app.message_router, "/messages/send-message", body.clone(), Some(&sender))
        .await;
    app.sync_users().await;
    let after = app
        .post(&app.message_router, "/messages/send-message", body, Some(&sender))
        .await;

    assert_eq!(before.status, StatusCode::CONFLICT);
    assert_eq!(after.status, StatusCode::OK);
}

#[tokio::test]
async fn empty_text_is_bad_request() {
    let app = TestApp::new();
    let sender = app.register(&fake_email()).await;

    let response = app
        .post(
            &app.message_router,
            "/messages/send-message",
            json!({ "recipient_email": "b@x.com", "text": "" }),
            Some(&sender),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Request.Validation");
}

#[tokio::test]
async fn message_routes_require_token() {
    let app = TestApp::new();

    let get = app
        .get(&app.message_router, "/messages/get-messages", None)
        .await;
    let send = app
        .post(
            &app.message_router,
            "/messages/send-message",
            json!({ "recipient_email": "b@x.com", "text": "hi" }),
            None,
        )
        .await;

    assert_eq!(get.status, StatusCode::UNAUTHORIZED);
    assert_eq!(send.status, StatusCode::UNAUTHORIZED);
}
