//! User service endpoint tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;
use uuid::Uuid;

use messenger::domain::{UserDeletedEvent, UserEvent};

use crate::common::{bare_claims, fake_email, sign_claims, TestApp, PASSWORD};

#[tokio::test]
async fn first_registration_is_administrator_then_user() {
    let app = TestApp::new();
    let admin = app.register("a@x.com").await;
    app.register("b@x.com").await;

    let response = app
        .get(&app.user_router, "/users/get-all", Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let roles: Vec<(&str, &str)> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| (u["email"].as_str().unwrap(), u["role"].as_str().unwrap()))
        .collect();
    assert_eq!(roles, vec![("a@x.com", "Administrator"), ("b@x.com", "User")]);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::new();
    let email = fake_email();
    app.register(&email).await;

    let response = app
        .post(
            &app.user_router,
            "/users/register",
            json!({ "email": email, "password": PASSWORD }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "BadRequest");
    assert_eq!(response.body["message"], "User.AlreadyExists");
    assert_eq!(
        response.body["description"],
        format!("User with email {} already exists", email)
    );
}

#[test_case(json!({ "email": "not-an-email", "password": PASSWORD }) ; "bad email")]
#[test_case(json!({ "email": "a@x.com", "password": "password" }) ; "weak password")]
#[test_case(json!({ "email": "a@x.com" }) ; "missing password")]
#[tokio::test]
async fn invalid_registration_body_is_bad_request(body: serde_json::Value) {
    let app = TestApp::new();

    let response = app
        .post(&app.user_router, "/users/register", body, None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Request.Validation");
    assert_eq!(app.users.outbox_len(), 0);
}

#[tokio::test]
async fn login_twice_with_same_password_succeeds() {
    let app = TestApp::new();
    let email = fake_email();
    app.register(&email).await;
    let salt_after_register = app.users.get(&email).unwrap().salt;

    for _ in 0..2 {
        let response = app
            .post(
                &app.user_router,
                "/users/login",
                json!({ "email": email, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body["token"].is_string());
    }

    assert_ne!(app.users.get(&email).unwrap().salt, salt_after_register);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = TestApp::new();
    let email = fake_email();
    app.register(&email).await;

    let response = app
        .post(
            &app.user_router,
            "/users/login",
            json!({ "email": email, "password": "Wr0ng!pass" }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "User.InvalidPassword");
}

#[tokio::test]
async fn login_with_unknown_email_is_not_found() {
    let app = TestApp::new();

    let response = app
        .post(
            &app.user_router,
            "/users/login",
            json!({ "email": "ghost@x.com", "password": PASSWORD }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "User.NotFound");
    assert_eq!(
        response.body["description"],
        "User with email ghost@x.com not found"
    );
}

#[tokio::test]
async fn current_user_id_comes_from_token() {
    let app = TestApp::new();
    let email = fake_email();
    let token = app.register(&email).await;

    let response = app
        .get(&app.user_router, "/users/get-current-user-id", Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["user_id"],
        app.users.get(&email).unwrap().id.to_string()
    );
}

#[test_case(None ; "missing token")]
#[test_case(Some("not-a-jwt") ; "garbage token")]
#[tokio::test]
async fn protected_routes_require_valid_token(token: Option<&str>) {
    let app = TestApp::new();

    let response = app.get(&app.user_router, "/users/get-all", token).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "Unauthorized");
}

#[test_case(Some("a@x.com"), None, true ; "missing role")]
#[test_case(None, Some("User"), true ; "missing email")]
#[test_case(Some("a@x.com"), Some("Root"), true ; "unknown role")]
#[test_case(Some("a@x.com"), Some("User"), false ; "subject not a uuid")]
#[tokio::test]
async fn signed_token_without_usable_claims_is_conflict(
    email: Option<&str>,
    role: Option<&str>,
    uuid_subject: bool,
) {
    let app = TestApp::new();
    let mut claims = bare_claims();
    claims.email = email.map(str::to_owned);
    claims.role = role.map(str::to_owned);
    if !uuid_subject {
        claims.sub = "not-a-uuid".into();
    }

    let response = app
        .get(
            &app.user_router,
            "/users/get-current-user-id",
            Some(&sign_claims(&claims)),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["code"], "Conflict");
    assert_eq!(response.body["message"], "User.Claims");
}

#[tokio::test]
async fn administrator_deletes_another_user() {
    let app = TestApp::new();
    let admin = app.register("a@x.com").await;
    app.register("b@x.com").await;
    let target = app.users.get("b@x.com").unwrap().id;
    app.relay().await.unwrap();
    app.bus.take();

    let response = app
        .post(
            &app.user_router,
            "/users/delete",
            json!({ "id": target }),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));
    assert!(app.users.get("b@x.com").is_none());
    app.relay().await.unwrap();
    assert_eq!(
        app.bus.take(),
        vec![UserEvent::Deleted(UserDeletedEvent { id: target })]
    );
}

#[tokio::test]
async fn administrator_cannot_delete_themselves() {
    let app = TestApp::new();
    let admin = app.register("a@x.com").await;
    let id = app.users.get("a@x.com").unwrap().id;

    let response = app
        .post(&app.user_router, "/users/delete", json!({ "id": id }), Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "User.Delete");
    assert_eq!(response.body["description"], "User can not delete themselves");
    assert!(app.users.get("a@x.com").is_some());
}

#[tokio::test]
async fn deleting_unknown_user_is_not_found() {
    let app = TestApp::new();
    let admin = app.register("a@x.com").await;
    let ghost = Uuid::new_v4();

    let response = app
        .post(&app.user_router, "/users/delete", json!({ "id": ghost }), Some(&admin))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body["description"],
        format!("User with id {} not found", ghost)
    );
}

#[tokio::test]
async fn regular_user_cannot_delete() {
    let app = TestApp::new();
    app.register("a@x.com").await;
    let user = app.register("b@x.com").await;
    let admin_id = app.users.get("a@x.com").unwrap().id;

    let response = app
        .post(
            &app.user_router,
            "/users/delete",
            json!({ "id": admin_id }),
            Some(&user),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(app.users.get("a@x.com").is_some());
}

#[tokio::test]
async fn is_user_exist_reports_id_or_nil() {
    let app = TestApp::new();
    let email = fake_email();
    let token = app.register(&email).await;
    let id = app.users.get(&email).unwrap().id;

    let found = app
        .post(
            &app.user_router,
            "/users/is-user-exist",
            json!({ "email": email }),
            Some(&token),
        )
        .await;
    let missing = app
        .post(
            &app.user_router,
            "/users/is-user-exist",
            json!({ "email": "ghost@x.com" }),
            Some(&token),
        )
        .await;

    assert_eq!(found.body, json!({ "user_id": id, "is_existing": true }));
    assert_eq!(
        missing.body,
        json!({ "user_id": Uuid::nil(), "is_existing": false })
    );
}
