//! Common Test Utilities
//!
//! In-memory repositories, outbox and event bus, plus a [`TestApp`] that
//! drives the real user and message service routers with `oneshot`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use fake::{faker::internet::en::SafeEmail, Fake};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use messenger::application::events::EventDispatcher;
use messenger::application::services::{
    Claims, MessageService, MessageServiceImpl, TokenIssuer, TokenVerifier, UserService,
    UserServiceImpl,
};
use messenger::config::JwtSettings;
use messenger::domain::{
    AvailableUser, AvailableUserRepository, EventPublisher, Message, MessageRepository,
    OutboxEntry, OutboxRepository, Role, RoleRepository, RoleType, User, UserEvent,
    UserRepository,
};
use messenger::infrastructure::events::OutboxRelay;
use messenger::presentation::http::handlers::health::HealthState;
use messenger::presentation::http::routes;
use messenger::shared::error::AppError;
use messenger::startup::{MessageServiceState, UserServiceState};

pub const PASSWORD: &str = "P@ssw0rd1";

const PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/private_key.pem");
const PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/public_key.pem");

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        issuer: "messenger-test".into(),
        audience: "messenger-test".into(),
        expiration_minutes: 5,
        private_key_path: None,
        public_key_path: String::new(),
    }
}

pub fn verifier() -> Arc<TokenVerifier> {
    Arc::new(TokenVerifier::from_pem(PUBLIC_KEY, &jwt_settings()).unwrap())
}

/// Sign arbitrary claims with the fixture key, bypassing `TokenIssuer`.
pub fn sign_claims(claims: &Claims) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY).unwrap();
    encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
}

/// Claims the verifier accepts, for a random subject with no email or role.
pub fn bare_claims() -> Claims {
    let settings = jwt_settings();
    let now = chrono::Utc::now().timestamp();
    Claims {
        sub: Uuid::new_v4().to_string(),
        email: None,
        role: None,
        iss: settings.issuer,
        aud: settings.audience,
        iat: now,
        exp: now + 300,
    }
}

/// A random, well-formed email address
pub fn fake_email() -> String {
    SafeEmail().fake()
}

/// User store with an outbox written under the same lock as the users.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
    outbox: Mutex<Vec<OutboxEntry>>,
}

impl InMemoryUsers {
    pub fn get(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn outbox_len(&self) -> usize {
        self.outbox.lock().unwrap().len()
    }

    fn enqueue(&self, event: &UserEvent) {
        let mut outbox = self.outbox.lock().unwrap();
        let seq = outbox.last().map_or(1, |e| e.seq + 1);
        outbox.push(OutboxEntry {
            seq,
            event: event.clone(),
        });
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.get(email))
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn has_any(&self) -> Result<bool, AppError> {
        Ok(!self.users.lock().unwrap().is_empty())
    }

    async fn create(&self, user: &User, event: &UserEvent) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        users.push(user.clone());
        self.enqueue(event);
        Ok(true)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        password: &[u8],
        salt: &[u8],
    ) -> Result<(), AppError> {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.password = password.to_vec();
            user.salt = salt.to_vec();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, event: &UserEvent) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }
        self.enqueue(event);
        Ok(true)
    }
}

#[async_trait]
impl OutboxRepository for InMemoryUsers {
    async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>, AppError> {
        let outbox = self.outbox.lock().unwrap();
        Ok(outbox.iter().take(limit as usize).cloned().collect())
    }

    async fn remove(&self, seq: i64) -> Result<(), AppError> {
        self.outbox.lock().unwrap().retain(|e| e.seq != seq);
        Ok(())
    }
}

pub struct SeededRoles;

#[async_trait]
impl RoleRepository for SeededRoles {
    async fn find_by_type(&self, role_type: RoleType) -> Result<Option<Role>, AppError> {
        let id = match role_type {
            RoleType::Administrator => Uuid::from_u128(1),
            RoleType::User => Uuid::from_u128(2),
        };
        Ok(Some(Role { id, role_type }))
    }
}

/// Records published events until they are delivered. Can be switched off to
/// simulate an unreachable bus.
#[derive(Default)]
pub struct InMemoryBus {
    events: Mutex<Vec<UserEvent>>,
    down: AtomicBool,
}

impl InMemoryBus {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn take(&self) -> Vec<UserEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn pending(&self) -> Vec<UserEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryBus {
    async fn publish(&self, event: &UserEvent) -> Result<(), AppError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::Internal("event bus unreachable".into()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReplica {
    users: Mutex<HashMap<Uuid, AvailableUser>>,
    deleted: Mutex<HashSet<Uuid>>,
}

impl InMemoryReplica {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.users.lock().unwrap().contains_key(&id)
    }
}

#[async_trait]
impl AvailableUserRepository for InMemoryReplica {
    async fn upsert(&self, user: &AvailableUser) -> Result<bool, AppError> {
        let deleted = self.deleted.lock().unwrap();
        if deleted.contains(&user.id) {
            return Ok(false);
        }
        let mut users = self.users.lock().unwrap();
        users.retain(|id, u| *id == user.id || u.email != user.email);
        users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut deleted = self.deleted.lock().unwrap();
        deleted.insert(id);
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AvailableUser>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryMessages {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessages {
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn create(&self, message: &Message) -> Result<(), AppError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn take_unread(&self, recipient_id: Uuid) -> Result<Vec<Message>, AppError> {
        let mut messages = self.messages.lock().unwrap();
        let mut unread = Vec::new();
        for message in messages
            .iter_mut()
            .filter(|m| m.recipient_id == recipient_id && !m.is_read)
        {
            message.is_read = true;
            unread.push(message.clone());
        }
        unread.sort_by_key(|m| m.sent_at);
        Ok(unread)
    }
}

/// Parsed HTTP response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Both services wired to in-memory stores, sharing one event bus.
pub struct TestApp {
    pub user_router: Router,
    pub message_router: Router,
    pub users: Arc<InMemoryUsers>,
    pub relay: OutboxRelay<InMemoryUsers, InMemoryBus>,
    pub bus: Arc<InMemoryBus>,
    pub replica: Arc<InMemoryReplica>,
    pub messages: Arc<InMemoryMessages>,
    pub dispatcher: EventDispatcher,
}

impl TestApp {
    pub fn new() -> Self {
        let settings = jwt_settings();
        let issuer = Arc::new(TokenIssuer::from_pem(PRIVATE_KEY, &settings).unwrap());

        let users = Arc::new(InMemoryUsers::default());
        let bus = Arc::new(InMemoryBus::default());
        let replica = Arc::new(InMemoryReplica::default());
        let messages = Arc::new(InMemoryMessages::default());

        let user_service: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(
            users.clone(),
            Arc::new(SeededRoles),
            issuer,
        ));
        let message_service: Arc<dyn MessageService> = Arc::new(MessageServiceImpl::new(
            messages.clone(),
            replica.clone(),
        ));

        let user_router = routes::user_service_router(UserServiceState {
            users: user_service,
            verifier: verifier(),
            health: HealthState::new(),
        });
        let message_router = routes::message_service_router(MessageServiceState {
            messages: message_service,
            verifier: verifier(),
            health: HealthState::new(),
        });

        Self {
            user_router,
            message_router,
            relay: OutboxRelay::new(users.clone(), bus.clone(), 32, Duration::from_millis(10)),
            users,
            bus,
            dispatcher: EventDispatcher::for_replica(replica.clone()),
            replica,
            messages,
        }
    }

    /// Move committed events from the outbox onto the bus.
    pub async fn relay(&self) -> Result<usize, AppError> {
        self.relay.relay_once().await
    }

    /// Relay the outbox and deliver every published event to the replica.
    pub async fn sync_users(&self) {
        self.relay().await.unwrap();
        for event in self.bus.take() {
            self.deliver(&event).await;
        }
    }

    pub async fn deliver(&self, event: &UserEvent) {
        let payload = event.payload().unwrap();
        self.dispatcher
            .dispatch(event.event_type(), &payload)
            .await
            .unwrap();
    }

    /// Register and return the issued token.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .post(
                &self.user_router,
                "/users/register",
                serde_json::json!({ "email": email, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["token"].as_str().unwrap().to_owned()
    }

    pub async fn get(&self, router: &Router, uri: &str, token: Option<&str>) -> TestResponse {
        send(router, Method::GET, uri, None, token).await
    }

    pub async fn post(
        &self,
        router: &Router,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> TestResponse {
        send(router, Method::POST, uri, Some(body), token).await
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse { status, body }
}
