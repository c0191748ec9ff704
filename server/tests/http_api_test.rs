//! HTTP API integration tests.
//!
//! Drive the full router with `tower::ServiceExt::oneshot` over in-memory
//! stores. Accounts that never log in are inserted with a placeholder hash so
//! only the login tests pay for Argon2.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Integration tests can use expect for setup
#![allow(clippy::too_many_lines)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use helpdesk_auth::mocks::InMemoryAccountRepository;
use helpdesk_auth::repository::AccountFuture;
use helpdesk_auth::{Account, AccountRepository, AuthError, NewAccount, ProfileUpdate};
use helpdesk_core::access::AccessPolicy;
use helpdesk_core::numbering::TicketNumberFormat;
use helpdesk_core::types::{AccountId, Role};
use helpdesk_runtime::RetryPolicy;
use helpdesk_server::{build_router, AppState};
use helpdesk_testing::{InMemoryCommentStore, InMemoryTicketStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    accounts: Arc<InMemoryAccountRepository>,
    tickets: InMemoryTicketStore,
}

impl TestApp {
    fn new() -> Self {
        Self::with_policy(AccessPolicy::default())
    }

    fn with_policy(policy: AccessPolicy) -> Self {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        Self::build(policy, accounts.clone(), accounts)
    }

    /// Serve `repository` while seeding fixtures through `accounts`.
    fn build(
        policy: AccessPolicy,
        repository: Arc<dyn AccountRepository>,
        accounts: Arc<InMemoryAccountRepository>,
    ) -> Self {
        let tickets = InMemoryTicketStore::new();
        let comments = InMemoryCommentStore::new(tickets.clone());

        let state = AppState::new(
            repository,
            Arc::new(tickets.clone()),
            Arc::new(comments),
            TicketNumberFormat::default(),
            RetryPolicy::default(),
            policy,
        );

        Self {
            router: build_router(state),
            accounts,
            tickets,
        }
    }

    async fn account(&self, name: &str, role: Role) -> AccountId {
        let account = NewAccount {
            role,
            ..NewAccount::normal(name, format!("{}@example.com", name.to_lowercase()))
        };
        self.accounts
            .insert(account, "not-a-real-hash".into())
            .await
            .expect("insert account")
            .id
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        caller: Option<AccountId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = caller {
            builder = builder.header("X-User-Id", id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post_with_raw_caller(&self, uri: &str, header: &str, body: Value) -> StatusCode {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("X-User-Id", header)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }

    async fn get(&self, uri: &str, caller: Option<AccountId>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, caller, None).await
    }

    async fn post(&self, uri: &str, caller: Option<AccountId>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, caller, Some(body)).await
    }

    async fn put(&self, uri: &str, caller: Option<AccountId>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, caller, Some(body)).await
    }

    async fn open_ticket(&self, caller: Option<AccountId>, title: &str) -> Value {
        let (status, body) = self
            .post(
                "/register-ticket",
                caller,
                json!({"title": title, "description": "Details"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn titles(list: &Value) -> Vec<&str> {
    list.as_array()
        .expect("array")
        .iter()
        .map(|t| t["title"].as_str().expect("title"))
        .collect()
}

// ============================================================================
// Health and routing
// ============================================================================

#[tokio::test]
async fn test_health_and_fallback() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let (status, body) = app.get("/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    // Metrics are disabled without a recorder
    let (status, _) = app.get("/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_correlation_id() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("X-Correlation-ID"));
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/register",
            None,
            json!({"name": "Ana", "email": "Ana@Example.com", "password": "correct horse"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "normal");
    assert_eq!(body["email"], "ana@example.com");
    assert!(body.get("password_hash").is_none());

    let (status, body) = app
        .post("/login", None, json!({"email": "ana@example.com", "password": "correct horse"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana");

    // Wrong password and unknown email are indistinguishable
    let (wrong_status, wrong) = app
        .post("/login", None, json!({"email": "ana@example.com", "password": "battery staple"}))
        .await;
    let (unknown_status, unknown) = app
        .post("/login", None, json!({"email": "bob@example.com", "password": "correct horse"}))
        .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::new();
    app.account("Ana", Role::Normal).await;

    let (status, body) = app
        .post(
            "/register",
            None,
            json!({"name": "Ana", "email": "ANA@example.com", "password": "correct horse"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");

    let (status, _) = app
        .post(
            "/register",
            None,
            json!({"name": "Bob", "email": "bob@example.com", "password": "short"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            "/register",
            None,
            json!({"name": "Bob", "email": "not-an-email", "password": "correct horse"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Tickets
// ============================================================================

#[tokio::test]
async fn test_ticket_numbers_are_sequential() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;

    let first = app.open_ticket(Some(ana), "VPN down").await;
    let second = app.open_ticket(None, "Printer jam").await;

    assert_eq!(first["ticket_number"], "T000001");
    assert_eq!(first["owner"], ana.to_string());
    assert_eq!(first["status"], "Open");
    assert_eq!(second["ticket_number"], "T000002");
    assert!(second["owner"].is_null());
}

#[tokio::test]
async fn test_register_ticket_validation_and_unknown_caller() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/register-ticket", None, json!({"title": "   ", "description": "x"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            "/register-ticket",
            Some(AccountId::new()),
            json!({"title": "VPN", "description": "Down"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert!(app.tickets.is_empty());
}

#[tokio::test]
async fn test_malformed_caller_header_is_not_anonymous() {
    let app = TestApp::new();
    let ticket = json!({"title": "VPN", "description": "Down"});

    for header in ["42", "not-a-uuid", ""] {
        let status = app
            .post_with_raw_caller("/register-ticket", header, ticket.clone())
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "X-User-Id: {header:?}");
    }
    assert!(app.tickets.is_empty());

    // Leaving the header out entirely still opens a public ticket
    let created = app.open_ticket(None, "VPN").await;
    assert!(created["owner"].is_null());
}

#[tokio::test]
async fn test_listing_is_scoped_by_role() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let bob = app.account("Bob", Role::Normal).await;
    let sam = app.account("Sam", Role::Support).await;

    app.open_ticket(Some(ana), "ana-1").await;
    app.open_ticket(Some(bob), "bob-1").await;
    app.open_ticket(Some(ana), "ana-2").await;

    let (status, body) = app.get("/tickets", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, mine) = app.get("/tickets", Some(ana)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&mine), ["ana-2", "ana-1"]);
    assert_eq!(mine[0]["created_by"]["name"], "Ana");
    assert_eq!(mine[0]["created_by"]["email"], "ana@example.com");

    let (_, all) = app.get("/tickets", Some(sam)).await;
    assert_eq!(titles(&all), ["ana-2", "bob-1", "ana-1"]);

    let (status, body) = app.get("/tickets?status=Pending", Some(sam)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_status_filter() {
    let app = TestApp::new();
    let sam = app.account("Sam", Role::Support).await;
    let first = app.open_ticket(None, "first").await;
    app.open_ticket(None, "second").await;

    let (status, _) = app
        .put("/update-ticket", Some(sam), json!({"id": first["id"], "status": "In Progress"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, in_progress) = app.get("/tickets?status=In%20Progress", Some(sam)).await;
    assert_eq!(titles(&in_progress), ["first"]);
    let (_, open) = app.get("/tickets?status=Open", Some(sam)).await;
    assert_eq!(titles(&open), ["second"]);
}

#[tokio::test]
async fn test_ticket_detail_access() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let bob = app.account("Bob", Role::Normal).await;
    let sam = app.account("Sam", Role::Support).await;

    let ticket = app.open_ticket(Some(ana), "VPN down").await;
    let uri = format!("/ticket/{}", ticket["id"].as_str().unwrap());

    let (status, body) = app.get(&uri, Some(ana)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket"]["ticket_number"], "T000001");
    assert_eq!(body["comments"], json!([]));

    let (status, body) = app.get(&uri, Some(bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");

    let (status, _) = app.get(&uri, Some(sam)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .get(&format!("/ticket/{}", uuid::Uuid::new_v4()), Some(sam))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_public_ticket_visibility_follows_policy() {
    for (visible, expected) in [(true, StatusCode::OK), (false, StatusCode::FORBIDDEN)] {
        let app = TestApp::with_policy(AccessPolicy::new(visible));
        let ana = app.account("Ana", Role::Normal).await;
        let ticket = app.open_ticket(None, "anonymous").await;

        let (status, _) = app
            .get(&format!("/ticket/{}", ticket["id"].as_str().unwrap()), Some(ana))
            .await;
        assert_eq!(status, expected, "public_tickets_visible = {visible}");
    }
}

#[tokio::test]
async fn test_update_ticket_requires_staff() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let sam = app.account("Sam", Role::Support).await;
    let ticket = app.open_ticket(Some(ana), "VPN down").await;

    let (status, body) = app
        .put("/update-ticket", Some(ana), json!({"id": ticket["id"], "status": "Closed"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_ROLE");

    let (status, body) = app
        .put("/update-ticket", Some(sam), json!({"id": ticket["id"], "status": "Done"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .put("/update-ticket", Some(sam), json!({"id": ticket["id"], "status": "Resolved"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Resolved");
    assert_eq!(body["ticket_number"], "T000001");
}

#[tokio::test]
async fn test_comments() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let bob = app.account("Bob", Role::Normal).await;
    let sam = app.account("Sam", Role::Support).await;
    let ticket = app.open_ticket(Some(ana), "VPN down").await;
    let id = ticket["id"].as_str().unwrap();
    let comments_uri = format!("/ticket/{id}/comments");

    let (status, _) = app
        .post(&comments_uri, Some(ana), json!({"content": "Still broken"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(&comments_uri, Some(sam), json!({"content": "Looking into it"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(&comments_uri, Some(bob), json!({"content": "Me too"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");

    let (status, _) = app
        .post(&comments_uri, Some(ana), json!({"content": "  "}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, detail) = app.get(&format!("/ticket/{id}"), Some(ana)).await;
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"], "Looking into it");
    assert_eq!(comments[0]["written_by"]["name"], "Sam");
    assert_eq!(comments[1]["written_by"]["name"], "Ana");
}

#[tokio::test]
async fn test_ticket_stats() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let ada = app.account("Ada", Role::Administrator).await;
    let ticket = app.open_ticket(Some(ana), "one").await;
    app.open_ticket(Some(ana), "two").await;
    app.put("/update-ticket", Some(ada), json!({"id": ticket["id"], "status": "Closed"}))
        .await;

    let (status, body) = app.get("/ticket-stats", Some(ana)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_ROLE");

    let (status, body) = app.get("/ticket-stats", Some(ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(
        body["by_status"],
        json!([
            {"status": "Open", "count": 1},
            {"status": "In Progress", "count": 0},
            {"status": "Resolved", "count": 0},
            {"status": "Closed", "count": 1},
        ])
    );
}

// ============================================================================
// Public form
// ============================================================================

#[tokio::test]
async fn test_public_ticket_finds_or_registers_account() {
    let app = TestApp::new();

    let (status, first) = app
        .post(
            "/public-ticket",
            None,
            json!({
                "name": "Carla",
                "email": "carla@example.com",
                "password": "correct horse",
                "title": "Cannot print",
                "description": "Printer on floor 2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["user_created"], true);
    assert_eq!(first["ticket_number"], "T000001");

    // Same email again: no password needed, same account
    let (status, second) = app
        .post(
            "/public-ticket",
            None,
            json!({
                "name": "Carla",
                "email": "CARLA@example.com",
                "title": "Still cannot print",
                "description": "Same printer",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{second}");
    assert_eq!(second["user_created"], false);
    assert_eq!(second["account_id"], first["account_id"]);
    assert_eq!(second["owner"], first["account_id"]);

    // A new email without a password cannot register
    let (status, _) = app
        .post(
            "/public-ticket",
            None,
            json!({
                "name": "Dan",
                "email": "dan@example.com",
                "title": "Laptop",
                "description": "Broken screen",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.accounts.len().unwrap(), 1);
    assert_eq!(app.tickets.len(), 2);
}

// ============================================================================
// User administration
// ============================================================================

#[tokio::test]
async fn test_profile_access_and_update() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let bob = app.account("Bob", Role::Normal).await;
    let sam = app.account("Sam", Role::Support).await;

    let (status, body) = app.get(&format!("/user/{ana}"), Some(ana)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana");

    let (status, _) = app.get(&format!("/user/{ana}"), Some(bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/user/{ana}"), Some(sam)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put("/update-user", Some(ana), json!({"id": ana, "phone": "555-0100", "area": "Finance"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "555-0100");
    assert_eq!(body["area"], "Finance");
    assert_eq!(body["name"], "Ana");

    // Support may view but not edit another account
    let (status, body) = app
        .put("/update-user", Some(sam), json!({"id": ana, "name": "Someone"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");
}

#[tokio::test]
async fn test_user_administration_roles() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let sam = app.account("Sam", Role::Support).await;
    let ada = app.account("Ada", Role::Administrator).await;

    let (status, _) = app.get("/get-all-users", Some(ana)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.get("/get-all-users", Some(sam)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = app
        .put("/update-user-role", Some(sam), json!({"id": ana, "role": "support"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_ROLE");

    for invalid in ["soporte", "Admin", "root", ""] {
        let (status, _) = app
            .put("/update-user-role", Some(ada), json!({"id": ana, "role": invalid}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "role {invalid:?}");
    }

    let (status, body) = app
        .put("/update-user-role", Some(ada), json!({"id": ana, "role": "support"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "support");

    // The new role takes effect on the next request
    let (status, _) = app.get("/ticket-stats", Some(ana)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let ada = app.account("Ada", Role::Administrator).await;

    let (status, _) = app
        .put(&format!("/reset-password/{ana}"), Some(ana), json!({"password": "new password"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(&format!("/reset-password/{ana}"), Some(ada), json!({"password": "new password"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("/login", None, json!({"email": "ana@example.com", "password": "new password"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put(
            &format!("/reset-password/{}", AccountId::new()),
            Some(ada),
            json!({"password": "new password"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_releases_tickets() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let ada = app.account("Ada", Role::Administrator).await;
    app.open_ticket(Some(ana), "orphaned").await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/delete-user/{ada}"), Some(ada), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CANNOT_DELETE_SELF");

    let (status, body) = app
        .send(Method::DELETE, &format!("/delete-user/{ana}"), Some(ana), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_ROLE");

    let (status, body) = app
        .send(Method::DELETE, &format!("/delete-user/{ana}"), Some(ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released_tickets"], 1);

    let (_, tickets) = app.get("/tickets", Some(ada)).await;
    assert!(tickets[0]["owner"].is_null());
    assert_eq!(tickets[0]["created_by"]["name"], "Deleted user");

    // The deleted id no longer authenticates
    let (status, _) = app.get("/tickets", Some(ana)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::DELETE, &format!("/delete-user/{ana}"), Some(ada), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_numbers_continue_after_deletion() {
    let app = TestApp::new();
    let ana = app.account("Ana", Role::Normal).await;
    let ada = app.account("Ada", Role::Administrator).await;

    app.open_ticket(Some(ana), "one").await;
    app.send(Method::DELETE, &format!("/delete-user/{ana}"), Some(ada), None)
        .await;
    let next = app.open_ticket(Some(ada), "two").await;

    assert_eq!(next["ticket_number"], "T000002");
}

/// Account repository whose deletes always fail.
struct FailingDeletes(Arc<InMemoryAccountRepository>);

impl AccountRepository for FailingDeletes {
    fn insert(&self, account: NewAccount, password_hash: String) -> AccountFuture<'_, Account> {
        self.0.insert(account, password_hash)
    }

    fn find_credentials(&self, email: &str) -> AccountFuture<'_, Option<(Account, String)>> {
        self.0.find_credentials(email)
    }

    fn find_by_email(&self, email: &str) -> AccountFuture<'_, Option<Account>> {
        self.0.find_by_email(email)
    }

    fn get(&self, id: AccountId) -> AccountFuture<'_, Option<Account>> {
        self.0.get(id)
    }

    fn get_many(&self, ids: Vec<AccountId>) -> AccountFuture<'_, Vec<Account>> {
        self.0.get_many(ids)
    }

    fn list(&self) -> AccountFuture<'_, Vec<Account>> {
        self.0.list()
    }

    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> AccountFuture<'_, Account> {
        self.0.update_profile(id, update)
    }

    fn set_role(&self, id: AccountId, role: Role) -> AccountFuture<'_, Account> {
        self.0.set_role(id, role)
    }

    fn update_password_hash(&self, id: AccountId, password_hash: String) -> AccountFuture<'_, ()> {
        self.0.update_password_hash(id, password_hash)
    }

    fn delete(&self, _id: AccountId) -> AccountFuture<'_, bool> {
        Box::pin(async { Err(AuthError::DatabaseError("connection reset".to_string())) })
    }
}

#[tokio::test]
async fn test_failed_delete_keeps_ticket_ownership() {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let app = TestApp::build(
        AccessPolicy::default(),
        Arc::new(FailingDeletes(accounts.clone())),
        accounts,
    );
    let ana = app.account("Ana", Role::Normal).await;
    let ada = app.account("Ada", Role::Administrator).await;
    app.open_ticket(Some(ana), "still mine").await;

    let (status, _) = app
        .send(Method::DELETE, &format!("/delete-user/{ana}"), Some(ada), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, mine) = app.get("/tickets", Some(ana)).await;
    assert_eq!(titles(&mine), ["still mine"]);
    assert_eq!(mine[0]["owner"], ana.to_string());
}
