//! Router-level tests.
//!
//! Drive the full axum stack (routing, extractors, handlers) against the
//! in-memory store, one request at a time via `tower::ServiceExt::oneshot`.
//! No mail is configured, so every notification reports as skipped.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::Router;
use compact_str::CompactString;
use serde_json::{json, Value};
use std::sync::Arc;
use stichtag_core::config::{
    AuthConfig, EnrollmentConfig, ServerConfig, SharedConfig, SweepConfig,
};
use stichtag_core::entities::event_records::EventInsert;
use stichtag_core::entities::user_records::UserInsert;
use stichtag_core::entities::Role;
use stichtag_core::notify::{HttpMailSender, NotificationSender};
use stichtag_core::services::{DeadlineSweeper, EnrollmentService};
use stichtag_core::store::{MemoryStore, Store};
use time::{Date, Month};
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use crate::password;
use crate::server::build_router;
use crate::state::AppState;

fn shared_config() -> SharedConfig {
    SharedConfig {
        server: Arc::new(RwLock::new(ServerConfig {
            listen: "127.0.0.1:0".parse().unwrap(),
        })),
        auth: Arc::new(RwLock::new(AuthConfig::new(
            b"router-test-signing-secret".as_slice(),
            120,
        ))),
        enrollment: Arc::new(RwLock::new(EnrollmentConfig::default())),
        sweep: Arc::new(RwLock::new(SweepConfig { interval_secs: 0 })),
        mail: Arc::new(RwLock::new(None)),
    }
}

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = shared_config();
    let notifier: Arc<dyn NotificationSender> = Arc::new(HttpMailSender::new(config.mail.clone()));
    let enrollment = Arc::new(EnrollmentService::new(
        store.clone(),
        notifier.clone(),
        config.enrollment.clone(),
    ));
    let sweeper = Arc::new(DeadlineSweeper::new(store.clone(), notifier));
    let state = AppState::new(store.clone(), config, enrollment, sweeper);
    (build_router(state), store)
}

async fn seed_user(store: &MemoryStore, username: &str, role: Role, password: &str, score: i32) {
    store
        .insert_user(UserInsert {
            username: CompactString::from(username),
            password_hash: password::hash_password(password).unwrap(),
            role,
            email: Some(format!("{username}@example.org")),
            active: true,
            score,
        })
        .await
        .unwrap();
}

async fn seed_event(store: &MemoryStore, capacity: i32, deadline: Option<Date>) -> Uuid {
    let record = store
        .insert_event(EventInsert {
            title: "Sommerfest".to_string(),
            event_date: Date::from_calendar_date(2026, Month::October, 2).unwrap(),
            starts_at: None,
            ends_at: None,
            description: String::new(),
            capacity,
            deadline,
            organizer_name: None,
            organizer_email: Some("orga@example.org".to_string()),
            reward_score: 5,
        })
        .await
        .unwrap();
    record.event_id
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _store) = test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_inactive_accounts() {
    let (app, store) = test_app();
    seed_user(&store, "anna", Role::Member, "pw-anna", 0).await;
    store
        .insert_user(UserInsert {
            username: CompactString::from("zoe"),
            password_hash: password::hash_password("pw-zoe").unwrap(),
            role: Role::Member,
            email: None,
            active: false,
            score: 0,
        })
        .await
        .unwrap();

    // Wrong password and unknown username produce the same answer.
    let response = app
        .clone()
        .oneshot(post(
            "/api/auth/login",
            None,
            json!({ "username": "anna", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post(
            "/api/auth/login",
            None,
            json!({ "username": "nobody", "password": "whatever" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post(
            "/api/auth/login",
            None,
            json!({ "username": "zoe", "password": "pw-zoe" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (app, store) = test_app();
    let event_id = seed_event(&store, 2, None).await;

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            None,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            Some("not-a-token"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn members_cannot_reach_admin_routes() {
    let (app, store) = test_app();
    seed_user(&store, "anna", Role::Member, "pw-anna", 0).await;
    let token = login(&app, "anna", "pw-anna").await;

    let request = Request::builder()
        .uri("/api/admin/users")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn enroll_withdraw_round_trip() {
    let (app, store) = test_app();
    seed_user(&store, "anna", Role::Member, "pw-anna", 0).await;
    seed_user(&store, "bea", Role::Member, "pw-bea", 0).await;
    seed_user(&store, "carl", Role::Member, "pw-carl", 0).await;
    let event_id = seed_event(&store, 2, None).await;

    let anna = login(&app, "anna", "pw-anna").await;
    let bea = login(&app, "bea", "pw-bea").await;
    let carl = login(&app, "carl", "pw-carl").await;

    // First enrollment takes the seat; no mail configured, so the
    // notification reports as skipped.
    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            Some(&anna),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "anna");
    assert_eq!(body["notification"], "skipped");

    // Enrolling twice is a conflict.
    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            Some(&anna),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Second seat goes to bea; carl finds the event full.
    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            Some(&bea),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            Some(&carl),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The public event view lists both participants.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{event_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let participants = body["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);

    // Withdrawing releases the seat; doing it again is a no-op.
    let response = app
        .clone()
        .oneshot(post(
            &format!("/api/events/{event_id}/withdraw"),
            Some(&anna),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["withdrawn"], true);

    let response = app
        .oneshot(post(
            &format!("/api/events/{event_id}/withdraw"),
            Some(&anna),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["withdrawn"], false);
}

#[tokio::test]
async fn enroll_without_contact_address_is_rejected_by_default() {
    let (app, store) = test_app();
    store
        .insert_user(UserInsert {
            username: CompactString::from("mallory"),
            password_hash: password::hash_password("pw").unwrap(),
            role: Role::Member,
            email: None,
            active: true,
            score: 0,
        })
        .await
        .unwrap();
    let event_id = seed_event(&store, 2, None).await;
    let token = login(&app, "mallory", "pw").await;

    let response = app
        .oneshot(post(
            &format!("/api/events/{event_id}/enroll"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_manages_accounts_and_runs_the_sweep() {
    let (app, store) = test_app();
    // High score keeps the admin account out of the lowest draw tier.
    seed_user(&store, "admin", Role::Admin, "pw-admin", 99).await;
    seed_user(&store, "bea", Role::Member, "pw-bea", 0).await;
    seed_user(&store, "carl", Role::Member, "pw-carl", 0).await;
    let admin = login(&app, "admin", "pw-admin").await;

    // Create a member account over the API...
    let response = app
        .clone()
        .oneshot(post(
            "/api/admin/users",
            Some(&admin),
            json!({ "username": "dora", "password": "pw-dora", "email": "dora@example.org" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["role"], "member");
    assert_eq!(body["score"], 0);

    // ...and the username is now taken.
    let response = app
        .clone()
        .oneshot(post(
            "/api/admin/users",
            Some(&admin),
            json!({ "username": "dora", "password": "other" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // An event closing on the 26th, three seats, nobody signed up yet.
    let response = app
        .clone()
        .oneshot(post(
            "/api/admin/events",
            Some(&admin),
            json!({
                "title": "Kanufahrt",
                "event_date": "2026-10-02",
                "capacity": 3,
                "deadline": "2026-09-26",
                "reward_score": 5,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let event_id = body_json(response).await["event_id"]
        .as_str()
        .unwrap()
        .to_string();

    // The sweep fills all three seats from the score-0 tier and marks
    // the event, so a second pass finds nothing due.
    let response = app
        .clone()
        .oneshot(post(
            "/api/admin/sweep",
            Some(&admin),
            json!({ "date": "2026-09-26" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["events_processed"], 1);
    assert_eq!(report["seats_filled"], 3);

    let response = app
        .clone()
        .oneshot(post(
            "/api/admin/sweep",
            Some(&admin),
            json!({ "date": "2026-09-26" }),
        ))
        .await
        .unwrap();
    let report = body_json(response).await;
    assert_eq!(report["events_processed"], 0);
    assert_eq!(report["seats_filled"], 0);

    // Every winner got the reward score credited.
    let response = app
        .clone()
        .oneshot(get(&format!("/api/events/{event_id}")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["participants"].as_array().unwrap().len(), 3);
    assert_eq!(body["deadline_notified"], true);

    let request = Request::builder()
        .uri("/api/admin/users")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let users = body_json(response).await;
    let bea = users
        .as_array()
        .unwrap()
        .iter()
        .find(|user| user["username"] == "bea")
        .unwrap();
    assert_eq!(bea["score"], 5);
}

#[tokio::test]
async fn shrinking_capacity_below_enrollment_is_a_conflict() {
    let (app, store) = test_app();
    seed_user(&store, "admin", Role::Admin, "pw-admin", 0).await;
    seed_user(&store, "anna", Role::Member, "pw-anna", 0).await;
    seed_user(&store, "bea", Role::Member, "pw-bea", 0).await;
    let event_id = seed_event(&store, 2, None).await;
    store.enroll(event_id, "anna").await.unwrap();
    store.enroll(event_id, "bea").await.unwrap();

    let admin = login(&app, "admin", "pw-admin").await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/admin/events/{event_id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::from(
            json!({
                "title": "Sommerfest",
                "event_date": "2026-10-02",
                "capacity": 1,
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
