#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

use api::auth::generate_jwt;
use api::routes::routes;
use db::models::qr_session;
use db::models::user::{Model as UserModel, Role};
use db::test_utils::setup_test_db;
use util::state::AppState;

/// In-memory app wired exactly like the production router.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = setup_test_db().await;
    let app = routes(AppState::new(db.clone()));
    (app, db)
}

pub async fn seed_user(db: &DatabaseConnection, name: &str, role: Role) -> (UserModel, String) {
    let user = UserModel::create(db, name, &format!("{name}@test.com"), "password123", role)
        .await
        .expect("seed user");
    let (token, _) = generate_jwt(user.id, user.role);
    (user, format!("Bearer {token}"))
}

pub async fn seed_teacher(db: &DatabaseConnection, name: &str) -> (UserModel, String) {
    seed_user(db, name, Role::Teacher).await
}

pub async fn seed_student(db: &DatabaseConnection, name: &str) -> (UserModel, String) {
    seed_user(db, name, Role::Student).await
}

/// Inserts a session row directly so tests can shift `created_at` relative
/// to the wall clock the handlers read.
pub async fn seed_session(
    db: &DatabaseConnection,
    teacher_id: i64,
    code: &str,
    created_at: DateTime<Utc>,
    validity_minutes: i64,
) -> qr_session::Model {
    qr_session::ActiveModel {
        code: Set(code.to_owned()),
        generated_by: Set(teacher_id),
        description: Set("Daily attendance QR code".to_owned()),
        location: Set("Classroom".to_owned()),
        course: Set("General".to_owned()),
        active: Set(true),
        created_at: Set(created_at),
        expires_at: Set(created_at + Duration::minutes(validity_minutes)),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed session")
}

pub fn request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    }
}

/// Sends one request through the router and returns (status, parsed body).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("router call");
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse json body")
    }
}
