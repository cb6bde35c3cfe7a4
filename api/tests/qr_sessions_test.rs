mod helpers;

use chrono::{Duration, Utc};
use serde_json::json;

use helpers::{make_test_app, request, seed_session, seed_student, seed_teacher, send};

#[tokio::test]
async fn generate_is_teacher_only() {
    let (app, db) = make_test_app().await;
    let (_, student_auth) = seed_student(&db, "gen_student").await;

    let (status, body) = send(&app, request("POST", "/qr/generate", None, Some(json!({})))).await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        request("POST", "/qr/generate", Some(&student_auth), Some(json!({}))),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn generate_returns_code_with_defaults() {
    let (app, db) = make_test_app().await;
    let (teacher, auth) = seed_teacher(&db, "gen_teacher").await;

    let (status, body) = send(
        &app,
        request("POST", "/qr/generate", Some(&auth), Some(json!({}))),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    let code = data["code"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert!(code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_eq!(data["generated_by"], teacher.id);
    assert_eq!(data["active"], true);
    assert_eq!(data["description"], "Daily attendance QR code");
    assert_eq!(data["location"], "Classroom");
    assert_eq!(data["course"], "General");
    assert_eq!(data["validity_minutes"], 10);
}

#[tokio::test]
async fn generate_honors_custom_fields() {
    let (app, db) = make_test_app().await;
    let (_, auth) = seed_teacher(&db, "gen_custom").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/qr/generate",
            Some(&auth),
            Some(json!({
                "description": "Morning lecture",
                "location": "Room 4-1",
                "course": "COS 110",
                "validity_minutes": 30
            })),
        ),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(body["data"]["description"], "Morning lecture");
    assert_eq!(body["data"]["location"], "Room 4-1");
    assert_eq!(body["data"]["course"], "COS 110");
    assert_eq!(body["data"]["validity_minutes"], 30);
}

#[tokio::test]
async fn generate_rejects_out_of_range_validity() {
    let (app, db) = make_test_app().await;
    let (_, auth) = seed_teacher(&db, "gen_bad").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/qr/generate",
            Some(&auth),
            Some(json!({ "validity_minutes": 0 })),
        ),
    )
    .await;

    assert_eq!(status, 422);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn active_lists_only_the_requesting_teachers_live_sessions() {
    let (app, db) = make_test_app().await;
    let (teacher, auth) = seed_teacher(&db, "active_a").await;
    let (other, other_auth) = seed_teacher(&db, "active_b").await;

    let now = Utc::now();
    seed_session(&db, teacher.id, "ACTIVE01", now, 30).await;
    // already past expiry
    seed_session(&db, teacher.id, "EXPIRED1", now - Duration::minutes(20), 10).await;
    seed_session(&db, other.id, "OTHERS01", now, 30).await;

    let (status, body) = send(&app, request("GET", "/qr/active", Some(&auth), None)).await;
    assert_eq!(status, 200);
    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["code"], "ACTIVE01");

    let (status, body) = send(&app, request("GET", "/qr/active", Some(&other_auth), None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn validate_reports_validity_without_marking() {
    let (app, db) = make_test_app().await;
    let (teacher, _) = seed_teacher(&db, "val_teacher").await;
    let (_, student_auth) = seed_student(&db, "val_student").await;

    let now = Utc::now();
    seed_session(&db, teacher.id, "VALID001", now, 30).await;
    seed_session(&db, teacher.id, "EXPIRED2", now - Duration::minutes(20), 10).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/qr/validate",
            Some(&student_auth),
            Some(json!({ "code": "VALID001" })),
        ),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["code"], "VALID001");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/qr/validate",
            Some(&student_auth),
            Some(json!({ "code": "EXPIRED2" })),
        ),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/qr/validate",
            Some(&student_auth),
            Some(json!({ "code": "NOPE0000" })),
        ),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn deactivate_is_owner_only_and_idempotent_over_http() {
    let (app, db) = make_test_app().await;
    let (teacher, auth) = seed_teacher(&db, "deact_a").await;
    let (_, other_auth) = seed_teacher(&db, "deact_b").await;

    let session = seed_session(&db, teacher.id, "DEACT001", Utc::now(), 30).await;
    let uri = format!("/qr/{}/deactivate", session.id);

    let (status, _) = send(&app, request("PUT", &uri, Some(&other_auth), None)).await;
    assert_eq!(status, 403);

    let (status, body) = send(&app, request("PUT", &uri, Some(&auth), None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["active"], false);

    // repeat succeeds with no state change
    let (status, body) = send(&app, request("PUT", &uri, Some(&auth), None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["active"], false);

    let (status, _) = send(
        &app,
        request("PUT", "/qr/999999/deactivate", Some(&auth), None),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn history_pages_newest_first() {
    let (app, db) = make_test_app().await;
    let (teacher, auth) = seed_teacher(&db, "hist_teacher").await;

    let now = Utc::now();
    for i in 0..3 {
        let code = format!("HIST000{i}");
        seed_session(&db, teacher.id, &code, now - Duration::minutes(3 - i), 10).await;
    }

    let (status, body) = send(
        &app,
        request("GET", "/qr/history?page=1&per_page=2", Some(&auth), None),
    )
    .await;
    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["sessions"].as_array().unwrap().len(), 2);
    assert_eq!(data["sessions"][0]["code"], "HIST0002");
    assert_eq!(data["pagination"]["total_items"], 3);
    assert_eq!(data["pagination"]["total_pages"], 2);
    assert_eq!(data["pagination"]["current_page"], 1);

    let (status, body) = send(
        &app,
        request("GET", "/qr/history?page=2&per_page=2", Some(&auth), None),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["sessions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cleanup_deactivates_expired_sessions() {
    let (app, db) = make_test_app().await;
    let (teacher, auth) = seed_teacher(&db, "sweep_teacher").await;

    let now = Utc::now();
    seed_session(&db, teacher.id, "SWEEP001", now - Duration::minutes(30), 10).await;
    seed_session(&db, teacher.id, "SWEEP002", now, 30).await;

    let (status, body) = send(&app, request("POST", "/qr/cleanup", Some(&auth), None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deactivated"], 1);

    // second sweep finds nothing left to flip
    let (status, body) = send(&app, request("POST", "/qr/cleanup", Some(&auth), None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deactivated"], 0);
}
