mod common;

use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{june_submission, TestApp, ADMIN_KEY};
use meal_portal_api::{
    db::MenuStore,
    models::{month::Month, portal::Portal},
};

#[tokio::test]
async fn health_reports_the_store_backend() {
    let app = TestApp::without_sheets();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["sheets"], false);
}

#[tokio::test]
async fn menu_lists_ten_slots() {
    let app = TestApp::without_sheets();
    let (status, body) = app.get("/menu").await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0]["label"], "Monday Night - Chicken Curry");
    assert_eq!(slots[0]["header"], "Monday Chicken");
}

#[tokio::test]
async fn admin_routes_require_the_key() {
    let app = TestApp::without_sheets();

    let (status, body) = app.post("/admin/portals/june/open", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing X-Admin-Key header");

    let (status, body) = app
        .get_with_key("/admin/submissions", "wrong-key")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid admin key");

    assert!(app.store.get_portal(Month::June).await.unwrap().is_none());
}

#[tokio::test]
async fn portal_listing_covers_every_month() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/march/open", json!({ "durationDays": 5 }))
        .await;

    let (status, body) = app.get("/portals").await;
    assert_eq!(status, StatusCode::OK);
    let portals = body.as_array().unwrap();
    assert_eq!(portals.len(), 12);
    assert_eq!(portals[0]["month"], "January");
    assert_eq!(portals[0]["isOpen"], false);
    assert_eq!(portals[2]["month"], "March");
    assert_eq!(portals[2]["isOpen"], true);
    assert_eq!(portals[2]["daysRemaining"], 5);
}

#[tokio::test]
async fn open_uses_the_default_window_and_accepts_any_case() {
    let app = TestApp::without_sheets();
    let (status, body) = app.admin_post("/admin/portals/JUNE/open", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], "June");
    assert_eq!(body["isOpen"], true);
    assert_eq!(body["daysRemaining"], 30);
    assert!(body["spreadsheetId"].is_null());

    let (status, body) = app.get("/portals/june").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOpen"], true);
}

#[tokio::test]
async fn open_rejects_out_of_range_durations() {
    let app = TestApp::without_sheets();
    let (status, body) = app
        .admin_post("/admin/portals/june/open", json!({ "durationDays": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "durationDays must be between 1 and 365");
    assert!(app.store.get_portal(Month::June).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_month_in_path_is_a_bad_request() {
    let app = TestApp::without_sheets();
    let (status, body) = app.get("/portals/smarch").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid month: smarch");
}

#[tokio::test]
async fn submission_to_an_unopened_portal_is_rejected() {
    let app = TestApp::without_sheets();
    let (status, body) = app.post("/submissions", june_submission("Asha", "2023001")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Portal for June is not open");
    assert!(app.store.list_submissions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn submission_after_close_is_rejected() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;
    let (status, body) = app.admin_post("/admin/portals/june/close", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOpen"], false);
    assert!(body["daysRemaining"].is_null());

    let (status, _) = app.post("/submissions", june_submission("Asha", "2023001")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.list_submissions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn overdue_portal_reads_closed_and_refuses_submissions() {
    let app = TestApp::without_sheets();
    let now = Utc::now();
    app.store
        .save_portal(&Portal {
            closing_date: Some(now - Duration::minutes(1)),
            is_open: true,
            ..Portal::closed(Month::June, now - Duration::days(3))
        })
        .await
        .unwrap();

    let (_, body) = app.get("/portals/june").await;
    assert_eq!(body["isOpen"], false);
    assert!(body["closingDate"].is_null());

    let (status, body) = app.post("/submissions", june_submission("Asha", "2023001")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Portal for June is not open");
}

#[tokio::test]
async fn missing_fields_are_reported_without_writing() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;

    let mut body = june_submission("Asha", "2023001");
    body.as_object_mut().unwrap().remove("studentName");
    let (status, resp) = app.post("/submissions", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid student name");

    let (status, resp) = app
        .post(
            "/submissions",
            json!({ "studentName": "Asha", "studentId": "2023001", "month": "June", "selections": [1, 2] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid selections");

    assert!(app.store.list_submissions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn misspelled_month_in_body_is_invalid_month() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;

    let mut body = june_submission("Asha", "2023001");
    body["month"] = json!("Juny");
    let (status, resp) = app.post("/submissions", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid month");
    assert!(app.store.list_submissions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_bodies_answer_with_an_error_object() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;

    let (status, body) = app
        .send_raw(
            Method::POST,
            "/submissions",
            Some("application/json"),
            "{not json".to_string(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let submission = june_submission("Asha", "2023001").to_string();
    let (status, body) = app
        .send_raw(Method::POST, "/submissions", None, submission, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .send_raw(
            Method::POST,
            "/admin/portals/july/open",
            Some("application/json"),
            json!({ "durationDays": "ten" }).to_string(),
            Some(ADMIN_KEY),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(app.store.list_submissions(None).await.unwrap().is_empty());
    assert!(app.store.get_portal(Month::July).await.unwrap().is_none());
}

#[tokio::test]
async fn accepted_submission_is_stored_without_a_mirror() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;

    let (status, body) = app.post("/submissions", june_submission("Asha", "2023001")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["mirrored"], false);
    assert!(body.get("mirrorError").is_none());
    assert_eq!(body["submission"]["status"], "submitted");
    assert_eq!(body["submission"]["month"], "June");
    assert_eq!(
        body["submission"]["selections"]["S - Night - Boiled Egg"],
        true
    );

    let stored = app.store.list_submissions(Some(Month::June)).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].student_id, "2023001");
}

#[tokio::test]
async fn admin_can_list_fetch_and_cancel_submissions() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;
    app.admin_post("/admin/portals/july/open", json!({})).await;
    let (_, first) = app.post("/submissions", june_submission("Asha", "2023001")).await;
    let mut july = june_submission("Ravi", "2023002");
    july["month"] = json!("july");
    app.post("/submissions", july).await;

    let (status, all) = app.admin_get("/admin/submissions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, june) = app.admin_get("/admin/submissions?month=June").await;
    assert_eq!(june.as_array().unwrap().len(), 1);
    assert_eq!(june[0]["studentName"], "Asha");

    let id = first["submission"]["id"].as_str().unwrap();
    let (status, fetched) = app.admin_get(&format!("/admin/submissions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["studentId"], "2023001");

    let (status, cancelled) = app
        .admin_post(&format!("/admin/submissions/{id}/cancel"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, body) = app
        .admin_get("/admin/submissions/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Submission not found");
}

#[tokio::test]
async fn activation_closes_every_other_month() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/may/open", json!({})).await;
    app.admin_post("/admin/portals/june/open", json!({})).await;

    let (status, body) = app.admin_post("/admin/portals/july/activate", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reopened"], true);
    assert_eq!(body["closed"], json!(["May", "June"]));
    assert_eq!(body["portal"]["daysRemaining"], 3);

    let (_, portals) = app.get("/portals").await;
    let open: Vec<_> = portals
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["isOpen"] == true)
        .map(|p| p["month"].clone())
        .collect();
    assert_eq!(open, vec![json!("July")]);
}

#[tokio::test]
async fn export_has_one_row_per_stored_submission() {
    let app = TestApp::without_sheets();
    app.admin_post("/admin/portals/june/open", json!({})).await;
    app.post("/submissions", june_submission("Asha", "2023001")).await;
    app.post("/submissions", june_submission("Ravi", "2023002")).await;

    let (status, headers, csv) = app.admin_raw("/admin/export?month=june").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("menu-export-june-"));

    let lines: Vec<&str> = csv.lines().collect();
    let stored = app.store.list_submissions(Some(Month::June)).await.unwrap();
    assert_eq!(lines.len(), stored.len() + 1);
    assert!(lines[0].starts_with("Student Name,ID Number,Monday Chicken"));
    assert!(lines[1].starts_with("Asha,2023001,Yes,No,No"));
    assert!(lines[1].contains(",Yes,"));
}

#[tokio::test]
async fn export_without_month_covers_everything() {
    let app = TestApp::without_sheets();
    let (status, headers, csv) = app.admin_raw("/admin/export").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("menu-export-all-"));
    assert_eq!(csv.lines().count(), 1);
}

#[tokio::test]
async fn sheet_routes_report_missing_configuration() {
    let app = TestApp::without_sheets();

    let (status, body) = app.admin_get("/admin/sheets/june/rows").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());

    let (status, report) = app.admin_get("/admin/diagnostics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success"], false);
    assert_eq!(report["steps"].as_array().unwrap().len(), 1);
    assert_eq!(report["steps"][0]["status"], "error");

    let (status, cfg) = app.admin_get("/admin/diagnostics/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cfg["enabled"], false);
    assert_eq!(cfg["privateKey"], "Not available");
    assert_eq!(cfg["sheetName"], "Menu Selections");
}
