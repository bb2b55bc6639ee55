#![cfg(feature = "web-interface")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use weekly_roster::config::RosterDefaults;
use weekly_roster::roster::period::RosterPeriod;
use weekly_roster::roster::RosterState;
use weekly_roster::web::{router, AppState};

fn app() -> Router {
    let roster = RosterState::new(&RosterDefaults::default(), RosterPeriod::new(2025, 10));
    router(AppState::new(roster))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_roster_view() {
    let response = app().oneshot(get("/api/roster")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    assert_eq!(view["rosterInfo"]["week"], 10);
    assert_eq!(view["weekDates"]["Mon"], "2025-09-01");
    assert_eq!(view["timeSlots"]["Sun"][0], "08:00");
    assert_eq!(view["totals"]["weekTotal"], 0.0);
}

#[tokio::test]
async fn test_commands_update_shared_state() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/roster/commands",
            json!({"type": "addWorker", "name": "Aiko"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for (field, value) in [("startTime", "09:00"), ("endTime", "19:00")] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/roster/commands",
                json!({"type": "updateShift", "index": 0, "day": "Thu", "field": field, "value": value}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let view = body_json(app.clone().oneshot(get("/api/roster")).await.unwrap()).await;
    assert_eq!(view["workers"][0]["shifts"]["Thu"]["hours"], 10.0);
    assert_eq!(view["totals"]["dailyTotals"]["Thu"], 10.0);
    assert_eq!(view["breaks"][0]["Thu"], json!(["PB", "MB", "MB2"]));

    let summary = body_json(app.oneshot(get("/api/summary")).await.unwrap()).await;
    assert_eq!(summary["rows"][0]["weeklyHours"], "10.0 hrs");
    assert_eq!(summary["rows"][0]["cells"]["Thu"]["closing"], true);
}

#[tokio::test]
async fn test_unknown_command_is_rejected() {
    let response = app()
        .oneshot(post_json("/api/roster/commands", json!({"type": "fireEveryone"})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_settings_download_and_import() {
    let app = app();
    app.clone()
        .oneshot(post_json(
            "/api/roster/commands",
            json!({"type": "setRosterTitle", "title": "Sushi Bar"}),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/settings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"roster-settings-"));
    let document = body_json(response).await;
    assert_eq!(document["rosterInfo"]["title"], "Sushi Bar");
    assert!(document["exportDate"].is_string());

    let fresh = self::app();
    let response = fresh
        .clone()
        .oneshot(post_json("/api/settings", document))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["rosterInfo"]["title"], "Sushi Bar");
}

#[tokio::test]
async fn test_invalid_settings_returns_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/settings")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Error loading settings file. Please check the file format."
    );
}

#[tokio::test]
async fn test_multipart_upload() {
    let boundary = "roster-boundary";
    let payload = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"settings_file\"; filename=\"s.json\"\r\nContent-Type: application/json\r\n\r\n{body}\r\n--{b}--\r\n",
        b = boundary,
        body = json!({"roles": ["Front", "Back"]})
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/settings/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(payload))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["roles"], json!(["Front", "Back"]));
}

#[tokio::test]
async fn test_settings_schema() {
    let response = app().oneshot(get("/api/settings/schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let schema = body_json(response).await;
    assert!(schema["properties"]["workers"].is_object());
    assert!(schema["properties"]["exportDate"].is_object());
}

#[tokio::test]
async fn test_utilization_grid() {
    let response = app().oneshot(get("/api/utilization")).await.unwrap();
    let grid = body_json(response).await;
    let rows = grid["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 24);
    assert_eq!(rows[0]["time"], "07:30");
}

#[tokio::test]
async fn test_image_export() {
    let response = app()
        .oneshot(get("/api/export/image?format=jpeg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"roster-summary-2025-09-01.jpg\""
    );
    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let response = app()
        .oneshot(get("/api/export/image?dataUrl=true"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["fileName"], "roster-summary-2025-09-01.png");
    assert!(body["dataUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let response = app()
        .oneshot(get("/api/export/image?format=gif"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
