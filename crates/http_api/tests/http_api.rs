use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rusqlite::{Connection, params};
use serde_json::Value;
use tower::util::ServiceExt;

use app_api::AppContext;
use http_api::HttpState;
use youknow_app::{AppConfig, AppPaths, AppState, PipelineConfig, ensure_app_data_dir};

const CHROME_EPOCH_OFFSET_US: i64 = 11_644_473_600 * 1_000_000;

struct TestApp {
    _temp_dir: tempfile::TempDir,
    router: axum::Router,
}

fn write_history(path: &Path, urls: &[(&str, i64)]) {
    let conn = Connection::open(path).expect("open history");
    conn.execute_batch(
        "CREATE TABLE urls (id INTEGER PRIMARY KEY, url LONGVARCHAR, title LONGVARCHAR,
           visit_count INTEGER DEFAULT 0 NOT NULL, last_visit_time INTEGER NOT NULL);
         CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER NOT NULL,
           visit_time INTEGER NOT NULL);",
    )
    .expect("schema");
    for (url, minutes_ago) in urls {
        let ts = Utc::now() - Duration::minutes(*minutes_ago);
        let chrome = ts.timestamp_micros() + CHROME_EPOCH_OFFSET_US;
        conn.execute(
            "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, '', 1, ?2)",
            params![url, chrome],
        )
        .expect("insert url");
        conn.execute(
            "INSERT INTO visits (url, visit_time) VALUES (?1, ?2)",
            params![conn.last_insert_rowid(), chrome],
        )
        .expect("insert visit");
    }
}

fn build_app(with_history: bool) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().join("data"));
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let history_path = temp_dir.path().join("History");
    if with_history {
        write_history(
            &history_path,
            &[
                ("https://github.com/tokio-rs/axum", 50),
                ("https://docs.rs/axum/latest/axum/", 45),
                ("https://www.google.com/search?q=axum+middleware", 44),
                ("https://github.com/tokio-rs/axum/issues", 40),
            ],
        );
    }

    let app_state = AppState::new(AppConfig {
        db_path: paths.db_path.clone(),
        history_path: Some(history_path),
        pipeline: PipelineConfig::default(),
    });
    app_state.initialize();

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let router = http_api::router(HttpState::new(context));

    TestApp {
        _temp_dir: temp_dir,
        router,
    }
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let payload = serde_json::from_slice(&body).expect("json body");
    (status, payload)
}

#[tokio::test]
async fn health_answers_get_and_post() {
    let app = build_app(false);

    let get = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .expect("request");
    let (status, payload) = send(&app.router, get).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["service"], "youknow");

    let (status, _) = send(&app.router, post("/api/health", "{}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_is_empty_before_first_cycle() {
    let app = build_app(true);
    let (status, payload) = send(&app.router, post("/api/dashboard", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["window_days"], 7);
    assert!(payload["generated_at"].is_null());
    assert_eq!(payload["top_domains"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn dashboard_rejects_bad_windows() {
    let app = build_app(true);
    for body in [r#"{"days": 0}"#, r#"{"days": -1}"#, r#"{"days": 31}"#] {
        let (status, payload) = send(&app.router, post("/api/dashboard", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["code"], "invalid_input");
    }
}

#[tokio::test]
async fn refresh_runs_a_cycle_and_publishes() {
    let app = build_app(true);

    let (status, payload) = send(&app.router, post("/api/refresh", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["result"], "ran");
    assert_eq!(payload["report"]["published"], true);
    assert_eq!(payload["report"]["visits_read"], 4);

    let (status, payload) = send(&app.router, post("/api/dashboard", r#"{"days": 1}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(payload["generated_at"].is_string());
    assert_eq!(payload["top_domains"][0]["domain"], "github.com");
    assert_eq!(payload["top_domains"][0]["category"], "development");
    assert_eq!(payload["top_searches"][0]["q"], "axum middleware");

    let (status, payload) = send(&app.router, post("/api/status", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["state"], "idle");
    assert_eq!(payload["backend"]["name"], "sqlite");
    assert_eq!(payload["degraded"], false);
    assert_eq!(payload["counters"]["completed"], 1);
}

#[tokio::test]
async fn missing_history_is_reported_not_fatal() {
    let app = build_app(false);

    let (status, payload) = send(&app.router, post("/api/refresh", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["report"]["published"], false);
    assert_eq!(payload["report"]["error"]["kind"], "SourceUnavailable");

    let (_, payload) = send(&app.router, post("/api/status", "{}")).await;
    assert_eq!(payload["last_error"]["kind"], "SourceUnavailable");

    let (status, payload) = send(&app.router, post("/api/source_check", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(payload["located"].is_null());
    assert!(payload["error"].is_string());
}

#[tokio::test]
async fn source_check_probes_the_history_file() {
    let app = build_app(true);
    let (status, payload) = send(&app.router, post("/api/source_check", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(payload["located"].is_string());
    assert_eq!(payload["probe"]["visit_count"], 4);
}

#[tokio::test]
async fn api_rejects_foreign_origin() {
    let app = build_app(false);

    let mut request = post("/api/status", "{}");
    request
        .headers_mut()
        .insert(header::ORIGIN, "https://example.com".parse().expect("origin"));
    let (status, payload) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(payload["code"], "invalid_origin");

    let mut request = post("/api/status", "{}");
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://127.0.0.1:3846".parse().expect("origin"));
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_json_404() {
    let app = build_app(false);
    let request = Request::builder()
        .uri("/nowhere")
        .body(Body::empty())
        .expect("request");
    let (status, payload) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["code"], "not_found");
}
