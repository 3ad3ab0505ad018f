//! Integration tests for the cmdanno-web endpoints
//!
//! Tests cover:
//! - Registration, login, logout, and the cookie fallback to the login page
//! - Annotation submit/edit/delete semantics, including duplicate and
//!   cross-annotator behavior
//! - Progress upserts
//! - Previous/next navigation edge statuses
//! - Panel rendering (exclusion lists, progress markers)

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use cmdanno_common::config::AppConfig;
use cmdanno_common::db::create_schema;
use cmdanno_web::db::content;
use cmdanno_web::{build_router, AppState};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: In-memory database with the full schema applied
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");

    create_schema(&pool).await.expect("Should create schema");
    pool
}

/// Test helper: App over the given pool with default configuration
fn setup_app(db: SqlitePool) -> axum::Router {
    let state = AppState::new(db, AppConfig::default());
    build_router(state)
}

/// Test helper: Request without a session cookie
fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Request carrying the access-code cookie
fn auth_request(uri: &str, access_code: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("access_code={}", access_code))
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Extract body as text
async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

/// Test helper: Register a user and return the access code
async fn register(app: &axum::Router, first: &str, last: &str) -> String {
    let request = test_request(&format!("/register?firstname={}&lastname={}", first, last));
    let response = app.clone().oneshot(request).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "REGISTRATION_SUCCESS");
    body["access_code"].as_str().unwrap().to_string()
}

/// Test helper: Seed the find utility with three tagged pages
async fn seed_find_corpus(db: &SqlitePool) {
    let tag_id = content::get_or_create_tag(db, "find").await.unwrap();
    for url in ["a.com", "b.com", "c.com"] {
        let url_id = content::get_or_create_url(db, url).await.unwrap();
        content::add_url_tag(db, url_id, tag_id).await.unwrap();
    }
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_cookie_required() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cmdanno-web");
    assert!(body["version"].is_string());
}

// =============================================================================
// Registration & Login
// =============================================================================

#[tokio::test]
async fn test_register_derives_access_code() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("/register?firstname=Ann&lastname=Lee"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "REGISTRATION_SUCCESS");
    assert_eq!(body["firstname"], "Ann");
    assert_eq!(body["lastname"], "Lee");
    assert_eq!(body["access_code"], "ann-lee");
}

#[tokio::test]
async fn test_duplicate_registration_reports_user_exists() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());

    register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(test_request("/register?firstname=Ann&lastname=Lee"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "USER_EXISTS");

    // No second row was created
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_login_sets_cookie() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(test_request(&format!("/login?access_code={}", code)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Login should set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("access_code=ann-lee"));

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "LOGIN_SUCCESS");
    assert_eq!(body["access_code"], "ann-lee");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("/login?access_code=no-body"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "USER_DOES_NOT_EXIST");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(auth_request("/logout", &code))
        .await
        .unwrap();
    let body_status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Logout should clear the session cookie")
        .to_str()
        .unwrap()
        .to_string();

    assert_eq!(body_status, StatusCode::OK);
    // Removal cookie has an empty value and an expiry in the past
    assert!(set_cookie.starts_with("access_code="));
}

#[tokio::test]
async fn test_missing_cookie_renders_login_page() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(test_request("/utility_panel")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    assert!(html.contains("<title>cmdanno</title>"));
    assert!(html.contains("access code"));
}

#[tokio::test]
async fn test_stale_cookie_renders_login_page() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(auth_request("/utility_panel", "ghost-user"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    assert!(html.contains("<title>cmdanno</title>"));
}

// =============================================================================
// Annotation Lifecycle
// =============================================================================

#[tokio::test]
async fn test_submit_annotation_saves_and_starts_progress() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(auth_request(
            "/submit_annotation?url=a.com&nl=list+files&utility=ls&command=ls",
            &code,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ANNOTATION_SAVED");
    assert_eq!(body["nl"], "list files");
    assert_eq!(body["command"], "ls");

    let annotation_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM annotations")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(annotation_count, 1);

    let progress_status: String =
        sqlx::query_scalar("SELECT status FROM annotation_progress")
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(progress_status, "in-progress");
}

#[tokio::test]
async fn test_duplicate_submission_not_deduplicated() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let code = register(&app, "Ann", "Lee").await;

    let uri = "/submit_annotation?url=a.com&nl=list+files&utility=ls&command=ls";
    app.clone().oneshot(auth_request(uri, &code)).await.unwrap();
    app.clone().oneshot(auth_request(uri, &code)).await.unwrap();

    // Two annotation rows, but still a single progress row for the pair
    let annotation_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM annotations")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(annotation_count, 2);

    let progress_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM annotation_progress")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(progress_count, 1);
}

#[tokio::test]
async fn test_submission_does_not_demote_completed_progress() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let code = register(&app, "Ann", "Lee").await;

    app.clone()
        .oneshot(auth_request(
            "/update_progress?url=a.com&status=completed",
            &code,
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(auth_request(
            "/submit_annotation?url=a.com&nl=x&utility=ls&command=ls",
            &code,
        ))
        .await
        .unwrap();

    let progress_status: String =
        sqlx::query_scalar("SELECT status FROM annotation_progress")
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(progress_status, "completed");
}

#[tokio::test]
async fn test_edit_replaces_all_matching_rows() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let ann = register(&app, "Ann", "Lee").await;
    let bob = register(&app, "Bob", "Ray").await;

    // Both annotators submit the same triple
    let uri = "/submit_annotation?url=a.com&nl=old&utility=ls&command=ls";
    app.clone().oneshot(auth_request(uri, &ann)).await.unwrap();
    app.clone().oneshot(auth_request(uri, &bob)).await.unwrap();

    // Ann edits the triple: every matching row goes, one new row for Ann
    let response = app
        .clone()
        .oneshot(auth_request(
            "/submit_edit?url=a.com&original_nl=old&original_command=ls&nl=new&command=ls+-la",
            &ann,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "EDIT_SAVED");
    assert_eq!(body["nl"], "new");
    assert_eq!(body["command"], "ls -la");

    let rows: Vec<(i64,)> = sqlx::query_as("SELECT annotator_id FROM annotations")
        .fetch_all(&db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "Edit must remove every matching row");

    let ann_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE access_code = 'ann-lee'")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(rows[0].0, ann_id, "Replacement row belongs to the acting user");
}

#[tokio::test]
async fn test_delete_annotation_unscoped() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let ann = register(&app, "Ann", "Lee").await;
    let bob = register(&app, "Bob", "Ray").await;

    let uri = "/submit_annotation?url=a.com&nl=old&utility=ls&command=ls";
    app.clone().oneshot(auth_request(uri, &ann)).await.unwrap();
    app.clone().oneshot(auth_request(uri, &bob)).await.unwrap();

    let response = app
        .clone()
        .oneshot(auth_request(
            "/delete_annotation?url=a.com&nl=old&command=ls",
            &ann,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "DELETION_SUCCESS");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM annotations")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0, "Delete removes both annotators' rows");
}

#[tokio::test]
async fn test_update_progress_upserts() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .clone()
        .oneshot(auth_request(
            "/update_progress?url=a.com&status=completed",
            &code,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "PROGRESS_UPDATED");

    // completed -> in-progress is an allowed explicit transition
    app.clone()
        .oneshot(auth_request(
            "/update_progress?url=a.com&status=in-progress",
            &code,
        ))
        .await
        .unwrap();

    let rows: Vec<(String,)> = sqlx::query_as("SELECT status FROM annotation_progress")
        .fetch_all(&db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "in-progress");
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
async fn test_previous_url_returns_neighbor() {
    let db = setup_test_db().await;
    seed_find_corpus(&db).await;
    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(auth_request("/previous_url?utility=find&url=b.com", &code))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "PREVIOUS_URL_SUCCESS");
    assert_eq!(body["url"], "a.com");
}

#[tokio::test]
async fn test_next_url_returns_neighbor() {
    let db = setup_test_db().await;
    seed_find_corpus(&db).await;
    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(auth_request("/next_url?utility=find&url=a.com", &code))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "NEXT_URL_SUCCESS");
    assert_eq!(body["url"], "b.com");
}

#[tokio::test]
async fn test_navigation_boundary_statuses() {
    let db = setup_test_db().await;
    seed_find_corpus(&db).await;
    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .clone()
        .oneshot(auth_request("/previous_url?utility=find&url=a.com", &code))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "IS_FIRST_URL");

    let response = app
        .clone()
        .oneshot(auth_request("/next_url?utility=find&url=c.com", &code))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "IS_LAST_URL");
}

#[tokio::test]
async fn test_navigation_unknown_url() {
    let db = setup_test_db().await;
    seed_find_corpus(&db).await;
    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    for uri in [
        "/previous_url?utility=find&url=z.com",
        "/next_url?utility=find&url=z.com",
    ] {
        let response = app.clone().oneshot(auth_request(uri, &code)).await.unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "URL_DOES_NOT_EXIST");
    }
}

#[tokio::test]
async fn test_navigation_unknown_utility() {
    let db = setup_test_db().await;
    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    // No tagged URLs at all: the sequence is empty
    let response = app
        .oneshot(auth_request("/previous_url?utility=tar&url=a.com", &code))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "URL_DOES_NOT_EXIST");
}

// =============================================================================
// Panels
// =============================================================================

#[tokio::test]
async fn test_utility_panel_applies_exclusion_lists() {
    let db = setup_test_db().await;
    seed_find_corpus(&db).await;

    // Tag pages with one kept and one denied utility
    let tar = content::get_or_create_tag(&db, "tar").await.unwrap();
    let python = content::get_or_create_tag(&db, "python").await.unwrap();
    let url_id = content::get_or_create_url(&db, "d.com").await.unwrap();
    content::add_url_tag(&db, url_id, tar).await.unwrap();
    content::add_url_tag(&db, url_id, python).await.unwrap();

    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    let response = app
        .oneshot(auth_request("/utility_panel", &code))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = extract_text(response.into_body()).await;
    assert!(html.contains(">tar</a>"), "kept utility should be listed");
    assert!(
        !html.contains(">python</a>"),
        "deny-listed utility must not appear"
    );
    assert!(
        !html.contains(">find</a>"),
        "allow-override utility must not appear"
    );
}

#[tokio::test]
async fn test_utility_panel_marks_in_progress() {
    let db = setup_test_db().await;

    let tar = content::get_or_create_tag(&db, "tar").await.unwrap();
    let url_id = content::get_or_create_url(&db, "d.com").await.unwrap();
    content::add_url_tag(&db, url_id, tar).await.unwrap();

    let app = setup_app(db);
    let code = register(&app, "Ann", "Lee").await;

    // An annotation whose command carries the tag flips the marker
    app.clone()
        .oneshot(auth_request(
            "/submit_annotation?url=d.com&nl=pack&utility=tar&command=tar+cf",
            &code,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(auth_request("/utility_panel", &code))
        .await
        .unwrap();
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("class=\"utility in-progress\""));
}

#[tokio::test]
async fn test_url_panel_shows_progress_statuses() {
    let db = setup_test_db().await;
    seed_find_corpus(&db).await;
    let app = setup_app(db.clone());
    let ann = register(&app, "Ann", "Lee").await;
    let bob = register(&app, "Bob", "Ray").await;

    // Ann completed a.com; Bob annotated b.com; c.com untouched
    app.clone()
        .oneshot(auth_request("/update_progress?url=a.com&status=completed", &ann))
        .await
        .unwrap();
    app.clone()
        .oneshot(auth_request(
            "/submit_annotation?url=b.com&nl=x&utility=find&command=find+.",
            &bob,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(auth_request("/url_panel?utility=find", &ann))
        .await
        .unwrap();
    let html = extract_text(response.into_body()).await;

    assert!(html.contains(">a.com</a> <span class=\"completed\">completed</span>"));
    assert!(html
        .contains(">b.com</a> <span class=\"others-in-progress\">others-in-progress</span>"));
    assert!(html.contains(">c.com</a> <span class=\"\"></span>"));
}

// =============================================================================
// Collection Page
// =============================================================================

#[tokio::test]
async fn test_collect_page_scopes_to_current_user() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let ann = register(&app, "Ann", "Lee").await;
    let bob = register(&app, "Bob", "Ray").await;

    app.clone()
        .oneshot(auth_request(
            "/submit_annotation?url=a.com&nl=mine&utility=ls&command=ls",
            &ann,
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(auth_request(
            "/submit_annotation?url=a.com&nl=theirs&utility=ls&command=ls+-la",
            &bob,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(auth_request("/collect_page?utility=ls&url=a.com", &ann))
        .await
        .unwrap();
    let html = extract_text(response.into_body()).await;

    assert!(html.contains("mine"));
    assert!(!html.contains("theirs"), "other annotators' rows are hidden");
}

#[tokio::test]
async fn test_collect_page_admin_sees_all_annotators() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let ann = register(&app, "Ann", "Lee").await;
    let bob = register(&app, "Bob", "Ray").await;

    app.clone()
        .oneshot(auth_request(
            "/submit_annotation?url=a.com&nl=theirs&utility=ls&command=ls+-la",
            &bob,
        ))
        .await
        .unwrap();

    // Grant Ann the admin role
    sqlx::query("UPDATE users SET is_admin = 1 WHERE access_code = 'ann-lee'")
        .execute(&db)
        .await
        .unwrap();

    let response = app
        .oneshot(auth_request("/collect_page?utility=ls&url=a.com", &ann))
        .await
        .unwrap();
    let html = extract_text(response.into_body()).await;

    assert!(html.contains("theirs"), "admin sees every annotator's rows");
}

#[tokio::test]
async fn test_collect_page_reports_completion_and_viewer_link() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let code = register(&app, "Ann", "Lee").await;

    app.clone()
        .oneshot(auth_request("/update_progress?url=a.com&status=completed", &code))
        .await
        .unwrap();

    let response = app
        .oneshot(auth_request("/collect_page?utility=ls&url=a.com", &code))
        .await
        .unwrap();
    let html = extract_text(response.into_body()).await;

    assert!(html.contains("You marked this page completed."));
    assert!(html.contains("https://via.hypothes.is/a.com"));
}
