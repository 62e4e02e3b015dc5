//! End-to-end tests of the HTTP surface against an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bap_api::{AppState, create_router};
use bap_core::auth::{Role, hash_password};
use bap_core::document::{DocumentStore, DocumentStoreConfig};
use bap_db::migration::MigratorTrait;
use bap_db::{Migrator, UserRepository};
use bap_shared::config::{ImportSettings, JwtConfig};
use bap_shared::jwt::JwtService;
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "bap-test-boundary";
const PASSWORD: &str = "correct horse";

const SHEET: &str = "\
Budget Code,Campaign Name,Amount,Specialist
TV-001,Spring launch,\"1,500,000\",bat
TV-002,Summer promo,250000,dorj
TV-003,,100,bat
";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

async fn app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let users = UserRepository::new(db.clone());
    let hash = hash_password(PASSWORD).unwrap();
    for (name, role) in [
        ("bat", Role::Planner),
        ("sarnai", Role::Manager),
        ("root", Role::Admin),
    ] {
        users.create(name, &hash, name, role).await.unwrap();
    }

    let dir = TempDir::new().unwrap();
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(JwtConfig {
            secret: "test-secret".into(),
            access_token_expires_minutes: 5,
        })),
        documents: DocumentStore::from_config(DocumentStoreConfig::new(dir.path())).unwrap(),
        import: Arc::new(ImportSettings::default()),
    };

    TestApp {
        router: create_router(state),
        _dir: dir,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn login(app: &TestApp, username: &str) -> String {
    let request = Request::post("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: &str, csv: &str) -> Request<Body> {
    Request::post("/api/v1/files")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart(&[
            ("channel", None, b"TV".as_slice()),
            ("file", Some("march.csv"), csv.as_bytes()),
        ])))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, Request::get("/api/v1/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = app().await;
    let (status, body) = send(&app, Request::get("/api/v1/files").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = send(&app, authed("GET", "/api/v1/files", "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = app().await;
    let request = Request::post("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "bat", "password": "nope" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_upload_reports_warnings_and_duplicates() {
    let app = app().await;
    let token = login(&app, "bat").await;

    let (status, first) = send(&app, upload_request(&token, SHEET)).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["items_imported"], 2);
    assert_eq!(first["header_row"], 1);
    assert_eq!(first["file"]["status"], "PENDING_APPROVAL");
    assert_eq!(first["file"]["channel"], "TV");
    assert_eq!(first["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(first["warnings"][0]["row"], 4);
    assert!(first["duplicate_of"].is_null());

    let (status, second) = send(&app, upload_request(&token, SHEET)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["duplicate_of"], first["file"]["id"]);
    assert!(second["warnings"][0]["row"].is_null());
}

#[tokio::test]
async fn test_manager_cannot_upload() {
    let app = app().await;
    let token = login(&app, "sarnai").await;
    let (status, body) = send(&app, upload_request(&token, SHEET)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "UPLOAD_NOT_PERMITTED");
}

#[tokio::test]
async fn test_unparseable_upload_is_bad_request() {
    let app = app().await;
    let token = login(&app, "bat").await;
    let (status, body) = send(&app, upload_request(&token, "just,some\nnoise,here\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "HEADER_NOT_FOUND");
}

#[tokio::test]
async fn test_approval_over_http() {
    let app = app().await;
    let planner = login(&app, "bat").await;
    let manager = login(&app, "sarnai").await;

    let (_, uploaded) = send(&app, upload_request(&planner, SHEET)).await;
    let id = uploaded["file"]["id"].as_str().unwrap().to_string();

    let (status, detail) = send(&app, authed("GET", &format!("/api/v1/files/{id}"), &manager)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["permitted_actions"], json!(["approve", "reject"]));
    assert_eq!(detail["items"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        authed("POST", &format!("/api/v1/files/{id}/approve"), &planner),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "INVALID_TRANSITION");

    let (status, body) = send(
        &app,
        authed("POST", &format!("/api/v1/files/{id}/approve"), &manager),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED_FOR_PRINT");

    let (status, body) = send(
        &app,
        authed("POST", &format!("/api/v1/files/{id}/approve"), &manager),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_TRANSITION");

    let (status, body) = send(&app, authed("GET", "/api/v1/files/status-counts", &planner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[1], json!({ "status": "APPROVED_FOR_PRINT", "count": 1 }));
}

#[tokio::test]
async fn test_pdf_download_before_generation_is_not_found() {
    let app = app().await;
    let planner = login(&app, "bat").await;
    let (_, uploaded) = send(&app, upload_request(&planner, SHEET)).await;
    let id = uploaded["file"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, authed("GET", &format!("/api/v1/files/{id}/pdf"), &planner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "DOCUMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_only_admin_creates_users() {
    let app = app().await;
    let planner = login(&app, "bat").await;
    let admin = login(&app, "root").await;
    let payload = json!({
        "username": "dorj",
        "password": "pw",
        "full_name": "Dorj",
        "role": "planner"
    })
    .to_string();

    let request = |token: &str| {
        Request::post("/api/v1/users")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.clone()))
            .unwrap()
    };

    let (status, _) = send(&app, request(&planner)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request(&admin)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "planner");

    let (status, body) = send(&app, request(&admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_metric_labels() {
    let app = app().await;
    let token = login(&app, "bat").await;

    let (status, _) = send(&app, authed("GET", "/api/v1/channels/tv/metric-labels", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, authed("GET", "/api/v1/channels/radio/metric-labels", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_manager_downloads_uploaded_spreadsheet() {
    let app = app().await;
    let planner = login(&app, "bat").await;
    let manager = login(&app, "sarnai").await;
    let (_, uploaded) = send(&app, upload_request(&planner, SHEET)).await;
    let id = uploaded["file"]["id"].as_str().unwrap().to_string();
    assert!(
        uploaded["file"]["source_file_path"]
            .as_str()
            .unwrap()
            .ends_with(".csv")
    );

    let response = app
        .router
        .clone()
        .oneshot(authed("GET", &format!("/api/v1/files/{id}/source"), &manager))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), SHEET.as_bytes());
}

#[tokio::test]
async fn test_dashboard_trend() {
    let app = app().await;
    let token = login(&app, "sarnai").await;

    let (status, body) = send(&app, authed("GET", "/api/v1/dashboard/trend?year=2024", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, authed("GET", "/api/v1/dashboard/trend", &token)).await;
    assert_eq!(status, StatusCode::OK);
}
