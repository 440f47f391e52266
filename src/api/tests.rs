// HTTP 接口测试

use std::sync::Arc;

use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};
use serde_json::Value;
use uuid::Uuid;

use crate::api::middleware::{JwtUtils, RequestIdMiddleware};
use crate::api::{configure_all, AppState};
use crate::db::entities::prelude::{ConnectionType, OrganizationRole};
use crate::oauth::OAuthState;
use crate::test_support::*;

fn app_state(db: Arc<DatabaseConnection>) -> AppState {
    AppState::with_provider(db, test_config(), Arc::new(FakeOAuthProvider { fail: false })).unwrap()
}

fn bearer(user_id: Uuid) -> (&'static str, String) {
    let token = JwtUtils::generate_token(user_id, "alice@example.com", &test_config().security).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

macro_rules! init_app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(app_state($db)))
                .wrap(RequestIdMiddleware)
                .configure(configure_all),
        )
        .await
    };
}

#[actix_web::test]
async fn test_protected_endpoints_require_token() {
    let app = init_app!(empty_db());
    let id = Uuid::new_v4();

    let endpoints = [
        (Method::GET, "/api/v1/auth/me".to_string()),
        (Method::GET, "/api/v1/organizations".to_string()),
        (Method::POST, "/api/v1/organizations".to_string()),
        (Method::GET, format!("/api/v1/organizations/{}/workspaces", id)),
        (Method::POST, format!("/api/v1/organizations/{}/workspaces", id)),
        (Method::GET, format!("/api/v1/workspaces/{}", id)),
        (Method::GET, format!("/api/v1/workspaces/{}/agents", id)),
        (Method::GET, format!("/api/v1/workspaces/{}/files", id)),
        (Method::GET, format!("/api/v1/workspaces/{}/connections", id)),
        (Method::GET, format!("/api/v1/workspaces/{}/database-connections", id)),
        (Method::DELETE, format!("/api/v1/agents/{}", id)),
        (Method::DELETE, format!("/api/v1/connections/{}", id)),
        (Method::GET, "/api/v1/oauth/google?workspace_id=x&connection_type=google_docs".to_string()),
        (Method::POST, "/api/v1/oauth/google".to_string()),
    ];

    for (method, uri) in endpoints {
        let req = test::TestRequest::default()
            .method(method.clone())
            .uri(&uri)
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "AUTHENTICATION_ERROR");
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn test_invalid_token_is_rejected() {
    let app = init_app!(empty_db());
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_blank_workspace_name_is_rejected_before_database() {
    let db = empty_db();
    let app = init_app!(db.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/organizations/{}/workspaces", Uuid::new_v4()))
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(serde_json::json!({ "name": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "name");

    drop(app);
    assert!(transaction_log(db).is_empty());
}

#[actix_web::test]
async fn test_malformed_json_and_path_are_bad_requests() {
    let app = init_app!(empty_db());

    let req = test::TestRequest::post()
        .uri("/api/v1/organizations")
        .insert_header(bearer(Uuid::new_v4()))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let req = test::TestRequest::get()
        .uri("/api/v1/workspaces/not-a-uuid")
        .insert_header(bearer(Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_initiate_validates_query() {
    let app = init_app!(empty_db());

    for uri in [
        "/api/v1/oauth/google?connection_type=google_sheets".to_string(),
        "/api/v1/oauth/google?workspace_id=abc&connection_type=google_sheets".to_string(),
        format!("/api/v1/oauth/google?workspace_id={}&connection_type=dropbox", Uuid::new_v4()),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_initiate_returns_wrapped_auth_url() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Member)]])
        .into_connection();
    let app = init_app!(Arc::new(db));

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/oauth/google?workspace_id={}&connection_type=google_analytics",
            workspace_id
        ))
        .insert_header(bearer(user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["stage"], "auth_redirect");
    assert!(body["data"]["auth_url"].as_str().unwrap().contains("state="));
    assert!(body["request_id"].is_string());
}

#[actix_web::test]
async fn test_upload_by_non_member_is_forbidden() {
    let workspace_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, Uuid::new_v4(), Uuid::new_v4())]])
        .append_query_results([Vec::<crate::db::entities::organization_member::Model>::new()])
        .into_connection();
    let app = init_app!(Arc::new(db));

    let body = "--BOUNDARY\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"report.csv\"\r\n\
        Content-Type: text/csv\r\n\r\n\
        a,b\r\n\
        --BOUNDARY--\r\n";
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/workspaces/{}/files", workspace_id))
        .insert_header(bearer(Uuid::new_v4()))
        .insert_header(("Content-Type", "multipart/form-data; boundary=BOUNDARY"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_exchange_rejects_stale_state() {
    let user_id = Uuid::new_v4();
    let mut state = OAuthState::new(Uuid::new_v4(), ConnectionType::GoogleSheets, user_id, None);
    state.timestamp -= 6 * 60 * 1000;

    let app = init_app!(empty_db());
    let req = test::TestRequest::post()
        .uri("/api/v1/oauth/google")
        .insert_header(bearer(user_id))
        .set_json(serde_json::json!({ "code": "auth-code", "state": state.encode().unwrap() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_exchange_missing_code() {
    let app = init_app!(empty_db());
    let req = test::TestRequest::post()
        .uri("/api/v1/oauth/google")
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(serde_json::json!({ "state": "abc" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_exchange_succeeds_when_data_source_fails() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Admin)]])
        .append_query_results([vec![connection_model(connection_id, workspace_id, user_id)]])
        .append_query_results([vec![token_model(connection_id)]])
        .append_query_errors([DbErr::Custom("duplicate data source".to_string())])
        .into_connection();
    let app = init_app!(Arc::new(db));

    let state = OAuthState::new(workspace_id, ConnectionType::GoogleSheets, user_id, None);
    let req = test::TestRequest::post()
        .uri("/api/v1/oauth/google")
        .insert_header(bearer(user_id))
        .set_json(serde_json::json!({ "code": "auth-code", "state": state.encode().unwrap() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["connection_id"], connection_id.to_string());
    assert_eq!(body["data"]["data_source_registered"], false);
    assert_eq!(body["data"]["stage"], "connection_persisted");
}

#[actix_web::test]
async fn test_health_endpoints() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let app = init_app!(Arc::new(db));

    for uri in ["/health", "/api/v1/health"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }
}

#[actix_web::test]
async fn test_health_reports_unavailable_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors([DbErr::Custom("connection refused".to_string())])
        .into_connection();
    let app = init_app!(Arc::new(db));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_openapi_document_is_served() {
    let app = init_app!(empty_db());
    let req = test::TestRequest::get().uri("/api/v1/openapi.json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["paths"]["/api/v1/oauth/google"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}
