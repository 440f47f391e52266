// OAuth 连接流程测试

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use uuid::Uuid;

use super::*;
use crate::db::entities::prelude::{ConnectionType, OrganizationRole};
use crate::db::entities::{organization_member, workspace};
use crate::test_support::*;

const TTL_SECONDS: i64 = 300;

fn service(db: Arc<DatabaseConnection>, fail: bool) -> ConnectService {
    ConnectService::new(
        db,
        encryption(),
        Arc::new(FakeOAuthProvider { fail }),
        TTL_SECONDS,
    )
}

fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

fn member_db(workspace_id: Uuid, org_id: Uuid, user_id: Uuid) -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Member)]])
}

fn fresh_state(workspace_id: Uuid, user_id: Uuid) -> OAuthState {
    OAuthState::new(
        workspace_id,
        ConnectionType::GoogleSheets,
        user_id,
        Some("sheet-123".to_string()),
    )
}

#[test]
fn test_state_uses_camel_case_base64_json() {
    let state = fresh_state(Uuid::new_v4(), Uuid::new_v4());
    let encoded = state.encode().unwrap();

    let json: serde_json::Value = serde_json::from_slice(&BASE64.decode(&encoded).unwrap()).unwrap();
    assert_eq!(json["workspaceId"], state.workspace_id.to_string());
    assert_eq!(json["connectionType"], "google_sheets");
    assert_eq!(json["userId"], state.user_id.to_string());
    assert_eq!(json["documentId"], "sheet-123");
    assert!(json["timestamp"].is_i64());

    assert_eq!(OAuthState::decode(&encoded).unwrap(), state);
}

#[test]
fn test_state_without_document_id_omits_field() {
    let state = OAuthState::new(Uuid::new_v4(), ConnectionType::GoogleDocs, Uuid::new_v4(), None);
    let json: serde_json::Value =
        serde_json::from_slice(&BASE64.decode(state.encode().unwrap()).unwrap()).unwrap();
    assert!(json.get("documentId").is_none());
}

#[test]
fn test_state_decode_rejects_garbage() {
    assert_eq!(OAuthState::decode("%%not-base64%%").unwrap_err().status_code(), 400);

    let not_json = BASE64.encode(b"plain text");
    assert_eq!(OAuthState::decode(&not_json).unwrap_err().status_code(), 400);

    let unknown_type = BASE64.encode(
        br#"{"workspaceId":"00000000-0000-0000-0000-000000000000","connectionType":"dropbox","userId":"00000000-0000-0000-0000-000000000000","timestamp":0}"#,
    );
    assert_eq!(OAuthState::decode(&unknown_type).unwrap_err().status_code(), 400);
}

#[test]
fn test_state_expiry_window() {
    let mut state = fresh_state(Uuid::new_v4(), Uuid::new_v4());
    state.timestamp = 1_000_000;
    let ttl_ms = TTL_SECONDS * 1000;

    assert!(!state.is_expired_at(1_000_000 + ttl_ms, ttl_ms));
    assert!(state.is_expired_at(1_000_000 + ttl_ms + 1, ttl_ms));
    // 未来时间戳不视为过期
    assert!(!state.is_expired_at(0, ttl_ms));
}

#[test]
fn test_state_expiry_with_extreme_timestamps() {
    let mut state = fresh_state(Uuid::new_v4(), Uuid::new_v4());
    let now_ms = chrono::Utc::now().timestamp_millis();
    let ttl_ms = TTL_SECONDS * 1000;

    state.timestamp = i64::MIN;
    assert!(state.is_expired_at(now_ms, ttl_ms));

    state.timestamp = -1;
    assert!(state.is_expired_at(now_ms, ttl_ms));

    state.timestamp = i64::MAX;
    assert!(!state.is_expired_at(now_ms, ttl_ms));
}

#[test]
fn test_token_expiry_out_of_range_is_none() {
    let issued_at = chrono::Utc::now();
    let mut tokens = OAuthTokenSet {
        access_token: FAKE_ACCESS_TOKEN.to_string(),
        refresh_token: None,
        token_type: "Bearer".to_string(),
        scope: None,
        expires_in: Some(3600),
        id_token: None,
    };
    assert_eq!(
        tokens.expires_at(issued_at),
        Some(issued_at + chrono::Duration::seconds(3600))
    );

    tokens.expires_in = Some(i64::MAX);
    assert!(tokens.expires_at(issued_at).is_none());

    tokens.expires_in = Some(i64::MIN);
    assert!(tokens.expires_at(issued_at).is_none());

    // 可表示为 Duration 但相加后超出日期范围
    tokens.expires_in = Some(i64::MAX / 1000);
    assert!(tokens.expires_at(issued_at).is_none());

    tokens.expires_in = None;
    assert!(tokens.expires_at(issued_at).is_none());
}

#[test]
fn test_stage_order() {
    let mut stage = ConnectStage::Start;
    let mut visited = vec![stage];
    while let Some(next) = stage.next() {
        assert!(next > stage);
        stage = next;
        visited.push(stage);
    }
    assert_eq!(visited.len(), 6);
    assert_eq!(stage, ConnectStage::DataSourceRegistered);
    assert_eq!(
        serde_json::to_value(ConnectStage::ConnectionPersisted).unwrap(),
        "connection_persisted"
    );
}

#[tokio::test]
async fn test_exchange_rejects_empty_code_and_state() {
    let svc = service(empty_db(), false);
    let user_id = Uuid::new_v4();

    let err = svc.exchange(user_id, "", "abc").await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = svc.exchange(user_id, "code", "  ").await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_stale_state_rejected_before_any_other_check() {
    // 空的 MockDatabase：任何数据库访问都会失败并返回 500
    let svc = service(empty_db(), false);
    let caller = Uuid::new_v4();

    // state 的 userId 与调用者不一致，但过期检查优先
    let mut state = fresh_state(Uuid::new_v4(), Uuid::new_v4());
    state.timestamp = 1_000;
    let encoded = state.encode().unwrap();

    let now_ms = state.timestamp + TTL_SECONDS * 1000 + 1;
    let err = svc.exchange_at(caller, "code", &encoded, now_ms).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_pre_epoch_state_rejected_without_database_access() {
    let db = empty_db();
    let svc = service(db.clone(), false);
    let user_id = Uuid::new_v4();

    let mut state = fresh_state(Uuid::new_v4(), user_id);
    state.timestamp = i64::MIN;
    let encoded = state.encode().unwrap();

    let err = svc.exchange(user_id, "code", &encoded).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    drop(svc);
    assert!(transaction_log(db).is_empty());
}

#[tokio::test]
async fn test_future_dated_state_is_accepted() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();

    let db = member_db(workspace_id, org_id, user_id)
        .append_query_results([vec![connection_model(connection_id, workspace_id, user_id)]])
        .append_query_results([vec![token_model(connection_id)]])
        .append_query_results([vec![data_source_model(workspace_id, connection_id)]])
        .into_connection();

    let mut state = fresh_state(workspace_id, user_id);
    state.timestamp = chrono::Utc::now().timestamp_millis() + 60 * 60 * 1000;
    let encoded = state.encode().unwrap();

    let outcome = service(Arc::new(db), false)
        .exchange(user_id, "auth-code", &encoded)
        .await
        .unwrap();
    assert_eq!(outcome.connection_id, connection_id);
    assert_eq!(outcome.stage, ConnectStage::DataSourceRegistered);
}

#[tokio::test]
async fn test_replayed_exchange_repeats_inserts() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let first_id = Uuid::new_v4();
    let second_id = Uuid::new_v4();

    let db = member_db(workspace_id, org_id, user_id)
        .append_query_results([vec![connection_model(first_id, workspace_id, user_id)]])
        .append_query_results([vec![token_model(first_id)]])
        .append_query_results([vec![data_source_model(workspace_id, first_id)]])
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Member)]])
        .append_query_results([vec![connection_model(second_id, workspace_id, user_id)]])
        .append_query_results([vec![token_model(second_id)]])
        .append_query_results([vec![data_source_model(workspace_id, second_id)]])
        .into_connection();
    let db = Arc::new(db);
    let state = fresh_state(workspace_id, user_id).encode().unwrap();

    let svc = service(db.clone(), false);
    let first = svc.exchange(user_id, "auth-code", &state).await.unwrap();
    let second = svc.exchange(user_id, "auth-code", &state).await.unwrap();
    assert_ne!(first.connection_id, second.connection_id);

    drop(svc);
    let connection_inserts = transaction_log(db)
        .iter()
        .filter(|txn| format!("{:?}", txn).contains(r#"INSERT INTO \"external_connections\""#))
        .count();
    assert_eq!(connection_inserts, 2);
}

#[tokio::test]
async fn test_exchange_rejects_user_mismatch() {
    let svc = service(empty_db(), false);
    let state = fresh_state(Uuid::new_v4(), Uuid::new_v4()).encode().unwrap();

    let err = svc.exchange(Uuid::new_v4(), "code", &state).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_exchange_missing_workspace_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<workspace::Model>::new()])
        .into_connection();
    let user_id = Uuid::new_v4();
    let state = fresh_state(Uuid::new_v4(), user_id).encode().unwrap();

    let err = service(Arc::new(db), false).exchange(user_id, "code", &state).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_exchange_requires_organization_membership() {
    let workspace_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, Uuid::new_v4(), Uuid::new_v4())]])
        .append_query_results([Vec::<organization_member::Model>::new()])
        .into_connection();
    let state = fresh_state(workspace_id, user_id).encode().unwrap();

    let err = service(Arc::new(db), false).exchange(user_id, "code", &state).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = member_db(workspace_id, org_id, user_id).into_connection();
    let state = fresh_state(workspace_id, user_id).encode().unwrap();

    let err = service(Arc::new(db), true).exchange(user_id, "code", &state).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_successful_exchange_persists_encrypted_rows() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();

    let db = member_db(workspace_id, org_id, user_id)
        .append_query_results([vec![connection_model(connection_id, workspace_id, user_id)]])
        .append_query_results([vec![token_model(connection_id)]])
        .append_query_results([vec![data_source_model(workspace_id, connection_id)]])
        .into_connection();
    let db = Arc::new(db);
    let state = fresh_state(workspace_id, user_id).encode().unwrap();

    let svc = service(db.clone(), false);
    let outcome = svc.exchange(user_id, "auth-code", &state).await.unwrap();

    assert_eq!(outcome.connection_id, connection_id);
    assert_eq!(outcome.workspace_id, workspace_id);
    assert!(outcome.data_source_registered);
    assert!(outcome.data_source_id.is_some());
    assert_eq!(outcome.stage, ConnectStage::DataSourceRegistered);

    drop(svc);
    let log = format!("{:?}", transaction_log(db));
    assert!(log.contains("external_connections"));
    assert!(log.contains("oauth_tokens"));
    assert!(log.contains("workspace_data_sources"));
    assert!(!log.contains(FAKE_ACCESS_TOKEN));
}

#[tokio::test]
async fn test_data_source_failure_is_swallowed() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();

    let db = member_db(workspace_id, org_id, user_id)
        .append_query_results([vec![connection_model(connection_id, workspace_id, user_id)]])
        .append_query_results([vec![token_model(connection_id)]])
        .append_query_errors([DbErr::Custom("unique violation".to_string())])
        .into_connection();
    let state = fresh_state(workspace_id, user_id).encode().unwrap();

    let outcome = service(Arc::new(db), false).exchange(user_id, "auth-code", &state).await.unwrap();

    assert!(!outcome.data_source_registered);
    assert!(outcome.data_source_id.is_none());
    assert_eq!(outcome.stage, ConnectStage::ConnectionPersisted);
}

#[tokio::test]
async fn test_token_insert_failure_is_server_error() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();

    let db = member_db(workspace_id, org_id, user_id)
        .append_query_results([vec![connection_model(connection_id, workspace_id, user_id)]])
        .append_query_errors([DbErr::Custom("connection reset".to_string())])
        .into_connection();
    let state = fresh_state(workspace_id, user_id).encode().unwrap();

    let err = service(Arc::new(db), false).exchange(user_id, "auth-code", &state).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_initiate_returns_auth_url_with_state() {
    let workspace_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = member_db(workspace_id, org_id, user_id).into_connection();

    let response = service(Arc::new(db), false)
        .initiate(
            user_id,
            InitiateConnect {
                workspace_id,
                connection_type: ConnectionType::GoogleAnalytics,
                document_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(response.stage, ConnectStage::AuthRedirect);
    let url = url::Url::parse(&response.auth_url).unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    let decoded = OAuthState::decode(&state).unwrap();
    assert_eq!(decoded.workspace_id, workspace_id);
    assert_eq!(decoded.user_id, user_id);
    assert_eq!(decoded.connection_type, ConnectionType::GoogleAnalytics);
}

#[test]
fn test_google_authorization_url_parameters() {
    let mut config = test_config().oauth.google;
    config.redirect_uri = "https://app.example.com/oauth/google/callback".to_string();
    let provider = GoogleOAuthProvider::new(config).unwrap();

    let url = provider
        .authorization_url(ConnectionType::GoogleSheets, "c3RhdGU=")
        .unwrap();
    let url = url::Url::parse(&url).unwrap();
    let params: std::collections::HashMap<String, String> = url.query_pairs().into_owned().collect();

    assert_eq!(url.host_str(), Some("accounts.google.com"));
    assert_eq!(params["client_id"], "test-client-id");
    assert_eq!(params["redirect_uri"], "https://app.example.com/oauth/google/callback");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["access_type"], "offline");
    assert_eq!(params["prompt"], "consent");
    assert_eq!(params["include_granted_scopes"], "true");
    assert_eq!(params["state"], "c3RhdGU=");
    assert!(params["scope"].contains("spreadsheets.readonly"));
    assert!(params["scope"].contains("drive.readonly"));
}

#[test]
fn test_google_provider_requires_credentials() {
    let provider = GoogleOAuthProvider::new(crate::config::AppConfig::default().oauth.google).unwrap();
    assert!(!provider.is_configured());
    let err = provider
        .authorization_url(ConnectionType::GoogleDocs, "state")
        .unwrap_err();
    assert_eq!(err.status_code(), 503);
}

#[test]
fn test_google_scopes_per_connection_type() {
    let provider = GoogleOAuthProvider::new(test_config().oauth.google).unwrap();
    let docs = provider.scopes(ConnectionType::GoogleDocs);
    assert!(docs.iter().any(|s| s.ends_with("documents.readonly")));
    let analytics = provider.scopes(ConnectionType::GoogleAnalytics);
    assert!(analytics.iter().any(|s| s.ends_with("analytics.readonly")));
    assert!(!analytics.iter().any(|s| s.ends_with("drive.readonly")));
}
