// 服务层测试

use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use std::sync::Arc;
use uuid::Uuid;

use super::*;
use crate::api::middleware::JwtUtils;
use crate::config::StorageConfig;
use crate::db::entities::prelude::OrganizationRole;
use crate::db::entities::{ai_agent, file_summary, organization, user};
use crate::test_support::*;

fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// 依次返回工作区与成员关系，满足 require_workspace_access
fn workspace_member_db(workspace_id: Uuid, org_id: Uuid, user_id: Uuid, role: OrganizationRole) -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, role)]])
}

fn storage_config(path: &std::path::Path) -> StorageConfig {
    StorageConfig {
        path: path.to_string_lossy().into_owned(),
        max_file_size: 1024,
        max_files_per_upload: 3,
        allowed_extensions: vec!["csv".to_string(), ".PDF".to_string()],
    }
}

// ---- 认证 ----

#[test]
fn test_validate_registration() {
    let request = RegisterRequest {
        email: "  Alice@Example.com ".to_string(),
        password: "correct-horse".to_string(),
        display_name: None,
    };
    let (email, display_name) = AuthService::validate_registration(&request).unwrap();
    assert_eq!(email, "alice@example.com");
    assert_eq!(display_name, "alice");

    let bad_email = RegisterRequest {
        email: "not-an-email".to_string(),
        ..request.clone()
    };
    assert_eq!(AuthService::validate_registration(&bad_email).unwrap_err().status_code(), 400);

    let short_password = RegisterRequest {
        password: "short".to_string(),
        ..request
    };
    assert_eq!(AuthService::validate_registration(&short_password).unwrap_err().status_code(), 400);
}

#[tokio::test]
async fn test_register_issues_verifiable_token() {
    let config = test_config();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([vec![user_model(user_id, "alice@example.com", "hash")]])
        .into_connection();

    let response = AuthService::new(Arc::new(db), config.security.clone())
        .register(RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
            display_name: Some("Alice".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.user.id, user_id);
    let claims = JwtUtils::verify_token(&response.access_token, &config.security).unwrap();
    assert_eq!(claims.sub, user_id.to_string());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let config = test_config();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(Uuid::new_v4(), "alice@example.com", "hash")]])
        .into_connection();

    let err = AuthService::new(Arc::new(db), config.security.clone())
        .register(RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
            display_name: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email_alike() {
    let config = test_config();
    let password_hash = bcrypt::hash("correct-horse", 4).unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(Uuid::new_v4(), "alice@example.com", &password_hash)]])
        .into_connection();
    let wrong_password = AuthService::new(Arc::new(db), config.security.clone())
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let unknown = AuthService::new(Arc::new(db), config.security.clone())
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(wrong_password.status_code(), 401);
    assert_eq!(unknown.status_code(), 401);
    assert_eq!(wrong_password.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_login_success() {
    let config = test_config();
    let user_id = Uuid::new_v4();
    let password_hash = bcrypt::hash("correct-horse", 4).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id, "alice@example.com", &password_hash)]])
        .append_query_results([vec![user_model(user_id, "alice@example.com", &password_hash)]])
        .into_connection();

    let response = AuthService::new(Arc::new(db), config.security.clone())
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.email, "alice@example.com");
    assert_eq!(response.expires_in, config.security.jwt_expiration);
}

// ---- 组织 ----

#[test]
fn test_slugify() {
    assert_eq!(slugify("Acme Corp"), "acme-corp");
    assert_eq!(slugify("  Data & AI -- Lab! "), "data-ai-lab");
    assert_eq!(slugify("数据"), "");
    assert!(validate_slug("acme-corp").is_ok());
    assert!(validate_slug("-acme").is_err());
    assert!(validate_slug("a").is_err());
    assert!(validate_slug("Acme").is_err());
}

#[test]
fn test_derive_slug_falls_back_for_unusable_names() {
    assert_eq!(derive_slug("Acme Corp"), "acme-corp");

    for name in ["研发部", "X", "!!"] {
        let slug = derive_slug(name);
        assert!(slug.starts_with("org-"), "{} -> {}", name, slug);
        assert!(validate_slug(&slug).is_ok());
    }
}

#[tokio::test]
async fn test_create_organization_with_non_ascii_name() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<organization::Model>::new()])
        .append_query_results([vec![organization_model(org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Owner)]])
        .into_connection();
    let db = Arc::new(db);

    let info = OrganizationService::new(db.clone())
        .create(
            user_id,
            CreateOrganizationRequest {
                name: "研发部".to_string(),
                slug: None,
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(info.id, org_id);

    let log = format!("{:?}", transaction_log(db));
    assert!(log.contains("org-"));
}

#[tokio::test]
async fn test_create_organization_adds_owner_membership() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<organization::Model>::new()])
        .append_query_results([vec![organization_model(org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Owner)]])
        .into_connection();

    let info = OrganizationService::new(Arc::new(db))
        .create(
            user_id,
            CreateOrganizationRequest {
                name: "Acme".to_string(),
                slug: None,
                description: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(info.id, org_id);
    assert_eq!(info.role, Some(OrganizationRole::Owner));
}

#[tokio::test]
async fn test_create_organization_rejects_duplicate_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![organization_model(Uuid::new_v4(), Uuid::new_v4())]])
        .into_connection();

    let err = OrganizationService::new(Arc::new(db))
        .create(
            Uuid::new_v4(),
            CreateOrganizationRequest {
                name: "Acme".to_string(),
                slug: Some("acme".to_string()),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_create_organization_rejects_blank_name() {
    let err = OrganizationService::new(empty_db())
        .create(
            Uuid::new_v4(),
            CreateOrganizationRequest {
                name: "   ".to_string(),
                slug: None,
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_get_organization_requires_membership() {
    let org_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![organization_model(org_id, Uuid::new_v4())]])
        .append_query_results([Vec::<crate::db::entities::organization_member::Model>::new()])
        .into_connection();

    let err = OrganizationService::new(Arc::new(db)).get(Uuid::new_v4(), org_id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<organization::Model>::new()])
        .into_connection();
    let err = OrganizationService::new(Arc::new(db)).get(Uuid::new_v4(), org_id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_delete_organization_owner_only() {
    let owner_id = Uuid::new_v4();
    let admin_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![organization_model(org_id, owner_id)]])
        .append_query_results([vec![member_model(org_id, admin_id, OrganizationRole::Admin)]])
        .into_connection();

    let err = OrganizationService::new(Arc::new(db)).delete(admin_id, org_id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_add_member_cannot_grant_owner() {
    let err = OrganizationService::new(empty_db())
        .add_member(
            Uuid::new_v4(),
            Uuid::new_v4(),
            AddMemberRequest {
                email: "bob@example.com".to_string(),
                role: OrganizationRole::Owner,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_add_member_unknown_email() {
    let owner_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![organization_model(org_id, owner_id)]])
        .append_query_results([vec![member_model(org_id, owner_id, OrganizationRole::Owner)]])
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let err = OrganizationService::new(Arc::new(db))
        .add_member(
            owner_id,
            org_id,
            AddMemberRequest {
                email: "bob@example.com".to_string(),
                role: OrganizationRole::Member,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_remove_owner_is_rejected() {
    let owner_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![organization_model(org_id, owner_id)]])
        .append_query_results([vec![member_model(org_id, owner_id, OrganizationRole::Owner)]])
        .into_connection();

    let err = OrganizationService::new(Arc::new(db))
        .remove_member(owner_id, org_id, owner_id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

// ---- 工作区 ----

#[test]
fn test_validate_workspace_name() {
    assert_eq!(validate_workspace_name("  Sales  ").unwrap(), "Sales");
    assert_eq!(validate_workspace_name("").unwrap_err().status_code(), 400);
    assert_eq!(validate_workspace_name(" \t ").unwrap_err().status_code(), 400);
    assert!(validate_workspace_name(&"a".repeat(MAX_WORKSPACE_NAME_LENGTH)).is_ok());
    assert!(validate_workspace_name(&"a".repeat(MAX_WORKSPACE_NAME_LENGTH + 1)).is_err());
}

#[tokio::test]
async fn test_create_workspace_blank_name_skips_database() {
    let db = empty_db();
    let err = WorkspaceService::new(db.clone())
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            CreateWorkspaceRequest {
                name: "   ".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(transaction_log(db).is_empty());
}

#[tokio::test]
async fn test_create_workspace_adds_admin_member() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![organization_model(org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Member)]])
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![crate::db::entities::workspace_member::Model {
            id: Uuid::new_v4(),
            workspace_id,
            user_id,
            role: crate::db::entities::prelude::WorkspaceRole::Admin,
            joined_at: now(),
        }]])
        .into_connection();

    let info = WorkspaceService::new(Arc::new(db))
        .create(
            user_id,
            org_id,
            CreateWorkspaceRequest {
                name: " Analytics ".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(info.id, workspace_id);
    assert_eq!(info.organization_id, org_id);
}

#[tokio::test]
async fn test_delete_workspace_requires_manager() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Member).into_connection();

    let err = WorkspaceService::new(Arc::new(db)).delete(user_id, workspace_id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_delete_workspace_as_admin() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Admin)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    WorkspaceService::new(Arc::new(db)).delete(user_id, workspace_id).await.unwrap();
}

// ---- Agent ----

#[test]
fn test_validate_temperature() {
    assert!(validate_temperature(0.0).is_ok());
    assert!(validate_temperature(2.0).is_ok());
    assert!(validate_temperature(-0.1).is_err());
    assert!(validate_temperature(2.5).is_err());
    assert!(validate_temperature(f64::NAN).is_err());
}

#[tokio::test]
async fn test_create_agent_uses_defaults() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let agent_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Member)
        .append_query_results([vec![agent_model(agent_id, workspace_id, user_id)]])
        .into_connection();

    let info = AgentService::new(Arc::new(db))
        .create(
            user_id,
            workspace_id,
            CreateAgentRequest {
                name: "Support bot".to_string(),
                description: None,
                system_prompt: None,
                model: None,
                temperature: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(info.model, ai_agent::DEFAULT_MODEL);
    assert_eq!(info.temperature, ai_agent::DEFAULT_TEMPERATURE);
}

#[tokio::test]
async fn test_create_agent_rejects_out_of_range_temperature() {
    let err = AgentService::new(empty_db())
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            CreateAgentRequest {
                name: "bot".to_string(),
                description: None,
                system_prompt: None,
                model: None,
                temperature: Some(3.0),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_get_missing_agent() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<ai_agent::Model>::new()])
        .into_connection();
    let err = AgentService::new(Arc::new(db)).get(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

// ---- 文件 ----

#[test]
fn test_file_storage_validation() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::from_config(&storage_config(dir.path()));

    assert_eq!(storage.validate("report.CSV", 10).unwrap(), "csv");
    assert_eq!(storage.validate("scan.pdf", 10).unwrap(), "pdf");
    assert_eq!(storage.validate("run.exe", 10).unwrap_err().status_code(), 400);
    assert_eq!(storage.validate("noext", 10).unwrap_err().status_code(), 400);
    assert_eq!(storage.validate("big.csv", 2048).unwrap_err().status_code(), 413);
    assert_eq!(storage.validate("empty.csv", 0).unwrap_err().status_code(), 400);
}

#[test]
fn test_sanitize_file_name_strips_directories() {
    assert_eq!(FileStorage::sanitize_file_name("../../etc/passwd.csv"), "passwd.csv");
    assert_eq!(FileStorage::sanitize_file_name(" report.csv "), "report.csv");
    assert_eq!(FileStorage::sanitize_file_name(".."), "");
}

#[tokio::test]
async fn test_upload_reports_per_file_results() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let file_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Member)
        .append_query_results([vec![file_model(file_id, workspace_id, user_id)]])
        .into_connection();

    let service = FileService::new(Arc::new(db), FileStorage::from_config(&storage_config(dir.path())));
    let target = service.authorize_upload(user_id, workspace_id).await.unwrap();
    let result = service
        .upload(
            target,
            vec![
                IncomingFile {
                    file_name: "report.csv".to_string(),
                    content_type: Some("text/csv".to_string()),
                    data: b"a,b\n1,2\n".to_vec(),
                    size: 8,
                },
                IncomingFile {
                    file_name: "malware.exe".to_string(),
                    content_type: None,
                    data: vec![0; 4],
                    size: 4,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.uploaded.len(), 1);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].file_name, "malware.exe");

    let stored: Vec<_> = std::fs::read_dir(dir.path().join(workspace_id.to_string()))
        .unwrap()
        .collect();
    assert_eq!(stored.len(), 1);
}

fn csv_file(name: &str) -> IncomingFile {
    IncomingFile {
        file_name: name.to_string(),
        content_type: Some("text/csv".to_string()),
        data: b"a,b\n".to_vec(),
        size: 4,
    }
}

#[tokio::test]
async fn test_upload_requires_files() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, Uuid::new_v4(), user_id, OrganizationRole::Member).into_connection();

    let service = FileService::new(Arc::new(db), FileStorage::from_config(&storage_config(dir.path())));
    let target = service.authorize_upload(user_id, workspace_id).await.unwrap();
    let err = service.upload(target, vec![]).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_upload_rejects_too_many_files() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, Uuid::new_v4(), user_id, OrganizationRole::Member).into_connection();

    let service = FileService::new(Arc::new(db), FileStorage::from_config(&storage_config(dir.path())));
    let target = service.authorize_upload(user_id, workspace_id).await.unwrap();
    let files = (0..4).map(|i| csv_file(&format!("part-{}.csv", i))).collect();
    let err = service.upload(target, files).await.unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(!dir.path().join(workspace_id.to_string()).exists());
}

#[test]
fn test_storage_file_count_limit() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::from_config(&storage_config(dir.path()));
    assert!(storage.check_file_count(3).is_ok());
    assert_eq!(storage.check_file_count(4).unwrap_err().status_code(), 400);
}

#[tokio::test]
async fn test_upload_authorization_rejects_non_member() {
    let dir = tempfile::tempdir().unwrap();
    let workspace_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![workspace_model(workspace_id, Uuid::new_v4(), Uuid::new_v4())]])
        .append_query_results([Vec::<crate::db::entities::organization_member::Model>::new()])
        .into_connection();

    let service = FileService::new(Arc::new(db), FileStorage::from_config(&storage_config(dir.path())));
    let err = service
        .authorize_upload(Uuid::new_v4(), workspace_id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_get_missing_summary() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let file_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![file_model(file_id, workspace_id, user_id)]])
        .append_query_results([vec![workspace_model(workspace_id, org_id, user_id)]])
        .append_query_results([vec![member_model(org_id, user_id, OrganizationRole::Member)]])
        .append_query_results([Vec::<file_summary::Model>::new()])
        .into_connection();

    let service = FileService::new(Arc::new(db), FileStorage::from_config(&storage_config(dir.path())));
    let err = service.get_summary(user_id, file_id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_delete_file_for_non_member() {
    let dir = tempfile::tempdir().unwrap();
    let workspace_id = Uuid::new_v4();
    let file_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![file_model(file_id, workspace_id, Uuid::new_v4())]])
        .append_query_results([vec![workspace_model(workspace_id, Uuid::new_v4(), Uuid::new_v4())]])
        .append_query_results([Vec::<crate::db::entities::organization_member::Model>::new()])
        .into_connection();

    let service = FileService::new(Arc::new(db), FileStorage::from_config(&storage_config(dir.path())));
    let err = service.delete(Uuid::new_v4(), file_id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

// ---- 数据库连接与外部连接 ----

#[tokio::test]
async fn test_database_connection_validation() {
    let service = DatabaseConnectionService::new(empty_db(), encryption());

    let err = service
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            CreateDatabaseConnectionRequest {
                name: "warehouse".to_string(),
                db_type: "oracle".to_string(),
                config: serde_json::json!({"host": "db"}),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = service
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            CreateDatabaseConnectionRequest {
                name: "warehouse".to_string(),
                db_type: "postgres".to_string(),
                config: serde_json::json!("postgres://user:pass@db/app"),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_database_connection_config_is_encrypted() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let stored = crate::db::entities::database_connection::Model {
        id: Uuid::new_v4(),
        workspace_id,
        name: "warehouse".to_string(),
        db_type: crate::db::entities::prelude::DatabaseType::Postgres,
        encrypted_config: "v1:placeholder".to_string(),
        created_by: user_id,
        created_at: now(),
        updated_at: now(),
    };
    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Member)
        .append_query_results([vec![stored]])
        .into_connection();
    let db = Arc::new(db);

    let service = DatabaseConnectionService::new(db.clone(), encryption());
    let info = service
        .create(
            user_id,
            workspace_id,
            CreateDatabaseConnectionRequest {
                name: "warehouse".to_string(),
                db_type: "Postgres".to_string(),
                config: serde_json::json!({"password": "hunter2-secret"}),
            },
        )
        .await
        .unwrap();

    assert_eq!(info.name, "warehouse");
    drop(service);
    let log = format!("{:?}", transaction_log(db));
    assert!(!log.contains("hunter2-secret"));
}

#[tokio::test]
async fn test_list_connections_decrypts_config() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();

    let config = crate::oauth::ConnectionConfig {
        provider: "google".to_string(),
        connection_type: crate::db::entities::prelude::ConnectionType::GoogleSheets,
        scopes: vec!["scope".to_string()],
        account_email: Some("analyst@example.com".to_string()),
        document_id: None,
        connected_at: chrono::Utc::now(),
    };
    let mut stored = connection_model(connection_id, workspace_id, user_id);
    stored.encrypted_config = encryption().encrypt_json(&config).unwrap();
    let mut broken = connection_model(Uuid::new_v4(), workspace_id, user_id);
    broken.encrypted_config = "v1:not-valid".to_string();

    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Member)
        .append_query_results([vec![stored, broken]])
        .into_connection();

    let connections = ConnectionService::new(Arc::new(db), encryption())
        .list(user_id, workspace_id)
        .await
        .unwrap();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[0].config.as_ref(), Some(&config));
    assert!(connections[1].config.is_none());
}

#[tokio::test]
async fn test_list_data_sources() {
    let user_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();
    let workspace_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();
    let db = workspace_member_db(workspace_id, org_id, user_id, OrganizationRole::Member)
        .append_query_results([vec![data_source_model(workspace_id, connection_id)]])
        .into_connection();

    let sources = ConnectionService::new(Arc::new(db), encryption())
        .list_data_sources(user_id, workspace_id)
        .await
        .unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].connection_id, connection_id);
}
