// 数据库迁移脚本定义
// 版本号按时间排序，应用顺序即列表顺序

use super::Migration;

/// 获取所有迁移
pub fn get_all_migrations() -> Vec<Migration> {
    vec![
        create_users_table(),
        create_organization_tables(),
        create_workspace_tables(),
        create_ai_agents_table(),
        create_file_tables(),
        create_external_connection_tables(),
        create_database_connections_table(),
    ]
}

fn migration(version: &str, name: &str, description: &str, up_sql: &str, down_sql: &str) -> Migration {
    Migration {
        version: version.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        up_sql: up_sql.to_string(),
        down_sql: down_sql.to_string(),
    }
}

/// 创建用户表
fn create_users_table() -> Migration {
    migration(
        "20250101_000001",
        "create_users_table",
        "创建用户表",
        r#"
            CREATE TABLE users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                display_name VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                last_login_at TIMESTAMPTZ
            );

            CREATE INDEX idx_users_created_at ON users(created_at);
        "#,
        r#"
            DROP TABLE IF EXISTS users;
        "#,
    )
}

/// 创建组织与组织成员表
fn create_organization_tables() -> Migration {
    migration(
        "20250101_000002",
        "create_organization_tables",
        "创建组织表和组织成员表",
        r#"
            CREATE TYPE organization_role AS ENUM ('owner', 'admin', 'member');

            CREATE TABLE organizations (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(63) NOT NULL UNIQUE,
                description TEXT,
                owner_id UUID NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE organization_members (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role organization_role NOT NULL DEFAULT 'member',
                joined_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                CONSTRAINT uq_organization_members UNIQUE (organization_id, user_id)
            );

            CREATE INDEX idx_organizations_owner ON organizations(owner_id);
            CREATE INDEX idx_organization_members_user ON organization_members(user_id);
        "#,
        r#"
            DROP TABLE IF EXISTS organization_members;
            DROP TABLE IF EXISTS organizations;
            DROP TYPE IF EXISTS organization_role;
        "#,
    )
}

/// 创建工作区与工作区成员表
fn create_workspace_tables() -> Migration {
    migration(
        "20250101_000003",
        "create_workspace_tables",
        "创建工作区表和工作区成员表",
        r#"
            CREATE TYPE workspace_role AS ENUM ('admin', 'editor', 'viewer');

            CREATE TABLE workspaces (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                name VARCHAR(100) NOT NULL CHECK (length(trim(name)) > 0),
                description TEXT,
                created_by UUID NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE workspace_members (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role workspace_role NOT NULL DEFAULT 'viewer',
                joined_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                CONSTRAINT uq_workspace_members UNIQUE (workspace_id, user_id)
            );

            CREATE INDEX idx_workspaces_organization ON workspaces(organization_id);
            CREATE INDEX idx_workspace_members_user ON workspace_members(user_id);
        "#,
        r#"
            DROP TABLE IF EXISTS workspace_members;
            DROP TABLE IF EXISTS workspaces;
            DROP TYPE IF EXISTS workspace_role;
        "#,
    )
}

/// 创建 AI Agent 表
fn create_ai_agents_table() -> Migration {
    migration(
        "20250101_000004",
        "create_ai_agents_table",
        "创建 AI Agent 配置表",
        r#"
            CREATE TABLE ai_agents (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                system_prompt TEXT,
                model VARCHAR(100) NOT NULL,
                temperature DOUBLE PRECISION NOT NULL DEFAULT 0.7 CHECK (temperature >= 0 AND temperature <= 2),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_by UUID NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX idx_ai_agents_workspace ON ai_agents(workspace_id);
        "#,
        r#"
            DROP TABLE IF EXISTS ai_agents;
        "#,
    )
}

/// 创建文件上传与摘要表
fn create_file_tables() -> Migration {
    migration(
        "20250101_000005",
        "create_file_tables",
        "创建文件上传表和文件摘要表",
        r#"
            CREATE TABLE file_uploads (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                uploaded_by UUID NOT NULL REFERENCES users(id),
                file_name VARCHAR(255) NOT NULL,
                stored_path VARCHAR(500) NOT NULL,
                content_type VARCHAR(255) NOT NULL,
                size_bytes BIGINT NOT NULL CHECK (size_bytes >= 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE file_summaries (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                file_id UUID NOT NULL UNIQUE REFERENCES file_uploads(id) ON DELETE CASCADE,
                summary TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX idx_file_uploads_workspace ON file_uploads(workspace_id);
        "#,
        r#"
            DROP TABLE IF EXISTS file_summaries;
            DROP TABLE IF EXISTS file_uploads;
        "#,
    )
}

/// 创建外部连接、OAuth 令牌与数据源表
fn create_external_connection_tables() -> Migration {
    migration(
        "20250101_000006",
        "create_external_connection_tables",
        "创建外部连接、OAuth 令牌和工作区数据源表",
        r#"
            CREATE TYPE connection_type AS ENUM ('google_sheets', 'google_docs', 'google_analytics');
            CREATE TYPE connection_status AS ENUM ('active', 'revoked', 'error');

            CREATE TABLE external_connections (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                user_id UUID NOT NULL REFERENCES users(id),
                provider VARCHAR(50) NOT NULL,
                connection_type connection_type NOT NULL,
                name VARCHAR(255) NOT NULL,
                encrypted_config TEXT NOT NULL,
                status connection_status NOT NULL DEFAULT 'active',
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE oauth_tokens (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                connection_id UUID NOT NULL REFERENCES external_connections(id) ON DELETE CASCADE,
                encrypted_tokens TEXT NOT NULL,
                expires_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE workspace_data_sources (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                connection_id UUID NOT NULL REFERENCES external_connections(id) ON DELETE CASCADE,
                source_type connection_type NOT NULL,
                name VARCHAR(255) NOT NULL,
                document_id VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX idx_external_connections_workspace ON external_connections(workspace_id);
            CREATE INDEX idx_oauth_tokens_connection ON oauth_tokens(connection_id);
            CREATE INDEX idx_workspace_data_sources_workspace ON workspace_data_sources(workspace_id);
        "#,
        r#"
            DROP TABLE IF EXISTS workspace_data_sources;
            DROP TABLE IF EXISTS oauth_tokens;
            DROP TABLE IF EXISTS external_connections;
            DROP TYPE IF EXISTS connection_status;
            DROP TYPE IF EXISTS connection_type;
        "#,
    )
}

/// 创建数据库连接表
fn create_database_connections_table() -> Migration {
    migration(
        "20250101_000007",
        "create_database_connections_table",
        "创建工作区数据库连接表",
        r#"
            CREATE TYPE database_type AS ENUM ('postgres', 'mysql', 'sqlite', 'mssql');

            CREATE TABLE database_connections (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL,
                db_type database_type NOT NULL,
                encrypted_config TEXT NOT NULL,
                created_by UUID NOT NULL REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX idx_database_connections_workspace ON database_connections(workspace_id);
        "#,
        r#"
            DROP TABLE IF EXISTS database_connections;
            DROP TYPE IF EXISTS database_type;
        "#,
    )
}
