// 外部连接实体定义
// 一条记录对应一次成功的 OAuth 授权

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// 连接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "connection_type")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[sea_orm(string_value = "google_sheets")]
    GoogleSheets,
    #[sea_orm(string_value = "google_docs")]
    GoogleDocs,
    #[sea_orm(string_value = "google_analytics")]
    GoogleAnalytics,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::GoogleSheets => "google_sheets",
            ConnectionType::GoogleDocs => "google_docs",
            ConnectionType::GoogleAnalytics => "google_analytics",
        }
    }

    /// 用于连接与数据源默认名称
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionType::GoogleSheets => "Google Sheets",
            ConnectionType::GoogleDocs => "Google Docs",
            ConnectionType::GoogleAnalytics => "Google Analytics",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google_sheets" => Ok(ConnectionType::GoogleSheets),
            "google_docs" => Ok(ConnectionType::GoogleDocs),
            "google_analytics" => Ok(ConnectionType::GoogleAnalytics),
            other => Err(format!("不支持的连接类型: {}", other)),
        }
    }
}

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "connection_status")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "revoked")]
    Revoked,
    #[sea_orm(string_value = "error")]
    Error,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_connections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_id: Uuid,

    /// 完成授权的用户
    pub user_id: Uuid,

    /// 身份提供方，例如 google
    #[sea_orm(column_type = "String(Some(50))")]
    pub provider: String,

    pub connection_type: ConnectionType,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    /// 加密后的连接配置
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub encrypted_config: String,

    pub status: ConnectionStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspace::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspace::Column::Id",
        on_delete = "Cascade"
    )]
    Workspace,

    #[sea_orm(has_many = "super::oauth_token::Entity")]
    Tokens,

    #[sea_orm(has_many = "super::workspace_data_source::Entity")]
    DataSources,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::oauth_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl Related<super::workspace_data_source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataSources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
