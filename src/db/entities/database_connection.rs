// 数据库连接实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// 支持的数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "database_type")]
#[serde(rename_all = "snake_case")]
pub enum DatabaseType {
    #[sea_orm(string_value = "postgres")]
    Postgres,
    #[sea_orm(string_value = "mysql")]
    Mysql,
    #[sea_orm(string_value = "sqlite")]
    Sqlite,
    #[sea_orm(string_value = "mssql")]
    Mssql,
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(DatabaseType::Postgres),
            "mysql" => Ok(DatabaseType::Mysql),
            "sqlite" => Ok(DatabaseType::Sqlite),
            "mssql" => Ok(DatabaseType::Mssql),
            other => Err(format!("不支持的数据库类型: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "database_connections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_id: Uuid,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    pub db_type: DatabaseType,

    /// 加密后的连接配置（主机、账号、密码等）
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub encrypted_config: String,

    pub created_by: Uuid,
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
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
