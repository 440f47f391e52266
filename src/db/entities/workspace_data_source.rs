// 工作区数据源实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::external_connection::ConnectionType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspace_data_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_id: Uuid,
    pub connection_id: Uuid,

    /// 数据源类型，与连接类型一致
    pub source_type: ConnectionType,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    /// 外部文档 ID（表格、文档等）
    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub document_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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

    #[sea_orm(
        belongs_to = "super::external_connection::Entity",
        from = "Column::ConnectionId",
        to = "super::external_connection::Column::Id",
        on_delete = "Cascade"
    )]
    Connection,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::external_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Connection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
