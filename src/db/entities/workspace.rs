// 工作区实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 工作区实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 所属组织
    pub organization_id: Uuid,

    #[sea_orm(column_type = "String(Some(100))")]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_delete = "Cascade"
    )]
    Organization,

    #[sea_orm(has_many = "super::workspace_member::Entity")]
    Members,

    #[sea_orm(has_many = "super::ai_agent::Entity")]
    Agents,

    #[sea_orm(has_many = "super::external_connection::Entity")]
    ExternalConnections,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::workspace_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::ai_agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agents.def()
    }
}

impl Related<super::external_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalConnections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
