// 组织实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 组织实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 组织名称
    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    /// 组织标识符（用于 URL 等，全局唯一）
    #[sea_orm(column_type = "String(Some(63))", unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// 所有者用户 ID
    pub owner_id: Uuid,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// 组织关联关系
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// 一对多：组织 -> 成员
    #[sea_orm(has_many = "super::organization_member::Entity")]
    Members,

    /// 一对多：组织 -> 工作区
    #[sea_orm(has_many = "super::workspace::Entity")]
    Workspaces,
}

impl Related<super::organization_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
