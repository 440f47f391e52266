// 用户实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用户实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// 用户 ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 邮箱地址（全局唯一）
    #[sea_orm(column_type = "String(Some(255))", unique)]
    pub email: String,

    /// 密码哈希
    #[sea_orm(column_type = "String(Some(255))")]
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// 显示名称
    #[sea_orm(column_type = "String(Some(255))")]
    pub display_name: String,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,

    /// 最后登录时间
    #[sea_orm(nullable)]
    pub last_login_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// 一对多：用户 -> 组织成员关系
    #[sea_orm(has_many = "super::organization_member::Entity")]
    OrganizationMembers,
}

impl Related<super::organization_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
